use crate::anki::actions::{CARDS_TO_NOTES, NOTES_INFO};
use crate::anki::note::RawNote;
use crate::anki::{AnkiClient, AnkiError};
use crate::input::InputError;
use crate::mcp::errors;
use serde_json::{Value, json};

pub mod create_card;
pub mod create_cloze_card;
pub mod create_deck;
pub mod update_card;
pub mod update_cloze_card;

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> serde_json::Value {
    let message = message.into();
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

pub fn success_result(text: impl Into<String>, structured: Value) -> Value {
    json!({
        "content": [{"type": "text", "text": text.into()}],
        "structuredContent": structured,
        "isError": false
    })
}

#[derive(Debug)]
pub struct ToolError {
    pub kind: &'static str,
    pub message: String,
    /// AnkiConnect action that produced the error, if any.
    pub source: Option<String>,
}

impl ToolError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self {
            kind: errors::PRECONDITION_FAILED,
            message: message.into(),
            source: None,
        }
    }

    pub fn into_result(self) -> Value {
        error_result(self.kind, self.message, self.source.as_deref())
    }
}

impl From<InputError> for ToolError {
    fn from(err: InputError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
            source: None,
        }
    }
}

impl From<AnkiError> for ToolError {
    fn from(err: AnkiError) -> Self {
        let (kind, source) = match &err {
            AnkiError::Transport { .. } => (errors::BACKEND_UNREACHABLE, None),
            AnkiError::Backend { action, .. }
            | AnkiError::NullResult { action }
            | AnkiError::Decode { action, .. } => (errors::BACKEND_ERROR, Some(action.clone())),
            AnkiError::Client(_) => (errors::INTERNAL_ERROR, None),
        };
        Self {
            kind,
            message: err.to_string(),
            source,
        }
    }
}

/// Collapse a tool body's outcome into an MCP tool result.
pub fn finish(outcome: Result<Value, ToolError>) -> Value {
    outcome.unwrap_or_else(ToolError::into_result)
}

/// Resolve the note that generated `card_id`.
pub async fn note_for_card(client: &AnkiClient, card_id: i64) -> Result<i64, ToolError> {
    let note_ids: Vec<i64> = client
        .execute(CARDS_TO_NOTES, json!({ "cards": [card_id] }))
        .await?;
    note_ids
        .first()
        .copied()
        .ok_or_else(|| ToolError::precondition(format!("no note found for card id {card_id}")))
}

pub async fn note_info(client: &AnkiClient, note_id: i64) -> Result<RawNote, ToolError> {
    let notes: Vec<RawNote> = client
        .execute(NOTES_INFO, json!({ "notes": [note_id] }))
        .await?;
    notes
        .into_iter()
        .find(|note| note.note_id == note_id)
        .ok_or_else(|| ToolError::precondition(format!("note {note_id} does not exist")))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::anki::AnkiClient;
    use crate::config::ClientConfig;
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn client(server: &MockServer) -> AnkiClient {
        let config = ClientConfig::default()
            .with_endpoint(server.uri())
            .with_retries(1, Duration::ZERO);
        AnkiClient::new(config).expect("client")
    }

    pub async fn mock_action(server: &MockServer, action: &str, result: Value, times: u64) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "action": action })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": result, "error": null})),
            )
            .expect(times)
            .mount(server)
            .await;
    }

    /// Bodies of every request the fake AnkiConnect received, in order.
    pub async fn received(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .expect("recording enabled")
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("json body"))
            .collect()
    }

    pub fn actions(bodies: &[Value]) -> Vec<String> {
        bodies
            .iter()
            .filter_map(|body| body["action"].as_str().map(str::to_string))
            .collect()
    }
}
