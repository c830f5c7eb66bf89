use serde_json::json;

use super::actions::{DECK_NAMES, FIND_NOTES, NOTES_INFO};
use super::client::AnkiClient;
use super::error::AnkiError;
use super::note::{Card, NoteModel, RawNote, project};

/// Note ids per `notesInfo` call when reading a whole deck.
pub const NOTES_INFO_BATCH_SIZE: usize = 5;

pub async fn deck_names(client: &AnkiClient) -> Result<Vec<String>, AnkiError> {
    client.execute(DECK_NAMES, json!({})).await
}

/// Search query selecting exactly the notes of `deck` (and its subdecks).
///
/// `*` and `_` are wildcards in Anki searches, even inside quotes, so they
/// are escaped along with `\` and `"`.
pub fn deck_query(deck: &str) -> String {
    let mut escaped = String::with_capacity(deck.len() + 2);
    for c in deck.chars() {
        if matches!(c, '\\' | '"' | '*' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("deck:\"{escaped}\"")
}

pub async fn find_deck_notes(client: &AnkiClient, deck: &str) -> Result<Vec<i64>, AnkiError> {
    client
        .execute(FIND_NOTES, json!({ "query": deck_query(deck) }))
        .await
}

pub async fn notes_info(client: &AnkiClient, note_ids: &[i64]) -> Result<Vec<RawNote>, AnkiError> {
    client
        .execute(NOTES_INFO, json!({ "notes": note_ids }))
        .await
}

/// Fetch and project every note of `deck`, in the order `findNotes` returned
/// them. Details are fetched sequentially in batches of
/// [`NOTES_INFO_BATCH_SIZE`].
pub async fn deck_cards(client: &AnkiClient, deck: &str) -> Result<Vec<Card>, AnkiError> {
    let note_ids = find_deck_notes(client, deck).await?;
    tracing::debug!(deck, notes = note_ids.len(), "fetching deck contents");

    let mut cards = Vec::with_capacity(note_ids.len());
    for batch in note_ids.chunks(NOTES_INFO_BATCH_SIZE) {
        let notes = notes_info(client, batch).await?;
        for note in &notes {
            if let NoteModel::Unknown(model) = note.model() {
                tracing::debug!(note_id = note.note_id, model = %model, "unrecognised note type");
            }
        }
        cards.extend(notes.iter().map(project));
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::Value;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Answers `notesInfo` with a Basic note for every requested id.
    struct NotesInfoResponder;

    impl Respond for NotesInfoResponder {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).expect("json body");
            let notes: Vec<Value> = body["params"]["notes"]
                .as_array()
                .expect("notes array")
                .iter()
                .map(|id| {
                    let id = id.as_i64().expect("note id");
                    json!({
                        "noteId": id,
                        "modelName": "Basic",
                        "fields": {
                            "Front": {"value": format!("front {id}"), "order": 0},
                            "Back": {"value": format!("back {id}"), "order": 1}
                        },
                        "cards": [id * 10],
                        "tags": ["deck"]
                    })
                })
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({"result": notes, "error": null}))
        }
    }

    fn client(uri: &str) -> AnkiClient {
        let config = ClientConfig::default()
            .with_endpoint(uri)
            .with_retries(1, Duration::ZERO);
        AnkiClient::new(config).expect("client")
    }

    #[test]
    fn deck_query_escapes_quotes() {
        assert_eq!(deck_query("Spanish::Verbs"), "deck:\"Spanish::Verbs\"");
        assert_eq!(deck_query("My \"best\" deck"), "deck:\"My \\\"best\\\" deck\"");
    }

    #[test]
    fn deck_query_escapes_wildcards() {
        assert_eq!(deck_query("Verbs_1"), "deck:\"Verbs\\_1\"");
        assert_eq!(deck_query("C*"), "deck:\"C\\*\"");
        assert_eq!(deck_query("a\\b"), "deck:\"a\\\\b\"");
    }

    #[tokio::test]
    async fn twelve_notes_are_fetched_in_three_ordered_batches() {
        let server = MockServer::start().await;
        let ids: Vec<i64> = (1..=12).collect();
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "action": "findNotes",
                "params": {"query": "deck:\"Spanish\""}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": ids})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"action": "notesInfo"})))
            .respond_with(NotesInfoResponder)
            .expect(3)
            .mount(&server)
            .await;

        let cards = deck_cards(&client(&server.uri()), "Spanish")
            .await
            .expect("cards");

        assert_eq!(cards.len(), 12);
        let card_ids: Vec<i64> = cards.iter().filter_map(|card| card.card_id).collect();
        assert_eq!(card_ids, (1..=12).map(|id| id * 10).collect::<Vec<_>>());
        assert_eq!(cards[0].front, "front 1");
        assert_eq!(cards[11].back, "back 12");

        let requests = server.received_requests().await.expect("recorded requests");
        let batches: Vec<Vec<i64>> = requests
            .iter()
            .map(|request| serde_json::from_slice::<Value>(&request.body).expect("json"))
            .filter(|body| body["action"] == "notesInfo")
            .map(|body| {
                body["params"]["notes"]
                    .as_array()
                    .expect("notes")
                    .iter()
                    .filter_map(Value::as_i64)
                    .collect()
            })
            .collect();
        assert_eq!(
            batches,
            vec![
                vec![1, 2, 3, 4, 5],
                vec![6, 7, 8, 9, 10],
                vec![11, 12],
            ]
        );
    }

    #[tokio::test]
    async fn empty_deck_skips_notes_info() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"action": "findNotes"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"action": "notesInfo"})))
            .respond_with(NotesInfoResponder)
            .expect(0)
            .mount(&server)
            .await;

        let cards = deck_cards(&client(&server.uri()), "Empty")
            .await
            .expect("cards");
        assert!(cards.is_empty());
    }
}
