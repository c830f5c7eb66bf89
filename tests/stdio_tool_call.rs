mod common;

use common::{Server, closed_port_url};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn error_kind(response: &Value) -> Option<&str> {
    response
        .get("result")
        .and_then(|v| v.get("structuredContent"))
        .and_then(|v| v.get("error"))
        .and_then(|v| v.get("kind"))
        .and_then(|v| v.as_str())
}

#[tokio::test(flavor = "multi_thread")]
async fn cloze_card_is_validated_then_created() -> Result<(), Box<dyn std::error::Error>> {
    let anki = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "addNote",
            "version": 6,
            "params": {"note": {"modelName": "Cloze", "deckName": "Geography"}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": 1234, "error": null})),
        )
        .expect(1)
        .mount(&anki)
        .await;

    let mut server = Server::spawn(&anki.uri())?;

    let rejected = server.send(tool_call(
        10,
        "anki.create_cloze_card",
        json!({"deckName": "Geography", "text": "Capital of France: Paris"}),
    ))?;
    assert_eq!(error_kind(&rejected), Some("invalid_input"));

    let created = server.send(tool_call(
        11,
        "anki.create_cloze_card",
        json!({"deckName": "Geography", "text": "Capital of France: {{c1::Paris}}"}),
    ))?;
    let result = created.get("result").expect("result present");
    assert_eq!(result.get("isError").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        result
            .get("structuredContent")
            .and_then(|v| v.get("noteId"))
            .and_then(|v| v.as_i64()),
        Some(1234)
    );
    Ok(())
}

#[test]
fn unreachable_backend_is_reported_after_retries() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::spawn(&closed_port_url())?;

    let response = server.send(tool_call(12, "anki.create_deck", json!({"name": "Spanish"})))?;
    assert_eq!(error_kind(&response), Some("backend_unreachable"));
    let text = response
        .get("result")
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("text"))
        .and_then(|v| v.as_str())
        .expect("text content");
    assert!(text.contains("after 2 attempt(s)"), "{text}");
    Ok(())
}

#[test]
fn unknown_tool_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::spawn(&closed_port_url())?;

    let response = server.send(tool_call(13, "anki.delete_deck", json!({})))?;
    assert_eq!(error_kind(&response), Some("invalid_input"));
    Ok(())
}
