use crate::anki::AnkiClient;
use crate::anki::actions::CREATE_DECK;
use crate::input::{Arguments, InputError};
use crate::tools::{ToolError, finish, success_result};
use serde_json::{Value, json};

pub async fn call(client: &AnkiClient, args: &Value) -> Value {
    finish(run(client, args).await)
}

fn parse_name(args: &Value) -> Result<String, InputError> {
    let mut reader = Arguments::new(args);
    let name = reader.required_string("name");
    reader.finish()?;
    name.ok_or_else(|| InputError::invalid_input("name is required"))
}

async fn run(client: &AnkiClient, args: &Value) -> Result<Value, ToolError> {
    let name = parse_name(args)?;

    // createDeck is idempotent: an existing deck's id is returned unchanged.
    let deck_id: i64 = client.execute(CREATE_DECK, json!({ "deck": name })).await?;
    tracing::info!(deck = %name, deck_id, "deck created");

    Ok(success_result(
        format!("Created deck \"{name}\" (id {deck_id})"),
        json!({ "deckId": deck_id, "name": name }),
    ))
}
