use crate::anki::AnkiClient;
use crate::anki::actions::{ADD_NOTE, FIELD_BACK, FIELD_FRONT, MODEL_BASIC};
use crate::input::{Arguments, InputError};
use crate::tools::{ToolError, finish, success_result};
use serde_json::{Value, json};

pub async fn call(client: &AnkiClient, args: &Value) -> Value {
    finish(run(client, args).await)
}

#[derive(Debug)]
struct NewCard {
    deck_name: String,
    front: String,
    back: String,
    tags: Vec<String>,
}

fn parse(args: &Value) -> Result<NewCard, InputError> {
    let mut reader = Arguments::new(args);
    let deck_name = reader.required_string("deckName");
    let front = reader.required_string("front");
    let back = reader.required_string("back");
    let tags = reader.optional_tags("tags");
    reader.finish()?;

    let (Some(deck_name), Some(front), Some(back)) = (deck_name, front, back) else {
        return Err(InputError::invalid_input("deckName, front and back are required"));
    };
    Ok(NewCard {
        deck_name,
        front,
        back,
        tags: tags.unwrap_or_default(),
    })
}

async fn run(client: &AnkiClient, args: &Value) -> Result<Value, ToolError> {
    let card = parse(args)?;

    let params = json!({
        "note": {
            "deckName": card.deck_name,
            "modelName": MODEL_BASIC,
            "fields": {
                FIELD_FRONT: card.front,
                FIELD_BACK: card.back,
            },
            "tags": card.tags,
        }
    });
    let note_id: i64 = client.execute(ADD_NOTE, params).await?;
    tracing::info!(deck = %card.deck_name, note_id, "basic note created");

    Ok(success_result(
        format!("Created card in deck \"{}\" (note id {note_id})", card.deck_name),
        json!({ "noteId": note_id, "deckName": card.deck_name }),
    ))
}
