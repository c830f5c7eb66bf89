use crate::anki::AnkiClient;
use crate::anki::actions::{ADD_NOTE, FIELD_BACK_EXTRA, FIELD_TEXT, MODEL_CLOZE};
use crate::input::{Arguments, InputError};
use crate::tools::{ToolError, finish, success_result};
use serde_json::{Value, json};

pub async fn call(client: &AnkiClient, args: &Value) -> Value {
    finish(run(client, args).await)
}

#[derive(Debug)]
struct NewClozeCard {
    deck_name: String,
    text: String,
    back_extra: String,
    tags: Vec<String>,
}

fn parse(args: &Value) -> Result<NewClozeCard, InputError> {
    let mut reader = Arguments::new(args);
    let deck_name = reader.required_string("deckName");
    let text = reader.cloze_text("text", true);
    let back_extra = reader.optional_text("backExtra");
    let tags = reader.optional_tags("tags");
    reader.finish()?;

    let (Some(deck_name), Some(text)) = (deck_name, text) else {
        return Err(InputError::invalid_input("deckName and text are required"));
    };
    Ok(NewClozeCard {
        deck_name,
        text,
        back_extra: back_extra.unwrap_or_default(),
        tags: tags.unwrap_or_default(),
    })
}

async fn run(client: &AnkiClient, args: &Value) -> Result<Value, ToolError> {
    let card = parse(args)?;

    let params = json!({
        "note": {
            "deckName": card.deck_name,
            "modelName": MODEL_CLOZE,
            "fields": {
                FIELD_TEXT: card.text,
                FIELD_BACK_EXTRA: card.back_extra,
            },
            "tags": card.tags,
        }
    });
    let note_id: i64 = client.execute(ADD_NOTE, params).await?;
    tracing::info!(deck = %card.deck_name, note_id, "cloze note created");

    Ok(success_result(
        format!(
            "Created cloze card in deck \"{}\" (note id {note_id})",
            card.deck_name
        ),
        json!({ "noteId": note_id, "deckName": card.deck_name }),
    ))
}
