use crate::anki::AnkiClient;
use crate::anki::actions::{FIELD_BACK_EXTRA, FIELD_TEXT};
use crate::anki::note::NoteModel;
use crate::input::{Arguments, InputError};
use crate::tools::update_card::apply_note_update;
use crate::tools::{ToolError, finish, note_for_card, note_info};
use serde_json::{Map, Value, json};

pub async fn call(client: &AnkiClient, args: &Value) -> Value {
    finish(run(client, args).await)
}

#[derive(Debug)]
struct ClozeUpdate {
    card_id: i64,
    fields: Map<String, Value>,
    tags: Option<Vec<String>>,
}

fn parse(args: &Value) -> Result<ClozeUpdate, InputError> {
    let mut reader = Arguments::new(args);
    let card_id = reader.required_id("cardId");
    let text = reader.cloze_text("text", false);
    let back_extra = reader.optional_text("backExtra");
    let tags = reader.optional_tags("tags");
    reader.finish()?;

    let card_id = card_id.ok_or_else(|| InputError::invalid_input("cardId is required"))?;
    let mut fields = Map::new();
    if let Some(text) = text {
        fields.insert(FIELD_TEXT.to_string(), json!(text));
    }
    if let Some(back_extra) = back_extra {
        fields.insert(FIELD_BACK_EXTRA.to_string(), json!(back_extra));
    }
    Ok(ClozeUpdate {
        card_id,
        fields,
        tags,
    })
}

async fn run(client: &AnkiClient, args: &Value) -> Result<Value, ToolError> {
    let update = parse(args)?;
    let note_id = note_for_card(client, update.card_id).await?;

    // Cloze-shaped fields must never be written into another note type.
    let note = note_info(client, note_id).await?;
    if note.model() != NoteModel::Cloze {
        return Err(ToolError::precondition(format!(
            "card {} belongs to a \"{}\" note, not a Cloze note",
            update.card_id, note.model_name
        )));
    }

    let summary = apply_note_update(client, note_id, update.fields, update.tags).await?;
    Ok(summary.into_result(update.card_id))
}
