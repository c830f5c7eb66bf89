use crate::anki::AnkiClient;
use crate::anki::actions::{FIELD_BACK, FIELD_FRONT, UPDATE_NOTE_FIELDS, UPDATE_NOTE_TAGS};
use crate::input::{Arguments, InputError};
use crate::tools::{ToolError, finish, note_for_card, success_result};
use serde_json::{Map, Value, json};

pub async fn call(client: &AnkiClient, args: &Value) -> Value {
    finish(run(client, args).await)
}

#[derive(Debug)]
struct CardUpdate {
    card_id: i64,
    fields: Map<String, Value>,
    tags: Option<Vec<String>>,
}

fn parse(args: &Value) -> Result<CardUpdate, InputError> {
    let mut reader = Arguments::new(args);
    let card_id = reader.required_id("cardId");
    let front = reader.optional_string("front");
    let back = reader.optional_string("back");
    let tags = reader.optional_tags("tags");
    reader.finish()?;

    let card_id = card_id.ok_or_else(|| InputError::invalid_input("cardId is required"))?;
    let mut fields = Map::new();
    if let Some(front) = front {
        fields.insert(FIELD_FRONT.to_string(), json!(front));
    }
    if let Some(back) = back {
        fields.insert(FIELD_BACK.to_string(), json!(back));
    }
    Ok(CardUpdate {
        card_id,
        fields,
        tags,
    })
}

async fn run(client: &AnkiClient, args: &Value) -> Result<Value, ToolError> {
    let update = parse(args)?;
    let note_id = note_for_card(client, update.card_id).await?;
    let summary = apply_note_update(client, note_id, update.fields, update.tags).await?;
    Ok(summary.into_result(update.card_id))
}

/// What a note update actually wrote.
pub(crate) struct UpdateSummary {
    pub note_id: i64,
    pub fields: Vec<String>,
    pub tags_replaced: bool,
}

impl UpdateSummary {
    pub fn into_result(self, card_id: i64) -> Value {
        let text = match (self.fields.is_empty(), self.tags_replaced) {
            (true, false) => format!("Nothing to update for card {card_id}"),
            (false, false) => format!("Updated {} of card {card_id}", self.fields.join(", ")),
            (true, true) => format!("Replaced tags of card {card_id}"),
            (false, true) => format!(
                "Updated {} and replaced tags of card {card_id}",
                self.fields.join(", ")
            ),
        };
        success_result(
            text,
            json!({
                "cardId": card_id,
                "noteId": self.note_id,
                "updatedFields": self.fields,
                "tagsReplaced": self.tags_replaced
            }),
        )
    }
}

/// Write fields, then tags. The two writes are separate AnkiConnect calls:
/// if the tag write fails the field write stays in place.
pub(crate) async fn apply_note_update(
    client: &AnkiClient,
    note_id: i64,
    fields: Map<String, Value>,
    tags: Option<Vec<String>>,
) -> Result<UpdateSummary, ToolError> {
    let field_names: Vec<String> = fields.keys().cloned().collect();

    if !fields.is_empty() {
        client
            .execute::<()>(
                UPDATE_NOTE_FIELDS,
                json!({ "note": { "id": note_id, "fields": fields } }),
            )
            .await?;
        tracing::info!(note_id, fields = ?field_names, "note fields updated");
    }

    let tags_replaced = match tags {
        Some(tags) => {
            client
                .execute::<()>(UPDATE_NOTE_TAGS, json!({ "note": note_id, "tags": tags }))
                .await?;
            tracing::info!(note_id, "note tags replaced");
            true
        }
        None => false,
    };

    Ok(UpdateSummary {
        note_id,
        fields: field_names,
        tags_replaced,
    })
}
