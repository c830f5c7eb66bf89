use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::actions::{
    FIELD_BACK, FIELD_BACK_EXTRA, FIELD_FRONT, FIELD_TEXT, MODEL_BASIC, MODEL_CLOZE,
};

pub const CLOZE_BACK_PLACEHOLDER: &str = "[Cloze deletion]";
pub const UNKNOWN_NOTE_PLACEHOLDER: &str = "[Unknown note type]";

/// One entry of a `notesInfo` response.
///
/// AnkiConnect answers `{}` for ids it does not know, so every member is
/// optional and falls back to its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawNote {
    pub note_id: i64,
    pub model_name: String,
    pub fields: HashMap<String, FieldValue>,
    pub cards: Vec<i64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteModel {
    Basic,
    Cloze,
    Unknown(String),
}

impl NoteModel {
    pub fn from_name(name: &str) -> Self {
        match name {
            MODEL_BASIC => NoteModel::Basic,
            MODEL_CLOZE => NoteModel::Cloze,
            other => NoteModel::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_id: Option<i64>,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
}

impl RawNote {
    pub fn model(&self) -> NoteModel {
        NoteModel::from_name(&self.model_name)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|field| field.value.as_str())
    }
}

/// Project a note into the card view shown to clients. Never fails: notes
/// of an unrecognised model get placeholder text.
pub fn project(note: &RawNote) -> Card {
    let (front, back) = match note.model() {
        NoteModel::Basic => project_basic(note),
        NoteModel::Cloze => project_cloze(note),
        NoteModel::Unknown(_) => (
            UNKNOWN_NOTE_PLACEHOLDER.to_string(),
            UNKNOWN_NOTE_PLACEHOLDER.to_string(),
        ),
    };

    Card {
        card_id: note.cards.first().copied(),
        front,
        back,
        tags: note.tags.clone(),
    }
}

fn project_basic(note: &RawNote) -> (String, String) {
    (
        note.field(FIELD_FRONT).unwrap_or_default().to_string(),
        note.field(FIELD_BACK).unwrap_or_default().to_string(),
    )
}

fn project_cloze(note: &RawNote) -> (String, String) {
    let front = note.field(FIELD_TEXT).unwrap_or_default().to_string();
    let back = match note.field(FIELD_BACK_EXTRA) {
        Some(extra) if !extra.is_empty() => extra.to_string(),
        _ => CLOZE_BACK_PLACEHOLDER.to_string(),
    };
    (front, back)
}
