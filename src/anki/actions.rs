//! AnkiConnect action names and the parts of its contract that the
//! pipeline has to know about.

pub const API_VERSION: u8 = 6;

pub const CREATE_DECK: &str = "createDeck";
pub const DECK_NAMES: &str = "deckNames";
pub const FIND_NOTES: &str = "findNotes";
pub const NOTES_INFO: &str = "notesInfo";
pub const ADD_NOTE: &str = "addNote";
pub const CARDS_TO_NOTES: &str = "cardsToNotes";
pub const UPDATE_NOTE_FIELDS: &str = "updateNoteFields";
pub const UPDATE_NOTE_TAGS: &str = "updateNoteTags";

/// Actions whose documented success response is `{"result": null, "error": null}`.
///
/// Any other action answering with a null result is treated as a contract
/// violation. Revisit this list if AnkiConnect changes which actions may
/// legitimately return null.
pub const NULL_ON_SUCCESS: &[&str] = &[UPDATE_NOTE_FIELDS, UPDATE_NOTE_TAGS];

pub fn null_result_is_success(action: &str) -> bool {
    NULL_ON_SUCCESS.contains(&action)
}

pub const MODEL_BASIC: &str = "Basic";
pub const MODEL_CLOZE: &str = "Cloze";

pub const FIELD_FRONT: &str = "Front";
pub const FIELD_BACK: &str = "Back";
pub const FIELD_TEXT: &str = "Text";
pub const FIELD_BACK_EXTRA: &str = "Back Extra";
