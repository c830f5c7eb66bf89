use serde_json::json;

pub const TOOL_CREATE_DECK: &str = "anki.create_deck";
pub const TOOL_CREATE_CARD: &str = "anki.create_card";
pub const TOOL_UPDATE_CARD: &str = "anki.update_card";
pub const TOOL_CREATE_CLOZE_CARD: &str = "anki.create_cloze_card";
pub const TOOL_UPDATE_CLOZE_CARD: &str = "anki.update_cloze_card";

pub const PROTOCOL_VERSION: &str = "2025-11-25";
pub const DECK_URI_PREFIX: &str = "anki://decks/";
pub const DECK_MIME_TYPE: &str = "application/json";

fn tags_schema() -> serde_json::Value {
    json!({
        "oneOf": [
            { "type": "array", "items": { "type": "string" } },
            { "type": "string" }
        ],
        "description": "Tags to attach to the note, as a list or one string separated by spaces or commas"
    })
}

fn card_id_schema() -> serde_json::Value {
    json!({
        "oneOf": [
            { "type": "integer", "minimum": 1 },
            { "type": "string", "pattern": "^\\s*[0-9]+\\s*$" }
        ],
        "description": "Id of any card generated by the note"
    })
}

pub fn create_deck_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "minLength": 1, "description": "Deck name; use :: for subdecks" }
        },
        "required": ["name"],
        "additionalProperties": false
    })
}

pub fn create_card_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "deckName": { "type": "string", "minLength": 1 },
            "front": { "type": "string", "minLength": 1 },
            "back": { "type": "string", "minLength": 1 },
            "tags": tags_schema()
        },
        "required": ["deckName", "front", "back"],
        "additionalProperties": false
    })
}

pub fn update_card_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "cardId": card_id_schema(),
            "front": { "type": "string" },
            "back": { "type": "string" },
            "tags": tags_schema()
        },
        "required": ["cardId"],
        "additionalProperties": false
    })
}

pub fn create_cloze_card_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "deckName": { "type": "string", "minLength": 1 },
            "text": {
                "type": "string",
                "description": "Text with cloze deletions, e.g. Capital of France: {{c1::Paris}}"
            },
            "backExtra": { "type": "string" },
            "tags": tags_schema()
        },
        "required": ["deckName", "text"],
        "additionalProperties": false
    })
}

pub fn update_cloze_card_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "cardId": card_id_schema(),
            "text": { "type": "string" },
            "backExtra": { "type": "string" },
            "tags": tags_schema()
        },
        "required": ["cardId"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_id_and_tags_accept_string_forms() {
        let schema = update_card_schema();
        let card_id_types: Vec<&str> = schema["properties"]["cardId"]["oneOf"]
            .as_array()
            .expect("cardId oneOf")
            .iter()
            .filter_map(|variant| variant["type"].as_str())
            .collect();
        assert_eq!(card_id_types, vec!["integer", "string"]);

        for schema in [
            create_card_schema(),
            update_card_schema(),
            create_cloze_card_schema(),
            update_cloze_card_schema(),
        ] {
            let tag_types: Vec<&str> = schema["properties"]["tags"]["oneOf"]
                .as_array()
                .expect("tags oneOf")
                .iter()
                .filter_map(|variant| variant["type"].as_str())
                .collect();
            assert_eq!(tag_types, vec!["array", "string"]);
        }
    }
}
