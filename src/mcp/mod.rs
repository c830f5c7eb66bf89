use serde_json::json;

pub mod contracts;
pub mod errors;
pub mod resources;

pub fn tool_definitions() -> Vec<serde_json::Value> {
    vec![
        json!({
            "name": contracts::TOOL_CREATE_DECK,
            "description": "Create a new Anki deck.",
            "inputSchema": contracts::create_deck_schema()
        }),
        json!({
            "name": contracts::TOOL_CREATE_CARD,
            "description": "Create a Basic front/back card in a deck.",
            "inputSchema": contracts::create_card_schema()
        }),
        json!({
            "name": contracts::TOOL_UPDATE_CARD,
            "description": "Update the front, back or tags of an existing Basic card.",
            "inputSchema": contracts::update_card_schema()
        }),
        json!({
            "name": contracts::TOOL_CREATE_CLOZE_CARD,
            "description": "Create a cloze deletion card in a deck.",
            "inputSchema": contracts::create_cloze_card_schema()
        }),
        json!({
            "name": contracts::TOOL_UPDATE_CLOZE_CARD,
            "description": "Update the text, back extra or tags of an existing cloze card.",
            "inputSchema": contracts::update_cloze_card_schema()
        }),
    ]
}
