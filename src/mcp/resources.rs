//! Decks exposed as MCP resources: one `anki://decks/<name>` resource per
//! deck, whose contents are the deck's cards.

use crate::anki::{AnkiClient, AnkiError, deck};
use crate::mcp::contracts::{DECK_MIME_TYPE, DECK_URI_PREFIX};
use crate::mcp::errors;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde_json::{Value, json};

const DECK_NAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: errors::RPC_INVALID_PARAMS,
            message: message.into(),
        }
    }
}

impl From<AnkiError> for RpcError {
    fn from(err: AnkiError) -> Self {
        Self {
            code: errors::RPC_INTERNAL_ERROR,
            message: err.to_string(),
        }
    }
}

pub fn deck_uri(name: &str) -> String {
    format!("{DECK_URI_PREFIX}{}", utf8_percent_encode(name, DECK_NAME_SET))
}

pub fn deck_from_uri(uri: &str) -> Option<String> {
    let encoded = uri.strip_prefix(DECK_URI_PREFIX)?;
    let name = percent_decode_str(encoded).decode_utf8().ok()?;
    if name.trim().is_empty() {
        return None;
    }
    Some(name.into_owned())
}

pub async fn list(client: &AnkiClient) -> Result<Value, RpcError> {
    let names = deck::deck_names(client).await?;
    let resources: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "uri": deck_uri(name),
                "name": name,
                "description": format!("Cards in the Anki deck \"{name}\""),
                "mimeType": DECK_MIME_TYPE
            })
        })
        .collect();
    Ok(json!({ "resources": resources }))
}

pub async fn read(client: &AnkiClient, params: Option<&Value>) -> Result<Value, RpcError> {
    let uri = params
        .and_then(|value| value.get("uri"))
        .and_then(|value| value.as_str())
        .ok_or_else(|| RpcError::invalid_params("params.uri must be a string"))?;
    let deck_name = deck_from_uri(uri)
        .ok_or_else(|| RpcError::invalid_params(format!("unknown resource uri: {uri}")))?;

    let cards = deck::deck_cards(client, &deck_name).await?;
    let text = serde_json::to_string_pretty(&json!({
        "deck": deck_name,
        "cards": cards
    }))
    .map_err(|err| RpcError {
        code: errors::RPC_INTERNAL_ERROR,
        message: format!("failed to serialize deck contents: {err}"),
    })?;

    Ok(json!({
        "contents": [{
            "uri": uri,
            "mimeType": DECK_MIME_TYPE,
            "text": text
        }]
    }))
}
