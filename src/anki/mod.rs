pub mod actions;
pub mod client;
pub mod deck;
pub mod error;
pub mod note;

pub use client::AnkiClient;
pub use error::AnkiError;
