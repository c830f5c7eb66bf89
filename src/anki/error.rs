use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnkiError {
    /// Connection failures, non-200 statuses and unparseable bodies, after
    /// every attempt was used.
    #[error(
        "could not reach AnkiConnect after {attempts} attempt(s): {message}. \
         Make sure Anki is running with the AnkiConnect add-on enabled"
    )]
    Transport { attempts: u32, message: String },

    #[error("AnkiConnect rejected {action}: {message}")]
    Backend { action: String, message: String },

    #[error("AnkiConnect returned a null result for {action}")]
    NullResult { action: String },

    #[error("unexpected {action} payload: {message}")]
    Decode { action: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
