use thiserror::Error;

/// Failure of a single Graph operation. These never escape the wrapper
/// boundary as panics or anyhow errors; systems fold them into the error
/// envelope so the model can explain the failure to the user.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{operation}: HTTP Error {status} - {body}")]
    Http {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation}: {kind} - {detail}")]
    Transport {
        operation: String,
        kind: String,
        detail: String,
    },

    #[error("{operation}: AuthError - {detail}")]
    Auth { operation: String, detail: String },

    #[error("{0}")]
    MissingIdentifier(String),
}

impl GraphError {
    pub(crate) fn transport(operation: &str, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "TimeoutError"
        } else if err.is_connect() {
            "ConnectError"
        } else if err.is_decode() {
            "DecodeError"
        } else {
            "RequestError"
        };
        GraphError::Transport {
            operation: operation.to_string(),
            kind: kind.to_string(),
            detail: err.to_string(),
        }
    }
}
