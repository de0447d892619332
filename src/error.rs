use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// Constraint violations raised by the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("user #{0} does not exist")]
    UnknownUser(u64),

    #[error("order #{0} does not exist")]
    UnknownOrder(u64),

    #[error("product '{0}' does not exist")]
    ProductNotFound(String),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The file must have the extension CSV or JSON, got '{0}'")]
    UnsupportedFormat(String),

    #[error("unsupported text encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("file is not valid {0} text")]
    Decode(&'static str),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed file: {0}")]
    Structure(String),

    #[error("{record}: missing required field '{field}'")]
    MissingField { record: String, field: &'static str },

    #[error("{record}: unknown field '{field}'")]
    UnknownField { record: String, field: String },

    #[error("{record}: invalid value for '{field}': {reason}")]
    InvalidField {
        record: String,
        field: String,
        reason: String,
    },

    #[error("user '{0}' does not exist")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// Errors returned by HTTP handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("no file was uploaded")]
    MissingFile,

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::DuplicateUsername(_)) => StatusCode::CONFLICT,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Import(_)
            | AppError::Store(_)
            | AppError::Multipart(_)
            | AppError::MissingFile => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
