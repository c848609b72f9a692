use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiaryError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Row {0} is not a data row")]
    InvalidLocator(u32),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, DiaryError>;
