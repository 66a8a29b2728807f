use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("JSON Error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Could not read config {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Malformed config {}: {source}", path.display())]
    ConfigFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Customer: '{key}' does not exist, check your customers.json file")]
    CustomerNotFound { key: String },

    #[error("Input Error: {source}")]
    Input {
        #[from]
        source: inquire::error::InquireError,
    },

    #[error("Amounts of item {item_no} are too large, even with the configured defaults")]
    AmountOverflow { item_no: usize },

    #[error("Error rendering PDF {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },
}
