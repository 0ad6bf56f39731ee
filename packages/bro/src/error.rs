//! Error types for the BRO client.
//!
//! A single `BroError` enum covers validation, transport, XML and output
//! failures so library consumers can match on the cause.

use thiserror::Error;

/// Main error type for the BRO client library.
#[derive(Debug, Error)]
pub enum BroError {
    /// Invalid BRO object identifier.
    #[error("Invalid BRO ID format: '{0}'. Expected CPT followed by 12 digits (e.g., CPT000000053405)")]
    InvalidBroId(String),

    /// Invalid date format or value.
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD on or after 2015-01-01 (e.g., 2023-03-03)")]
    InvalidDate(String),

    /// Begin date lies after the end date.
    #[error("Invalid date range: begin date {begin} is after end date {end}")]
    InvalidDateRange { begin: String, end: String },

    /// Search area is not usable.
    #[error("Invalid search area: {0}")]
    InvalidArea(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The BRO API answered with a non-success status code.
    #[error("BRO API returned {status}{}", if .body.is_empty() { String::new() } else { format!(": {}", .body) })]
    Status { status: u16, body: String },

    /// Failed to download a CPT object.
    #[error("Failed to download CPT object {bro_id}: {source}")]
    ObjectDownload {
        bro_id: String,
        #[source]
        source: Box<BroError>,
    },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// XML content is not valid UTF-8.
    #[error("XML content is not valid UTF-8: {0}")]
    XmlEncoding(#[from] std::str::Utf8Error),

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Element text could not be converted to the expected type.
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },

    /// A characteristics search matched nothing.
    #[error("No available objects have been found in given date + area range. Retry with different parameters.")]
    NoDocumentsFound,

    /// Coordinate reprojection failed.
    #[error("Coordinate transformation failed: {0}")]
    Projection(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl From<proj4rs::errors::Error> for BroError {
    fn from(err: proj4rs::errors::Error) -> Self {
        Self::Projection(err.to_string())
    }
}

/// Result type alias for BRO client operations.
pub type Result<T> = std::result::Result<T, BroError>;
