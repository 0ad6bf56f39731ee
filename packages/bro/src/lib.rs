//! BRO client - search and download CPT soundings from the Dutch
//! Basisregistratie Ondergrond (BRO).
//!
//! This crate queries the public BRO CPT service for soundings registered
//! in a date range and area, downloads individual CPT objects as IMBRO XML,
//! and turns those documents into a nested, serializable structure.
//!
//! # Example
//!
//! ```
//! use bro::xml::{ImbroFile, ParsedValue};
//!
//! let xml = br#"<dispatchDataResponse xmlns:brocom="http://www.broservices.nl/xsd/brocommon/3.0">
//!   <dispatchDocument><CPT_O><brocom:broId>CPT000000053405</brocom:broId></CPT_O></dispatchDocument>
//! </dispatchDataResponse>"#;
//!
//! let parsed = ImbroFile::new(&xml[..]).parse().unwrap();
//! assert_eq!(
//!     parsed.pointer("dispatchDocument/CPT_O/broId").and_then(ParsedValue::as_str),
//!     Some("CPT000000053405")
//! );
//! ```
//!
//! # Architecture
//!
//! - [`xml`]: IMBRO structural parser and DOM helpers
//! - [`geometry`]: WGS84 / RD New coordinates and search areas
//! - [`characteristics`]: Characteristics search results
//! - [`geojson`]: GeoJSON export
//! - [`api`]: BRO CPT API client
//! - [`http`]: HTTP client wrapper
//! - [`config`]: Constants and validation
//! - [`output`]: JSON/YAML rendering and file output
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod api;
pub mod characteristics;
pub mod cli;
pub mod config;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod http;
pub mod output;
pub mod xml;

// Re-export main functions
pub use api::{
    get_cpt_characteristics, get_cpt_characteristics_and_return_cpt_objects, get_cpt_object,
    BroClient,
};

// Re-export commonly used items
pub use characteristics::CptCharacteristics;
pub use config::{validate_bro_id, validate_date};
pub use error::{BroError, Result};
pub use geometry::{Area, Circle, Envelope, Point, RdPoint};
pub use xml::{ImbroFile, ParseMode, ParsedValue};
