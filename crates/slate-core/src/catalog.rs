//! Built-in seed catalog.

use serde::Deserialize;

use crate::model::Course;

const DEFAULT_CATALOG: &str = include_str!("../catalog/default.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    course: Vec<Course>,
}

/// Parse a catalog document (`[[course]]` tables).
///
/// # Errors
///
/// Returns the TOML error if the document is malformed.
pub fn parse_catalog(text: &str) -> Result<Vec<Course>, toml::de::Error> {
    toml::from_str::<CatalogFile>(text).map(|file| file.course)
}

/// The seed courses in pool order.
///
/// # Errors
///
/// Fails only if the embedded catalog is malformed.
pub fn default_catalog() -> Result<Vec<Course>, toml::de::Error> {
    parse_catalog(DEFAULT_CATALOG)
}
