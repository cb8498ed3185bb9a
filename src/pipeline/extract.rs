//! Decoding the extraction payload into [`ExtractedFields`].
//!
//! The payload must be a flat JSON object whose values are strings or
//! `null`. A `null` value is stored as the empty string. Nested objects,
//! arrays, numbers or anything that is not JSON abort the run. Keys are not checked against the template; a key the template needs
//! but the model left out fails later, at render time.

use crate::error::RenameError;
use std::collections::BTreeMap;

/// Field name → value, as returned by the text model.
pub type ExtractedFields = BTreeMap<String, String>;

/// Decode `payload` into [`ExtractedFields`].
pub fn parse_fields(payload: &str) -> Result<ExtractedFields, RenameError> {
    let raw: BTreeMap<String, Option<String>> =
        serde_json::from_str(payload).map_err(|source| RenameError::InvalidExtraction {
            payload: payload.to_string(),
            source,
        })?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}
