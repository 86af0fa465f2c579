use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::models::{CoordinateValue, TargetCatalog, TargetRecord};

/// Custom deserializer that accepts a number, a numeric string, or a blank
/// cell. Blank cells (`null`, `""`, `"-"`, `"—"`) become `None`.
fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "-" || trimmed == "—" {
                Ok(None)
            } else {
                trimmed.parse::<f64>().map(Some).map_err(D::Error::custom)
            }
        }
    }
}

/// Raw row as published in the LOOK tables, keyed by the page's column headers
#[derive(Debug, Deserialize)]
struct RawLookRow {
    #[serde(rename = "Target Name")]
    name: String,
    #[serde(rename = "R.A.")]
    ra: CoordinateValue,
    #[serde(rename = "Dec.")]
    dec: CoordinateValue,
    #[serde(rename = "V Mag.", default, deserialize_with = "deserialize_optional_number")]
    magnitude: Option<f64>,
    #[serde(rename = "Rate (\"/min)", default, deserialize_with = "deserialize_optional_number")]
    rate: Option<f64>,
}

impl From<RawLookRow> for TargetRecord {
    fn from(raw: RawLookRow) -> Self {
        TargetRecord {
            name: raw.name.trim().to_string(),
            ra: raw.ra,
            dec: raw.dec,
            // An unpublished magnitude can never pass the magnitude window.
            magnitude: raw.magnitude.unwrap_or(f64::NAN),
            rate: raw.rate.unwrap_or(0.0),
        }
    }
}

/// Container for the published document
#[derive(Debug, Deserialize)]
struct RawLookDocument {
    #[serde(default)]
    active: Vec<RawLookRow>,
    #[serde(default)]
    new: Vec<RawLookRow>,
}

/// Parse a LOOK target document from a file.
pub fn parse_look_file(path: &Path) -> Result<TargetCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read target file: {}", path.display()))?;

    parse_look_str(&content)
}

/// Parse a LOOK target document from a string.
///
/// The document must be a JSON object holding an `active` and/or a `new`
/// array of rows.
pub fn parse_look_str(json_str: &str) -> Result<TargetCatalog> {
    let json_value: serde_json::Value = serde_json::from_str(json_str).with_context(|| {
        let preview: String = json_str.chars().take(200).collect();
        format!("Invalid JSON syntax. First 200 chars: {}", preview)
    })?;

    let has_tables = json_value
        .as_object()
        .map(|o| o.contains_key("active") || o.contains_key("new"))
        .unwrap_or(false);
    if !has_tables {
        anyhow::bail!(
            "Target document must contain an 'active' or 'new' table. Found keys: {:?}",
            json_value.as_object().map(|o| o.keys().collect::<Vec<_>>())
        );
    }

    let document: RawLookDocument = serde_path_to_error::deserialize(json_value)
        .map_err(|e| anyhow::anyhow!("Invalid target row at '{}': {}", e.path(), e.inner()))?;

    Ok(TargetCatalog {
        active: document.active.into_iter().map(TargetRecord::from).collect(),
        new: document.new.into_iter().map(TargetRecord::from).collect(),
    })
}
