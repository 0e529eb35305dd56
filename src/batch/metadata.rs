// Metadata resolution
//
// Turns a raw build item (path + string-keyed metadata) into a
// `SourceFileRequest`. Missing fields are reported, never defaulted.

use crate::error::ShaderError;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

pub const PROFILE: &str = "Profile";
pub const ENTRYPOINT: &str = "Entrypoint";
pub const OUTPUT_FILE_NAME: &str = "OutputFileName";

/// One input record as the host build system hands it over
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InputItem {
    /// A row without a path is a blank row
    #[serde(rename = "path", default)]
    pub item_spec: String,
    #[serde(flatten, deserialize_with = "scalar_metadata")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Flag(bool),
    Integer(i64),
    Float(f64),
}

/// Metadata values are strings; other scalars are kept in their text form
fn scalar_metadata<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Scalar::Text(text) => text,
                Scalar::Flag(flag) => flag.to_string(),
                Scalar::Integer(n) => n.to_string(),
                Scalar::Float(x) => x.to_string(),
            };
            (key, value)
        })
        .collect())
}

impl InputItem {
    pub fn new(item_spec: impl Into<String>) -> Self {
        Self {
            item_spec: item_spec.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata value, or "" when the key is absent
    pub fn metadata(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Validated view of an input item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileRequest {
    pub source_path: String,
    pub profile: String,
    pub entrypoint: String,
    pub explicit_output_name: Option<String>,
}

/// Resolve the request for `item`.
///
/// Returns `None` for blank rows (empty path). Otherwise the request is always
/// produced, even with empty fields; each missing field adds one error to
/// the returned list so the caller can keep going with the file.
pub fn resolve(item: &InputItem) -> Option<(SourceFileRequest, Vec<ShaderError>)> {
    if item.item_spec.is_empty() {
        return None;
    }

    let source_path = item.item_spec.clone();
    let profile = item.metadata(PROFILE).to_string();
    let entrypoint = item.metadata(ENTRYPOINT).to_string();
    let explicit_output_name = Some(item.metadata(OUTPUT_FILE_NAME))
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let mut errors = Vec::new();
    if profile.is_empty() {
        errors.push(ShaderError::MissingProfile {
            source_path: source_path.clone(),
        });
    }
    if entrypoint.is_empty() {
        errors.push(ShaderError::MissingEntrypoint {
            source_path: source_path.clone(),
        });
    }

    let request = SourceFileRequest {
        source_path,
        profile,
        entrypoint,
        explicit_output_name,
    };
    Some((request, errors))
}
