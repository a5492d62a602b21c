use crate::error::CistronError;
use serde::{Deserialize, Serialize};

/// A named, self-validating part of [`AppConfig`](super::AppConfig).
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    /// Table name of the section in TOML/JSON files and the env-var path.
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), CistronError>;
    fn to_manifest(&self) -> ConfigManifest;
}

/// Field descriptors of one section, for front ends that build their own
/// editing surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigManifest {
    pub section: String,
    pub fields: Vec<FieldManifest>,
}

impl ConfigManifest {
    pub fn field(&self, name: &str) -> Option<&FieldManifest> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldManifest {
    pub name: String,
    pub field_type: String,
    pub default: serde_json::Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub description: String,
}

impl FieldManifest {
    pub(crate) fn new(
        name: &str,
        field_type: &str,
        default: serde_json::Value,
        range: (Option<f64>, Option<f64>),
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            default,
            min: range.0,
            max: range.1,
            description: description.to_string(),
        }
    }
}
