//! Script path configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::Result;

/// Options controlling the built-in default formatter and template-based
/// mappings.
///
/// Template values may contain `{unit}` and `{component}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptOptions {
    /// Prefix for every default path
    #[serde(default = "defaults::path_prefix")]
    pub path_prefix: String,
    /// Static asset root for components from external units
    #[serde(default = "defaults::asset_root")]
    pub asset_root: String,
    /// File name suffix of component scripts
    #[serde(default = "defaults::script_suffix")]
    pub script_suffix: String,
    /// Namespace -> path template
    #[serde(default)]
    pub namespaces: HashMap<String, String>,
    /// Unit identity (`name@version`) -> path template
    #[serde(default)]
    pub units: HashMap<String, String>,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            path_prefix: defaults::PATH_PREFIX.to_string(),
            asset_root: defaults::ASSET_ROOT.to_string(),
            script_suffix: defaults::SCRIPT_SUFFIX.to_string(),
            namespaces: HashMap::new(),
            units: HashMap::new(),
        }
    }
}

impl ScriptOptions {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_json(&content)?;
        log::debug!("Loaded script options from {:?}", path);
        Ok(options)
    }
}
