//! View configuration
//!
//! Loaded from `datafx.toml`:
//!
//! ```toml
//! resource_dir = "resources"
//! layout_extension = "toml"
//!
//! [strings]
//! welcome = "Welcome to the wizard"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use datafx_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const CONFIG_FILENAME: &str = "datafx.toml";

/// Text values starting with this prefix are looked up in [`ViewConfiguration::strings`]
pub const STRING_KEY_PREFIX: char = '%';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfiguration {
    /// Directory the filesystem resource loader reads layouts and icons from
    pub resource_dir: PathBuf,

    /// File extension used when a layout name is derived from the controller name
    pub layout_extension: String,

    /// Localized strings, referenced from layouts and titles as `%key`
    pub strings: HashMap<String, String>,
}

impl Default for ViewConfiguration {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resources"),
            layout_extension: "toml".to_string(),
            strings: HashMap::new(),
        }
    }
}

impl ViewConfiguration {
    /// Parse a configuration file, failing on unreadable or malformed content
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve `%key` through the string table. Unknown keys and plain text
    /// are returned unchanged.
    pub fn resolve_text(&self, text: &str) -> String {
        match text.strip_prefix(STRING_KEY_PREFIX) {
            Some(key) => match self.strings.get(key) {
                Some(value) => value.clone(),
                None => {
                    debug!("No string for key '{}'", key);
                    text.to_string()
                }
            },
            None => text.to_string(),
        }
    }

    /// Layout resource name derived from a controller type name
    ///
    /// `WizardStartController` becomes `WizardStart.toml`.
    pub fn conventional_layout_name(&self, controller_name: &str) -> String {
        let base = controller_name
            .strip_suffix("Controller")
            .filter(|b| !b.is_empty())
            .unwrap_or(controller_name);
        format!("{}.{}", base, self.layout_extension)
    }
}

/// Load `datafx.toml` from `dir`
///
/// A missing file yields the defaults. A file that can't be read or parsed is
/// reported as [`Error::Config`].
pub fn load_view_configuration(dir: &Path) -> Result<ViewConfiguration> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Ok(ViewConfiguration::default());
    }

    let config = ViewConfiguration::from_file(&config_path)?;
    debug!("Loaded view configuration from {:?}", config_path);
    Ok(config)
}
