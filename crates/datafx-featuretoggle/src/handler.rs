//! Feature state shared by every view of a flow

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use datafx_core::prelude::*;
use datafx_core::{NodeRef, Property};
use serde::Deserialize;

/// `[features]` table of a feature file
///
/// ```toml
/// [features]
/// FEATURE1 = true
/// FEATURE2 = false
/// ```
#[derive(Debug, Default, Deserialize)]
struct FeatureFile {
    #[serde(default)]
    features: BTreeMap<String, bool>,
}

/// Feature flags as observable properties
///
/// Every feature name maps to one [`Property<bool>`]; all nodes and fields
/// bound to a feature follow it when it is toggled. Unknown features are
/// created on first use with the handler's default state.
#[derive(Debug)]
pub struct FeatureHandler {
    default_enabled: bool,
    features: RefCell<HashMap<String, Property<bool>>>,
    // Negated mirrors, bound to `disabled` node properties
    inverted: RefCell<HashMap<String, Property<bool>>>,
}

impl Default for FeatureHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureHandler {
    /// Handler where unknown features start enabled
    pub fn new() -> Self {
        Self::with_default(true)
    }

    pub fn with_default(default_enabled: bool) -> Self {
        Self {
            default_enabled,
            features: RefCell::new(HashMap::new()),
            inverted: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: FeatureFile = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse feature table: {e}")))?;
        let handler = Self::new();
        for (name, enabled) in file.features {
            handler.set_enabled(&name, enabled);
        }
        Ok(handler)
    }

    /// Load feature states, falling back to an empty handler if the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No feature file at {}, using defaults", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
        let handler = Self::from_toml(&content)?;
        info!(
            "Loaded {} feature(s) from {}",
            handler.features.borrow().len(),
            path.display()
        );
        Ok(handler)
    }

    /// Shared property for `name`
    pub fn feature_property(&self, name: &str) -> Property<bool> {
        self.features
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| Property::new(self.default_enabled))
            .clone()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        match self.features.borrow().get(name) {
            Some(property) => property.get(),
            None => self.default_enabled,
        }
    }

    pub fn set_enabled(&self, name: &str, enabled: bool) {
        debug!("Feature {} -> {}", name, enabled);
        self.feature_property(name).set(enabled);
    }

    pub fn enable(&self, name: &str) {
        self.set_enabled(name, true);
    }

    pub fn disable(&self, name: &str) {
        self.set_enabled(name, false);
    }

    /// Known feature names, sorted
    pub fn features(&self) -> Vec<String> {
        let mut names: Vec<String> = self.features.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Show `node` only while `name` is enabled
    pub fn hide_by_feature(&self, node: &NodeRef, name: &str) {
        node.visible().bind(&self.feature_property(name));
    }

    /// Disable `node` while `name` is disabled
    pub fn disable_by_feature(&self, node: &NodeRef, name: &str) {
        node.disabled().bind(&self.inverted_property(name));
    }

    fn inverted_property(&self, name: &str) -> Property<bool> {
        if let Some(inverted) = self.inverted.borrow().get(name) {
            return inverted.clone();
        }
        let feature = self.feature_property(name);
        let inverted = Property::new(!feature.get());
        let mirror = inverted.clone();
        feature.add_listener(move |_, enabled| mirror.set(!*enabled));
        self.inverted
            .borrow_mut()
            .insert(name.to_string(), inverted.clone());
        inverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafx_core::Node;
    use tempfile::tempdir;

    #[test]
    fn test_unknown_feature_uses_default() {
        assert!(FeatureHandler::new().is_enabled("BETA"));
        assert!(!FeatureHandler::with_default(false).is_enabled("BETA"));
    }

    #[test]
    fn test_feature_property_is_shared() {
        let handler = FeatureHandler::new();
        let first = handler.feature_property("BETA");
        let second = handler.feature_property("BETA");

        handler.disable("BETA");

        assert!(!first.get());
        assert!(!second.get());
        assert_eq!(handler.features(), vec!["BETA"]);
    }

    #[test]
    fn test_hide_by_feature_follows_toggle() {
        let handler = FeatureHandler::new();
        let button = Node::button("Export");

        handler.hide_by_feature(&button, "EXPORT");
        assert!(button.visible().get());

        handler.disable("EXPORT");
        assert!(!button.visible().get());

        handler.enable("EXPORT");
        assert!(button.visible().get());
    }

    #[test]
    fn test_disable_by_feature_is_inverted() {
        let handler = FeatureHandler::new();
        handler.disable("SYNC");
        let first = Node::button("Sync");
        let second = Node::button("Sync now");

        handler.disable_by_feature(&first, "SYNC");
        handler.disable_by_feature(&second, "SYNC");
        assert!(first.disabled().get());
        assert!(second.disabled().get());

        handler.enable("SYNC");
        assert!(!first.disabled().get());
        assert!(!second.disabled().get());
        assert_eq!(handler.feature_property("SYNC").listener_count(), 1);
    }

    #[test]
    fn test_from_toml() {
        let handler = FeatureHandler::from_toml(
            r#"
            [features]
            FEATURE1 = true
            FEATURE2 = false
            "#,
        )
        .unwrap();
        assert!(handler.is_enabled("FEATURE1"));
        assert!(!handler.is_enabled("FEATURE2"));
        assert_eq!(handler.features(), vec!["FEATURE1", "FEATURE2"]);
    }

    #[test]
    fn test_from_toml_rejects_non_bool() {
        let result = FeatureHandler::from_toml("[features]\nFEATURE1 = \"yes\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        let handler = FeatureHandler::load(&temp.path().join("features.toml")).unwrap();
        assert!(handler.features().is_empty());
    }

    #[test]
    fn test_load_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("features.toml");
        std::fs::write(&path, "[features]\nDARK_MODE = false\n").unwrap();

        let handler = FeatureHandler::load(&path).unwrap();
        assert!(!handler.is_enabled("DARK_MODE"));
    }
}
