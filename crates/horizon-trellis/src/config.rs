//! Dispatcher configuration.
//!
//! Configuration can be built in code, parsed from TOML or JSON text, or
//! loaded from a file whose extension selects the format:
//!
//! ```toml
//! id_separator = "_"
//!
//! [options]
//! theme = "dark"
//! columns = 3
//!
//! [animation]
//! default_duration_ms = 200
//! ```

use std::path::Path;

use horizon_trellis_core::{Error, Map, Result, Value};
use serde::{Deserialize, Serialize};

use crate::element::DEFAULT_DURATION_MS;

/// Animation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Tween duration used when a definition omits `duration`.
    pub default_duration_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

/// Settings applied to a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Dispatcher-level option defaults, consulted by views without a local
    /// override.
    pub options: Map,
    pub animation: AnimationConfig,
    /// Separator between prefix and number in generated ids.
    pub id_separator: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            options: Map::new(),
            animation: AnimationConfig::default(),
            id_separator: "-".to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a default option.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn default_duration_ms(mut self, duration_ms: f64) -> Self {
        self.animation.default_duration_ms = duration_ms;
        self
    }

    pub fn id_separator(mut self, separator: impl Into<String>) -> Self {
        self.id_separator = separator.into();
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validated()
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validated()
    }

    /// Load a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(Error::config(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    /// Serialize as pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    fn validated(self) -> Result<Self> {
        let duration = self.animation.default_duration_ms;
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::config(format!(
                "animation.default_duration_ms must be a non-negative number, got {duration}"
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.animation.default_duration_ms, 150.0);
        assert_eq!(config.id_separator, "-");
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let config = DispatcherConfig::from_toml_str(
            r#"
            id_separator = "_"

            [options]
            theme = "dark"
            columns = 3

            [animation]
            default_duration_ms = 200.0
            "#,
        )
        .unwrap();

        assert_eq!(config.id_separator, "_");
        assert_eq!(config.options["theme"], Value::from("dark"));
        assert_eq!(config.options["columns"], Value::Integer(3));
        assert_eq!(config.animation.default_duration_ms, 200.0);
    }

    #[test]
    fn test_from_json_partial() {
        let config = DispatcherConfig::from_json_str(r#"{ "options": { "dense": true } }"#).unwrap();
        assert_eq!(config.options["dense"], Value::Bool(true));
        assert_eq!(config.animation.default_duration_ms, 150.0);
    }

    #[test]
    fn test_rejects_negative_duration() {
        let err = DispatcherConfig::from_json_str(r#"{ "animation": { "default_duration_ms": -1 } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("trellis.toml");
        let mut file = std::fs::File::create(&toml_path).unwrap();
        writeln!(file, "[options]\nlocale = \"nl\"").unwrap();
        let config = DispatcherConfig::load(&toml_path).unwrap();
        assert_eq!(config.options["locale"], Value::from("nl"));

        let yaml_path = dir.path().join("trellis.yaml");
        std::fs::write(&yaml_path, "options: {}").unwrap();
        assert!(matches!(
            DispatcherConfig::load(&yaml_path),
            Err(Error::Config { .. })
        ));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            DispatcherConfig::load(&missing),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip_keeps_options() {
        let config = DispatcherConfig::new()
            .option("theme", "light")
            .default_duration_ms(90.0);
        let text = config.to_toml_string().unwrap();
        assert_eq!(DispatcherConfig::from_toml_str(&text).unwrap(), config);
    }
}
