//! Definition file loading
//!
//! Documents are JSON or YAML, picked by file extension (`.json`, `.yaml`,
//! `.yml`).

use crate::error::{ConfigError, ConfigResult};
use crate::model::AutomationConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load an automation definition file
pub fn load_automation(path: impl AsRef<Path>) -> ConfigResult<AutomationConfig> {
    load(path.as_ref())
}

/// Load any JSON or YAML document, such as a trigger payload
pub fn load_value(path: impl AsRef<Path>) -> ConfigResult<serde_json::Value> {
    load(path.as_ref())
}

/// Parse an automation definition from a string
pub fn parse_automation(
    content: &str,
    format: Format,
    source_path: &Path,
) -> ConfigResult<AutomationConfig> {
    parse(content, format, source_path)
}

fn load<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let format = Format::from_path(path)?;
    debug!("Loading {:?} document: {:?}", format, path);

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&content, format, path)
}

fn parse<T: DeserializeOwned>(
    content: &str,
    format: Format,
    source_path: &Path,
) -> ConfigResult<T> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| ConfigError::ParseJson {
            path: source_path.to_path_buf(),
            source: e,
        }),
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.YML")).unwrap(), Format::Yaml);
        assert!(matches!(
            Format::from_path(Path::new("a.toml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_yaml_automation() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "quote.yaml",
            r#"
name: quote
actions:
  - type: setVariable
    alias: setName
    propertyName: name
    value:
      objectPathLookup: /trigger/name
"#,
        );

        let config = load_automation(&path).unwrap();
        assert_eq!(config.name, "quote");
        assert_eq!(config.actions[0].alias, "setName");
        assert_eq!(
            config.actions[0].setting("value"),
            Some(&serde_json::json!({"objectPathLookup": "/trigger/name"}))
        );
    }

    #[test]
    fn test_load_json_value() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "trigger.json", r#"{"name": "Peter"}"#);
        assert_eq!(
            load_value(&path).unwrap(),
            serde_json::json!({"name": "Peter"})
        );
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "{ not json");
        let err = load_automation(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_automation("/nonexistent/automation.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
