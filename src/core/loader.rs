//! Parsing adapter turning configuration files into documents.

use crate::core::ConfigDocument;
use crate::error::{ConfigError, Result};
use std::fmt;
use std::path::Path;

/// Structured-data formats a configuration file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// YAML, the exporter's native format.
    #[default]
    Yaml,
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    ///
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    ///
    /// Anything else, including no extension, is treated as YAML.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use exporter_config::core::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_path("exporter.toml"), DocumentFormat::Toml);
    /// assert_eq!(DocumentFormat::from_path("exporter.conf"), DocumentFormat::Yaml);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Toml => f.write_str("toml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Parse raw file contents into a document.
///
/// Missing or `null` fields decode to empty values and unknown keys are
/// ignored. Beyond that, no defaulting or validation happens here.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] if the bytes are not valid for the
/// format or do not have the document's shape, and
/// [`ConfigError::FeatureNotEnabled`] if the format's cargo feature is off.
pub fn parse_document(bytes: &[u8], format: DocumentFormat) -> Result<ConfigDocument> {
    match format {
        DocumentFormat::Yaml => parse_yaml(bytes),
        DocumentFormat::Toml => parse_toml(bytes),
        DocumentFormat::Json => parse_json(bytes),
    }
}

/// Read and parse the file at `path`, detecting the format from its extension.
///
/// # Errors
///
/// Returns [`ConfigError::IoError`] if the file cannot be read, otherwise
/// whatever [`parse_document`] returns.
pub fn load_document(path: impl AsRef<Path>) -> Result<ConfigDocument> {
    let path = path.as_ref();
    load_document_as(path, DocumentFormat::from_path(path))
}

/// Read and parse the file at `path` as `format`.
///
/// # Errors
///
/// Same as [`load_document`].
pub fn load_document_as(path: impl AsRef<Path>, format: DocumentFormat) -> Result<ConfigDocument> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&bytes, format).map_err(|e| match e {
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{} ({})", msg, path.display()))
        }
        other => other,
    })
}

#[cfg(feature = "yaml")]
fn parse_yaml(bytes: &[u8]) -> Result<ConfigDocument> {
    // An empty YAML stream is an empty document rather than an EOF error.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigDocument::default());
    }

    serde_yaml::from_slice(bytes)
        .map_err(|e| ConfigError::ParseError(format!("invalid yaml: {}", e)))
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_bytes: &[u8]) -> Result<ConfigDocument> {
    Err(ConfigError::FeatureNotEnabled("yaml"))
}

#[cfg(feature = "toml")]
fn parse_toml(bytes: &[u8]) -> Result<ConfigDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("invalid toml: {}", e)))?;

    toml::from_str(text).map_err(|e| ConfigError::ParseError(format!("invalid toml: {}", e)))
}

#[cfg(not(feature = "toml"))]
fn parse_toml(_bytes: &[u8]) -> Result<ConfigDocument> {
    Err(ConfigError::FeatureNotEnabled("toml"))
}

#[cfg(feature = "json")]
fn parse_json(bytes: &[u8]) -> Result<ConfigDocument> {
    serde_json::from_slice(bytes)
        .map_err(|e| ConfigError::ParseError(format!("invalid json: {}", e)))
}

#[cfg(not(feature = "json"))]
fn parse_json(_bytes: &[u8]) -> Result<ConfigDocument> {
    Err(ConfigError::FeatureNotEnabled("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path("config.yaml"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("config.yml"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("config.YML"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("config.toml"), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path("config.json"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path("config"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("config.txt"), DocumentFormat::Yaml);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_document("/nonexistent/exporter.yml");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_full_yaml() {
        let doc = parse_document(
            br#"
hosts:
  default:
    username: root
    password: calvin
  10.0.0.5:
    username: admin
    password: secret
    collectors: [system, sensors]
groups:
  lab:
    username: lab
    password: labpass
collectors:
  - system
  - storage
loglevel: debug
"#,
            DocumentFormat::Yaml,
        )
        .unwrap();

        assert_eq!(doc.hosts.len(), 2);
        assert_eq!(doc.hosts["default"].username, "root");
        assert!(doc.hosts["default"].collectors.is_empty());
        assert_eq!(doc.hosts["10.0.0.5"].collectors, vec!["system", "sensors"]);
        assert_eq!(doc.groups["lab"].password, "labpass");
        assert_eq!(doc.collectors, vec!["system", "storage"]);
        assert_eq!(doc.log_level, "debug");
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_yaml_nulls_and_missing_fields() {
        let doc = parse_document(
            br#"
hosts:
  switch-01:
    username: admin
    collectors:
groups:
collectors: ~
unknown_key: ignored
"#,
            DocumentFormat::Yaml,
        )
        .unwrap();

        let host = &doc.hosts["switch-01"];
        assert_eq!(host.username, "admin");
        assert_eq!(host.password, "");
        assert!(host.collectors.is_empty());
        assert!(doc.groups.is_empty());
        assert!(doc.collectors.is_empty());
        assert_eq!(doc.log_level, "");
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_empty_yaml() {
        let doc = parse_document(b"  \n", DocumentFormat::Yaml).unwrap();
        assert_eq!(doc, ConfigDocument::default());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_malformed_yaml() {
        let result = parse_document(b"hosts: [unclosed", DocumentFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));

        // Valid YAML, wrong shape.
        let result = parse_document(b"collectors: {a: 1}", DocumentFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_load_yaml_file_and_error_mentions_path() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("exporter.yml");
        fs::write(&good, "loglevel: warn\n").unwrap();
        assert_eq!(load_document(&good).unwrap().log_level, "warn");

        let bad = temp_dir.path().join("broken.yml");
        fs::write(&bad, "hosts: [unclosed").unwrap();
        let err = load_document(&bad).unwrap_err();
        assert!(err.to_string().contains("broken.yml"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_parse_toml() {
        let doc = parse_document(
            br#"
collectors = ["system"]
loglevel = "error"

[hosts.default]
username = "root"
password = "pw"
"#,
            DocumentFormat::Toml,
        )
        .unwrap();

        assert_eq!(doc.hosts["default"].username, "root");
        assert_eq!(doc.collectors, vec!["system"]);
        assert_eq!(doc.log_level, "error");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_parse_json() {
        let doc = parse_document(
            br#"{"groups": {"core": {"username": "u", "password": "p", "collectors": null}}, "log_level": "trace"}"#,
            DocumentFormat::Json,
        )
        .unwrap();

        assert_eq!(doc.groups["core"].username, "u");
        assert!(doc.groups["core"].collectors.is_empty());
        assert_eq!(doc.log_level, "trace");
    }

    #[cfg(not(feature = "toml"))]
    #[test]
    fn test_disabled_format() {
        let result = parse_document(b"", DocumentFormat::Toml);
        assert!(matches!(result, Err(ConfigError::FeatureNotEnabled("toml"))));
    }

    #[test]
    fn test_load_as_explicit_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exporter.conf");
        fs::write(&path, "").unwrap();

        let result = load_document_as(&path, DocumentFormat::Yaml);
        if cfg!(feature = "yaml") {
            assert_eq!(result.unwrap(), ConfigDocument::default());
        } else {
            assert!(result.is_err());
        }
    }
}
