//! Workspace configuration
//!
//! Controls where mapping and schema documents are written inside a workspace
//! and in which format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a workspace configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid workspace configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid workspace configuration: {0}")]
    Invalid(String),
}

/// Document format for persisted mappings and schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
        }
    }

    /// Format of a document file name, if it has a known extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension {
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

/// Layout of a workspace on a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Directory, relative to the workspace, holding one document per mapping
    pub mappings_dir: String,
    /// Directory, relative to the workspace, holding one document per schema
    pub schemas_dir: String,
    /// Format new documents are written in
    pub format: DocumentFormat,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            mappings_dir: "mappings".to_string(),
            schemas_dir: "schemas".to_string(),
            format: DocumentFormat::Yaml,
        }
    }
}

impl WorkspaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML; missing keys keep their defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_mapping_sdk::config::{DocumentFormat, WorkspaceConfig};
    ///
    /// let config = WorkspaceConfig::from_toml_str("format = \"json\"").unwrap();
    /// assert_eq!(config.format, DocumentFormat::Json);
    /// assert_eq!(config.mappings_dir, "mappings");
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WorkspaceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_mappings_dir(mut self, dir: impl Into<String>) -> Self {
        self.mappings_dir = dir.into();
        self
    }

    pub fn with_schemas_dir(mut self, dir: impl Into<String>) -> Self {
        self.schemas_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, dir) in [("mappingsDir", &self.mappings_dir), ("schemasDir", &self.schemas_dir)] {
            if dir.trim_matches('/').is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
            if dir.split('/').any(|segment| segment == "..") {
                return Err(ConfigError::Invalid(format!("{} must stay inside the workspace", key)));
            }
        }
        Ok(())
    }
}
