//! Effective task options with provenance
//!
//! Layers are converted to JSON values and combined with the message tree
//! merge, so options follow the same rules as translations: objects merge
//! by key, arrays and scalars are replaced by the later layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use globalize_merge::merge;

use super::defaults::BuiltinDefaults;
use super::options::{ConfigError, TaskOptions};

/// Origin of an options layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OptionsOrigin {
    Builtin,
    File,
    Cli,
}

impl OptionsOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionsOrigin::Builtin => "builtin",
            OptionsOrigin::File => "file",
            OptionsOrigin::Cli => "cli",
        }
    }
}

/// A contributing options layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSource {
    pub origin: OptionsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Overrides taken from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub default_locale: Option<String>,
    pub locales: Option<Vec<String>>,
}

impl CliOverrides {
    /// Convert to a JSON layer, or None when no flag was given
    pub fn to_value(&self) -> Option<Value> {
        let mut map = serde_json::Map::new();
        if let Some(default_locale) = &self.default_locale {
            map.insert("default_locale".to_string(), Value::from(default_locale.clone()));
        }
        if let Some(locales) = &self.locales {
            map.insert("locales".to_string(), Value::from(locales.clone()));
        }

        if map.is_empty() {
            None
        } else {
            Some(Value::Object(map))
        }
    }
}

/// Merged and validated options, plus where they came from
#[derive(Debug, Clone)]
pub struct EffectiveOptions {
    pub options: TaskOptions,

    /// Directory relative paths are resolved against
    pub root: PathBuf,

    /// Contributing layers in precedence order
    pub sources: Vec<OptionsSource>,
}

impl EffectiveOptions {
    /// Build effective options from the options file and CLI overrides
    pub fn build(options_path: &Path, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: built-in defaults
        layers.push(BuiltinDefaults::default().to_value());
        sources.push(OptionsSource {
            origin: OptionsOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: options file
        let (value, digest) = Self::load_toml_file(options_path)?;
        layers.push(value);
        sources.push(OptionsSource {
            origin: OptionsOrigin::File,
            path: Some(options_path.to_string_lossy().to_string()),
            digest: Some(digest),
        });

        // Layer 3: CLI overrides
        if let Some(cli) = overrides.to_value() {
            layers.push(cli);
            sources.push(OptionsSource {
                origin: OptionsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge(layers);
        let options: TaskOptions =
            serde_json::from_value(merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        options.validate()?;

        if !options.locales.contains(&options.default_locale) {
            tracing::warn!(
                default_locale = %options.default_locale,
                "default locale is not listed in 'locales'; no bundle will be built for it"
            );
        }

        let root = project_root(options_path);

        Ok(Self {
            options,
            root,
            sources,
        })
    }

    /// Resolve a project-relative path
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Directory holding the options file; a bare file name means the working directory
pub fn project_root(options_path: &Path) -> PathBuf {
    options_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
