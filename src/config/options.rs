//! Task options (globalize.toml)
//!
//! Declares the locales to process, the modules whose components carry
//! messages, and the bundles to build from them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use crate::template::placeholders;

/// Error types for option loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read options file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse options: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Module resolution strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    /// Element entries are file paths or glob patterns
    #[default]
    Direct,
    /// Element entries are module ids resolved against a base url
    BaseUrl,
}

/// Resolver configuration (`[resolver]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub kind: ResolverKind,

    /// Directory module ids are resolved against (base-url only)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Suffix appended to resolved module ids (base-url only)
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Module id prefix rewrites, e.g. `"vendor" = "../third_party"`
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

fn default_suffix() -> String {
    ".json".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            kind: ResolverKind::Direct,
            base_url: None,
            suffix: default_suffix(),
            paths: BTreeMap::new(),
        }
    }
}

/// One module (`[modules.<name>]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Message file path template, e.g. "translations/{locale}.json"
    pub messages: String,

    /// Component descriptors rendered for this module
    #[serde(default)]
    pub elements: Vec<String>,
}

/// Bundle output options (`[bundle]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleOptions {
    /// Header line written before each bundle; may use `{locale}`
    #[serde(default)]
    pub banner: Option<String>,
}

/// Fully merged task options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOptions {
    /// Locale whose messages come from the components themselves
    pub default_locale: String,

    /// All locales to process
    pub locales: Vec<String>,

    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Modules by name
    pub modules: BTreeMap<String, ModuleConfig>,

    /// Bundle destination template -> module names
    #[serde(default)]
    pub build: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub bundle: BundleOptions,
}

impl TaskOptions {
    /// Parse options from a TOML string (no defaults layer)
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let options: TaskOptions =
            toml::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Locales other than the default, in declaration order
    pub fn translated_locales(&self) -> impl Iterator<Item = &str> {
        self.locales
            .iter()
            .map(String::as_str)
            .filter(move |locale| *locale != self.default_locale)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_locale.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'default_locale' must be a non-empty locale (e.g., \"en\")".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for locale in &self.locales {
            if locale.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "'locales' must not contain empty entries".to_string(),
                ));
            }
            if !seen.insert(locale.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate locale '{}' in 'locales'",
                    locale
                )));
            }
        }

        for (name, module) in &self.modules {
            if module.messages.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "module[\"{}\"] must include 'messages' (e.g., \"translations/{{locale}}.json\")",
                    name
                )));
            }
            Self::validate_template(&format!("module[\"{}\"].messages", name), &module.messages)?;
            // one table per locale; without the placeholder every locale shares a file
            if !placeholders(&module.messages).contains(&"locale") {
                return Err(ConfigError::ValidationError(format!(
                    "module[\"{}\"].messages must contain {{locale}} (got \"{}\")",
                    name, module.messages
                )));
            }

            if module.elements.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "module[\"{}\"] must include at least one entry in 'elements'",
                    name
                )));
            }
        }

        for (dest, modules) in &self.build {
            Self::validate_template(&format!("build[\"{}\"]", dest), dest)?;
            for module in modules {
                if !self.modules.contains_key(module) {
                    return Err(ConfigError::ValidationError(format!(
                        "build[\"{}\"] references unknown module '{}'",
                        dest, module
                    )));
                }
            }
        }

        if let Some(banner) = &self.bundle.banner {
            Self::validate_template("bundle.banner", banner)?;
        }

        if self.resolver.kind == ResolverKind::BaseUrl && self.resolver.base_url.is_none() {
            return Err(ConfigError::ValidationError(
                "resolver kind 'base-url' requires 'base_url'".to_string(),
            ));
        }

        Ok(())
    }

    /// Templates may only use the `{locale}` placeholder
    fn validate_template(field: &str, template: &str) -> Result<(), ConfigError> {
        match placeholders(template).into_iter().find(|name| *name != "locale") {
            Some(name) => Err(ConfigError::ValidationError(format!(
                "{} uses unknown placeholder '{{{}}}' (only {{locale}} is supported)",
                field, name
            ))),
            None => Ok(()),
        }
    }
}
