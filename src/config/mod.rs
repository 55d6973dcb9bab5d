//! Task options
//!
//! Options are assembled from three layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. The options file (globalize.toml)
//! 3. CLI overrides

mod defaults;
mod effective;
mod options;

pub use defaults::BuiltinDefaults;
pub use effective::{CliOverrides, EffectiveOptions, OptionsOrigin, OptionsSource};
pub use options::{
    BundleOptions, ConfigError, ModuleConfig, ResolverConfig, ResolverKind, TaskOptions,
};

/// Default options file name, relative to the working directory
pub const DEFAULT_OPTIONS_FILE: &str = "globalize.toml";
