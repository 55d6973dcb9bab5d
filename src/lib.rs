//! globalize-tasks - message extraction and per-locale bundles
//!
//! This crate extracts the default messages used by UI components, keeps a
//! translation table per locale up to date (filling in keys that are new
//! since the last run without touching existing translations), and builds
//! per-locale bundles containing only the messages the components use.

pub mod compiler;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod template;

pub use compiler::{CompileError, JsonMessageCompiler, MessageCompiler};
pub use config::{CliOverrides, ConfigError, EffectiveOptions, TaskOptions};
pub use extract::{ExtractError, ExtractionContext};
pub use pipeline::{Pipeline, PipelineError, PipelineResult};
pub use report::{FileKind, FileOutcome, FileStatus, TaskReport, WriteMode};
pub use resolver::{BaseUrlResolver, DirectResolver, ModuleResolver, ResolveError};
