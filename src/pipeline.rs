//! Task pipeline
//!
//! Runs the two phases of the task in order:
//! - Translation tables: render each module's components, write the
//!   default-locale table, then fill the missing keys of every other locale
//! - Bundles: for each locale and build destination, load the translations
//!   of the listed modules, render their components and write a bundle
//!
//! Every module (table phase) and every locale/destination pair (bundle
//! phase) gets its own [`ExtractionContext`]. Files are only rewritten when
//! their content changes.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globalize_merge::canonical_serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::compiler::{CompileError, JsonMessageCompiler, MessageCompiler};
use crate::config::{ConfigError, EffectiveOptions, ModuleConfig};
use crate::extract::{read_json, ExtractError, ExtractionContext};
use crate::report::{FileKind, FileStatus, TaskReport, WriteMode};
use crate::resolver::{resolver_for, ModuleResolver, ResolveError};
use crate::template::{with_locale, TemplateError};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("extract error: {0}")]
    Extract(#[from] ExtractError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("messages for locale '{locale}' not found: {path}")]
    MissingMessages { locale: String, path: PathBuf },
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) | PipelineError::Template(_) => 1,
            PipelineError::Resolve(_) | PipelineError::Extract(_) => 2,
            PipelineError::Compile(_) | PipelineError::MissingMessages { .. } => 3,
            PipelineError::Io { .. } => 4,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Drives translation-table and bundle generation
pub struct Pipeline<'a> {
    effective: &'a EffectiveOptions,
    resolver: Box<dyn ModuleResolver>,
    compiler: Box<dyn MessageCompiler>,
    mode: WriteMode,

    /// Contents computed but not written (check mode), by path
    staged: HashMap<PathBuf, String>,
}

impl<'a> Pipeline<'a> {
    pub fn new(effective: &'a EffectiveOptions, mode: WriteMode) -> Self {
        Self {
            effective,
            resolver: resolver_for(&effective.options.resolver),
            compiler: Box::new(JsonMessageCompiler),
            mode,
            staged: HashMap::new(),
        }
    }

    /// Replace the message compiler
    pub fn with_compiler(mut self, compiler: Box<dyn MessageCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the module resolver
    pub fn with_resolver(mut self, resolver: Box<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Translation tables, then bundles
    pub fn run(&mut self) -> PipelineResult<TaskReport> {
        let mut report = self.generate_translation_table()?;
        report.extend(self.generate_bundles()?);
        Ok(report)
    }

    /// Write the default translation table of every module and fill the
    /// missing keys of the other locales' tables
    pub fn generate_translation_table(&mut self) -> PipelineResult<TaskReport> {
        let effective = self.effective;
        let options = &effective.options;
        let mut report = TaskReport::new(self.mode);

        for (name, module) in &options.modules {
            debug!(module = %name, "extracting default messages");

            let mut ctx = ExtractionContext::new();
            self.render_module(&mut ctx, module)?;

            let default_translation = self
                .compiler
                .generate_default_translation(&options.default_locale, &ctx);
            let dest = self.messages_path(module, &options.default_locale)?;

            let existing = self.read_existing(&dest);
            let changed = match existing.as_deref().map(|text| serde_json::from_str::<Value>(text)) {
                Some(Ok(tree)) => format!("{}\n", canonical_serialize(&tree)) != default_translation,
                _ => true,
            };
            let status = self.store(&dest, &default_translation, changed)?;
            if status == FileStatus::Written {
                info!("Generated `{}` using the default translation.", dest.display());
            }
            report.record(
                &dest,
                FileKind::Default,
                &options.default_locale,
                status,
                sha256_hex(&default_translation),
            );

            for locale in options.translated_locales() {
                let dest = self.messages_path(module, locale)?;
                let existing = self.read_tree_or_empty(&dest)?;

                let update =
                    self.compiler
                        .init_or_update_translation(locale, &existing, &default_translation)?;
                match update {
                    Some(translation) => {
                        let status = self.store(&dest, &translation, true)?;
                        if status == FileStatus::Written {
                            info!(
                                "Populated the new fields of `{}` using the default translation.",
                                dest.display()
                            );
                        }
                        report.record(&dest, FileKind::Translation, locale, status, sha256_hex(&translation));
                    }
                    None => {
                        debug!(path = %dest.display(), "translation unchanged");
                        let digest = self
                            .read_existing(&dest)
                            .map(|text| sha256_hex(&text))
                            .unwrap_or_default();
                        report.record(&dest, FileKind::Translation, locale, FileStatus::Unchanged, digest);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Write one bundle per locale and build destination
    pub fn generate_bundles(&mut self) -> PipelineResult<TaskReport> {
        let effective = self.effective;
        let options = &effective.options;
        let mut report = TaskReport::new(self.mode);

        for locale in &options.locales {
            for (dest_template, module_names) in &options.build {
                let mut ctx = ExtractionContext::new();

                for name in module_names {
                    // validated at load time
                    let Some(module) = options.modules.get(name) else {
                        continue;
                    };

                    let messages_path = self.messages_path(module, locale)?;
                    let messages = self.read_tree(&messages_path)?.ok_or_else(|| {
                        PipelineError::MissingMessages {
                            locale: locale.clone(),
                            path: messages_path.clone(),
                        }
                    })?;
                    ctx.load_messages(messages);
                    self.render_module(&mut ctx, module)?;
                }

                let content = self
                    .compiler
                    .generate_bundle(locale, &ctx, &options.bundle)?;
                let dest = effective.resolve_path(&with_locale(dest_template, locale)?);

                let changed = self.read_existing(&dest).as_deref() != Some(content.as_str());
                let status = self.store(&dest, &content, changed)?;
                if status == FileStatus::Written {
                    info!("Generated `{}`.", dest.display());
                } else {
                    debug!(path = %dest.display(), ?status, "bundle not written");
                }
                report.record(&dest, FileKind::Bundle, locale, status, sha256_hex(&content));
            }
        }

        Ok(report)
    }

    fn render_module(&self, ctx: &mut ExtractionContext, module: &ModuleConfig) -> PipelineResult<()> {
        for entry in &module.elements {
            for path in self.resolver.resolve(&self.effective.root, entry)? {
                debug!(element = %path.display(), "rendering");
                ctx.render(&path)?;
            }
        }
        Ok(())
    }

    fn messages_path(&self, module: &ModuleConfig, locale: &str) -> PipelineResult<PathBuf> {
        Ok(self
            .effective
            .resolve_path(&with_locale(&module.messages, locale)?))
    }

    /// Current contents of a file, seeing staged contents first
    fn read_existing(&self, path: &Path) -> Option<String> {
        if let Some(staged) = self.staged.get(path) {
            return Some(staged.clone());
        }
        fs::read_to_string(path).ok()
    }

    /// Parsed message tree, or None when the file does not exist
    fn read_tree(&self, path: &Path) -> PipelineResult<Option<Value>> {
        if let Some(staged) = self.staged.get(path) {
            let tree = serde_json::from_str(staged).map_err(|source| ExtractError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            return Ok(Some(tree));
        }
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_json(path)?))
    }

    /// A missing file reads as an empty tree
    fn read_tree_or_empty(&self, path: &Path) -> PipelineResult<Value> {
        Ok(self
            .read_tree(path)?
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    /// Write (or stage, in check mode) `content` when `changed`
    fn store(&mut self, path: &Path, content: &str, changed: bool) -> PipelineResult<FileStatus> {
        if !changed {
            return Ok(FileStatus::Unchanged);
        }

        match self.mode {
            WriteMode::Check => {
                self.staged.insert(path.to_path_buf(), content.to_string());
                Ok(FileStatus::Stale)
            }
            WriteMode::Write => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                fs::write(path, content).map_err(|source| PipelineError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(FileStatus::Written)
            }
        }
    }
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
