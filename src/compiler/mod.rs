//! Message compiler
//!
//! Turns the state of an [`ExtractionContext`] into file contents: the
//! default translation table, updated translation tables for the other
//! locales, and per-locale bundles holding only the messages the rendered
//! components use.

use serde_json::{Map, Value};

use globalize_merge::{canonical_serialize, is_unchanged, merge};

use crate::config::BundleOptions;
use crate::extract::{display_path, insert_at, lookup, ExtractionContext};
use crate::template::{with_locale, TemplateError};

/// Errors from compiling messages
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Missing message '{path}' for locale '{locale}'")]
    MissingMessage { locale: String, path: String },

    #[error("Invalid default translation: {0}")]
    InvalidDefault(String),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Produces translation tables and bundles
pub trait MessageCompiler {
    /// Default translation table text, `{default_locale: <messages>}`
    fn generate_default_translation(&self, default_locale: &str, ctx: &ExtractionContext) -> String;

    /// Fill the missing keys of `existing` from the default translation.
    ///
    /// Returns the new file contents, or None when nothing changed.
    fn init_or_update_translation(
        &self,
        locale: &str,
        existing: &Value,
        default_translation: &str,
    ) -> Result<Option<String>, CompileError>;

    /// Bundle text for `locale` holding every message the context rendered
    fn generate_bundle(
        &self,
        locale: &str,
        ctx: &ExtractionContext,
        options: &BundleOptions,
    ) -> Result<String, CompileError>;
}

/// Writes translation tables and bundles as canonical JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMessageCompiler;

impl JsonMessageCompiler {
    /// Wrap a tree as `{locale: tree}`
    fn scoped(locale: &str, tree: Value) -> Value {
        let mut map = Map::new();
        map.insert(locale.to_string(), tree);
        Value::Object(map)
    }

    /// Messages of the default translation, whatever locale key it was written under
    fn default_messages(default_translation: &str) -> Result<Value, CompileError> {
        let parsed: Value = serde_json::from_str(default_translation)
            .map_err(|e| CompileError::InvalidDefault(e.to_string()))?;

        match parsed {
            Value::Object(map) if map.len() <= 1 => Ok(map
                .into_iter()
                .next()
                .map(|(_, messages)| messages)
                .unwrap_or_else(|| Value::Object(Map::new()))),
            _ => Err(CompileError::InvalidDefault(
                "expected an object with a single locale key".to_string(),
            )),
        }
    }
}

impl MessageCompiler for JsonMessageCompiler {
    fn generate_default_translation(&self, default_locale: &str, ctx: &ExtractionContext) -> String {
        let messages = Value::Object(ctx.default_messages().clone());
        with_newline(canonical_serialize(&Self::scoped(default_locale, messages)))
    }

    fn init_or_update_translation(
        &self,
        locale: &str,
        existing: &Value,
        default_translation: &str,
    ) -> Result<Option<String>, CompileError> {
        let seed = Self::scoped(locale, Self::default_messages(default_translation)?);

        // Existing translations take precedence over the regenerated default
        let merged = merge([seed, existing.clone()]);
        if is_unchanged(existing, &merged) {
            return Ok(None);
        }
        Ok(Some(with_newline(canonical_serialize(&merged))))
    }

    fn generate_bundle(
        &self,
        locale: &str,
        ctx: &ExtractionContext,
        options: &BundleOptions,
    ) -> Result<String, CompileError> {
        let mut messages = Map::new();
        for path in ctx.used_paths() {
            let mut full_path = Vec::with_capacity(path.len() + 1);
            full_path.push(locale.to_string());
            full_path.extend(path.iter().cloned());

            let message = lookup(ctx.loaded(), &full_path).ok_or_else(|| {
                CompileError::MissingMessage {
                    locale: locale.to_string(),
                    path: display_path(path),
                }
            })?;
            insert_at(&mut messages, path, message.clone());
        }

        let body = canonical_serialize(&Self::scoped(locale, Value::Object(messages)));
        let content = match &options.banner {
            Some(banner) => format!("{}\n{}", with_locale(banner, locale)?, body),
            None => body,
        };
        Ok(with_newline(content))
    }
}

fn with_newline(mut text: String) -> String {
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(descriptor: Value) -> ExtractionContext {
        let mut ctx = ExtractionContext::new();
        if let Value::Object(map) = descriptor {
            ctx.render_tree(map);
        }
        ctx
    }

    #[test]
    fn test_default_translation_sorted() {
        let ctx = rendered(json!({"nav": {"home": "Home"}, "greeting": "Hello"}));
        let text = JsonMessageCompiler.generate_default_translation("en", &ctx);

        assert_eq!(
            text,
            "{\n  \"en\": {\n    \"greeting\": \"Hello\",\n    \"nav\": {\n      \"home\": \"Home\"\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_new_translation_from_default() {
        let ctx = rendered(json!({"greeting": "Hello"}));
        let default = JsonMessageCompiler.generate_default_translation("en", &ctx);

        let text = JsonMessageCompiler
            .init_or_update_translation("pt", &json!({}), &default)
            .unwrap()
            .unwrap();
        let written: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written, json!({"pt": {"greeting": "Hello"}}));
    }

    #[test]
    fn test_existing_translation_wins() {
        let ctx = rendered(json!({"greeting": "hello", "farewell": "bye"}));
        let default = JsonMessageCompiler.generate_default_translation("en", &ctx);

        let text = JsonMessageCompiler
            .init_or_update_translation("pt", &json!({"pt": {"greeting": "oi"}}), &default)
            .unwrap()
            .unwrap();
        let written: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written, json!({"pt": {"greeting": "oi", "farewell": "bye"}}));
    }

    #[test]
    fn test_complete_translation_unchanged() {
        let ctx = rendered(json!({"greeting": "hello"}));
        let default = JsonMessageCompiler.generate_default_translation("en", &ctx);

        let update = JsonMessageCompiler
            .init_or_update_translation("pt", &json!({"pt": {"greeting": "oi"}}), &default)
            .unwrap();
        assert!(update.is_none());
    }

    #[test]
    fn test_stale_keys_are_kept() {
        // Keys no longer rendered are never removed from translations
        let ctx = rendered(json!({"greeting": "hello"}));
        let default = JsonMessageCompiler.generate_default_translation("en", &ctx);

        let update = JsonMessageCompiler
            .init_or_update_translation(
                "pt",
                &json!({"pt": {"greeting": "oi", "old": "velho"}}),
                &default,
            )
            .unwrap();
        assert!(update.is_none());
    }

    #[test]
    fn test_invalid_default_translation() {
        let err = JsonMessageCompiler
            .init_or_update_translation("pt", &json!({}), "{\"en\": {}, \"pt\": {}}")
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidDefault(_)));
    }

    #[test]
    fn test_bundle_holds_used_messages_only() {
        let mut ctx = rendered(json!({"greeting": "Hello", "nav": {"home": "Home"}}));
        ctx.load_messages(json!({
            "pt": {
                "greeting": "Olá",
                "nav": {"home": "Início", "about": "Sobre"},
                "unused": "x"
            }
        }));

        let text = JsonMessageCompiler
            .generate_bundle("pt", &ctx, &BundleOptions::default())
            .unwrap();
        let bundle: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            bundle,
            json!({"pt": {"greeting": "Olá", "nav": {"home": "Início"}}})
        );
    }

    #[test]
    fn test_bundle_missing_message() {
        let mut ctx = rendered(json!({"nav": {"home": "Home"}}));
        ctx.load_messages(json!({"pt": {"nav": {}}}));

        let err = JsonMessageCompiler
            .generate_bundle("pt", &ctx, &BundleOptions::default())
            .unwrap_err();
        match err {
            CompileError::MissingMessage { locale, path } => {
                assert_eq!(locale, "pt");
                assert_eq!(path, "nav/home");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bundle_banner() {
        let mut ctx = rendered(json!({"greeting": "Hello"}));
        ctx.load_messages(json!({"en": {"greeting": "Hello"}}));

        let options = BundleOptions {
            banner: Some("/* {locale} messages */".to_string()),
        };
        let text = JsonMessageCompiler.generate_bundle("en", &ctx, &options).unwrap();
        assert!(text.starts_with("/* en messages */\n{"));
    }
}
