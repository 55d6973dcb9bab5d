//! Path templates with `{name}` placeholders
//!
//! Used for message file paths (`translations/{locale}.json`), build
//! destinations and bundle banners.

use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Errors for template substitution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{name}}}' in template '{template}'")]
    UnknownVariable { name: String, template: String },
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([a-zA-Z]+)\}").expect("valid placeholder regex"))
}

/// Replace every `{name}` in `template` with its value from `vars`.
pub fn var_replace(template: &str, vars: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    // Check first so the error names the first unknown placeholder
    for name in placeholders(template) {
        if !vars.contains_key(name) {
            return Err(TemplateError::UnknownVariable {
                name: name.to_string(),
                template: template.to_string(),
            });
        }
    }

    let replaced = placeholder_regex().replace_all(template, |caps: &regex_lite::Captures| {
        vars.get(&caps[1]).copied().unwrap_or_default().to_string()
    });
    Ok(replaced.into_owned())
}

/// Substitute the `{locale}` placeholder
pub fn with_locale(template: &str, locale: &str) -> Result<String, TemplateError> {
    let vars = HashMap::from([("locale", locale)]);
    var_replace(template, &vars)
}

/// Placeholder names used in a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
