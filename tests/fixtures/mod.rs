//! Test fixtures: throwaway project trees
//!
//! A project is a temp directory holding a globalize.toml, component
//! descriptors and (optionally) existing translation files.

#![allow(dead_code)]

use globalize_tasks::{CliOverrides, EffectiveOptions};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Options used by most tests: two modules, three locales, two bundles
pub const OPTIONS: &str = r#"
default_locale = "en"
locales = ["en", "pt", "zh"]

[modules.app]
messages = "translations/app/{locale}.json"
elements = ["src/app/**/*.messages.json"]

[modules.admin]
messages = "translations/admin/{locale}.json"
elements = ["src/admin/Dashboard.messages.json"]

[build]
"dist/{locale}/app.json" = ["app"]
"dist/{locale}/all.json" = ["app", "admin"]
"#;

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new(options: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let project = Self { dir };
        project.write("globalize.toml", options);
        project
    }

    /// The default project: components for `app` and `admin`
    pub fn standard() -> Self {
        let project = Self::new(OPTIONS);
        project.write(
            "src/app/Greeting.messages.json",
            r#"{"greeting": "Hello", "farewell": "Bye"}"#,
        );
        project.write(
            "src/app/nav/Menu.messages.json",
            r#"{"nav": {"home": "Home", "about": "About"}}"#,
        );
        project.write(
            "src/admin/Dashboard.messages.json",
            r#"{"dashboard": {"title": "Dashboard"}}"#,
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn options(&self) -> EffectiveOptions {
        self.options_with(&CliOverrides::default())
    }

    pub fn options_with(&self, overrides: &CliOverrides) -> EffectiveOptions {
        EffectiveOptions::build(&self.path("globalize.toml"), overrides).expect("valid options")
    }
}
