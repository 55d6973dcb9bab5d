//! Message extraction from component descriptors
//!
//! A component descriptor is a JSON message tree holding the default
//! messages a component formats, e.g.
//! `{"greeting": "Hello", "nav": {"home": "Home"}}`. Rendering a descriptor
//! records those messages and the paths they live at.
//!
//! All state lives in an [`ExtractionContext`] created for one scope and
//! dropped when the scope ends, so nothing leaks from one locale or module
//! into the next.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globalize_merge::deep_merge;

/// Errors while rendering descriptors
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Descriptor {0} is not a JSON object")]
    InvalidDescriptor(PathBuf),
}

/// Keys leading to a message inside a tree, displayed as `nav/home`
pub type MessagePath = Vec<String>;

/// Scoped accumulator of loaded locale data and rendered messages
#[derive(Debug)]
pub struct ExtractionContext {
    /// Locale data loaded for formatting (`{locale: {...}}`)
    loaded: Value,

    /// Default messages collected from rendered components
    defaults: Map<String, Value>,

    /// Message paths in first-use order
    used: Vec<MessagePath>,
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self {
            loaded: Value::Object(Map::new()),
            defaults: Map::new(),
            used: Vec::new(),
        }
    }

    /// Merge locale data into the context; later loads win
    pub fn load_messages(&mut self, messages: Value) {
        let loaded = std::mem::take(&mut self.loaded);
        self.loaded = deep_merge(loaded, messages);
    }

    /// Read and render one descriptor file
    pub fn render(&mut self, path: &Path) -> Result<(), ExtractError> {
        let descriptor = read_json(path)?;
        match descriptor {
            Value::Object(map) => {
                self.render_tree(map);
                Ok(())
            }
            _ => Err(ExtractError::InvalidDescriptor(path.to_path_buf())),
        }
    }

    /// Record the messages of an already-parsed descriptor
    pub fn render_tree(&mut self, descriptor: Map<String, Value>) {
        let mut paths = Vec::new();
        collect_leaf_paths(&descriptor, &mut Vec::new(), &mut paths);
        for path in paths {
            if !self.used.contains(&path) {
                self.used.push(path);
            }
        }

        let defaults = Value::Object(std::mem::take(&mut self.defaults));
        if let Value::Object(merged) = deep_merge(defaults, Value::Object(descriptor)) {
            self.defaults = merged;
        }
    }

    /// Locale data loaded so far
    pub fn loaded(&self) -> &Value {
        &self.loaded
    }

    /// Default messages rendered so far
    pub fn default_messages(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Message paths used by rendered components, in first-use order
    pub fn used_paths(&self) -> &[MessagePath] {
        &self.used
    }
}

/// Read a JSON file
pub fn read_json(path: &Path) -> Result<Value, ExtractError> {
    let contents = fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ExtractError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Look up the value at `path` inside `tree`
pub fn lookup<'a>(tree: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(tree, |node, key| node.get(key))
}

/// Insert `value` at `path`, creating intermediate objects
pub fn insert_at(tree: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut node = tree;
    for key in parents {
        let entry = node
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    node.insert(last.clone(), value);
}

/// Render a message path for display
pub fn display_path(path: &[String]) -> String {
    path.join("/")
}

/// Leaves are anything that is not an object; arrays count as one message
fn collect_leaf_paths(map: &Map<String, Value>, prefix: &mut Vec<String>, out: &mut Vec<MessagePath>) {
    for (key, value) in map {
        prefix.push(key.clone());
        match value {
            Value::Object(child) => collect_leaf_paths(child, prefix, out),
            _ => out.push(prefix.clone()),
        }
        prefix.pop();
    }
}
