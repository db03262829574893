//! Per-directory metadata declarations (`_meta.js` / `_meta.json`).
//!
//! A declaration maps a child name (file stem or directory name) to a display
//! title or to a nested mapping. Failures never abort a scan: they are logged
//! and the directory is treated as having no metadata.

pub mod literal;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

pub use literal::{ParseError, Position};

pub const META_JS: &str = "_meta.js";
pub const META_JSON: &str = "_meta.json";

static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+default\s+\{").expect("valid export regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Title(String),
    Nested(MetaMap),
    /// Booleans, numbers and `null`. Present but never a title.
    Other,
}

impl MetaValue {
    pub fn as_title(&self) -> Option<&str> {
        match self {
            MetaValue::Title(title) => Some(title),
            _ => None,
        }
    }
}

/// Insertion-ordered mapping of child names to metadata values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaMap {
    entries: Vec<(String, MetaValue)>,
}

impl MetaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier value for the same key in place.
    pub fn insert(&mut self, key: String, value: MetaValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The display title for `key`, only when the value is a plain string.
    pub fn title(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for MetaMap {
    fn from(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut map = MetaMap::new();
        for (key, value) in object {
            let value = match value {
                serde_json::Value::String(title) => MetaValue::Title(title),
                serde_json::Value::Object(nested) => MetaValue::Nested(nested.into()),
                _ => MetaValue::Other,
            };
            map.insert(key, value);
        }
        map
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Whether `name` is one of the metadata declaration file names.
pub fn is_meta_file(name: &str) -> bool {
    name == META_JS || name == META_JSON
}

/// Extract the mapping exported by a `_meta.js` module.
///
/// Returns `Ok(None)` when the source has no `export default { ... }`.
pub fn parse_meta_module(source: &str) -> Result<Option<MetaMap>, ParseError> {
    let Some(found) = EXPORT_DEFAULT.find(source) else {
        return Ok(None);
    };
    // The match ends just past the opening brace.
    let object_start = found.end() - 1;
    let (map, _) = literal::parse_object(&source[object_start..]).map_err(|err| ParseError {
        position: shift_position(source, object_start, err.position),
        ..err
    })?;
    Ok(Some(map))
}

/// Parse a `_meta.json` document. The top level must be an object.
pub fn parse_meta_json(source: &str) -> Result<MetaMap, serde_json::Error> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(source)?;
    Ok(object.into())
}

/// Load the metadata declared for `dir`, surfacing every failure.
///
/// `_meta.js` takes precedence over `_meta.json`.
pub fn load_meta(dir: &Path) -> Result<Option<MetaMap>, MetaError> {
    let js_path = dir.join(META_JS);
    if js_path.is_file() {
        let source = read(&js_path)?;
        let map = parse_meta_module(&source).map_err(|source| MetaError::Parse {
            path: js_path.clone(),
            source,
        })?;
        if map.is_none() {
            debug!("{} has no `export default` object", js_path.display());
        }
        return Ok(map);
    }

    let json_path = dir.join(META_JSON);
    if json_path.is_file() {
        let source = read(&json_path)?;
        let map = parse_meta_json(&source).map_err(|source| MetaError::Json {
            path: json_path.clone(),
            source,
        })?;
        return Ok(Some(map));
    }

    Ok(None)
}

/// Load the metadata for `dir`, logging and discarding any failure.
pub fn read_meta_dir(dir: &Path) -> Option<MetaMap> {
    match load_meta(dir) {
        Ok(map) => map,
        Err(err) => {
            warn!("Ignoring metadata: {err}");
            None
        }
    }
}

fn read(path: &Path) -> Result<String, MetaError> {
    std::fs::read_to_string(path).map_err(|source| MetaError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Translate a position relative to `source[offset..]` into one relative to `source`.
fn shift_position(source: &str, offset: usize, position: Position) -> Position {
    let prefix = &source[..offset];
    let prefix_lines = prefix.matches('\n').count();
    if position.line > 1 {
        return Position {
            line: position.line + prefix_lines,
            col: position.col,
        };
    }
    let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
    Position {
        line: 1 + prefix_lines,
        col: prefix[line_start..].chars().count() + position.col,
    }
}
