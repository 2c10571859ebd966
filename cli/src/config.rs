//! Site configuration: discovery, merging with the bundled base config,
//! and validation.
//!
//! Configs are handled as raw YAML values so that keys we don't model and
//! custom tags such as `!ENV` survive a load/dump round trip untouched.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, error, warn};

use crate::error::ConfigError;

/// Bundled configuration shared by every project.
pub const BASE_CONFIG: &str = include_str!("../mkdocs.base.yml");

/// Looked up, in order, when no config file is given explicitly.
pub const CANDIDATES: &[&str] = &["mkdocs.yml", "mkdocs.yaml"];

/// Keys merged by appending the base list to the project list.
const APPENDED_LISTS: &[&str] = &["extra_css", "extra_javascript"];

const KNOWN_KEYS: &[&str] = &[
    "INHERIT",
    "copyright",
    "dev_addr",
    "docs_dir",
    "draft_docs",
    "edit_uri",
    "exclude_docs",
    "extra",
    "extra_css",
    "extra_javascript",
    "extra_templates",
    "hooks",
    "markdown_extensions",
    "nav",
    "not_in_nav",
    "plugins",
    "remote_branch",
    "remote_name",
    "repo_name",
    "repo_url",
    "site_author",
    "site_description",
    "site_dir",
    "site_name",
    "site_url",
    "strict",
    "theme",
    "use_directory_urls",
    "validation",
    "watch",
];

/// Resolve the config file: the explicit path if any, else the first
/// existing candidate in `dir`.
pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        return Ok(path.to_path_buf());
    }

    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or(ConfigError::NotFound)
}

/// Parse YAML text that must hold a mapping at the top level.
pub fn parse_mapping(text: &str, origin: &str) -> Result<Mapping, ConfigError> {
    let value: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
        origin: origin.to_string(),
        source,
    })?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConfigError::NotMapping {
            origin: origin.to_string(),
        }),
    }
}

pub fn load(path: &Path) -> Result<Mapping, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mapping(&text, &path.display().to_string())
}

pub fn base() -> Result<Mapping, ConfigError> {
    parse_mapping(BASE_CONFIG, "mkdocs.base.yml")
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Merge `base` into `project`:
///
/// - `theme` is taken from the base; the project's own theme features are
///   appended after the base features;
/// - `extra_css` and `extra_javascript` get the base entries appended;
/// - every other base key (e.g. `markdown_extensions`) is laid over the
///   project value.
pub fn merge(project: &mut Mapping, base: &Mapping) -> Result<(), ConfigError> {
    let project_features: Vec<Value> = project
        .get("theme")
        .and_then(|theme| theme.get("features"))
        .and_then(Value::as_sequence)
        .cloned()
        .unwrap_or_default();

    let mut theme = base
        .get("theme")
        .cloned()
        .unwrap_or_else(|| Value::Mapping(Mapping::new()));
    if let Value::Mapping(theme_map) = &mut theme {
        let features = theme_map
            .entry(key("features"))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        match features {
            Value::Sequence(seq) => seq.extend(project_features),
            _ => {
                return Err(ConfigError::NotAList {
                    key: "theme.features".to_string(),
                });
            }
        }
    }
    project.insert(key("theme"), theme);

    for name in APPENDED_LISTS {
        let base_items = base
            .get(*name)
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default();
        let entry = project
            .entry(key(name))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        match entry {
            Value::Sequence(seq) => seq.extend(base_items),
            _ => {
                return Err(ConfigError::NotAList {
                    key: name.to_string(),
                });
            }
        }
    }

    for (name, value) in base {
        let handled = name
            .as_str()
            .is_some_and(|n| n == "theme" || APPENDED_LISTS.contains(&n));
        if !handled {
            project.insert(name.clone(), value.clone());
        }
    }

    debug!("merged base configuration");
    Ok(())
}

pub fn to_yaml(config: &Mapping) -> Result<String, ConfigError> {
    serde_yaml::to_string(config).map_err(ConfigError::Serialize)
}

/// Problems found in a configuration, keyed by config name.
#[derive(Debug, Default, PartialEq)]
pub struct Validation {
    pub errors: Vec<(String, String)>,
    pub warnings: Vec<(String, String)>,
}

impl Validation {
    fn error(&mut self, name: &str, message: impl Into<String>) {
        self.errors.push((name.to_string(), message.into()));
    }

    fn warning(&mut self, name: &str, message: impl Into<String>) {
        self.warnings.push((name.to_string(), message.into()));
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Tagged values (`!ENV ...`) are resolved by whoever consumes the config,
/// so they pass any type check.
fn is_tagged(value: &Value) -> bool {
    matches!(value, Value::Tagged(_))
}

fn check_string(v: &mut Validation, name: &str, value: &Value) {
    if !value.is_string() && !is_tagged(value) {
        v.error(name, format!("Expected a string, got {}", type_name(value)));
    }
}

fn check_list(
    v: &mut Validation,
    name: &str,
    value: &Value,
    item_ok: impl Fn(&Value) -> bool,
    item_expected: &str,
) {
    let Some(items) = value.as_sequence() else {
        v.error(name, format!("Expected a list, got {}", type_name(value)));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        if !item_ok(item) && !is_tagged(item) {
            v.error(
                name,
                format!("Item {i}: expected {item_expected}, got {}", type_name(item)),
            );
        }
    }
}

/// Validate a merged configuration.
pub fn validate(config: &Mapping) -> Validation {
    let mut v = Validation::default();

    match config.get("site_name") {
        None => v.error("site_name", "Required configuration not provided."),
        Some(value) => check_string(&mut v, "site_name", value),
    }

    if let Some(theme) = config.get("theme") {
        if !theme.is_mapping() && !theme.is_string() {
            v.error("theme", format!("Expected a mapping or a theme name, got {}", type_name(theme)));
        }
    }

    if let Some(value) = config.get("extra_css") {
        check_list(&mut v, "extra_css", value, Value::is_string, "a string");
    }
    if let Some(value) = config.get("extra_javascript") {
        check_list(
            &mut v,
            "extra_javascript",
            value,
            |item| item.is_string() || item.get("path").is_some_and(Value::is_string),
            "a string or a mapping with 'path'",
        );
    }
    if let Some(value) = config.get("markdown_extensions") {
        check_list(
            &mut v,
            "markdown_extensions",
            value,
            |item| item.is_string() || item.as_mapping().is_some_and(|m| m.len() == 1),
            "an extension name or a single-key mapping",
        );
    }

    for name in ["docs_dir", "site_dir"] {
        if let Some(value) = config.get(name) {
            check_string(&mut v, name, value);
        }
    }
    if let Some(value) = config.get("strict") {
        if !value.is_bool() && !is_tagged(value) {
            v.error("strict", format!("Expected a boolean, got {}", type_name(value)));
        }
    }

    for (name, _) in config {
        match name.as_str() {
            Some(name) if KNOWN_KEYS.contains(&name) => {}
            Some(name) => v.warning(name, "Unrecognised configuration name"),
            None => v.warning("?", format!("Configuration names must be strings, got {}", type_name(name))),
        }
    }

    v
}

/// Validate, logging every problem. Errors always abort; warnings abort
/// only in strict mode.
pub fn check(config: &Mapping, strict: bool) -> Result<(), ConfigError> {
    let report = validate(config);

    for (name, warning) in &report.warnings {
        warn!("Config value '{name}': {warning}");
    }
    for (name, err) in &report.errors {
        error!("Config value '{name}': {err}");
    }

    if !report.errors.is_empty() {
        Err(ConfigError::Aborted)
    } else if strict && !report.warnings.is_empty() {
        Err(ConfigError::StrictWarnings(report.warnings.len()))
    } else {
        Ok(())
    }
}

/// The parts of the config the build itself needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
    #[serde(default)]
    pub strict: bool,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("site")
}

impl BuildSettings {
    /// Read the build settings from `config`. Relative directories are
    /// resolved against `root`, the directory holding the config file.
    pub fn from_config(config: &Mapping, root: &Path) -> Result<BuildSettings, ConfigError> {
        let mut subset = Mapping::new();
        for name in ["docs_dir", "site_dir", "strict"] {
            if let Some(value) = config.get(name) {
                subset.insert(key(name), value.clone());
            }
        }
        let mut settings: BuildSettings =
            serde_yaml::from_value(Value::Mapping(subset)).map_err(|source| ConfigError::Yaml {
                origin: "build settings".to_string(),
                source,
            })?;
        settings.docs_dir = root.join(&settings.docs_dir);
        settings.site_dir = root.join(&settings.site_dir);
        Ok(settings)
    }
}
