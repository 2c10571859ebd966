use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::block::error::BlockError;

/// Accepted shape of an option value.
#[derive(Debug, Clone, Copy)]
pub enum OptionKind {
    /// Any string.
    Text,
    /// One string out of a fixed set.
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub kind: OptionKind,
}

pub type OptionValue = String;

/// Resolved block options: every declared option is present, either from
/// the block header or from its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    values: BTreeMap<&'static str, OptionValue>,
}

impl Options {
    /// The resolved value of a declared option. An undeclared name yields
    /// an empty string.
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    /// Resolve options for `block` from the YAML text found under its header.
    pub fn resolve(
        block: &'static str,
        specs: &'static [OptionSpec],
        yaml: &str,
    ) -> Result<Options, BlockError> {
        let mut values: BTreeMap<&'static str, OptionValue> = specs
            .iter()
            .map(|spec| (spec.name, spec.default.to_string()))
            .collect();

        if yaml.trim().is_empty() {
            return Ok(Options { values });
        }

        let parsed: Value = serde_yaml::from_str(yaml)
            .map_err(|source| BlockError::MalformedOptions { block, source })?;
        let mapping = match parsed {
            Value::Mapping(m) => m,
            Value::Null => return Ok(Options { values }),
            _ => return Err(BlockError::OptionsNotMapping { block }),
        };

        for (key, value) in mapping {
            let name = yaml_scalar(&key).unwrap_or_default();
            let Some(spec) = specs.iter().find(|s| s.name == name) else {
                return Err(BlockError::UnknownOption {
                    block,
                    option: name,
                });
            };
            let Some(text) = yaml_scalar(&value) else {
                return Err(BlockError::OptionNotText {
                    block,
                    option: name,
                });
            };
            if let OptionKind::OneOf(allowed) = spec.kind {
                if !allowed.contains(&text.as_str()) {
                    return Err(BlockError::OptionNotAllowed {
                        block,
                        option: name,
                        value: text,
                        allowed: allowed.join(", "),
                    });
                }
            }
            values.insert(spec.name, text);
        }

        Ok(Options { values })
    }
}

/// Scalars are coerced to strings; a null value reads as empty.
fn yaml_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[OptionSpec] = &[
        OptionSpec {
            name: "title",
            default: "",
            kind: OptionKind::Text,
        },
        OptionSpec {
            name: "loading",
            default: "lazy",
            kind: OptionKind::OneOf(&["lazy", "eager"]),
        },
    ];

    #[test]
    fn defaults_without_yaml() {
        let opts = Options::resolve("x", SPECS, "").unwrap();
        assert_eq!(opts.value("title"), "");
        assert_eq!(opts.value("loading"), "lazy");
    }

    #[test]
    fn overrides_from_yaml() {
        let opts = Options::resolve("x", SPECS, "title: My trace\nloading: eager\n").unwrap();
        assert_eq!(opts.value("title"), "My trace");
        assert_eq!(opts.value("loading"), "eager");
    }

    #[test]
    fn rejects_unknown_option() {
        let err = Options::resolve("x", SPECS, "colour: red").unwrap_err();
        assert!(matches!(err, BlockError::UnknownOption { ref option, .. } if option == "colour"));
    }

    #[test]
    fn rejects_value_outside_set() {
        let err = Options::resolve("x", SPECS, "loading: sometimes").unwrap_err();
        assert!(err.to_string().contains("must be one of lazy, eager"));
    }

    #[test]
    fn rejects_non_mapping() {
        let err = Options::resolve("x", SPECS, "- a\n- b").unwrap_err();
        assert!(matches!(err, BlockError::OptionsNotMapping { .. }));
    }
}
