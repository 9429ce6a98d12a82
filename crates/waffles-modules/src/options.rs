//! Module option strings: `module:key=val:key2=val2`.
//!
//! The registry treats all option values as opaque strings; each module
//! owns the typed parsing of its own option set during `validate`.

use crate::{ModuleError, Result};

/// Parsed `key=value` options for one module invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleOptions {
    opts: Vec<(String, String)>,
}

impl ModuleOptions {
    /// Raw value of an option, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.opts
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Option keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.opts.iter().map(|(k, _)| k.as_str())
    }

    /// Whether no options were given.
    pub fn is_empty(&self) -> bool {
        self.opts.is_empty()
    }

    /// Typed float option.
    pub fn get_f64(&self, module: &str, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|v| {
                v.parse().map_err(|_| ModuleError::InvalidOption {
                    module: module.to_string(),
                    reason: format!("{key}: expected a number, got {v:?}"),
                })
            })
            .transpose()
    }

    /// Typed integer option.
    pub fn get_usize(&self, module: &str, key: &str) -> Result<Option<usize>> {
        self.get(key)
            .map(|v| {
                v.parse().map_err(|_| ModuleError::InvalidOption {
                    module: module.to_string(),
                    reason: format!("{key}: expected an integer, got {v:?}"),
                })
            })
            .transpose()
    }

    /// Typed boolean option; accepts the `True`/`False` literals.
    pub fn get_bool(&self, module: &str, key: &str) -> Result<Option<bool>> {
        self.get(key)
            .map(|v| match v {
                "True" | "true" => Ok(true),
                "False" | "false" => Ok(false),
                _ => Err(ModuleError::InvalidOption {
                    module: module.to_string(),
                    reason: format!("{key}: expected True or False, got {v:?}"),
                }),
            })
            .transpose()
    }

    /// Reject any option key not in `allowed`, naming all offenders.
    pub fn check_keys(&self, module: &str, allowed: &[&str]) -> Result<()> {
        let unknown: Vec<&str> = self
            .keys()
            .filter(|k| !allowed.contains(k))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ModuleError::InvalidOption {
                module: module.to_string(),
                reason: format!("unrecognized option key(s): {}", unknown.join(", ")),
            })
        }
    }
}

/// Split a module spec string into the module name and its options.
pub fn parse_module_spec(spec: &str) -> Result<(String, ModuleOptions)> {
    let mut parts = spec.split(':');
    let name = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ModuleError::InvalidOption {
            module: spec.to_string(),
            reason: "empty module name".to_string(),
        })?
        .to_string();
    let mut opts = Vec::new();
    for part in parts {
        if part.trim().is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=').ok_or_else(|| ModuleError::InvalidOption {
            module: name.clone(),
            reason: format!("malformed option {part:?}, expected key=value"),
        })?;
        opts.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok((name, ModuleOptions { opts }))
}
