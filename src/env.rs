//! Environment variable access with a mockable seam.
//!
//! Handlers and the CLI read the environment through [`Env`] so tests can
//! inject values without touching the process environment (mutating it via
//! `std::env::set_var` is `unsafe` and races across test threads).

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Read from a fixed set of key-value pairs instead.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        let map = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            overrides: Some(map),
        }
    }

    /// Look up a variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Look up a variable, falling back to `default` when unset.
    pub fn var_or(&self, name: &str, default: &str) -> String {
        self.var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Whether the variable is present.
    pub fn is_set(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }
}
