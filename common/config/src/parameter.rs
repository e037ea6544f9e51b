//! Parameter file parsing and the `ParameterManager` (§6 "Parameter file
//! format").
//!
//! Format: key/value pairs, one per line, `#` starts a comment that runs to
//! end of line, key and value are whitespace-separated, an empty value
//! defaults to `"1"`, and keys are matched case-insensitively.

use crate::error::ConfigError;
use crate::error::MalformedOverrideSnafu;
use crate::error::MalformedParameterLineSnafu;
use crate::error::ReadSnafu;
use snafu::ResultExt;
use std::collections::HashMap;
use std::path::Path;

/// A case-insensitive key/value store with layered precedence:
/// `-Pkey=value` CLI overrides beat file-provided values.
#[derive(Debug, Clone, Default)]
pub struct ParameterManager {
    /// Lower-cased key -> (original-case key, value).
    values: HashMap<String, (String, String)>,
}

impl ParameterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a parameter file's contents and merges it in. Values already
    /// present (e.g. from a CLI override applied earlier) are left as-is:
    /// callers should load files first, then apply overrides, to honor the
    /// "overrides win" precedence rule.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        for (line_no, raw_line) in contents.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default();
            if key.is_empty() {
                return MalformedParameterLineSnafu {
                    path: path.to_path_buf(),
                    line_no: line_no + 1,
                    line: raw_line.to_string(),
                }
                .fail();
            }
            let value = parts.next().map(str::trim).unwrap_or_default();
            self.set_raw(key, if value.is_empty() { "1" } else { value });
        }
        Ok(())
    }

    /// Applies a `-Pkey=value` CLI override. Overrides always replace any
    /// existing value for the same (case-insensitive) key, matching §6's
    /// stated precedence.
    pub fn apply_override(&mut self, raw: &str) -> Result<(), ConfigError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| MalformedOverrideSnafu { raw: raw.to_string() }.build())?;
        if key.is_empty() {
            return MalformedOverrideSnafu { raw: raw.to_string() }.fail();
        }
        self.set_raw(key, if value.is_empty() { "1" } else { value });
        Ok(())
    }

    fn set_raw(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_lowercase(), (key.to_string(), value.to_string()));
    }

    /// Looks up a value by key, case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(|(_, v)| v.as_str())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(original_case_key, value)` pairs. Ordering is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.values().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
#[path = "parameter.test.rs"]
mod tests;
