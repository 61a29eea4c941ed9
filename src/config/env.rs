use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Reads `PREFIX<sep>A<sep>B=value` environment variables as the key `a.b`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    fn entries_from<I>(&self, vars: I) -> Vec<ConfigEntry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);

        vars.into_iter()
            .filter_map(|(key, value)| {
                let rest = key.strip_prefix(&prefix_with_sep)?;
                if rest.is_empty() {
                    return None;
                }
                let path = rest
                    .split(self.separator.as_str())
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>();
                tracing::debug!(key = %key, path = %path.join("."), "config override from environment");
                Some(ConfigEntry::at_path(path, coerce(&value)))
            })
            .collect()
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.entries_from(std::env::vars()))
    }
}

/// Comma-separated values become arrays (`APP__DOMAIN=a.com,b.com`), each
/// element coerced on its own.
fn coerce(raw: &str) -> Value {
    if raw.contains(',') {
        return Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(coerce_scalar)
                .collect(),
        );
    }
    coerce_scalar(raw)
}

fn coerce_scalar(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    // "0.0.0.0" has dots but is not a float; parse rejects it and it stays a string.
    if raw.contains('.') {
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(raw.to_string())
}
