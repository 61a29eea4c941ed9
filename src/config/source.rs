//! Configuration sources and the merge rules shared by all of them.

use toml::{Table, Value};

use super::ConfigError;

/// A value contributed by a source, placed at `path` in the merged table.
///
/// An empty path means the value is a table merged at the root.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl ConfigEntry {
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// Something that yields configuration entries when the builder runs.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;
}

/// TOML text held in memory, e.g. embedded defaults.
#[derive(Debug, Clone)]
pub struct InlineSource {
    text: String,
}

impl InlineSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ConfigSource for InlineSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let table = toml::from_str(&self.text).map_err(|e| ConfigError::ParseError {
            path: "<inline>".into(),
            source: e,
        })?;
        Ok(vec![ConfigEntry::root(table)])
    }
}

/// Merges `value` into `table` at `path`.
///
/// Tables merge recursively; anything else replaces what was there.
pub fn merge_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (table.get_mut(first), value) {
            (Some(Value::Table(base)), Value::Table(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                table.insert(first.clone(), value);
            }
        }
        return;
    }

    let nested = table
        .entry(first.clone())
        .or_insert_with(|| Value::Table(Table::new()));
    if !nested.is_table() {
        *nested = Value::Table(Table::new());
    }
    if let Value::Table(nested) = nested {
        merge_at_path(nested, rest, value);
    }
}

fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_merge_tables_recursively() {
        let mut base: Table = toml::from_str(
            r#"
            [namespace]
            app = "src/app"
            "#,
        )
        .unwrap();
        let overlay: Table = toml::from_str(
            r#"
            [namespace]
            lib = "src/lib"
            "#,
        )
        .unwrap();

        merge_at_path(&mut base, &[], Value::Table(overlay));

        let ns = base["namespace"].as_table().unwrap();
        assert_eq!(ns["app"].as_str(), Some("src/app"));
        assert_eq!(ns["lib"].as_str(), Some("src/lib"));
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut base: Table = toml::from_str(r#"domain = ["a.com", "b.com"]"#).unwrap();

        merge_at_path(
            &mut base,
            &path("domain"),
            Value::Array(vec![Value::String("c.com".into())]),
        );

        assert_eq!(base["domain"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_replaces_scalar_with_table_on_the_way() {
        let mut base: Table = toml::from_str(r#"server = "flat""#).unwrap();

        merge_at_path(&mut base, &path("server.port"), Value::Integer(80));

        assert_eq!(base["server"]["port"].as_integer(), Some(80));
    }

    #[test]
    fn test_inline_source_parse_error() {
        let source = InlineSource::new("debug = ");
        assert!(matches!(
            source.entries(),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
