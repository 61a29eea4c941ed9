//! `${section.field}` references between configuration values.
//!
//! `$$` produces a literal `$`, so `$${X}` renders as `${X}`.

use toml::{Table, Value};

use super::settings::lookup;
use super::ConfigError;

/// Substitutes every reference in `table`.
///
/// Referenced strings are rendered depth-first and spliced in as finished text,
/// so output produced by a `$$` escape is never scanned again.
pub fn resolve_references(table: &mut Table) -> Result<(), ConfigError> {
    let root = table.clone();
    for (_, value) in table.iter_mut() {
        resolve_value(value, &root)?;
    }
    Ok(())
}

fn resolve_value(value: &mut Value, root: &Table) -> Result<(), ConfigError> {
    match value {
        Value::String(s) if s.contains('$') => {
            *s = render(s, root, &mut Vec::new())?;
        }
        Value::Table(t) => {
            for (_, v) in t.iter_mut() {
                resolve_value(v, root)?;
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                resolve_value(v, root)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Renders one string. `stack` holds the keys currently being expanded.
fn render(input: &str, root: &Table, stack: &mut Vec<String>) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('{') {
            let end = after.find('}').ok_or(ConfigError::UnclosedReference)?;
            out.push_str(&scalar_at(root, &after[..end], stack)?);
            rest = &after[end + 1..];
        } else {
            out.push('$');
            rest = tail;
        }
    }
    out.push_str(rest);

    Ok(out)
}

fn scalar_at(root: &Table, key: &str, stack: &mut Vec<String>) -> Result<String, ConfigError> {
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidReferencePath(key.to_string()));
    }
    if stack.iter().any(|k| k == key) {
        return Err(ConfigError::CircularReference);
    }

    match lookup(root, key) {
        None => Err(ConfigError::ReferenceNotFound(key.to_string())),
        Some(Value::String(s)) => {
            stack.push(key.to_string());
            let rendered = render(s, root, stack);
            stack.pop();
            rendered
        }
        Some(Value::Integer(i)) => Ok(i.to_string()),
        Some(Value::Float(f)) => Ok(f.to_string()),
        Some(Value::Boolean(b)) => Ok(b.to_string()),
        Some(Value::Datetime(dt)) => Ok(dt.to_string()),
        Some(Value::Array(_) | Value::Table(_)) => {
            Err(ConfigError::NonScalarReference(key.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(toml_str: &str) -> Result<Table, ConfigError> {
        let mut table: Table = toml::from_str(toml_str).unwrap();
        resolve_references(&mut table).map(|()| table)
    }

    #[test]
    fn test_nested_reference_in_namespace_map() {
        let table = resolved(
            r#"
            root = "/srv/site"

            [namespace]
            app = "${root}/app"
            "#,
        )
        .unwrap();
        assert_eq!(table["namespace"]["app"].as_str(), Some("/srv/site/app"));
    }

    #[test]
    fn test_chained_references_and_integers() {
        let table = resolved(
            r#"
            host = "example.com"
            port = 8080
            authority = "${host}:${port}"
            base = "https://${authority}/"
            "#,
        )
        .unwrap();
        assert_eq!(table["base"].as_str(), Some("https://example.com:8080/"));
    }

    #[test]
    fn test_references_inside_arrays() {
        let table = resolved(
            r#"
            host = "example.com"
            domain = ["${host}", "www.${host}"]
            "#,
        )
        .unwrap();
        let domain = table["domain"].as_array().unwrap();
        assert_eq!(domain[1].as_str(), Some("www.example.com"));
    }

    #[test]
    fn test_escape_and_lone_dollar() {
        let table = resolved(r#"value = "cost $5, literal $${VAR}""#).unwrap();
        assert_eq!(table["value"].as_str(), Some("cost $5, literal ${VAR}"));
    }

    #[test]
    fn test_escaped_text_is_not_rescanned() {
        let table = resolved(
            r#"
            host = "example.com"
            template = "$${user}@${host}"
            copy = "${template}"
            "#,
        )
        .unwrap();
        assert_eq!(table["template"].as_str(), Some("${user}@example.com"));
        assert_eq!(table["copy"].as_str(), Some("${user}@example.com"));
    }

    #[test]
    fn test_self_reference_is_circular() {
        assert!(matches!(
            resolved(r#"a = "x${a}""#),
            Err(ConfigError::CircularReference)
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            resolved(
                r#"
                a = "${b}"
                b = "${a}"
                "#
            ),
            Err(ConfigError::CircularReference)
        ));
        assert!(matches!(
            resolved(r#"url = "${missing.key}""#),
            Err(ConfigError::ReferenceNotFound(_))
        ));
        assert!(matches!(
            resolved(r#"url = "${open""#),
            Err(ConfigError::UnclosedReference)
        ));
        assert!(matches!(
            resolved(r#"url = "${a..b}""#),
            Err(ConfigError::InvalidReferencePath(_))
        ));
        assert!(matches!(
            resolved(
                r#"
                url = "${namespace}"
                [namespace]
                app = "x"
                "#
            ),
            Err(ConfigError::NonScalarReference(_))
        ));
    }
}
