//! Route descriptors.

use std::collections::BTreeMap;
use std::fmt;

/// Identifies a handler as `module/controller/action` plus parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub module: String,
    pub controller: String,
    pub action: String,
    pub params: BTreeMap<String, String>,
}

/// Builds a [`Route`].
pub fn route<I, K, V>(
    module: impl Into<String>,
    controller: impl Into<String>,
    action: impl Into<String>,
    params: I,
) -> Route
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    Route {
        module: module.into(),
        controller: controller.into(),
        action: action.into(),
        params: params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    }
}

impl Route {
    /// `/module/controller/action`, followed by `?k=v&...` when there are params.
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/{}", self.module, self.controller, self.action)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", encode_component(k), encode_component(v))?;
        }
        Ok(())
    }
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_path() {
        let r = route(
            "blog",
            "post",
            "show",
            [("id", "7"), ("q", "a b&c")],
        );

        assert_eq!(r.path(), "/blog/post/show?id=7&q=a%20b%26c");
    }

    #[test]
    fn test_route_without_params() {
        let r = route("home", "index", "index", Vec::<(String, String)>::new());
        assert_eq!(r.to_string(), "/home/index/index");
        assert!(r.params.is_empty());
    }
}
