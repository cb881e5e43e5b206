use crate::error::{MvcError, Result};

/// Join a party prefix and a route path into one normalized absolute path
pub fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => format!("/{}", prefix),
        (true, false) => format!("/{}", path),
        (false, false) => format!("/{}/{}", prefix, path),
    }
}

/// Parameter names declared by a route template such as `/users/{id}/{*rest}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    params: Vec<String>,
}

impl PathPattern {
    /// Parse and validate a route template
    ///
    /// Captures must span a whole segment, names must be unique and non-empty,
    /// and a `{*wildcard}` capture may only appear last.
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: &str| MvcError::InvalidRoute {
            path: template.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = template.trim_matches('/').split('/').collect();
        let mut params: Vec<String> = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            if segment.starts_with(':') || segment.starts_with('*') {
                return Err(invalid("use `{name}` or `{*name}` for captures"));
            }
            if !(segment.contains('{') || segment.contains('}')) {
                continue;
            }
            let inner = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .ok_or_else(|| invalid("captures must span a whole segment"))?;

            let name = match inner.strip_prefix('*') {
                Some(name) => {
                    if index + 1 != segments.len() {
                        return Err(invalid("wildcard capture must be the last segment"));
                    }
                    name
                }
                None => inner,
            };

            if name.is_empty() || name.contains(['{', '}', '*']) {
                return Err(invalid("capture names must be plain identifiers"));
            }
            if params.iter().any(|p| p == name) {
                return Err(invalid("duplicate capture name"));
            }
            params.push(name.to_string());
        }

        Ok(Self {
            template: template.to_string(),
            params,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn cursor(&self) -> PathCursor<'_> {
        PathCursor {
            params: &self.params,
            next: 0,
        }
    }
}

/// Captured name of a `{name}` or `{*name}` segment, with its wildcard flag
fn capture(segment: &str) -> Option<(&str, bool)> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    Some(match inner.strip_prefix('*') {
        Some(name) => (name, true),
        None => (inner, false),
    })
}

/// Why two distinct templates cannot be served side by side
///
/// Walking both templates from the root, literal segments may diverge
/// freely, but once the prefixes agree two captures in the same position
/// must be the same kind with the same name.
pub(crate) fn capture_conflict(existing: &str, candidate: &str) -> Option<String> {
    let left = existing.trim_matches('/').split('/');
    let right = candidate.trim_matches('/').split('/');

    for (a, b) in left.zip(right) {
        if a == b {
            continue;
        }
        return match (capture(a), capture(b)) {
            (Some(_), Some(_)) => Some(format!(
                "capture '{}' conflicts with '{}' of route {}",
                b, a, existing
            )),
            _ => None,
        };
    }
    None
}

/// Hands out a pattern's path parameters in declaration order
#[derive(Debug)]
pub struct PathCursor<'a> {
    params: &'a [String],
    next: usize,
}

impl<'a> PathCursor<'a> {
    /// Take the next unconsumed parameter as `(position, name)`
    pub fn next_param(&mut self) -> Option<(usize, &'a str)> {
        let name = self.params.get(self.next)?;
        let position = self.next;
        self.next += 1;
        Some((position, name.as_str()))
    }

    pub fn remaining(&self) -> usize {
        self.params.len() - self.next
    }
}
