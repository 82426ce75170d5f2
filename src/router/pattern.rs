//! URL patterns with `:name` placeholders and the parameters they capture.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled URL pattern such as `/categories/:id`.
///
/// Each `:name` placeholder captures exactly one non-empty path segment and
/// the whole path must match, there is no prefix matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile `pattern`. A segment is a placeholder if it starts with `:`
    /// and has a name, anything else is matched literally.
    pub fn compile(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_owned()),
                _ => Segment::Literal(segment.to_owned()),
            })
            .collect();

        Self {
            raw: pattern.to_owned(),
            segments,
        }
    }

    /// Match `path` against the pattern, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut params = RouteParams::default();
        let mut path_segments = split_path(path);

        for segment in &self.segments {
            let path_segment = path_segments.next()?;

            match segment {
                Segment::Literal(literal) if literal == path_segment => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if path_segment.is_empty() => return None,
                Segment::Param(name) => {
                    params.0.insert(name.clone(), path_segment.to_owned());
                }
            }
        }

        match path_segments.next() {
            Some(_) => None,
            None => Some(params),
        }
    }

    /// The pattern as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// The values captured by a [RoutePattern], keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// The raw value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Parse the value captured for `name`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPathParameter] if `name` was not captured or
    /// does not parse as `T`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, Error> {
        self.get(name)
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| Error::InvalidPathParameter(name.to_owned()))
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
