//! Route methods and path patterns.
//!
//! Three pattern kinds, in precedence order: static paths, `:name`
//! parameterised templates, and regular expressions whose capture groups
//! become positional `param0`, `param1`, ... parameters.
//!
//! Extracted parameter values are percent-decoded. Literal segments are
//! compared against the raw path.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::Serialize;
use switchyard_types::error::RouteError;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(RouteError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Precedence tier. Lower tiers are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTier {
    Static,
    Params,
    Regex,
}

impl RouteTier {
    pub const ALL: [RouteTier; 3] = [RouteTier::Static, RouteTier::Params, RouteTier::Regex];
}

impl fmt::Display for RouteTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Params => f.write_str("params"),
            Self::Regex => f.write_str("regex"),
        }
    }
}

/// One `/`-separated piece of a parameterised template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route path pattern.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    Static(String),
    Params {
        template: String,
        segments: Vec<Segment>,
    },
    Regex {
        source: String,
        regex: Regex,
    },
}

impl RoutePattern {
    /// Parse a static or `:name` template such as `/customer/:id`.
    pub fn template(template: &str) -> Result<Self, RouteError> {
        if !template.starts_with('/') {
            return Err(RouteError::NotAbsolute(template.to_string()));
        }
        let normalized = trim_trailing_slash(template);

        if !normalized.split('/').any(|s| s.starts_with(':')) {
            return Ok(Self::Static(normalized.to_string()));
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for raw in normalized.split('/').skip(1) {
            match raw.strip_prefix(':') {
                Some("") => return Err(RouteError::EmptyParam(template.to_string())),
                Some(name) => {
                    if !seen.insert(name) {
                        return Err(RouteError::DuplicateParam {
                            template: template.to_string(),
                            param: name.to_string(),
                        });
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }

        Ok(Self::Params {
            template: normalized.to_string(),
            segments,
        })
    }

    /// Compile a regex pattern. It must match the whole request path.
    pub fn regex(pattern: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| RouteError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::Regex {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn tier(&self) -> RouteTier {
        match self {
            Self::Static(_) => RouteTier::Static,
            Self::Params { .. } => RouteTier::Params,
            Self::Regex { .. } => RouteTier::Regex,
        }
    }

    /// Match `path`, returning the extracted, percent-decoded parameters.
    ///
    /// A parameter that does not decode to UTF-8 makes the path not match.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        match self {
            Self::Static(expected) => {
                (trim_trailing_slash(path) == expected).then(BTreeMap::new)
            }
            Self::Params { segments, .. } => {
                let normalized = trim_trailing_slash(path);
                let parts: Vec<&str> = normalized.split('/').skip(1).collect();
                if !normalized.starts_with('/') || parts.len() != segments.len() {
                    return None;
                }

                let mut params = BTreeMap::new();
                for (segment, part) in segments.iter().zip(parts) {
                    match segment {
                        Segment::Literal(literal) if literal == part => {}
                        Segment::Literal(_) => return None,
                        Segment::Param(_) if part.is_empty() => return None,
                        Segment::Param(name) => {
                            params.insert(name.clone(), decode_param(part)?);
                        }
                    }
                }
                Some(params)
            }
            Self::Regex { regex, .. } => {
                let captures = regex.captures(path)?;
                captures
                    .iter()
                    .skip(1)
                    .enumerate()
                    .filter_map(|(i, group)| group.map(|m| (i, m.as_str())))
                    .map(|(i, raw)| decode_param(raw).map(|value| (format!("param{i}"), value)))
                    .collect()
            }
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(path) => f.write_str(path),
            Self::Params { template, .. } => f.write_str(template),
            Self::Regex { source, .. } => f.write_str(source),
        }
    }
}

fn decode_param(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(|value| value.into_owned())
}

/// Drop one trailing `/` from a non-root path.
fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
