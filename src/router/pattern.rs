//! Path template compilation.
//!
//! Turns a route path such as `/book/{name}/action/{author}` into an
//! anchored regex with one named capture per `{placeholder}`. Literal
//! segments are escaped and matched exactly (case-sensitive, no
//! normalization). Compilation happens once at registration time; matching
//! is read-only afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Matches a single `{identifier}` placeholder inside a path segment.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^/{}]*)\}").expect("placeholder regex is valid"));

/// Error raised while compiling a path template.
///
/// These are registration-time configuration errors: a route that fails to
/// compile is rejected before the server ever starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The same capture name appears more than once in one template.
    DuplicateParam { path: String, name: String },
    /// A `{...}` token is not a valid identifier (`[A-Za-z_][A-Za-z0-9_]*`).
    InvalidPlaceholder { path: String, token: String },
    /// The assembled regex failed to compile.
    Compile { path: String, reason: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::DuplicateParam { path, name } => {
                write!(
                    f,
                    "path template '{path}': duplicate parameter name '{name}'"
                )
            }
            PatternError::InvalidPlaceholder { path, token } => {
                write!(
                    f,
                    "path template '{path}': invalid placeholder '{{{token}}}'"
                )
            }
            PatternError::Compile { path, reason } => {
                write!(f, "path template '{path}': failed to compile: {reason}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// A compiled path template.
///
/// Holds the original template text (used to detect duplicate
/// registrations) alongside the compiled matcher and the ordered list of
/// parameter names.
#[derive(Debug, Clone)]
pub struct PathPattern {
    path: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compile a route path into a matcher.
    ///
    /// Splits on `/` (preserving whether the template carries a leading
    /// and/or trailing slash), replaces each `{name}` token with a named
    /// capture matching one or more non-`/` characters, escapes everything
    /// else, and anchors the whole pattern so partial matches never
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when a placeholder is malformed or a
    /// capture name is used twice within the template.
    pub fn compile(path: &str) -> Result<Self, PatternError> {
        let leading_slash = path.starts_with('/');
        let trailing_slash = path.ends_with('/');
        let trimmed = path.trim_matches('/');

        let mut param_names: Vec<String> = Vec::new();
        let mut segments: Vec<String> = Vec::new();

        for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
            segments.push(compile_segment(path, segment, &mut param_names)?);
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        if leading_slash {
            pattern.push('/');
        }
        pattern.push_str(&segments.join("/"));
        if trailing_slash && !pattern.ends_with('/') {
            pattern.push('/');
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| PatternError::Compile {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_string(),
            regex,
            param_names,
        })
    }

    /// The original template text this pattern was compiled from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameter names in the order they appear in the template.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a concrete request path against this template.
    ///
    /// Returns the placeholder-name → captured-segment mapping on success.
    /// Captured values are percent-decoded; a value that fails to decode is
    /// surfaced as-is.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        let params = self
            .param_names
            .iter()
            .filter_map(|name| {
                caps.name(name).map(|m| {
                    let raw = m.as_str();
                    let value = urlencoding::decode(raw)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| raw.to_string());
                    (name.clone(), value)
                })
            })
            .collect();
        Some(params)
    }
}

/// Compile one path segment, escaping literal text and replacing
/// `{name}` tokens with named captures.
fn compile_segment(
    path: &str,
    segment: &str,
    param_names: &mut Vec<String>,
) -> Result<String, PatternError> {
    let mut compiled = String::with_capacity(segment.len() + 16);
    let mut last_end = 0;

    for caps in PLACEHOLDER.captures_iter(segment) {
        let whole = caps.get(0).expect("capture 0 always present");
        let name = &caps[1];

        if !is_identifier(name) {
            return Err(PatternError::InvalidPlaceholder {
                path: path.to_string(),
                token: name.to_string(),
            });
        }
        if param_names.iter().any(|n| n == name) {
            return Err(PatternError::DuplicateParam {
                path: path.to_string(),
                name: name.to_string(),
            });
        }

        compiled.push_str(&regex::escape(&segment[last_end..whole.start()]));
        compiled.push_str(&format!("(?P<{name}>[^/]+)"));
        param_names.push(name.to_string());
        last_end = whole.end();
    }
    compiled.push_str(&regex::escape(&segment[last_end..]));

    Ok(compiled)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
