//! Route pattern compilation.
//!
//! # Responsibilities
//! - Tokenize a pattern into literals and named parameters
//! - Reject malformed patterns before they reach the matcher
//! - Match a pathname against the compiled tokens
//!
//! # Pattern Syntax
//! ```text
//! /users/:id          named parameter, one non-slash segment
//! /users/:id?         optional parameter (leading slash is optional too)
//! /files/:path*       zero or more segments
//! /files/:path+       one or more segments
//! /price/\:usd        backslash escapes a literal ':', '(', '?', '*', '+'
//! ```
//!
//! # Design Decisions
//! - No regex: matching is a small backtracking walk over the tokens
//! - Parameters capture lazily, so `/:from-:to` splits on the literal
//! - Repeated parameters capture whole segments, longest first
//! - Literal comparison is ASCII case-insensitive unless `sensitive`

use std::ops::Range;
use thiserror::Error;

/// Errors raised while compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `:` was not followed by a parameter name.
    #[error("missing parameter name at position {position} in pattern `{pattern}`")]
    MissingName { pattern: String, position: usize },

    /// Custom capture groups (`(...)`) are not supported.
    #[error("unsupported capture group at position {position} in pattern `{pattern}`")]
    UnsupportedGroup { pattern: String, position: usize },

    /// A `?`, `*` or `+` that does not follow a parameter name.
    #[error("modifier `{modifier}` at position {position} does not follow a parameter in pattern `{pattern}`")]
    DanglingModifier {
        pattern: String,
        modifier: char,
        position: usize,
    },

    /// A trailing backslash with nothing to escape.
    #[error("dangling escape at end of pattern `{pattern}`")]
    DanglingEscape { pattern: String },

    /// The same parameter name appears twice.
    #[error("duplicate parameter `{name}` in pattern `{pattern}`")]
    DuplicateParam { pattern: String, name: String },
}

/// How many segments a parameter may capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Exactly one segment.
    One,
    /// Zero or one segment (`?`).
    Optional,
    /// Zero or more segments (`*`).
    ZeroOrMore,
    /// One or more segments (`+`).
    OneOrMore,
}

impl Modifier {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '?' => Some(Modifier::Optional),
            '*' => Some(Modifier::ZeroOrMore),
            '+' => Some(Modifier::OneOrMore),
            _ => None,
        }
    }

    fn is_optional(self) -> bool {
        matches!(self, Modifier::Optional | Modifier::ZeroOrMore)
    }

    fn is_repeat(self) -> bool {
        matches!(self, Modifier::ZeroOrMore | Modifier::OneOrMore)
    }
}

/// A named parameter inside a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    /// Parameter name without the `:` sigil.
    pub name: String,
    /// Whether the parameter owns the `/` in front of it.
    pub prefixed: bool,
    /// Capture modifier.
    pub modifier: Modifier,
}

/// One piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Param(ParamToken),
}

/// Options that change how a pattern is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompileOptions {
    /// The pattern must consume the whole pathname.
    pub end: bool,
    /// A trailing slash in the pattern is significant.
    pub strict: bool,
    /// Literal comparison is case-sensitive.
    pub sensitive: bool,
}

/// Split a pattern into literal and parameter tokens.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut seen: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                let escaped = chars.get(i + 1).ok_or_else(|| PatternError::DanglingEscape {
                    pattern: pattern.to_string(),
                })?;
                literal.push(*escaped);
                i += 2;
            }
            ':' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                if end == start {
                    return Err(PatternError::MissingName {
                        pattern: pattern.to_string(),
                        position: i,
                    });
                }
                let name: String = chars[start..end].iter().collect();
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name,
                    });
                }
                seen.push(name.clone());

                let prefixed = literal.ends_with('/');
                if prefixed {
                    literal.pop();
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }

                let mut modifier = Modifier::One;
                if let Some(m) = chars.get(end).copied().and_then(Modifier::from_char) {
                    modifier = m;
                    end += 1;
                }
                if chars.get(end) == Some(&'(') {
                    return Err(PatternError::UnsupportedGroup {
                        pattern: pattern.to_string(),
                        position: end,
                    });
                }

                tokens.push(Token::Param(ParamToken {
                    name,
                    prefixed,
                    modifier,
                }));
                i = end;
            }
            '(' | ')' => {
                return Err(PatternError::UnsupportedGroup {
                    pattern: pattern.to_string(),
                    position: i,
                });
            }
            '?' | '*' | '+' => {
                return Err(PatternError::DanglingModifier {
                    pattern: pattern.to_string(),
                    modifier: c,
                    position: i,
                });
            }
            _ => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Result of walking a pathname through a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Byte length of the consumed prefix.
    pub consumed: usize,
    /// Captured byte ranges, one per parameter in declaration order.
    pub captures: Vec<Option<Range<usize>>>,
}

/// A pattern compiled for one set of options.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    tokens: Vec<Token>,
    names: Vec<String>,
    options: CompileOptions,
    ends_with_delimiter: bool,
}

impl CompiledPattern {
    /// Compile `pattern` with the given options.
    pub fn compile(pattern: &str, options: CompileOptions) -> Result<Self, PatternError> {
        let mut tokens = tokenize(pattern)?;

        let ends_with_delimiter = matches!(tokens.last(), Some(Token::Literal(l)) if l.ends_with('/'));
        if !options.strict && ends_with_delimiter {
            if let Some(Token::Literal(l)) = tokens.last_mut() {
                l.pop();
                if l.is_empty() {
                    tokens.pop();
                }
            }
        }

        let names = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Param(p) => Some(p.name.clone()),
                Token::Literal(_) => None,
            })
            .collect();

        Ok(Self {
            source: pattern.to_string(),
            tokens,
            names,
            options,
            ends_with_delimiter,
        })
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Options used at compile time.
    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.names
    }

    /// Walk `pathname` from its start. Returns `None` when the pattern does not apply.
    pub fn find(&self, pathname: &str) -> Option<RawMatch> {
        let mut captures = vec![None; self.names.len()];
        let consumed = self.walk(0, 0, pathname, 0, &mut captures)?;
        Some(RawMatch { consumed, captures })
    }

    fn walk(
        &self,
        token: usize,
        slot: usize,
        input: &str,
        pos: usize,
        captures: &mut Vec<Option<Range<usize>>>,
    ) -> Option<usize> {
        let Some(current) = self.tokens.get(token) else {
            return self.finish(input, pos);
        };

        match current {
            Token::Literal(literal) => {
                let end = pos + literal.len();
                if end > input.len() || !input.is_char_boundary(end) {
                    return None;
                }
                let candidate = &input[pos..end];
                let equal = if self.options.sensitive {
                    candidate == literal
                } else {
                    candidate.eq_ignore_ascii_case(literal)
                };
                if equal {
                    self.walk(token + 1, slot, input, end, captures)
                } else {
                    None
                }
            }
            Token::Param(param) => {
                if let Some(end) = self.walk_present(param, token, slot, input, pos, captures) {
                    return Some(end);
                }
                captures[slot] = None;
                if param.modifier.is_optional() {
                    self.walk(token + 1, slot + 1, input, pos, captures)
                } else {
                    None
                }
            }
        }
    }

    fn walk_present(
        &self,
        param: &ParamToken,
        token: usize,
        slot: usize,
        input: &str,
        pos: usize,
        captures: &mut Vec<Option<Range<usize>>>,
    ) -> Option<usize> {
        let mut start = pos;
        if param.prefixed {
            if !input[pos..].starts_with('/') {
                return None;
            }
            start += 1;
        }

        if param.modifier.is_repeat() {
            // Whole segments, longest run first.
            let mut ends = Vec::new();
            let mut segment_start = start;
            for (offset, ch) in input[start..].char_indices() {
                if ch == '/' {
                    let at = start + offset;
                    if at == segment_start {
                        break;
                    }
                    ends.push(at);
                    segment_start = at + 1;
                }
            }
            if segment_start < input.len() && !input[segment_start..].contains('/') {
                ends.push(input.len());
            }
            for end in ends.into_iter().rev() {
                captures[slot] = Some(start..end);
                if let Some(done) = self.walk(token + 1, slot + 1, input, end, captures) {
                    return Some(done);
                }
            }
            return None;
        }

        for (offset, ch) in input[start..].char_indices() {
            if ch == '/' {
                break;
            }
            let end = start + offset + ch.len_utf8();
            captures[slot] = Some(start..end);
            if let Some(done) = self.walk(token + 1, slot + 1, input, end, captures) {
                return Some(done);
            }
        }
        None
    }

    fn finish(&self, input: &str, pos: usize) -> Option<usize> {
        if !self.options.strict && &input[pos..] == "/" && self.tail_accepts(input, pos + 1) {
            return Some(pos + 1);
        }
        if self.tail_accepts(input, pos) {
            Some(pos)
        } else {
            None
        }
    }

    fn tail_accepts(&self, input: &str, pos: usize) -> bool {
        if self.options.end {
            return pos == input.len();
        }
        if self.options.strict && self.ends_with_delimiter {
            return true;
        }
        pos == input.len() || input[pos..].starts_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str, end: bool, strict: bool) -> CompiledPattern {
        CompiledPattern::compile(
            pattern,
            CompileOptions {
                end,
                strict,
                sensitive: false,
            },
        )
        .unwrap()
    }

    fn consumed<'a>(pattern: &CompiledPattern, path: &'a str) -> Option<&'a str> {
        pattern.find(path).map(|m| &path[..m.consumed])
    }

    #[test]
    fn test_tokenize_literal_and_params() {
        let tokens = tokenize("/users/:id/posts/:post?").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], Token::Literal("/users".into()));
        assert!(matches!(&tokens[1], Token::Param(p) if p.name == "id" && p.prefixed));
        assert_eq!(tokens[2], Token::Literal("/posts".into()));
        assert!(matches!(&tokens[3], Token::Param(p) if p.modifier == Modifier::Optional));
    }

    #[test]
    fn test_tokenize_errors() {
        assert!(matches!(tokenize("/users/:"), Err(PatternError::MissingName { position: 7, .. })));
        assert!(matches!(tokenize("/users/:id(\\d+)"), Err(PatternError::UnsupportedGroup { .. })));
        assert!(matches!(tokenize("/a/*"), Err(PatternError::DanglingModifier { modifier: '*', .. })));
        assert!(matches!(tokenize("/a\\"), Err(PatternError::DanglingEscape { .. })));
        assert!(matches!(tokenize("/:id/:id"), Err(PatternError::DuplicateParam { .. })));
    }

    #[test]
    fn test_escaped_colon_is_literal() {
        let pattern = compile("/price/\\:usd", true, false);
        assert!(pattern.param_names().is_empty());
        assert_eq!(consumed(&pattern, "/price/:usd"), Some("/price/:usd"));
    }

    #[test]
    fn test_prefix_matching_stops_on_segment_boundary() {
        let pattern = compile("/users", false, false);
        assert_eq!(consumed(&pattern, "/users/5"), Some("/users"));
        assert_eq!(consumed(&pattern, "/usersx"), None);
    }

    #[test]
    fn test_non_strict_tolerates_trailing_slash() {
        let pattern = compile("/users/", true, false);
        assert_eq!(consumed(&pattern, "/users"), Some("/users"));
        assert_eq!(consumed(&pattern, "/users/"), Some("/users/"));
    }

    #[test]
    fn test_strict_trailing_slash_is_significant() {
        let pattern = compile("/users/", true, true);
        assert_eq!(consumed(&pattern, "/users"), None);
        assert_eq!(consumed(&pattern, "/users/"), Some("/users/"));

        let pattern = compile("/users", true, true);
        assert_eq!(consumed(&pattern, "/users/"), None);
    }

    #[test]
    fn test_lazy_params_split_on_literal() {
        let pattern = compile("/:from-:to", true, false);
        let m = pattern.find("/ams-nyc").unwrap();
        assert_eq!(m.captures[0], Some(1..4));
        assert_eq!(m.captures[1], Some(5..8));
    }

    #[test]
    fn test_repeat_params_capture_segments() {
        let pattern = compile("/files/:path*", true, false);
        let m = pattern.find("/files/a/b/c").unwrap();
        assert_eq!(m.captures[0], Some(7..12));

        let m = pattern.find("/files").unwrap();
        assert_eq!(m.captures[0], None);

        let pattern = compile("/files/:path+", true, false);
        assert!(pattern.find("/files").is_none());
    }

    #[test]
    fn test_case_sensitivity() {
        let insensitive = compile("/About", true, false);
        assert!(insensitive.find("/about").is_some());

        let sensitive = CompiledPattern::compile(
            "/About",
            CompileOptions {
                end: true,
                strict: false,
                sensitive: true,
            },
        )
        .unwrap();
        assert!(sensitive.find("/about").is_none());
    }
}
