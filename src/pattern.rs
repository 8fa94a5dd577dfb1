//! Glob-like patterns over fully qualified class names.
//!
//! The pattern language treats `.` as a literal package separator, `*` as a
//! single-segment wildcard, and `**` as a wildcard spanning zero or more
//! segments together with the adjoining separator. At most one `(...)`
//! capture group may pick the slice label out of the match; alternatively a
//! trailing `=name` names the slice explicitly.

use regex::Regex;

/// Error raised while compiling a pattern string.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("pattern must not be empty")]
    Empty,

    #[error("pattern '{0}' contains more than one capture group")]
    MultipleCaptures(String),

    #[error("pattern '{0}' has unbalanced capture parentheses")]
    UnbalancedCapture(String),

    #[error("pattern '{0}' combines a capture group with an explicit '=' name")]
    NamedCapture(String),

    #[error("pattern '{0}' has an empty name after '='")]
    EmptyName(String),

    #[error("pattern '{0}' chains more than two consecutive wildcards")]
    WildcardRun(String),

    #[error("pattern '{0}' is not a valid expression: {1}")]
    Invalid(String, regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    Star,
    DoubleStar,
    Dot,
    GroupOpen,
    GroupClose,
}

/// A compiled class-name pattern.
///
/// Matching yields the slice label: the explicit name when given, else the
/// captured group, else the whole matched class name.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
    captures_group: bool,
    explicit_name: Option<String>,
}

impl NamePattern {
    /// Compile a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let (glob, explicit_name) = match pattern.split_once('=') {
            Some((_, name)) if name.is_empty() => {
                return Err(PatternError::EmptyName(pattern.to_string()))
            }
            Some((glob, name)) => (glob, Some(name.to_string())),
            None => (pattern, None),
        };
        if glob.is_empty() {
            return Err(PatternError::Empty);
        }

        let tokens = tokenize(glob, pattern)?;
        let captures_group = tokens.iter().any(|t| *t == Token::GroupOpen);
        if captures_group && explicit_name.is_some() {
            return Err(PatternError::NamedCapture(pattern.to_string()));
        }

        let regex_source = build_regex(&tokens);
        let regex = Regex::new(&regex_source)
            .map_err(|e| PatternError::Invalid(pattern.to_string(), e))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            captures_group,
            explicit_name,
        })
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match a class name, returning the slice label on success.
    pub fn matches(&self, class_name: &str) -> Option<String> {
        let captures = self.regex.captures(class_name)?;
        if let Some(name) = &self.explicit_name {
            return Some(name.clone());
        }
        if self.captures_group {
            return captures.get(1).map(|m| m.as_str().to_string());
        }
        Some(class_name.to_string())
    }

    /// Match without producing the label.
    pub fn is_match(&self, class_name: &str) -> bool {
        self.regex.is_match(class_name)
    }
}

fn tokenize(glob: &str, pattern: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut group_open = false;
    let mut group_seen = false;
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                let mut run = 1;
                while chars.peek() == Some(&'*') {
                    chars.next();
                    run += 1;
                }
                match run {
                    1 => tokens.push(Token::Star),
                    2 => tokens.push(Token::DoubleStar),
                    _ => return Err(PatternError::WildcardRun(pattern.to_string())),
                }
            }
            '.' => tokens.push(Token::Dot),
            '(' => {
                if group_seen {
                    return Err(PatternError::MultipleCaptures(pattern.to_string()));
                }
                group_open = true;
                group_seen = true;
                tokens.push(Token::GroupOpen);
            }
            ')' => {
                if !group_open {
                    return Err(PatternError::UnbalancedCapture(pattern.to_string()));
                }
                group_open = false;
                tokens.push(Token::GroupClose);
            }
            other => tokens.push(Token::Literal(other)),
        }
    }
    if group_open {
        return Err(PatternError::UnbalancedCapture(pattern.to_string()));
    }
    // two `**` in a row are illegal, whether or not a separator sits between
    let double_star_adjacency = tokens
        .windows(2)
        .any(|pair| matches!(pair, [Token::DoubleStar, Token::DoubleStar]))
        || tokens
            .windows(3)
            .any(|triple| matches!(triple, [Token::DoubleStar, Token::Dot, Token::DoubleStar]));
    if double_star_adjacency {
        return Err(PatternError::WildcardRun(pattern.to_string()));
    }
    Ok(tokens)
}

fn build_regex(tokens: &[Token]) -> String {
    let mut out = String::from("^");
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            // `.**` at the end of the pattern swallows the separator, so
            // `com.**` also matches plain `com`.
            Token::Dot if tokens.get(i + 1) == Some(&Token::DoubleStar)
                && i + 2 == tokens.len() =>
            {
                out.push_str("(?:\\.[^.]+)*");
                i += 1;
            }
            Token::Dot => out.push_str("\\."),
            // `**.` matches whole segments including the trailing separator,
            // so `**.Foo` also matches plain `Foo`.
            Token::DoubleStar if tokens.get(i + 1) == Some(&Token::Dot) => {
                out.push_str("(?:[^.]+\\.)*");
                i += 1;
            }
            Token::DoubleStar => out.push_str(".*"),
            Token::Star => out.push_str("[^.]*"),
            Token::GroupOpen => out.push('('),
            Token::GroupClose => out.push(')'),
            Token::Literal(c) => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}
