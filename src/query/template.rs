//! Query templates and named-placeholder compilation.
//!
//! Templates use `:name` placeholders. Compiling a template rewrites them into
//! the positional syntax of the target driver and records which parameter
//! feeds each position.
//!
//! Templates are lexed with sqlparser's tokenizer in the backend's dialect, so
//! string literals (including MySQL backslash escapes and PostgreSQL
//! dollar-quoting), quoted identifiers and comments never yield placeholders.
//! Everything outside a placeholder is copied byte for byte.

use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::tokenizer::{Location, Token, TokenWithLocation, Tokenizer};

use super::params::ParameterSet;
use crate::error::{ApiError, Result};

/// Positional placeholder syntax of a database driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... (PostgreSQL). Repeated names reuse their index.
    Dollar,
    /// `?1`, `?2`, ... (SQLite). Repeated names reuse their index.
    NumberedQuestion,
    /// `?` (MySQL). Every occurrence takes its own bind slot.
    Question,
}

impl PlaceholderStyle {
    /// SQL dialect of the driver using this placeholder syntax.
    fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            Self::Dollar => Box::new(PostgreSqlDialect {}),
            Self::NumberedQuestion => Box::new(SQLiteDialect {}),
            Self::Question => Box::new(MySqlDialect {}),
        }
    }
}

/// The SQL body of a call, as read from its template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    name: String,
    sql: String,
}

impl QueryTemplate {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// The call name this template was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Rewrites the template's placeholders for the given driver syntax.
    pub fn compile(&self, style: PlaceholderStyle) -> Result<CompiledQuery> {
        compile(&self.sql, style)
    }
}

/// A template rewritten into positional form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    sql: String,
    /// Parameter name feeding each bind position, in order.
    bindings: Vec<String>,
}

impl CompiledQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    /// Looks up a value for every bind position.
    ///
    /// Parameters the template does not reference are ignored; a placeholder
    /// without a parameter is an error.
    pub fn bind(&self, params: &ParameterSet) -> Result<Vec<String>> {
        self.bindings
            .iter()
            .map(|name| {
                params.get(name).map(str::to_string).ok_or_else(|| {
                    ApiError::binding(format!("missing value for placeholder :{name}"))
                })
            })
            .collect()
    }
}

/// Rewrites every `:name` in `sql` into the positional form of `style`.
///
/// A placeholder is a `:` token directly followed by an unquoted word; `::`
/// casts and `:=` are separate tokens and pass through. Fails when the
/// template cannot be tokenized, e.g. on an unterminated string literal.
pub fn compile(sql: &str, style: PlaceholderStyle) -> Result<CompiledQuery> {
    let dialect = style.dialect();
    let tokens = Tokenizer::new(dialect.as_ref(), sql)
        .tokenize_with_location()
        .map_err(|e| ApiError::execution(format!("Failed to tokenize template: {e}")))?;

    let mut out = String::with_capacity(sql.len());
    let mut bindings: Vec<String> = Vec::new();
    let mut copied = 0;

    for pair in tokens.windows(2) {
        let Some((start, name)) = placeholder_at(sql, &pair[0], &pair[1]) else {
            continue;
        };
        if start < copied {
            continue;
        }
        out.push_str(&sql[copied..start]);
        push_placeholder(&mut out, &mut bindings, name.to_string(), style);
        copied = start + 1 + name.len();
    }
    out.push_str(&sql[copied..]);

    Ok(CompiledQuery { sql: out, bindings })
}

/// Returns the byte offset of the colon and the placeholder name when
/// `colon` and `word` form a `:name` placeholder.
fn placeholder_at<'a>(
    sql: &str,
    colon: &TokenWithLocation,
    word: &'a TokenWithLocation,
) -> Option<(usize, &'a str)> {
    let (Token::Colon, Token::Word(word)) = (&colon.token, &word.token) else {
        return None;
    };
    if word.quote_style.is_some() {
        return None;
    }

    let name = ident_prefix(&word.value);
    if name.is_empty() {
        return None;
    }

    let start = byte_offset(sql, &colon.location)?;
    let rest = sql.get(start..)?;
    (rest.starts_with(':') && rest[1..].starts_with(name)).then_some((start, name))
}

/// Longest prefix of `word` that is a placeholder name.
fn ident_prefix(word: &str) -> &str {
    match word.chars().next() {
        Some(first) if is_ident_start(first) => {
            let end = word
                .char_indices()
                .find(|(_, c)| !is_ident_char(*c))
                .map_or(word.len(), |(i, _)| i);
            &word[..end]
        }
        _ => "",
    }
}

/// Converts a tokenizer location (1-based line, 1-based character column)
/// into a byte offset of `sql`.
fn byte_offset(sql: &str, location: &Location) -> Option<usize> {
    let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
    let column = usize::try_from(location.column).ok()?.checked_sub(1)?;

    let line_start = match line {
        0 => 0,
        n => sql.match_indices('\n').nth(n - 1)?.0 + 1,
    };
    sql[line_start..]
        .char_indices()
        .nth(column)
        .map(|(i, _)| line_start + i)
}

fn push_placeholder(
    out: &mut String,
    bindings: &mut Vec<String>,
    name: String,
    style: PlaceholderStyle,
) {
    match style {
        PlaceholderStyle::Question => {
            out.push('?');
            bindings.push(name);
        }
        PlaceholderStyle::Dollar | PlaceholderStyle::NumberedQuestion => {
            let index = match bindings.iter().position(|existing| *existing == name) {
                Some(pos) => pos + 1,
                None => {
                    bindings.push(name);
                    bindings.len()
                }
            };
            let prefix = if style == PlaceholderStyle::Dollar { '$' } else { '?' };
            out.push(prefix);
            out.push_str(&index.to_string());
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
