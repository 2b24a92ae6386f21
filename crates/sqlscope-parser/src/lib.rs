//! Dialect-aware SQL front end: lexer, recursive descent parser with Pratt
//! precedence-climbing for expressions, and position-tracked diagnostics.
//!
//! The two entry points are [`tokenize`] and [`parse`]. Neither ever panics
//! on malformed input: lexing skips what it cannot recognize and parsing
//! collects [`ParseError`]s while recovering at statement boundaries, so a
//! single typo does not hide the rest of a script.
//!
//! ```
//! use sqlscope_parser::{parse, Dialect, ParseOptions};
//!
//! let outcome = parse(
//!     "SELECT id, name FROM Customers WHERE id = 1;",
//!     &ParseOptions::new(Dialect::Postgresql),
//! );
//! assert!(outcome.errors.is_empty());
//! assert_eq!(outcome.statements.len(), 1);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlscope_ast::Statement;
use thiserror::Error;
use tracing::debug;

mod expr;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::{ErrorCode, ParseError, ParseWarning, Parser, WarningCode};
pub use token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Dialect
// ---------------------------------------------------------------------------

/// The SQL dialect to lex and parse against.
///
/// The dialect decides which words are keywords (`TOP` binds only under
/// [`Dialect::SqlServer`], `ILIKE` only under [`Dialect::Postgresql`]),
/// whether `[name]` quotes an identifier, and which constructs draw a
/// [`WarningCode::DialectMismatch`] warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgresql,
    SqlServer,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgresql => "postgresql",
            Self::SqlServer => "sqlserver",
        })
    }
}

/// Error returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown SQL dialect: {0:?}")]
pub struct UnknownDialect(String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            "sqlserver" | "mssql" | "tsql" => Ok(Self::SqlServer),
            other => Err(UnknownDialect(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options controlling [`tokenize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub dialect: Dialect,
    /// Emit comment tokens instead of dropping them.
    pub preserve_comments: bool,
    /// Emit whitespace tokens instead of dropping them.
    pub preserve_whitespace: bool,
}

impl TokenizeOptions {
    /// Options for `dialect` with trivia dropped.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }
}

/// Options controlling [`parse`].
///
/// The preserve flags only affect the token list echoed back in the
/// [`ParseOutcome`]; the parser itself never sees trivia.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub dialect: Dialect,
    pub preserve_comments: bool,
    pub preserve_whitespace: bool,
}

impl ParseOptions {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Everything [`parse`] produces: the statements that could be built, the
/// token stream, and all diagnostics collected along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub statements: Vec<Statement>,
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutcome {
    /// True when parsing produced no errors. Warnings do not count.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Tokenize `sql` into a flat token list ending in `Eof`.
///
/// Never fails; malformed input yields flagged or skipped tokens.
#[must_use]
pub fn tokenize(sql: &str, options: &TokenizeOptions) -> Vec<Token> {
    Lexer::tokenize(sql, options)
}

/// Parse `sql` into statements, collecting errors and warnings as data.
///
/// A statement that cannot be parsed is skipped and parsing resumes at the
/// next `;` or statement keyword, so later statements still come through.
#[must_use]
pub fn parse(sql: &str, options: &ParseOptions) -> ParseOutcome {
    // Lex with comments kept so unterminated block comments can be reported
    // even when the caller does not want comment tokens back.
    let lex_options = TokenizeOptions {
        dialect: options.dialect,
        preserve_comments: true,
        preserve_whitespace: options.preserve_whitespace,
    };
    let mut tokens = Lexer::tokenize(sql, &lex_options);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for tok in &tokens {
        match tok.kind {
            TokenKind::Str { terminated: false } => errors.push(ParseError {
                message: "unterminated string literal".to_owned(),
                position: tok.span.start,
                code: ErrorCode::UnterminatedString,
            }),
            TokenKind::Comment {
                block: true,
                terminated: false,
            } => warnings.push(ParseWarning {
                message: "block comment is never closed".to_owned(),
                position: tok.span.start,
                code: WarningCode::UnterminatedComment,
            }),
            _ => {}
        }
    }

    let stream: Vec<Token> = tokens.iter().filter(|t| !t.is_trivia()).cloned().collect();
    let mut parser = Parser::new(stream, options.dialect);
    let (statements, parse_errors, parse_warnings) = parser.parse_all();
    errors.extend(parse_errors);
    warnings.extend(parse_warnings);

    if !options.preserve_comments {
        tokens.retain(|t| !matches!(t.kind, TokenKind::Comment { .. }));
    }

    debug!(
        dialect = %options.dialect,
        statements = statements.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "parse finished"
    );

    ParseOutcome {
        statements,
        tokens,
        errors,
        warnings,
    }
}
