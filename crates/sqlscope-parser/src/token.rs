//! Token types produced by the lexer.
//!
//! Every token carries its discriminant, the exact source text it covers,
//! and a [`Span`] with full line/column/offset positions. Keywords are their
//! own variants for O(1) matching in the parser.

use serde::{Deserialize, Serialize};
use sqlscope_ast::Span;

use crate::Dialect;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The token discriminant.
    pub kind: TokenKind,
    /// The exact slice of source text this token covers. For string tokens
    /// the surrounding quote characters are included.
    pub text: String,
    /// Source range, `span.end.offset - span.start.offset == text.len()`.
    pub span: Span,
}

impl Token {
    /// True for whitespace and comment tokens, which the parser skips.
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment { .. }
        )
    }
}

/// Token discriminant.
///
/// Organized by category: literals, identifiers, keywords, operators,
/// punctuation, and trivia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // === Literals ===
    /// Numeric literal: `42`, `3.14`. The text holds the digits.
    Number,
    /// String literal, quotes included in the text. `terminated` is false
    /// when the closing quote was missing and the token ran to end of input.
    Str { terminated: bool },

    // === Identifiers ===
    /// Unquoted identifier.
    Ident,
    /// Bracket-quoted identifier `[name]` (SQL Server only).
    QuotedIdent,

    // === Operators ===
    Eq,          // `=`
    Ne,          // `!=` or `<>`
    Lt,          // `<`
    Le,          // `<=`
    Gt,          // `>`
    Ge,          // `>=`
    Plus,        // `+`
    Minus,       // `-`
    Star,        // `*`
    Slash,       // `/`
    Percent,     // `%`
    Concat,      // `||`
    AndAnd,      // `&&`
    DoubleColon, // `::`

    // === Punctuation ===
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,

    // === Trivia ===
    /// A run of whitespace (only emitted when whitespace is preserved).
    Whitespace,
    /// A `--` line comment or `/* */` block comment (only emitted when
    /// comments are preserved). `terminated` is false for a block comment
    /// that ran to end of input.
    Comment { block: bool, terminated: bool },

    // === Keywords ===
    KwAll,
    KwAnd,
    KwAs,
    KwAsc,
    KwBetween,
    KwBy,
    KwCase,
    KwCast,
    KwCheck,
    KwConstraint,
    KwCreate,
    KwCross,
    KwDefault,
    KwDelete,
    KwDesc,
    KwDistinct,
    KwElse,
    KwEnd,
    KwExists,
    KwFalse,
    KwFirst,
    KwForeign,
    KwFrom,
    KwFull,
    KwGroup,
    KwHaving,
    KwIdentity,
    KwIf,
    KwIlike,
    KwIn,
    KwInner,
    KwInsert,
    KwInto,
    KwIs,
    KwJoin,
    KwKey,
    KwLast,
    KwLeft,
    KwLike,
    KwLimit,
    KwNot,
    KwNull,
    KwNulls,
    KwNvarchar,
    KwOffset,
    KwOn,
    KwOr,
    KwOrder,
    KwOuter,
    KwPrimary,
    KwReferences,
    KwReturning,
    KwRight,
    KwRowcount,
    KwSelect,
    KwSerial,
    KwSet,
    KwTable,
    KwText,
    KwThen,
    KwTop,
    KwTrue,
    KwUnique,
    KwUpdate,
    KwValues,
    KwWhen,
    KwWhere,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Look up an identifier string to see if it's a keyword in `dialect`.
    /// Returns the keyword variant if so, else `None`.
    ///
    /// A word that is a keyword only in the other dialect lexes as a plain
    /// identifier, so `TOP` stays usable as a column name under PostgreSQL.
    #[must_use]
    pub fn lookup_keyword(s: &str, dialect: Dialect) -> Option<Self> {
        // Case-insensitive keyword matching.
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Some(Self::KwAll),
            "AND" => Some(Self::KwAnd),
            "AS" => Some(Self::KwAs),
            "ASC" => Some(Self::KwAsc),
            "BETWEEN" => Some(Self::KwBetween),
            "BY" => Some(Self::KwBy),
            "CASE" => Some(Self::KwCase),
            "CAST" => Some(Self::KwCast),
            "CHECK" => Some(Self::KwCheck),
            "CONSTRAINT" => Some(Self::KwConstraint),
            "CREATE" => Some(Self::KwCreate),
            "CROSS" => Some(Self::KwCross),
            "DEFAULT" => Some(Self::KwDefault),
            "DELETE" => Some(Self::KwDelete),
            "DESC" => Some(Self::KwDesc),
            "DISTINCT" => Some(Self::KwDistinct),
            "ELSE" => Some(Self::KwElse),
            "END" => Some(Self::KwEnd),
            "EXISTS" => Some(Self::KwExists),
            "FALSE" => Some(Self::KwFalse),
            "FIRST" => Some(Self::KwFirst),
            "FOREIGN" => Some(Self::KwForeign),
            "FROM" => Some(Self::KwFrom),
            "FULL" => Some(Self::KwFull),
            "GROUP" => Some(Self::KwGroup),
            "HAVING" => Some(Self::KwHaving),
            "IF" => Some(Self::KwIf),
            "IN" => Some(Self::KwIn),
            "INNER" => Some(Self::KwInner),
            "INSERT" => Some(Self::KwInsert),
            "INTO" => Some(Self::KwInto),
            "IS" => Some(Self::KwIs),
            "JOIN" => Some(Self::KwJoin),
            "KEY" => Some(Self::KwKey),
            "LAST" => Some(Self::KwLast),
            "LEFT" => Some(Self::KwLeft),
            "LIKE" => Some(Self::KwLike),
            "LIMIT" => Some(Self::KwLimit),
            "NOT" => Some(Self::KwNot),
            "NULL" => Some(Self::KwNull),
            "NULLS" => Some(Self::KwNulls),
            "OFFSET" => Some(Self::KwOffset),
            "ON" => Some(Self::KwOn),
            "OR" => Some(Self::KwOr),
            "ORDER" => Some(Self::KwOrder),
            "OUTER" => Some(Self::KwOuter),
            "PRIMARY" => Some(Self::KwPrimary),
            "REFERENCES" => Some(Self::KwReferences),
            "RIGHT" => Some(Self::KwRight),
            "SELECT" => Some(Self::KwSelect),
            "SET" => Some(Self::KwSet),
            "TABLE" => Some(Self::KwTable),
            "THEN" => Some(Self::KwThen),
            "TRUE" => Some(Self::KwTrue),
            "UNIQUE" => Some(Self::KwUnique),
            "UPDATE" => Some(Self::KwUpdate),
            "VALUES" => Some(Self::KwValues),
            "WHEN" => Some(Self::KwWhen),
            "WHERE" => Some(Self::KwWhere),
            "ILIKE" if dialect == Dialect::Postgresql => Some(Self::KwIlike),
            "RETURNING" if dialect == Dialect::Postgresql => Some(Self::KwReturning),
            "SERIAL" if dialect == Dialect::Postgresql => Some(Self::KwSerial),
            "TEXT" if dialect == Dialect::Postgresql => Some(Self::KwText),
            "IDENTITY" if dialect == Dialect::SqlServer => Some(Self::KwIdentity),
            "NVARCHAR" if dialect == Dialect::SqlServer => Some(Self::KwNvarchar),
            "ROWCOUNT" if dialect == Dialect::SqlServer => Some(Self::KwRowcount),
            "TOP" if dialect == Dialect::SqlServer => Some(Self::KwTop),
            _ => None,
        }
    }

    /// Returns true if this is a keyword that can start a statement.
    /// Used by the parser for error recovery sync points.
    #[must_use]
    pub fn is_statement_start(&self) -> bool {
        matches!(
            self,
            Self::KwSelect | Self::KwInsert | Self::KwUpdate | Self::KwDelete | Self::KwCreate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_is_case_insensitive() {
        assert_eq!(
            TokenKind::lookup_keyword("select", Dialect::Postgresql),
            Some(TokenKind::KwSelect)
        );
        assert_eq!(
            TokenKind::lookup_keyword("SeLeCt", Dialect::SqlServer),
            Some(TokenKind::KwSelect)
        );
        assert_eq!(TokenKind::lookup_keyword("foo", Dialect::Postgresql), None);
    }

    #[test]
    fn dialect_specific_keywords() {
        assert_eq!(
            TokenKind::lookup_keyword("TOP", Dialect::SqlServer),
            Some(TokenKind::KwTop)
        );
        assert_eq!(TokenKind::lookup_keyword("TOP", Dialect::Postgresql), None);
        assert_eq!(
            TokenKind::lookup_keyword("ILIKE", Dialect::Postgresql),
            Some(TokenKind::KwIlike)
        );
        assert_eq!(TokenKind::lookup_keyword("ILIKE", Dialect::SqlServer), None);
    }

    #[test]
    fn dialect_specific_type_keywords() {
        assert_eq!(
            TokenKind::lookup_keyword("SERIAL", Dialect::Postgresql),
            Some(TokenKind::KwSerial)
        );
        assert_eq!(TokenKind::lookup_keyword("SERIAL", Dialect::SqlServer), None);
        assert_eq!(
            TokenKind::lookup_keyword("NVARCHAR", Dialect::SqlServer),
            Some(TokenKind::KwNvarchar)
        );
        assert_eq!(
            TokenKind::lookup_keyword("NVARCHAR", Dialect::Postgresql),
            None
        );
        assert_eq!(
            TokenKind::lookup_keyword("TEXT", Dialect::Postgresql),
            Some(TokenKind::KwText)
        );
        assert_eq!(
            TokenKind::lookup_keyword("ROWCOUNT", Dialect::SqlServer),
            Some(TokenKind::KwRowcount)
        );
        assert_eq!(
            TokenKind::lookup_keyword("RETURNING", Dialect::Postgresql),
            Some(TokenKind::KwReturning)
        );
    }

    #[test]
    fn statement_start_keywords() {
        assert!(TokenKind::KwSelect.is_statement_start());
        assert!(TokenKind::KwCreate.is_statement_start());
        assert!(!TokenKind::KwFrom.is_statement_start());
        assert!(!TokenKind::Ident.is_statement_start());
    }
}
