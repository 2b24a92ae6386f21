//! Hand-written recursive descent parser. Expression parsing lives in
//! `expr.rs`.
//!
//! The parser consumes a trivia-free token stream and turns it into
//! statements. Errors never abort the whole run: a failed statement is
//! recorded and the parser resynchronizes at the next `;` or statement
//! keyword before trying again.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlscope_ast::{
    Assignment, ColumnConstraint, ColumnConstraintKind, ColumnDef, CreateTableStatement, DataType,
    DeleteStatement, Expr, InsertSource, InsertStatement, JoinKind, JoinSpec, LimitClause, Literal,
    NullsOrder, OrderingTerm, Position, QualifiedName, SelectColumn, SelectStatement,
    SortDirection, Span, Statement, TableConstraint, TableConstraintKind, TableReference,
    UpdateStatement,
};
use thiserror::Error;
use tracing::debug;

use crate::lexer::unquote;
use crate::token::{Token, TokenKind};
use crate::Dialect;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Stable machine-readable category for a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ErrorCode {
    #[error("unexpected-token")]
    UnexpectedToken,
    #[error("unexpected-eof")]
    UnexpectedEof,
    #[error("unterminated-string")]
    UnterminatedString,
    #[error("expected-identifier")]
    ExpectedIdentifier,
    #[error("expected-expression")]
    ExpectedExpression,
    #[error("invalid-number")]
    InvalidNumber,
}

/// A recoverable parse failure, reported as data rather than thrown.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code} at {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    pub code: ErrorCode,
}

/// Stable machine-readable category for a [`ParseWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    /// A construct from the other dialect that was understood anyway.
    DialectMismatch,
    /// A block comment ran to end of input.
    UnterminatedComment,
}

/// Something suspicious that did not prevent parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub message: String,
    pub position: Position,
    pub code: WarningCode,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning at {}: {}", self.position, self.message)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) dialect: Dialect,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) warnings: Vec<ParseWarning>,
}

impl Parser {
    /// Build a parser over an already-lexed, trivia-free token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>, dialect: Dialect) -> Self {
        Self {
            tokens,
            pos: 0,
            dialect,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Parse every statement in the stream, recovering after failures.
    pub fn parse_all(&mut self) -> (Vec<Statement>, Vec<ParseError>, Vec<ParseWarning>) {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            if self.check(&TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Ok(s) => {
                    stmts.push(s);
                    if !self.at_eof() && !self.eat(&TokenKind::Semicolon) {
                        self.errors
                            .push(self.err_expected("`;` between statements"));
                        self.synchronize();
                    }
                }
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        (
            stmts,
            std::mem::take(&mut self.errors),
            std::mem::take(&mut self.warnings),
        )
    }

    /// Parse a single statement, dispatching on the leading keyword.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek() {
            TokenKind::KwSelect => Ok(Statement::Select(self.parse_select()?)),
            TokenKind::KwInsert => Ok(Statement::Insert(self.parse_insert()?)),
            TokenKind::KwUpdate => Ok(Statement::Update(self.parse_update()?)),
            TokenKind::KwDelete => Ok(Statement::Delete(self.parse_delete()?)),
            TokenKind::KwCreate => Ok(Statement::CreateTable(self.parse_create_table()?)),
            _ => Err(self.err_expected("a statement (SELECT, INSERT, UPDATE, DELETE, CREATE)")),
        }
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self) -> &TokenKind {
        self.current().map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    /// Clone the current token and advance past it.
    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.current().cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: Span::ZERO,
        });
        self.advance();
        tok
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, ParseError> {
        if self.check(kind) {
            let sp = self.current_span();
            self.advance();
            Ok(sp)
        } else {
            Err(self.err_expected(what))
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current().map_or(Span::ZERO, |t| t.span)
    }

    pub(crate) fn current_position(&self) -> Position {
        self.current_span().start
    }

    /// Span of the most recently consumed token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos == 0 {
            Span::ZERO
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    pub(crate) fn error_here(&self, code: ErrorCode, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.current_position(),
            code,
        }
    }

    pub(crate) fn err_expected(&self, what: &str) -> ParseError {
        if self.at_eof() {
            self.error_here(
                ErrorCode::UnexpectedEof,
                format!("expected {what}, found end of input"),
            )
        } else {
            let found = self.current().map_or_else(String::new, |t| t.text.clone());
            self.error_here(
                ErrorCode::UnexpectedToken,
                format!("expected {what}, found {found:?}"),
            )
        }
    }

    pub(crate) fn warn(&mut self, code: WarningCode, message: impl Into<String>) {
        self.warnings.push(ParseWarning {
            message: message.into(),
            position: self.current_position(),
            code,
        });
    }

    /// Skip tokens until a likely statement boundary: just past the next
    /// `;`, or at the next statement keyword, or end of input.
    fn synchronize(&mut self) {
        let from = self.current_position();
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                k if k.is_statement_start() => break,
                _ => self.advance(),
            }
        }
        debug!(from = %from, to = %self.current_position(), "resynchronized after parse error");
    }

    // -----------------------------------------------------------------------
    // Identifiers and names
    // -----------------------------------------------------------------------

    pub(crate) fn parse_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.peek() {
            TokenKind::Ident => {
                let tok = self.bump();
                Ok((tok.text, tok.span))
            }
            TokenKind::QuotedIdent => {
                let tok = self.bump();
                Ok((unquote(&tok.text), tok.span))
            }
            _ => {
                let mut err = self.err_expected(what);
                err.code = ErrorCode::ExpectedIdentifier;
                Err(err)
            }
        }
    }

    pub(crate) fn parse_qualified_name(&mut self) -> Result<(QualifiedName, Span), ParseError> {
        let (first, first_span) = self.parse_ident("a table name")?;
        if self.eat(&TokenKind::Dot) {
            let (second, second_span) = self.parse_ident("a name after `.`")?;
            Ok((
                QualifiedName::qualified(first, second),
                first_span.merge(second_span),
            ))
        } else {
            Ok((QualifiedName::bare(first), first_span))
        }
    }

    /// `[AS] alias`, or nothing. A bare identifier counts as an alias.
    fn parse_opt_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat(&TokenKind::KwAs) {
            let (name, _) = self.parse_ident("an alias after AS")?;
            return Ok(Some(name));
        }
        if matches!(self.peek(), TokenKind::Ident | TokenKind::QuotedIdent) {
            let (name, _) = self.parse_ident("an alias")?;
            return Ok(Some(name));
        }
        Ok(None)
    }

    fn parse_comma_sep<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![item(self)?];
        while self.eat(&TokenKind::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // SELECT
    // -----------------------------------------------------------------------

    pub(crate) fn parse_select(&mut self) -> Result<SelectStatement, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::KwSelect, "SELECT")?;

        let distinct = if self.eat(&TokenKind::KwDistinct) {
            true
        } else {
            let _ = self.eat(&TokenKind::KwAll);
            false
        };

        // SQL Server `TOP n` / `TOP (expr)`, normalized into the limit
        // fields. `TOP` only lexes as a keyword under that dialect.
        let top_limit = if self.eat(&TokenKind::KwTop) {
            Some(self.parse_top_operand()?)
        } else {
            None
        };

        let columns = self.parse_comma_sep(Self::parse_select_column)?;

        let from = if self.eat(&TokenKind::KwFrom) {
            self.parse_from_tables()?
        } else {
            Vec::new()
        };

        let where_clause = if self.eat(&TokenKind::KwWhere) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        let group_by = if self.eat(&TokenKind::KwGroup) {
            self.expect(&TokenKind::KwBy, "BY after GROUP")?;
            self.parse_comma_sep(Self::parse_expr)?
        } else {
            Vec::new()
        };

        let having = if self.eat(&TokenKind::KwHaving) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        let order_by = if self.eat(&TokenKind::KwOrder) {
            self.expect(&TokenKind::KwBy, "BY after ORDER")?;
            self.parse_comma_sep(Self::parse_ordering_term)?
        } else {
            Vec::new()
        };

        let mut limit = top_limit.map(|e| LimitClause {
            limit: Some(e),
            offset: None,
        });
        if self.check(&TokenKind::KwLimit) {
            if self.dialect == Dialect::SqlServer {
                self.warn(
                    WarningCode::DialectMismatch,
                    "LIMIT is PostgreSQL syntax; T-SQL uses TOP",
                );
            }
            self.advance();
            let e = self.parse_expr()?;
            limit.get_or_insert(LimitClause {
                limit: None,
                offset: None,
            })
            .limit = Some(e);
        }
        if self.check(&TokenKind::KwOffset) {
            if self.dialect == Dialect::SqlServer {
                self.warn(
                    WarningCode::DialectMismatch,
                    "OFFSET is PostgreSQL syntax here",
                );
            }
            self.advance();
            let e = self.parse_expr()?;
            limit
                .get_or_insert(LimitClause {
                    limit: None,
                    offset: None,
                })
                .offset = Some(e);
        }

        Ok(SelectStatement {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            span: start.merge(self.prev_span()),
        })
    }

    /// The operand of TOP: a bare number, or a parenthesized expression.
    /// Bare operands must be a single number so `TOP 10 *` does not read
    /// as a multiplication.
    fn parse_top_operand(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::LeftParen) {
            let e = self.parse_expr()?;
            self.expect(&TokenKind::RightParen, "`)` after TOP expression")?;
            Ok(e)
        } else if self.check(&TokenKind::Number) {
            let tok = self.bump();
            self.number_literal(&tok)
        } else {
            Err(self.err_expected("a row count after TOP"))
        }
    }

    /// Build an integer or float literal from a number token.
    pub(crate) fn number_literal(&self, tok: &Token) -> Result<Expr, ParseError> {
        let lit = if tok.text.contains('.') {
            tok.text.parse::<f64>().ok().map(Literal::Float)
        } else {
            tok.text.parse::<i64>().ok().map(Literal::Integer)
        };
        match lit {
            Some(lit) => Ok(Expr::Literal(lit, tok.span)),
            None => Err(ParseError {
                message: format!("number out of range: {}", tok.text),
                position: tok.span.start,
                code: ErrorCode::InvalidNumber,
            }),
        }
    }

    fn parse_select_column(&mut self) -> Result<SelectColumn, ParseError> {
        if self.check(&TokenKind::Star) {
            let tok = self.bump();
            return Ok(SelectColumn::Star(tok.span));
        }
        // `table.*`
        if matches!(self.peek(), TokenKind::Ident | TokenKind::QuotedIdent)
            && self.peek_nth(1) == &TokenKind::Dot
            && self.peek_nth(2) == &TokenKind::Star
        {
            let (table, start) = self.parse_ident("a table name")?;
            self.advance(); // `.`
            let end = self.bump().span; // `*`
            return Ok(SelectColumn::TableStar(table, start.merge(end)));
        }
        let expr = self.parse_expr()?;
        let alias = self.parse_opt_alias()?;
        let span = expr.span().merge(self.prev_span());
        Ok(SelectColumn::Expr { expr, alias, span })
    }

    fn parse_from_tables(&mut self) -> Result<Vec<TableReference>, ParseError> {
        let mut tables = vec![self.parse_table_ref(None)?];
        loop {
            if self.eat(&TokenKind::Comma) {
                tables.push(self.parse_table_ref(Some(JoinSpec {
                    kind: JoinKind::Cross,
                    on: None,
                }))?);
                continue;
            }
            let Some(kind) = self.parse_join_prefix()? else {
                break;
            };
            let mut table = self.parse_table_ref(None)?;
            let on = if self.eat(&TokenKind::KwOn) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            table.span = table.span.merge(self.prev_span());
            table.join = Some(JoinSpec { kind, on });
            tables.push(table);
        }
        Ok(tables)
    }

    /// Consume a join introducer through the JOIN keyword, if one is next.
    fn parse_join_prefix(&mut self) -> Result<Option<JoinKind>, ParseError> {
        let kind = match self.peek() {
            TokenKind::KwJoin => {
                self.advance();
                return Ok(Some(JoinKind::Inner));
            }
            TokenKind::KwInner => JoinKind::Inner,
            TokenKind::KwLeft => JoinKind::Left,
            TokenKind::KwRight => JoinKind::Right,
            TokenKind::KwFull => JoinKind::Full,
            TokenKind::KwCross => JoinKind::Cross,
            _ => return Ok(None),
        };
        self.advance();
        let _ = self.eat(&TokenKind::KwOuter);
        self.expect(&TokenKind::KwJoin, "JOIN")?;
        Ok(Some(kind))
    }

    fn parse_table_ref(&mut self, join: Option<JoinSpec>) -> Result<TableReference, ParseError> {
        let (name, name_span) = self.parse_qualified_name()?;
        let alias = self.parse_opt_alias()?;
        Ok(TableReference {
            name,
            alias,
            join,
            span: name_span.merge(self.prev_span()),
        })
    }

    fn parse_ordering_term(&mut self) -> Result<OrderingTerm, ParseError> {
        let expr = self.parse_expr()?;
        let direction = if self.eat(&TokenKind::KwAsc) {
            Some(SortDirection::Asc)
        } else if self.eat(&TokenKind::KwDesc) {
            Some(SortDirection::Desc)
        } else {
            None
        };
        let nulls = if self.eat(&TokenKind::KwNulls) {
            if self.dialect == Dialect::SqlServer {
                self.warn(
                    WarningCode::DialectMismatch,
                    "NULLS FIRST/LAST is PostgreSQL syntax",
                );
            }
            if self.eat(&TokenKind::KwFirst) {
                Some(NullsOrder::First)
            } else if self.eat(&TokenKind::KwLast) {
                Some(NullsOrder::Last)
            } else {
                return Err(self.err_expected("FIRST or LAST after NULLS"));
            }
        } else {
            None
        };
        let span = expr.span().merge(self.prev_span());
        Ok(OrderingTerm {
            expr,
            direction,
            nulls,
            span,
        })
    }

    // -----------------------------------------------------------------------
    // INSERT
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::KwInsert, "INSERT")?;
        self.expect(&TokenKind::KwInto, "INTO after INSERT")?;
        let (table, _) = self.parse_qualified_name()?;

        let columns = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let cols =
                self.parse_comma_sep(|p| p.parse_ident("a column name").map(|(name, _)| name))?;
            self.expect(&TokenKind::RightParen, "`)` after column list")?;
            cols
        } else {
            Vec::new()
        };

        let source = if self.eat(&TokenKind::KwValues) {
            let rows = self.parse_comma_sep(Self::parse_value_row)?;
            InsertSource::Values(rows)
        } else if self.check(&TokenKind::KwSelect) {
            InsertSource::Select(Box::new(self.parse_select()?))
        } else {
            return Err(self.err_expected("VALUES or SELECT"));
        };

        Ok(InsertStatement {
            table,
            columns,
            source,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_value_row(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(` to open a VALUES row")?;
        let exprs = self.parse_comma_sep(Self::parse_expr)?;
        self.expect(&TokenKind::RightParen, "`)` to close a VALUES row")?;
        Ok(exprs)
    }

    // -----------------------------------------------------------------------
    // UPDATE / DELETE
    // -----------------------------------------------------------------------

    fn parse_update(&mut self) -> Result<UpdateStatement, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::KwUpdate, "UPDATE")?;
        let (table, _) = self.parse_qualified_name()?;
        let alias = self.parse_opt_alias()?;
        self.expect(&TokenKind::KwSet, "SET")?;
        let assignments = self.parse_comma_sep(Self::parse_assignment)?;
        let where_clause = if self.eat(&TokenKind::KwWhere) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(UpdateStatement {
            table,
            alias,
            assignments,
            where_clause,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let (column, col_span) = self.parse_ident("a column name")?;
        self.expect(&TokenKind::Eq, "`=` in assignment")?;
        let value = self.parse_expr()?;
        let span = col_span.merge(value.span());
        Ok(Assignment {
            column,
            value,
            span,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::KwDelete, "DELETE")?;
        self.expect(&TokenKind::KwFrom, "FROM after DELETE")?;
        let (table, _) = self.parse_qualified_name()?;
        let alias = self.parse_opt_alias()?;
        let where_clause = if self.eat(&TokenKind::KwWhere) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(DeleteStatement {
            table,
            alias,
            where_clause,
            span: start.merge(self.prev_span()),
        })
    }

    // -----------------------------------------------------------------------
    // CREATE TABLE
    // -----------------------------------------------------------------------

    fn parse_create_table(&mut self) -> Result<CreateTableStatement, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::KwCreate, "CREATE")?;
        self.expect(&TokenKind::KwTable, "TABLE after CREATE")?;

        let if_not_exists = if self.check(&TokenKind::KwIf) {
            self.advance();
            self.expect(&TokenKind::KwNot, "NOT after IF")?;
            self.expect(&TokenKind::KwExists, "EXISTS after IF NOT")?;
            true
        } else {
            false
        };

        let (name, _) = self.parse_qualified_name()?;
        self.expect(&TokenKind::LeftParen, "`(` after the table name")?;

        let mut columns = Vec::new();
        let mut constraints = Vec::new();
        loop {
            if self.is_table_constraint_start() {
                constraints.push(self.parse_table_constraint()?);
            } else {
                columns.push(self.parse_column_def()?);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen, "`)` to close the table body")?;

        Ok(CreateTableStatement {
            if_not_exists,
            name,
            columns,
            constraints,
            span: start.merge(self.prev_span()),
        })
    }

    fn is_table_constraint_start(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::KwConstraint
                | TokenKind::KwPrimary
                | TokenKind::KwForeign
                | TokenKind::KwUnique
                | TokenKind::KwCheck
        )
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let (name, name_span) = self.parse_ident("a column name")?;
        let data_type = self.parse_data_type()?;
        let mut constraints = Vec::new();
        loop {
            let Some(constraint) = self.parse_column_constraint()? else {
                break;
            };
            constraints.push(constraint);
        }
        Ok(ColumnDef {
            name,
            data_type,
            constraints,
            span: name_span.merge(self.prev_span()),
        })
    }

    pub(crate) fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        // Dialect type keywords still name a type here.
        let (name, name_span) = if matches!(
            self.peek(),
            TokenKind::KwSerial | TokenKind::KwText | TokenKind::KwNvarchar
        ) {
            let tok = self.bump();
            (tok.text, tok.span)
        } else {
            self.parse_ident("a data type")?
        };
        let mut arg1 = None;
        let mut arg2 = None;
        if self.eat(&TokenKind::LeftParen) {
            let first = self.expect_number_text("a size parameter")?;
            arg1 = Some(first);
            if self.eat(&TokenKind::Comma) {
                arg2 = Some(self.expect_number_text("a second size parameter")?);
            }
            self.expect(&TokenKind::RightParen, "`)` after type parameters")?;
        }
        Ok(DataType {
            name,
            arg1,
            arg2,
            span: name_span.merge(self.prev_span()),
        })
    }

    fn expect_number_text(&mut self, what: &str) -> Result<String, ParseError> {
        if self.check(&TokenKind::Number) {
            Ok(self.bump().text)
        } else {
            Err(self.err_expected(what))
        }
    }

    fn expect_number_i64(&mut self, what: &str) -> Result<i64, ParseError> {
        let text = self.expect_number_text(what)?;
        text.parse().map_err(|_| ParseError {
            message: format!("number out of range: {text}"),
            position: self.prev_span().start,
            code: ErrorCode::InvalidNumber,
        })
    }

    fn parse_column_constraint(&mut self) -> Result<Option<ColumnConstraint>, ParseError> {
        let start = self.current_span();
        let name = if self.eat(&TokenKind::KwConstraint) {
            Some(self.parse_ident("a constraint name")?.0)
        } else {
            None
        };

        let kind = match self.peek() {
            TokenKind::KwPrimary => {
                self.advance();
                self.expect(&TokenKind::KwKey, "KEY after PRIMARY")?;
                ColumnConstraintKind::PrimaryKey
            }
            TokenKind::KwNot => {
                self.advance();
                self.expect(&TokenKind::KwNull, "NULL after NOT")?;
                ColumnConstraintKind::NotNull
            }
            TokenKind::KwNull => {
                self.advance();
                ColumnConstraintKind::Null
            }
            TokenKind::KwUnique => {
                self.advance();
                ColumnConstraintKind::Unique
            }
            TokenKind::KwDefault => {
                self.advance();
                ColumnConstraintKind::Default(self.parse_expr()?)
            }
            TokenKind::KwCheck => {
                self.advance();
                self.expect(&TokenKind::LeftParen, "`(` after CHECK")?;
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RightParen, "`)` after CHECK expression")?;
                ColumnConstraintKind::Check(e)
            }
            TokenKind::KwReferences => {
                self.advance();
                let (table, _) = self.parse_qualified_name()?;
                let columns = if self.eat(&TokenKind::LeftParen) {
                    let cols = self
                        .parse_comma_sep(|p| p.parse_ident("a column name").map(|(n, _)| n))?;
                    self.expect(&TokenKind::RightParen, "`)` after referenced columns")?;
                    cols
                } else {
                    Vec::new()
                };
                ColumnConstraintKind::References { table, columns }
            }
            TokenKind::KwIdentity => {
                self.advance();
                let (seed, increment) = if self.eat(&TokenKind::LeftParen) {
                    let seed = self.expect_number_i64("an IDENTITY seed")?;
                    self.expect(&TokenKind::Comma, "`,` between IDENTITY arguments")?;
                    let inc = self.expect_number_i64("an IDENTITY increment")?;
                    self.expect(&TokenKind::RightParen, "`)` after IDENTITY arguments")?;
                    (Some(seed), Some(inc))
                } else {
                    (None, None)
                };
                ColumnConstraintKind::Identity { seed, increment }
            }
            _ => {
                if name.is_some() {
                    return Err(self.err_expected("a constraint after CONSTRAINT name"));
                }
                return Ok(None);
            }
        };

        Ok(Some(ColumnConstraint {
            name,
            kind,
            span: start.merge(self.prev_span()),
        }))
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint, ParseError> {
        let start = self.current_span();
        let name = if self.eat(&TokenKind::KwConstraint) {
            Some(self.parse_ident("a constraint name")?.0)
        } else {
            None
        };

        let kind = match self.peek() {
            TokenKind::KwPrimary => {
                self.advance();
                self.expect(&TokenKind::KwKey, "KEY after PRIMARY")?;
                TableConstraintKind::PrimaryKey(self.parse_paren_column_list()?)
            }
            TokenKind::KwUnique => {
                self.advance();
                TableConstraintKind::Unique(self.parse_paren_column_list()?)
            }
            TokenKind::KwCheck => {
                self.advance();
                self.expect(&TokenKind::LeftParen, "`(` after CHECK")?;
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RightParen, "`)` after CHECK expression")?;
                TableConstraintKind::Check(e)
            }
            TokenKind::KwForeign => {
                self.advance();
                self.expect(&TokenKind::KwKey, "KEY after FOREIGN")?;
                let columns = self.parse_paren_column_list()?;
                self.expect(&TokenKind::KwReferences, "REFERENCES")?;
                let (table, _) = self.parse_qualified_name()?;
                let ref_columns = if self.check(&TokenKind::LeftParen) {
                    self.parse_paren_column_list()?
                } else {
                    Vec::new()
                };
                TableConstraintKind::ForeignKey {
                    columns,
                    table,
                    ref_columns,
                }
            }
            _ => return Err(self.err_expected("PRIMARY, UNIQUE, CHECK, or FOREIGN")),
        };

        Ok(TableConstraint {
            name,
            kind,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_paren_column_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(` before a column list")?;
        let cols = self.parse_comma_sep(|p| p.parse_ident("a column name").map(|(n, _)| n))?;
        self.expect(&TokenKind::RightParen, "`)` after the column list")?;
        Ok(cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lexer, TokenizeOptions};
    use pretty_assertions::assert_eq;
    use sqlscope_ast::{BinaryOp, Expr};

    fn parser_for(sql: &str, dialect: Dialect) -> Parser {
        let tokens: Vec<Token> = Lexer::tokenize(sql, &TokenizeOptions::new(dialect))
            .into_iter()
            .filter(|t| !t.is_trivia())
            .collect();
        Parser::new(tokens, dialect)
    }

    fn parse_one(sql: &str, dialect: Dialect) -> Statement {
        let mut p = parser_for(sql, dialect);
        let (mut stmts, errors, _) = p.parse_all();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(stmts.len(), 1, "expected one statement");
        stmts.remove(0)
    }

    fn select_of(stmt: Statement) -> SelectStatement {
        match stmt {
            Statement::Select(s) => s,
            other => panic!("expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn select_with_projection_from_and_where() {
        let s = select_of(parse_one(
            "SELECT id, name FROM Customers WHERE id = 1;",
            Dialect::Postgresql,
        ));
        assert_eq!(s.columns.len(), 2);
        assert_eq!(s.from.len(), 1);
        assert_eq!(s.from[0].name.name, "Customers");
        let where_clause = s.where_clause.expect("where clause");
        assert!(matches!(
            *where_clause,
            Expr::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn statement_spans_cover_the_source() {
        let sql = "SELECT id FROM t";
        let s = select_of(parse_one(sql, Dialect::Postgresql));
        assert_eq!(s.span.start.offset, 0);
        assert_eq!(s.span.end.offset as usize, sql.len());
    }

    #[test]
    fn top_parses_as_limit_under_sql_server() {
        let s = select_of(parse_one("SELECT TOP 10 * FROM T", Dialect::SqlServer));
        let limit = s.limit.expect("limit clause");
        assert!(matches!(
            limit.limit,
            Some(Expr::Literal(Literal::Integer(10), _))
        ));
        assert!(matches!(s.columns[0], SelectColumn::Star(_)));
    }

    #[test]
    fn top_is_an_ordinary_column_under_postgresql() {
        let s = select_of(parse_one("SELECT TOP FROM T", Dialect::Postgresql));
        assert_eq!(s.columns.len(), 1);
        match &s.columns[0] {
            SelectColumn::Expr {
                expr: Expr::Column(c, _),
                ..
            } => assert_eq!(c.column, "TOP"),
            other => panic!("expected a column named TOP, got {other:?}"),
        }
    }

    #[test]
    fn limit_offset_populate_the_limit_clause() {
        let s = select_of(parse_one(
            "SELECT a FROM t LIMIT 10 OFFSET 20",
            Dialect::Postgresql,
        ));
        let limit = s.limit.expect("limit clause");
        assert!(matches!(
            limit.limit,
            Some(Expr::Literal(Literal::Integer(10), _))
        ));
        assert!(matches!(
            limit.offset,
            Some(Expr::Literal(Literal::Integer(20), _))
        ));
    }

    #[test]
    fn limit_under_sql_server_warns_but_parses() {
        let mut p = parser_for("SELECT a FROM t LIMIT 5", Dialect::SqlServer);
        let (stmts, errors, warnings) = p.parse_all();
        assert_eq!(stmts.len(), 1);
        assert!(errors.is_empty());
        assert!(warnings
            .iter()
            .any(|w| w.code == WarningCode::DialectMismatch));
    }

    #[test]
    fn joins_attach_to_tables_in_order() {
        let s = select_of(parse_one(
            "SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.id, c",
            Dialect::Postgresql,
        ));
        assert_eq!(s.from.len(), 3);
        assert!(s.from[0].join.is_none());
        let join = s.from[1].join.as_ref().expect("join spec");
        assert_eq!(join.kind, JoinKind::Left);
        assert!(join.on.is_some());
        let comma = s.from[2].join.as_ref().expect("comma join");
        assert_eq!(comma.kind, JoinKind::Cross);
        assert!(comma.on.is_none());
    }

    #[test]
    fn order_by_with_direction_and_nulls() {
        let s = select_of(parse_one(
            "SELECT a FROM t ORDER BY a DESC NULLS LAST, b",
            Dialect::Postgresql,
        ));
        assert_eq!(s.order_by.len(), 2);
        assert_eq!(s.order_by[0].direction, Some(SortDirection::Desc));
        assert_eq!(s.order_by[0].nulls, Some(NullsOrder::Last));
        assert_eq!(s.order_by[1].direction, None);
    }

    #[test]
    fn insert_with_columns_and_two_rows() {
        let stmt = parse_one(
            "INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y')",
            Dialect::Postgresql,
        );
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(ins.columns, vec!["a", "b"]);
        match ins.source {
            InsertSource::Values(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].len(), 2);
            }
            InsertSource::Select(_) => panic!("expected VALUES"),
        }
    }

    #[test]
    fn insert_from_select() {
        let stmt = parse_one(
            "INSERT INTO archive SELECT * FROM live WHERE done",
            Dialect::Postgresql,
        );
        let Statement::Insert(ins) = stmt else {
            panic!("expected INSERT");
        };
        assert!(matches!(ins.source, InsertSource::Select(_)));
    }

    #[test]
    fn update_with_assignments_and_where() {
        let stmt = parse_one(
            "UPDATE t SET a = 1, b = b + 1 WHERE id = 7",
            Dialect::Postgresql,
        );
        let Statement::Update(up) = stmt else {
            panic!("expected UPDATE");
        };
        assert_eq!(up.assignments.len(), 2);
        assert_eq!(up.assignments[0].column, "a");
        assert!(up.where_clause.is_some());
    }

    #[test]
    fn delete_without_where_keeps_none() {
        let stmt = parse_one("DELETE FROM t", Dialect::Postgresql);
        let Statement::Delete(del) = stmt else {
            panic!("expected DELETE");
        };
        assert_eq!(del.table.name, "t");
        assert!(del.where_clause.is_none());
    }

    #[test]
    fn create_table_with_constraints() {
        let stmt = parse_one(
            "CREATE TABLE IF NOT EXISTS t (\
               id INT PRIMARY KEY,\
               name VARCHAR(255) NOT NULL,\
               price DECIMAL(10, 2) DEFAULT 0,\
               CONSTRAINT uq_name UNIQUE (name),\
               FOREIGN KEY (id) REFERENCES other (oid)\
             )",
            Dialect::Postgresql,
        );
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert!(ct.if_not_exists);
        assert_eq!(ct.columns.len(), 3);
        assert_eq!(ct.columns[1].data_type.name, "VARCHAR");
        assert_eq!(ct.columns[1].data_type.arg1.as_deref(), Some("255"));
        assert_eq!(ct.columns[2].data_type.arg2.as_deref(), Some("2"));
        assert_eq!(ct.constraints.len(), 2);
        assert_eq!(ct.constraints[0].name.as_deref(), Some("uq_name"));
        assert!(matches!(
            ct.constraints[1].kind,
            TableConstraintKind::ForeignKey { .. }
        ));
    }

    #[test]
    fn identity_column_under_sql_server() {
        let stmt = parse_one(
            "CREATE TABLE t (id INT IDENTITY(1, 1) PRIMARY KEY)",
            Dialect::SqlServer,
        );
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert!(matches!(
            ct.columns[0].constraints[0].kind,
            ColumnConstraintKind::Identity {
                seed: Some(1),
                increment: Some(1),
            }
        ));
    }

    #[test]
    fn dialect_type_keywords_name_column_types() {
        let stmt = parse_one(
            "CREATE TABLE t (id SERIAL PRIMARY KEY, note TEXT)",
            Dialect::Postgresql,
        );
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(ct.columns[0].data_type.name, "SERIAL");
        assert_eq!(ct.columns[1].data_type.name, "TEXT");

        let stmt = parse_one("CREATE TABLE t (name NVARCHAR(255))", Dialect::SqlServer);
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(ct.columns[0].data_type.name, "NVARCHAR");
        assert_eq!(ct.columns[0].data_type.arg1.as_deref(), Some("255"));
    }

    #[test]
    fn bad_statement_recovers_at_semicolon() {
        let mut p = parser_for("SELEKT 1; SELECT 2;", Dialect::Postgresql);
        let (stmts, errors, _) = p.parse_all();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnexpectedToken);
        assert_eq!(errors[0].position.line, 1);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Statement::Select(_)));
    }

    #[test]
    fn error_positions_point_at_the_offending_token() {
        let mut p = parser_for("SELECT FROM t", Dialect::Postgresql);
        let (_, errors, _) = p.parse_all();
        assert!(!errors.is_empty());
        // `FROM` starts at column 8.
        assert_eq!(errors[0].position.column, 8);
    }

    #[test]
    fn missing_semicolon_between_statements_is_reported() {
        let mut p = parser_for("SELECT 1 SELECT 2", Dialect::Postgresql);
        let (stmts, errors, _) = p.parse_all();
        assert_eq!(stmts.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn bracket_quoted_table_name_under_sql_server() {
        let s = select_of(parse_one(
            "SELECT * FROM [Order Details]",
            Dialect::SqlServer,
        ));
        assert_eq!(s.from[0].name.name, "Order Details");
    }
}
