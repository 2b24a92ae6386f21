//! SQL Abstract Syntax Tree node types for sqlscope.
//!
//! This crate defines the complete AST type hierarchy shared by the
//! PostgreSQL and SQL Server front ends. Every statement parsed by
//! `sqlscope-parser` produces a tree of these nodes, and every node carries a
//! [`Span`] pointing back at the source text it was built from. Trees are
//! plain owned data: immutable after construction, never shared, never
//! cyclic. A new parse produces an entirely new tree.
//!
//! Tree traversal and rewriting live in [`walk`]; the indented debug
//! rendering lives in [`pretty`]; `Display` impls that render nodes back to
//! SQL text live in `display`.

mod display;
pub mod pretty;
pub mod walk;

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Position & Span — source location tracking
// ---------------------------------------------------------------------------

/// A point in the source text.
///
/// `line` and `column` are 1-based and exist for diagnostics; `offset` is the
/// 0-based byte offset and is authoritative for slicing. Positions produced
/// by the tokenizer are monotonically non-decreasing across a token stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number, 1-based.
    pub line: u32,
    /// Column number, 1-based.
    pub column: u32,
    /// Byte offset into the source, 0-based.
    pub offset: u32,
}

impl Position {
    /// The start of the source text.
    pub const START: Self = Self {
        line: 1,
        column: 1,
        offset: 0,
    };

    #[must_use]
    pub const fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.line, self.column, self.offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The half-open source range `[start, end)` a token or node covers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First position covered (inclusive).
    pub start: Position,
    /// One past the last position covered (exclusive).
    pub end: Position,
}

impl Span {
    /// A zero-length span at the origin, used as a placeholder.
    pub const ZERO: Self = Self {
        start: Position::START,
        end: Position::START,
    };

    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one that covers both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Whether `other` lies entirely within this span.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.offset - self.start.offset
    }

    /// Whether the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.offset == self.end.offset
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.offset, self.end.offset)
    }
}

// ---------------------------------------------------------------------------
// Top-level statement
// ---------------------------------------------------------------------------

/// A single parsed SQL statement.
///
/// This is the top-level AST node. The parser produces one `Statement` per
/// semicolon-delimited SQL command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateTable(CreateTableStatement),
}

impl Statement {
    /// The source span the whole statement covers.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Select(s) => s.span,
            Self::Insert(s) => s.span,
            Self::Update(s) => s.span,
            Self::Delete(s) => s.span,
            Self::CreateTable(s) => s.span,
        }
    }
}

// ---------------------------------------------------------------------------
// Qualified names
// ---------------------------------------------------------------------------

/// A possibly-qualified object name like `dbo.Customers` or just `Customers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Optional schema / namespace qualifier.
    pub qualifier: Option<String>,
    /// The object name.
    pub name: String,
}

impl QualifiedName {
    /// Create an unqualified name.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Create a qualified name.
    #[must_use]
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref q) = self.qualifier {
            write!(f, "{q}.{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

// ---------------------------------------------------------------------------
// Column references
// ---------------------------------------------------------------------------

/// A reference to a column, possibly qualified with a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table (or alias) qualifier.
    pub table: Option<String>,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Create an unqualified column reference.
    #[must_use]
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// Create a table-qualified column reference.
    #[must_use]
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// A literal value in SQL source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// String literal, quotes stripped and escapes resolved.
    String(String),
    /// Boolean literal (`TRUE` / `FALSE`, PostgreSQL).
    Boolean(bool),
    /// The keyword `NULL`.
    Null,
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Logical
    Or,
    And,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Additive
    Add,
    Subtract,
    Concat,

    // Multiplicative
    Multiply,
    Divide,
    Modulo,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Concat => "||",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        })
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Unary minus (`-expr`).
    Negate,
    /// Unary plus (`+expr`).
    Plus,
    /// Logical NOT (`NOT expr`).
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negate => "-",
            Self::Plus => "+",
            Self::Not => "NOT",
        })
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node.
///
/// Every variant carries a [`Span`]. Sub-expressions are boxed; the tree has
/// single ownership throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal constant.
    Literal(Literal, Span),

    /// A column reference (possibly table-qualified).
    Column(ColumnRef, Span),

    /// `left op right`.
    Binary {
        left: Box<Self>,
        op: BinaryOp,
        right: Box<Self>,
        span: Span,
    },

    /// `op expr`.
    Unary {
        op: UnaryOp,
        expr: Box<Self>,
        span: Span,
    },

    /// `expr [NOT] LIKE pattern`, or PostgreSQL `ILIKE` when
    /// `case_insensitive` is set.
    Like {
        expr: Box<Self>,
        pattern: Box<Self>,
        not: bool,
        case_insensitive: bool,
        span: Span,
    },

    /// `expr [NOT] BETWEEN low AND high`.
    Between {
        expr: Box<Self>,
        low: Box<Self>,
        high: Box<Self>,
        not: bool,
        span: Span,
    },

    /// `expr [NOT] IN (item, ...)`.
    InList {
        expr: Box<Self>,
        items: Vec<Self>,
        not: bool,
        span: Span,
    },

    /// `expr [NOT] IN (SELECT ...)`.
    InSelect {
        expr: Box<Self>,
        query: Box<SelectStatement>,
        not: bool,
        span: Span,
    },

    /// `expr IS [NOT] NULL`.
    IsNull {
        expr: Box<Self>,
        not: bool,
        span: Span,
    },

    /// `CASE [operand] WHEN ... THEN ... [ELSE ...] END`.
    Case {
        operand: Option<Box<Self>>,
        branches: Vec<CaseBranch>,
        else_expr: Option<Box<Self>>,
        span: Span,
    },

    /// `name(args)`, including `COUNT(*)`.
    FunctionCall {
        name: String,
        args: FunctionArgs,
        span: Span,
    },

    /// `CAST(expr AS type)` or PostgreSQL `expr::type`.
    Cast {
        expr: Box<Self>,
        data_type: DataType,
        span: Span,
    },

    /// `[NOT] EXISTS (SELECT ...)`.
    Exists {
        query: Box<SelectStatement>,
        not: bool,
        span: Span,
    },

    /// A scalar subquery `(SELECT ...)`.
    Subquery(Box<SelectStatement>, Span),
}

impl Expr {
    /// The source span this expression covers.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(_, span)
            | Self::Column(_, span)
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::Like { span, .. }
            | Self::Between { span, .. }
            | Self::InList { span, .. }
            | Self::InSelect { span, .. }
            | Self::IsNull { span, .. }
            | Self::Case { span, .. }
            | Self::FunctionCall { span, .. }
            | Self::Cast { span, .. }
            | Self::Exists { span, .. }
            | Self::Subquery(_, span) => *span,
        }
    }
}

/// One `WHEN condition THEN result` arm of a CASE expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBranch {
    pub when: Expr,
    pub then: Expr,
}

/// Arguments to a function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionArgs {
    /// `COUNT(*)`.
    Star,
    /// Ordinary argument list, possibly empty.
    List(Vec<Expr>),
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

/// A `SELECT` statement with all its clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    pub distinct: bool,
    /// The projection list. Never empty on a successfully parsed statement.
    pub columns: Vec<SelectColumn>,
    /// Tables in the FROM clause, in source order. Joined tables carry their
    /// join decoration; comma-separated tables are implicit cross joins.
    pub from: Vec<TableReference>,
    pub where_clause: Option<Box<Expr>>,
    pub group_by: Vec<Expr>,
    pub having: Option<Box<Expr>>,
    pub order_by: Vec<OrderingTerm>,
    /// `LIMIT`/`OFFSET`, with SQL Server `TOP n` normalized into the same
    /// fields.
    pub limit: Option<LimitClause>,
    pub span: Span,
}

/// One entry in a SELECT projection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectColumn {
    /// `*`.
    Star(Span),
    /// `table.*`.
    TableStar(String, Span),
    /// An expression, optionally aliased with `AS`.
    Expr {
        expr: Expr,
        alias: Option<String>,
        span: Span,
    },
}

impl SelectColumn {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Star(span) | Self::TableStar(_, span) | Self::Expr { span, .. } => *span,
        }
    }
}

/// A table named in a FROM clause.
///
/// The first table of a FROM clause has `join: None`; each subsequent table
/// records how it attaches to what precedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReference {
    pub name: QualifiedName,
    pub alias: Option<String>,
    pub join: Option<JoinSpec>,
    pub span: Span,
}

/// How a table joins onto the preceding FROM entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub kind: JoinKind,
    /// The `ON` condition, absent for CROSS and comma joins.
    pub on: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        })
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingTerm {
    pub expr: Expr,
    pub direction: Option<SortDirection>,
    pub nulls: Option<NullsOrder>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullsOrder {
    First,
    Last,
}

/// Row-count bounds: `LIMIT`/`OFFSET` or normalized `TOP`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitClause {
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

// ---------------------------------------------------------------------------
// INSERT / UPDATE / DELETE
// ---------------------------------------------------------------------------

/// An `INSERT` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    pub table: QualifiedName,
    /// Explicit column list, empty when omitted.
    pub columns: Vec<String>,
    pub source: InsertSource,
    pub span: Span,
}

/// Where inserted rows come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    /// `VALUES (...), (...)`.
    Values(Vec<Vec<Expr>>),
    /// `INSERT INTO ... SELECT ...`.
    Select(Box<SelectStatement>),
}

/// An `UPDATE` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    pub table: QualifiedName,
    pub alias: Option<String>,
    /// The SET clause, one assignment per target column.
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Box<Expr>>,
    pub span: Span,
}

/// One `column = expr` entry of a SET clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
    pub span: Span,
}

/// A `DELETE` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    pub table: QualifiedName,
    pub alias: Option<String>,
    pub where_clause: Option<Box<Expr>>,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// CREATE TABLE
// ---------------------------------------------------------------------------

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStatement {
    pub if_not_exists: bool,
    pub name: QualifiedName,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    pub span: Span,
}

/// One column definition: a name, exactly one data type, and zero or more
/// constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
    pub span: Span,
}

/// A column type as written in DDL (e.g. `NVARCHAR(255)`, `DECIMAL(10,2)`).
///
/// The front end does not interpret type names; they are carried through for
/// downstream analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    pub name: String,
    /// Optional first size parameter.
    pub arg1: Option<String>,
    /// Optional second size parameter.
    pub arg2: Option<String>,
    pub span: Span,
}

/// A constraint attached to a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConstraint {
    /// Optional `CONSTRAINT name` prefix.
    pub name: Option<String>,
    pub kind: ColumnConstraintKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnConstraintKind {
    PrimaryKey,
    NotNull,
    Null,
    Unique,
    Default(Expr),
    Check(Expr),
    References {
        table: QualifiedName,
        columns: Vec<String>,
    },
    /// SQL Server `IDENTITY[(seed, increment)]`.
    Identity {
        seed: Option<i64>,
        increment: Option<i64>,
    },
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstraint {
    /// Optional `CONSTRAINT name` prefix.
    pub name: Option<String>,
    pub kind: TableConstraintKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableConstraintKind {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    Check(Expr),
    ForeignKey {
        columns: Vec<String>,
        table: QualifiedName,
        ref_columns: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(offset: u32) -> Position {
        Position::new(1, offset + 1, offset)
    }

    fn span(start: u32, end: u32) -> Span {
        Span::new(pos(start), pos(end))
    }

    #[test]
    fn span_merge_covers_both() {
        let merged = span(3, 7).merge(span(10, 14));
        assert_eq!(merged.start.offset, 3);
        assert_eq!(merged.end.offset, 14);
        // Order-independent.
        assert_eq!(span(10, 14).merge(span(3, 7)), merged);
    }

    #[test]
    fn span_contains_is_inclusive_of_bounds() {
        let outer = span(2, 20);
        assert!(outer.contains(span(2, 20)));
        assert!(outer.contains(span(5, 9)));
        assert!(!outer.contains(span(0, 4)));
        assert!(!outer.contains(span(15, 25)));
    }

    #[test]
    fn expr_span_accessor_matches_variant_span() {
        let sp = span(4, 9);
        let e = Expr::Binary {
            left: Box::new(Expr::Literal(Literal::Integer(1), span(4, 5))),
            op: BinaryOp::Add,
            right: Box::new(Expr::Literal(Literal::Integer(2), span(8, 9))),
            span: sp,
        };
        assert_eq!(e.span(), sp);
        assert!(sp.contains(span(4, 5)));
        assert!(sp.contains(span(8, 9)));
    }

    #[test]
    fn qualified_name_display() {
        assert_eq!(QualifiedName::bare("users").to_string(), "users");
        assert_eq!(
            QualifiedName::qualified("dbo", "Customers").to_string(),
            "dbo.Customers"
        );
    }
}
