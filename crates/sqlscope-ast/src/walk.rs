//! Generic tree traversal, search, and rewriting over parsed statements.
//!
//! These utilities operate on any AST regardless of how it was built, so
//! downstream analysis (optimizer advice, compliance scanning, telemetry)
//! never needs to depend on parser internals. Traversal is depth-first
//! pre-order, children in source order, every node visited exactly once.
//! Nothing here mutates the input tree; [`transform`] consumes its input and
//! returns a new tree.

use crate::{
    Assignment, ColumnConstraint, ColumnConstraintKind, ColumnDef, ColumnRef, CreateTableStatement,
    DataType, DeleteStatement, Expr, FunctionArgs, InsertSource, InsertStatement, OrderingTerm,
    QualifiedName, SelectColumn, SelectStatement, Span, Statement, TableConstraint,
    TableConstraintKind, TableReference, UpdateStatement,
};

// ---------------------------------------------------------------------------
// Node references
// ---------------------------------------------------------------------------

/// A borrowed reference to any node in the tree.
///
/// `Copy` so visitor callbacks can keep the parent around freely.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Select(&'a SelectStatement),
    Insert(&'a InsertStatement),
    Update(&'a UpdateStatement),
    Delete(&'a DeleteStatement),
    CreateTable(&'a CreateTableStatement),
    SelectColumn(&'a SelectColumn),
    TableRef(&'a TableReference),
    Expr(&'a Expr),
    OrderBy(&'a OrderingTerm),
    Assignment(&'a Assignment),
    ColumnDef(&'a ColumnDef),
    DataType(&'a DataType),
    ColumnConstraint(&'a ColumnConstraint),
    TableConstraint(&'a TableConstraint),
}

/// Discriminant for [`Node`], used by [`find_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SelectStatement,
    InsertStatement,
    UpdateStatement,
    DeleteStatement,
    CreateTableStatement,
    SelectColumn,
    TableReference,
    Expression,
    OrderByClause,
    SetClause,
    ColumnDefinition,
    DataType,
    ColumnConstraint,
    TableConstraint,
}

impl<'a> Node<'a> {
    /// The kind discriminant of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Select(_) => NodeKind::SelectStatement,
            Self::Insert(_) => NodeKind::InsertStatement,
            Self::Update(_) => NodeKind::UpdateStatement,
            Self::Delete(_) => NodeKind::DeleteStatement,
            Self::CreateTable(_) => NodeKind::CreateTableStatement,
            Self::SelectColumn(_) => NodeKind::SelectColumn,
            Self::TableRef(_) => NodeKind::TableReference,
            Self::Expr(_) => NodeKind::Expression,
            Self::OrderBy(_) => NodeKind::OrderByClause,
            Self::Assignment(_) => NodeKind::SetClause,
            Self::ColumnDef(_) => NodeKind::ColumnDefinition,
            Self::DataType(_) => NodeKind::DataType,
            Self::ColumnConstraint(_) => NodeKind::ColumnConstraint,
            Self::TableConstraint(_) => NodeKind::TableConstraint,
        }
    }

    /// The source span this node covers.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Select(s) => s.span,
            Self::Insert(s) => s.span,
            Self::Update(s) => s.span,
            Self::Delete(s) => s.span,
            Self::CreateTable(s) => s.span,
            Self::SelectColumn(c) => c.span(),
            Self::TableRef(t) => t.span,
            Self::Expr(e) => e.span(),
            Self::OrderBy(o) => o.span,
            Self::Assignment(a) => a.span,
            Self::ColumnDef(c) => c.span,
            Self::DataType(d) => d.span,
            Self::ColumnConstraint(c) => c.span,
            Self::TableConstraint(c) => c.span,
        }
    }
}

// ---------------------------------------------------------------------------
// visit
// ---------------------------------------------------------------------------

/// Visit every node of `stmt` depth-first pre-order.
///
/// The callback receives each node and its immediate parent (`None` for the
/// root). Holds no state between calls; reading the tree never changes it.
pub fn visit<'a, F>(stmt: &'a Statement, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    match stmt {
        Statement::Select(s) => visit_select(s, None, f),
        Statement::Insert(s) => visit_insert(s, None, f),
        Statement::Update(s) => visit_update(s, None, f),
        Statement::Delete(s) => visit_delete(s, None, f),
        Statement::CreateTable(s) => visit_create_table(s, None, f),
    }
}

fn visit_select<'a, F>(s: &'a SelectStatement, parent: Option<Node<'a>>, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    let me = Node::Select(s);
    f(me, parent);
    for col in &s.columns {
        f(Node::SelectColumn(col), Some(me));
        if let SelectColumn::Expr { expr, .. } = col {
            visit_expr(expr, Some(Node::SelectColumn(col)), f);
        }
    }
    for table in &s.from {
        let tnode = Node::TableRef(table);
        f(tnode, Some(me));
        if let Some(join) = &table.join {
            if let Some(on) = &join.on {
                visit_expr(on, Some(tnode), f);
            }
        }
    }
    if let Some(w) = &s.where_clause {
        visit_expr(w, Some(me), f);
    }
    for g in &s.group_by {
        visit_expr(g, Some(me), f);
    }
    if let Some(h) = &s.having {
        visit_expr(h, Some(me), f);
    }
    for term in &s.order_by {
        let onode = Node::OrderBy(term);
        f(onode, Some(me));
        visit_expr(&term.expr, Some(onode), f);
    }
    if let Some(limit) = &s.limit {
        if let Some(n) = &limit.limit {
            visit_expr(n, Some(me), f);
        }
        if let Some(o) = &limit.offset {
            visit_expr(o, Some(me), f);
        }
    }
}

fn visit_insert<'a, F>(s: &'a InsertStatement, parent: Option<Node<'a>>, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    let me = Node::Insert(s);
    f(me, parent);
    match &s.source {
        InsertSource::Values(rows) => {
            for row in rows {
                for e in row {
                    visit_expr(e, Some(me), f);
                }
            }
        }
        InsertSource::Select(q) => visit_select(q, Some(me), f),
    }
}

fn visit_update<'a, F>(s: &'a UpdateStatement, parent: Option<Node<'a>>, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    let me = Node::Update(s);
    f(me, parent);
    for a in &s.assignments {
        let anode = Node::Assignment(a);
        f(anode, Some(me));
        visit_expr(&a.value, Some(anode), f);
    }
    if let Some(w) = &s.where_clause {
        visit_expr(w, Some(me), f);
    }
}

fn visit_delete<'a, F>(s: &'a DeleteStatement, parent: Option<Node<'a>>, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    let me = Node::Delete(s);
    f(me, parent);
    if let Some(w) = &s.where_clause {
        visit_expr(w, Some(me), f);
    }
}

fn visit_create_table<'a, F>(s: &'a CreateTableStatement, parent: Option<Node<'a>>, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    let me = Node::CreateTable(s);
    f(me, parent);
    for col in &s.columns {
        let cnode = Node::ColumnDef(col);
        f(cnode, Some(me));
        f(Node::DataType(&col.data_type), Some(cnode));
        for c in &col.constraints {
            let con = Node::ColumnConstraint(c);
            f(con, Some(cnode));
            match &c.kind {
                ColumnConstraintKind::Default(e) | ColumnConstraintKind::Check(e) => {
                    visit_expr(e, Some(con), f);
                }
                _ => {}
            }
        }
    }
    for c in &s.constraints {
        let con = Node::TableConstraint(c);
        f(con, Some(me));
        if let TableConstraintKind::Check(e) = &c.kind {
            visit_expr(e, Some(con), f);
        }
    }
}

fn visit_expr<'a, F>(expr: &'a Expr, parent: Option<Node<'a>>, f: &mut F)
where
    F: FnMut(Node<'a>, Option<Node<'a>>),
{
    let me = Node::Expr(expr);
    f(me, parent);
    match expr {
        Expr::Literal(..) | Expr::Column(..) => {}
        Expr::Binary { left, right, .. } => {
            visit_expr(left, Some(me), f);
            visit_expr(right, Some(me), f);
        }
        Expr::Unary { expr: inner, .. } | Expr::IsNull { expr: inner, .. } => {
            visit_expr(inner, Some(me), f);
        }
        Expr::Like {
            expr: inner,
            pattern,
            ..
        } => {
            visit_expr(inner, Some(me), f);
            visit_expr(pattern, Some(me), f);
        }
        Expr::Between {
            expr: inner,
            low,
            high,
            ..
        } => {
            visit_expr(inner, Some(me), f);
            visit_expr(low, Some(me), f);
            visit_expr(high, Some(me), f);
        }
        Expr::InList {
            expr: inner, items, ..
        } => {
            visit_expr(inner, Some(me), f);
            for item in items {
                visit_expr(item, Some(me), f);
            }
        }
        Expr::InSelect {
            expr: inner, query, ..
        } => {
            visit_expr(inner, Some(me), f);
            visit_select(query, Some(me), f);
        }
        Expr::Case {
            operand,
            branches,
            else_expr,
            ..
        } => {
            if let Some(op) = operand {
                visit_expr(op, Some(me), f);
            }
            for b in branches {
                visit_expr(&b.when, Some(me), f);
                visit_expr(&b.then, Some(me), f);
            }
            if let Some(el) = else_expr {
                visit_expr(el, Some(me), f);
            }
        }
        Expr::FunctionCall { args, .. } => match args {
            FunctionArgs::Star => {}
            FunctionArgs::List(items) => {
                for item in items {
                    visit_expr(item, Some(me), f);
                }
            }
        },
        Expr::Cast {
            expr: inner,
            data_type,
            ..
        } => {
            visit_expr(inner, Some(me), f);
            f(Node::DataType(data_type), Some(me));
        }
        Expr::Exists { query, .. } | Expr::Subquery(query, _) => {
            visit_select(query, Some(me), f);
        }
    }
}

// ---------------------------------------------------------------------------
// find_all & extraction
// ---------------------------------------------------------------------------

/// All nodes (root included) whose kind matches, in traversal order.
///
/// Returns an empty Vec when nothing matches, never an error.
#[must_use]
pub fn find_all<'a>(stmt: &'a Statement, kind: NodeKind) -> Vec<Node<'a>> {
    let mut found = Vec::new();
    visit(stmt, &mut |node, _| {
        if node.kind() == kind {
            found.push(node);
        }
    });
    found
}

/// All table names a statement touches: FROM-clause tables plus the target
/// of INSERT / UPDATE / DELETE / CREATE TABLE and REFERENCES clauses.
#[must_use]
pub fn extract_tables<'a>(stmt: &'a Statement) -> Vec<&'a QualifiedName> {
    let mut tables = Vec::new();
    visit(stmt, &mut |node, _| match node {
        Node::TableRef(t) => tables.push(&t.name),
        Node::Insert(s) => tables.push(&s.table),
        Node::Update(s) => tables.push(&s.table),
        Node::Delete(s) => tables.push(&s.table),
        Node::CreateTable(s) => tables.push(&s.name),
        Node::ColumnConstraint(c) => {
            if let ColumnConstraintKind::References { table, .. } = &c.kind {
                tables.push(table);
            }
        }
        Node::TableConstraint(c) => {
            if let TableConstraintKind::ForeignKey { table, .. } = &c.kind {
                tables.push(table);
            }
        }
        _ => {}
    });
    tables
}

/// All column references appearing in expressions, in traversal order.
#[must_use]
pub fn extract_columns<'a>(stmt: &'a Statement) -> Vec<&'a ColumnRef> {
    let mut columns = Vec::new();
    visit(stmt, &mut |node, _| {
        if let Node::Expr(Expr::Column(c, _)) = node {
            columns.push(c);
        }
    });
    columns
}

// ---------------------------------------------------------------------------
// transform
// ---------------------------------------------------------------------------

/// Rewrite an expression tree, purely functionally.
///
/// `f` is applied to the node first; the (possibly replaced) node's children
/// are then transformed recursively. The input is consumed, never mutated in
/// place, so the original tree (if cloned beforehand) is untouched.
#[must_use]
pub fn transform<F>(expr: Expr, f: &F) -> Expr
where
    F: Fn(Expr) -> Expr,
{
    match f(expr) {
        e @ (Expr::Literal(..) | Expr::Column(..)) => e,
        Expr::Binary {
            left,
            op,
            right,
            span,
        } => Expr::Binary {
            left: Box::new(transform(*left, f)),
            op,
            right: Box::new(transform(*right, f)),
            span,
        },
        Expr::Unary { op, expr, span } => Expr::Unary {
            op,
            expr: Box::new(transform(*expr, f)),
            span,
        },
        Expr::Like {
            expr,
            pattern,
            not,
            case_insensitive,
            span,
        } => Expr::Like {
            expr: Box::new(transform(*expr, f)),
            pattern: Box::new(transform(*pattern, f)),
            not,
            case_insensitive,
            span,
        },
        Expr::Between {
            expr,
            low,
            high,
            not,
            span,
        } => Expr::Between {
            expr: Box::new(transform(*expr, f)),
            low: Box::new(transform(*low, f)),
            high: Box::new(transform(*high, f)),
            not,
            span,
        },
        Expr::InList {
            expr,
            items,
            not,
            span,
        } => Expr::InList {
            expr: Box::new(transform(*expr, f)),
            items: items.into_iter().map(|e| transform(e, f)).collect(),
            not,
            span,
        },
        Expr::InSelect {
            expr,
            query,
            not,
            span,
        } => Expr::InSelect {
            expr: Box::new(transform(*expr, f)),
            query: Box::new(map_select(*query, f)),
            not,
            span,
        },
        Expr::IsNull { expr, not, span } => Expr::IsNull {
            expr: Box::new(transform(*expr, f)),
            not,
            span,
        },
        Expr::Case {
            operand,
            branches,
            else_expr,
            span,
        } => Expr::Case {
            operand: operand.map(|e| Box::new(transform(*e, f))),
            branches: branches
                .into_iter()
                .map(|b| crate::CaseBranch {
                    when: transform(b.when, f),
                    then: transform(b.then, f),
                })
                .collect(),
            else_expr: else_expr.map(|e| Box::new(transform(*e, f))),
            span,
        },
        Expr::FunctionCall { name, args, span } => Expr::FunctionCall {
            name,
            args: match args {
                FunctionArgs::Star => FunctionArgs::Star,
                FunctionArgs::List(items) => {
                    FunctionArgs::List(items.into_iter().map(|e| transform(e, f)).collect())
                }
            },
            span,
        },
        Expr::Cast {
            expr,
            data_type,
            span,
        } => Expr::Cast {
            expr: Box::new(transform(*expr, f)),
            data_type,
            span,
        },
        Expr::Exists { query, not, span } => Expr::Exists {
            query: Box::new(map_select(*query, f)),
            not,
            span,
        },
        Expr::Subquery(query, span) => Expr::Subquery(Box::new(map_select(*query, f)), span),
    }
}

/// Apply an expression rewrite across every expression embedded in a
/// statement, returning the rebuilt statement.
#[must_use]
pub fn map_exprs<F>(stmt: Statement, f: &F) -> Statement
where
    F: Fn(Expr) -> Expr,
{
    match stmt {
        Statement::Select(s) => Statement::Select(map_select(s, f)),
        Statement::Insert(s) => Statement::Insert(InsertStatement {
            source: match s.source {
                InsertSource::Values(rows) => InsertSource::Values(
                    rows.into_iter()
                        .map(|row| row.into_iter().map(|e| transform(e, f)).collect())
                        .collect(),
                ),
                InsertSource::Select(q) => InsertSource::Select(Box::new(map_select(*q, f))),
            },
            ..s
        }),
        Statement::Update(s) => Statement::Update(UpdateStatement {
            assignments: s
                .assignments
                .into_iter()
                .map(|a| Assignment {
                    value: transform(a.value, f),
                    ..a
                })
                .collect(),
            where_clause: s.where_clause.map(|w| Box::new(transform(*w, f))),
            ..s
        }),
        Statement::Delete(s) => Statement::Delete(DeleteStatement {
            where_clause: s.where_clause.map(|w| Box::new(transform(*w, f))),
            ..s
        }),
        Statement::CreateTable(s) => Statement::CreateTable(CreateTableStatement {
            columns: s
                .columns
                .into_iter()
                .map(|c| ColumnDef {
                    constraints: c
                        .constraints
                        .into_iter()
                        .map(|con| ColumnConstraint {
                            kind: match con.kind {
                                ColumnConstraintKind::Default(e) => {
                                    ColumnConstraintKind::Default(transform(e, f))
                                }
                                ColumnConstraintKind::Check(e) => {
                                    ColumnConstraintKind::Check(transform(e, f))
                                }
                                other => other,
                            },
                            ..con
                        })
                        .collect(),
                    ..c
                })
                .collect(),
            constraints: s
                .constraints
                .into_iter()
                .map(|con| TableConstraint {
                    kind: match con.kind {
                        TableConstraintKind::Check(e) => {
                            TableConstraintKind::Check(transform(e, f))
                        }
                        other => other,
                    },
                    ..con
                })
                .collect(),
            ..s
        }),
    }
}

fn map_select<F>(s: SelectStatement, f: &F) -> SelectStatement
where
    F: Fn(Expr) -> Expr,
{
    SelectStatement {
        columns: s
            .columns
            .into_iter()
            .map(|c| match c {
                SelectColumn::Expr { expr, alias, span } => SelectColumn::Expr {
                    expr: transform(expr, f),
                    alias,
                    span,
                },
                other => other,
            })
            .collect(),
        from: s
            .from
            .into_iter()
            .map(|mut t| {
                if let Some(join) = t.join.take() {
                    t.join = Some(crate::JoinSpec {
                        kind: join.kind,
                        on: join.on.map(|e| transform(e, f)),
                    });
                }
                t
            })
            .collect(),
        where_clause: s.where_clause.map(|w| Box::new(transform(*w, f))),
        group_by: s.group_by.into_iter().map(|e| transform(e, f)).collect(),
        having: s.having.map(|h| Box::new(transform(*h, f))),
        order_by: s
            .order_by
            .into_iter()
            .map(|t| OrderingTerm {
                expr: transform(t.expr, f),
                ..t
            })
            .collect(),
        limit: s.limit.map(|l| crate::LimitClause {
            limit: l.limit.map(|e| transform(e, f)),
            offset: l.offset.map(|e| transform(e, f)),
        }),
        ..s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, Literal};

    fn sp() -> Span {
        Span::ZERO
    }

    fn col(name: &str) -> Expr {
        Expr::Column(ColumnRef::bare(name), sp())
    }

    fn int(n: i64) -> Expr {
        Expr::Literal(Literal::Integer(n), sp())
    }

    fn simple_select() -> Statement {
        Statement::Select(SelectStatement {
            distinct: false,
            columns: vec![
                SelectColumn::Expr {
                    expr: col("id"),
                    alias: None,
                    span: sp(),
                },
                SelectColumn::Expr {
                    expr: col("name"),
                    alias: None,
                    span: sp(),
                },
            ],
            from: vec![TableReference {
                name: QualifiedName::bare("Customers"),
                alias: None,
                join: None,
                span: sp(),
            }],
            where_clause: Some(Box::new(Expr::Binary {
                left: Box::new(col("id")),
                op: BinaryOp::Eq,
                right: Box::new(int(1)),
                span: sp(),
            })),
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            span: sp(),
        })
    }

    #[test]
    fn visit_passes_immediate_parent() {
        let stmt = simple_select();
        let mut saw_root = false;
        let mut child_parents = 0;
        visit(&stmt, &mut |node, parent| match parent {
            None => {
                assert!(matches!(node, Node::Select(_)));
                saw_root = true;
            }
            Some(_) => child_parents += 1,
        });
        assert!(saw_root);
        // cols(2) + their exprs(2) + table(1) + where(3 exprs)
        assert_eq!(child_parents, 8);
    }

    #[test]
    fn find_all_returns_matches_in_traversal_order() {
        let stmt = simple_select();
        let exprs = find_all(&stmt, NodeKind::Expression);
        assert_eq!(exprs.len(), 5);
        let none = find_all(&stmt, NodeKind::TableConstraint);
        assert!(none.is_empty());
    }

    #[test]
    fn extract_tables_and_columns() {
        let stmt = simple_select();
        let tables = extract_tables(&stmt);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Customers");

        let columns = extract_columns(&stmt);
        let names: Vec<_> = columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "id"]);
    }

    #[test]
    fn transform_rewrites_leaves_without_touching_input_shape() {
        let e = Expr::Binary {
            left: Box::new(int(1)),
            op: BinaryOp::Add,
            right: Box::new(int(2)),
            span: sp(),
        };
        let doubled = transform(e, &|node| match node {
            Expr::Literal(Literal::Integer(n), s) => Expr::Literal(Literal::Integer(n * 2), s),
            other => other,
        });
        match doubled {
            Expr::Binary { left, right, .. } => {
                assert_eq!(*left, int(2));
                assert_eq!(*right, int(4));
            }
            other => unreachable!("expected binary expr, got {other:?}"),
        }
    }

    #[test]
    fn transform_descends_into_subqueries() {
        let inner = SelectStatement {
            distinct: false,
            columns: vec![SelectColumn::Expr {
                expr: col("y"),
                alias: None,
                span: sp(),
            }],
            from: vec![TableReference {
                name: QualifiedName::bare("u"),
                alias: None,
                join: None,
                span: sp(),
            }],
            where_clause: Some(Box::new(Expr::Binary {
                left: Box::new(col("z")),
                op: BinaryOp::Eq,
                right: Box::new(int(3)),
                span: sp(),
            })),
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            span: sp(),
        };
        let e = Expr::InSelect {
            expr: Box::new(col("x")),
            query: Box::new(inner),
            not: false,
            span: sp(),
        };
        let rewritten = transform(e, &|node| match node {
            Expr::Literal(Literal::Integer(3), s) => Expr::Literal(Literal::Integer(99), s),
            other => other,
        });
        let Expr::InSelect { query, .. } = rewritten else {
            unreachable!("expected IN subquery");
        };
        let w = query.where_clause.expect("subquery where clause");
        match *w {
            Expr::Binary { right, .. } => assert_eq!(*right, int(99)),
            other => unreachable!("expected binary where, got {other:?}"),
        }
    }

    #[test]
    fn map_exprs_reaches_create_table_constraint_expressions() {
        let stmt = Statement::CreateTable(CreateTableStatement {
            if_not_exists: false,
            name: QualifiedName::bare("t"),
            columns: vec![ColumnDef {
                name: "a".to_owned(),
                data_type: DataType {
                    name: "INT".to_owned(),
                    arg1: None,
                    arg2: None,
                    span: sp(),
                },
                constraints: vec![ColumnConstraint {
                    name: None,
                    kind: ColumnConstraintKind::Default(int(3)),
                    span: sp(),
                }],
                span: sp(),
            }],
            constraints: vec![TableConstraint {
                name: None,
                kind: TableConstraintKind::Check(Expr::Binary {
                    left: Box::new(col("a")),
                    op: BinaryOp::Gt,
                    right: Box::new(int(3)),
                    span: sp(),
                }),
                span: sp(),
            }],
            span: sp(),
        });
        let rewritten = map_exprs(stmt, &|node| match node {
            Expr::Literal(Literal::Integer(3), s) => Expr::Literal(Literal::Integer(99), s),
            other => other,
        });
        let Statement::CreateTable(s) = rewritten else {
            unreachable!("expected create table");
        };
        assert_eq!(
            s.columns[0].constraints[0].kind,
            ColumnConstraintKind::Default(int(99))
        );
        match &s.constraints[0].kind {
            TableConstraintKind::Check(Expr::Binary { right, .. }) => {
                assert_eq!(**right, int(99));
            }
            other => unreachable!("expected check constraint, got {other:?}"),
        }
    }

    #[test]
    fn map_exprs_reaches_where_clause() {
        let stmt = simple_select();
        let rewritten = map_exprs(stmt, &|node| match node {
            Expr::Literal(Literal::Integer(_), s) => Expr::Literal(Literal::Integer(42), s),
            other => other,
        });
        let Statement::Select(s) = rewritten else {
            unreachable!("expected select");
        };
        let w = s.where_clause.expect("where clause");
        match *w {
            Expr::Binary { right, .. } => assert_eq!(*right, int(42)),
            other => unreachable!("expected binary where, got {other:?}"),
        }
    }
}
