//! Human-readable tree rendering of parsed statements.
//!
//! Meant for debugging output and golden tests, not for round-tripping SQL;
//! use the `Display` impls for that. Each node prints on its own line with
//! its children indented one level deeper, so nesting depth is visible at a
//! glance.

use std::fmt::Write as _;

use crate::{
    ColumnConstraintKind, CreateTableStatement, DeleteStatement, Expr, FunctionArgs, InsertSource,
    InsertStatement, SelectColumn, SelectStatement, Statement, TableConstraintKind,
    UpdateStatement,
};

/// Render `stmt` as an indented tree, `indent` spaces per nesting level.
#[must_use]
pub fn pretty_print(stmt: &Statement, indent: usize) -> String {
    let mut p = Printer {
        out: String::new(),
        indent,
        depth: 0,
    };
    p.statement(stmt);
    p.out
}

struct Printer {
    out: String,
    indent: usize,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth * self.indent {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.line(header);
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Select(s) => self.select(s),
            Statement::Insert(s) => self.insert(s),
            Statement::Update(s) => self.update(s),
            Statement::Delete(s) => self.delete(s),
            Statement::CreateTable(s) => self.create_table(s),
        }
    }

    fn select(&mut self, s: &SelectStatement) {
        let header = if s.distinct {
            format!("SelectStatement (distinct) @{:?}", s.span)
        } else {
            format!("SelectStatement @{:?}", s.span)
        };
        self.nested(&header, |p| {
            for col in &s.columns {
                match col {
                    SelectColumn::Star(_) => p.line("column: *"),
                    SelectColumn::TableStar(table, _) => {
                        let text = format!("column: {table}.*");
                        p.line(&text);
                    }
                    SelectColumn::Expr { expr, alias, .. } => {
                        let header = match alias {
                            Some(a) => format!("column (as {a}):"),
                            None => "column:".to_owned(),
                        };
                        p.nested(&header, |p| p.expr(expr));
                    }
                }
            }
            for table in &s.from {
                let mut header = format!("from: {}", table.name);
                if let Some(alias) = &table.alias {
                    let _ = write!(header, " as {alias}");
                }
                if let Some(join) = &table.join {
                    let _ = write!(header, " ({} join)", join.kind);
                    if let Some(on) = &join.on {
                        p.nested(&header, |p| {
                            p.nested("on:", |p| p.expr(on));
                        });
                        continue;
                    }
                }
                p.line(&header);
            }
            if let Some(w) = &s.where_clause {
                p.nested("where:", |p| p.expr(w));
            }
            if !s.group_by.is_empty() {
                p.nested("group by:", |p| {
                    for g in &s.group_by {
                        p.expr(g);
                    }
                });
            }
            if let Some(h) = &s.having {
                p.nested("having:", |p| p.expr(h));
            }
            for term in &s.order_by {
                let mut header = "order by".to_owned();
                if let Some(dir) = term.direction {
                    let _ = write!(header, " {dir:?}");
                }
                if let Some(nulls) = term.nulls {
                    let _ = write!(header, " nulls {nulls:?}");
                }
                header.push(':');
                p.nested(&header, |p| p.expr(&term.expr));
            }
            if let Some(limit) = &s.limit {
                if let Some(n) = &limit.limit {
                    p.nested("limit:", |p| p.expr(n));
                }
                if let Some(o) = &limit.offset {
                    p.nested("offset:", |p| p.expr(o));
                }
            }
        });
    }

    fn insert(&mut self, s: &InsertStatement) {
        let header = format!("InsertStatement into {} @{:?}", s.table, s.span);
        self.nested(&header, |p| {
            if !s.columns.is_empty() {
                let cols = format!("columns: {}", s.columns.join(", "));
                p.line(&cols);
            }
            match &s.source {
                InsertSource::Values(rows) => {
                    for row in rows {
                        p.nested("row:", |p| {
                            for e in row {
                                p.expr(e);
                            }
                        });
                    }
                }
                InsertSource::Select(q) => p.select(q),
            }
        });
    }

    fn update(&mut self, s: &UpdateStatement) {
        let header = format!("UpdateStatement {} @{:?}", s.table, s.span);
        self.nested(&header, |p| {
            for a in &s.assignments {
                let header = format!("set {} =", a.column);
                p.nested(&header, |p| p.expr(&a.value));
            }
            if let Some(w) = &s.where_clause {
                p.nested("where:", |p| p.expr(w));
            }
        });
    }

    fn delete(&mut self, s: &DeleteStatement) {
        let header = format!("DeleteStatement from {} @{:?}", s.table, s.span);
        self.nested(&header, |p| {
            if let Some(w) = &s.where_clause {
                p.nested("where:", |p| p.expr(w));
            }
        });
    }

    fn create_table(&mut self, s: &CreateTableStatement) {
        let header = format!("CreateTableStatement {} @{:?}", s.name, s.span);
        self.nested(&header, |p| {
            for col in &s.columns {
                let header = format!("column {} {}", col.name, col.data_type);
                p.nested(&header, |p| {
                    for c in &col.constraints {
                        match &c.kind {
                            ColumnConstraintKind::Default(e) => {
                                p.nested("default:", |p| p.expr(e));
                            }
                            ColumnConstraintKind::Check(e) => {
                                p.nested("check:", |p| p.expr(e));
                            }
                            other => {
                                let text = format!("constraint: {other:?}");
                                p.line(&text);
                            }
                        }
                    }
                });
            }
            for c in &s.constraints {
                if let TableConstraintKind::Check(e) = &c.kind {
                    p.nested("check:", |p| p.expr(e));
                } else {
                    let text = format!("constraint: {:?}", c.kind);
                    p.line(&text);
                }
            }
        });
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit, _) => {
                let text = format!("Literal {lit}");
                self.line(&text);
            }
            Expr::Column(col, _) => {
                let text = format!("Column {col}");
                self.line(&text);
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                let header = format!("Binary {op}");
                self.nested(&header, |p| {
                    p.expr(left);
                    p.expr(right);
                });
            }
            Expr::Unary { op, expr, .. } => {
                let header = format!("Unary {op}");
                self.nested(&header, |p| p.expr(expr));
            }
            Expr::Like {
                expr,
                pattern,
                not,
                case_insensitive,
                ..
            } => {
                let verb = if *case_insensitive { "Ilike" } else { "Like" };
                let header = if *not {
                    format!("Not{verb}")
                } else {
                    verb.to_owned()
                };
                self.nested(&header, |p| {
                    p.expr(expr);
                    p.expr(pattern);
                });
            }
            Expr::Between {
                expr,
                low,
                high,
                not,
                ..
            } => {
                let header = if *not { "NotBetween" } else { "Between" };
                self.nested(header, |p| {
                    p.expr(expr);
                    p.expr(low);
                    p.expr(high);
                });
            }
            Expr::InList {
                expr, items, not, ..
            } => {
                let header = if *not { "NotIn" } else { "In" };
                self.nested(header, |p| {
                    p.expr(expr);
                    for item in items {
                        p.expr(item);
                    }
                });
            }
            Expr::InSelect {
                expr, query, not, ..
            } => {
                let header = if *not { "NotInSelect" } else { "InSelect" };
                self.nested(header, |p| {
                    p.expr(expr);
                    p.select(query);
                });
            }
            Expr::IsNull { expr, not, .. } => {
                let header = if *not { "IsNotNull" } else { "IsNull" };
                self.nested(header, |p| p.expr(expr));
            }
            Expr::Case {
                operand,
                branches,
                else_expr,
                ..
            } => {
                self.nested("Case", |p| {
                    if let Some(op) = operand {
                        p.nested("operand:", |p| p.expr(op));
                    }
                    for b in branches {
                        p.nested("when:", |p| p.expr(&b.when));
                        p.nested("then:", |p| p.expr(&b.then));
                    }
                    if let Some(el) = else_expr {
                        p.nested("else:", |p| p.expr(el));
                    }
                });
            }
            Expr::FunctionCall { name, args, .. } => {
                let header = format!("FunctionCall {name}");
                self.nested(&header, |p| match args {
                    FunctionArgs::Star => p.line("*"),
                    FunctionArgs::List(items) => {
                        for item in items {
                            p.expr(item);
                        }
                    }
                });
            }
            Expr::Cast {
                expr, data_type, ..
            } => {
                let header = format!("Cast to {data_type}");
                self.nested(&header, |p| p.expr(expr));
            }
            Expr::Exists { query, not, .. } => {
                let header = if *not { "NotExists" } else { "Exists" };
                self.nested(header, |p| p.select(query));
            }
            Expr::Subquery(query, _) => {
                self.nested("Subquery", |p| p.select(query));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, ColumnRef, Literal, QualifiedName, Span, TableReference};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_select_as_indented_tree() {
        let stmt = Statement::Select(SelectStatement {
            distinct: false,
            columns: vec![SelectColumn::Expr {
                expr: Expr::Column(ColumnRef::bare("id"), Span::ZERO),
                alias: None,
                span: Span::ZERO,
            }],
            from: vec![TableReference {
                name: QualifiedName::bare("t"),
                alias: None,
                join: None,
                span: Span::ZERO,
            }],
            where_clause: Some(Box::new(Expr::Binary {
                left: Box::new(Expr::Column(ColumnRef::bare("id"), Span::ZERO)),
                op: BinaryOp::Eq,
                right: Box::new(Expr::Literal(Literal::Integer(1), Span::ZERO)),
                span: Span::ZERO,
            })),
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            span: Span::ZERO,
        });

        let text = pretty_print(&stmt, 2);
        let expected = "\
SelectStatement @0..0
  column:
    Column id
  from: t
  where:
    Binary =
      Column id
      Literal 1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn indent_width_is_configurable() {
        let stmt = Statement::Select(SelectStatement {
            distinct: false,
            columns: vec![SelectColumn::Star(Span::ZERO)],
            from: vec![],
            where_clause: None,
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            span: Span::ZERO,
        });
        let text = pretty_print(&stmt, 4);
        assert!(text.contains("\n    column: *\n"));
    }
}
