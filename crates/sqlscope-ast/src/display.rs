//! SQL text rendering via `fmt::Display` for AST nodes.
//!
//! Every major AST type implements `Display` to reconstruct valid SQL text.
//! The output is normalized (uppercase keywords, single spaces) rather than a
//! byte-faithful copy of the source; use the token stream for that.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Returns true if the name needs quoting (contains special chars).
fn needs_quoting(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let first = name.as_bytes()[0];
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return true;
    }
    name.bytes()
        .any(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if needs_quoting(name) {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    } else {
        f.write_str(name)
    }
}

/// Write an expression, wrapping in parentheses if it is a binary or unary
/// op, so precedence survives a parse → display → re-parse round trip.
fn write_paren_if_compound(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if matches!(expr, Expr::Binary { .. } | Expr::Unary { .. }) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

// ---------------------------------------------------------------------------
// Literal / ColumnRef / DataType
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(v) => {
                // Ensure the float always has a decimal point.
                if v.fract() == 0.0 && !v.is_infinite() && !v.is_nan() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref t) = self.table {
            write_ident(f, t)?;
            f.write_str(".")?;
        }
        write_ident(f, &self.column)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (&self.arg1, &self.arg2) {
            (Some(a1), Some(a2)) => write!(f, "({a1}, {a2})"),
            (Some(a1), None) => write!(f, "({a1})"),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Expr
// ---------------------------------------------------------------------------

impl fmt::Display for Expr {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit, _) => write!(f, "{lit}"),
            Self::Column(col, _) => write!(f, "{col}"),
            Self::Binary {
                left, op, right, ..
            } => {
                write_paren_if_compound(f, left)?;
                write!(f, " {op} ")?;
                write_paren_if_compound(f, right)
            }
            Self::Unary { op, expr, .. } => {
                if matches!(op, UnaryOp::Not) {
                    f.write_str("NOT ")?;
                } else {
                    write!(f, "{op}")?;
                }
                write_paren_if_compound(f, expr)
            }
            Self::Like {
                expr,
                pattern,
                not,
                case_insensitive,
                ..
            } => {
                write_paren_if_compound(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                f.write_str(if *case_insensitive { " ILIKE " } else { " LIKE " })?;
                write_paren_if_compound(f, pattern)
            }
            Self::Between {
                expr,
                low,
                high,
                not,
                ..
            } => {
                write_paren_if_compound(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                f.write_str(" BETWEEN ")?;
                write_paren_if_compound(f, low)?;
                f.write_str(" AND ")?;
                write_paren_if_compound(f, high)
            }
            Self::InList {
                expr, items, not, ..
            } => {
                write_paren_if_compound(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                f.write_str(" IN (")?;
                comma_list(f, items)?;
                f.write_str(")")
            }
            Self::InSelect {
                expr, query, not, ..
            } => {
                write_paren_if_compound(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                write!(f, " IN ({query})")
            }
            Self::IsNull { expr, not, .. } => {
                write_paren_if_compound(f, expr)?;
                f.write_str(if *not { " IS NOT NULL" } else { " IS NULL" })
            }
            Self::Case {
                operand,
                branches,
                else_expr,
                ..
            } => {
                f.write_str("CASE")?;
                if let Some(op) = operand {
                    write!(f, " {op}")?;
                }
                for branch in branches {
                    write!(f, " WHEN {} THEN {}", branch.when, branch.then)?;
                }
                if let Some(el) = else_expr {
                    write!(f, " ELSE {el}")?;
                }
                f.write_str(" END")
            }
            Self::FunctionCall { name, args, .. } => {
                write_ident(f, name)?;
                f.write_str("(")?;
                match args {
                    FunctionArgs::Star => f.write_str("*")?,
                    FunctionArgs::List(items) => comma_list(f, items)?,
                }
                f.write_str(")")
            }
            Self::Cast {
                expr, data_type, ..
            } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Exists { query, not, .. } => {
                if *not {
                    f.write_str("NOT ")?;
                }
                write!(f, "EXISTS ({query})")
            }
            Self::Subquery(q, _) => write!(f, "({q})"),
        }
    }
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star(_) => f.write_str("*"),
            Self::TableStar(t, _) => {
                write_ident(f, t)?;
                f.write_str(".*")
            }
            Self::Expr { expr, alias, .. } => {
                write!(f, "{expr}")?;
                if let Some(a) = alias {
                    f.write_str(" AS ")?;
                    write_ident(f, a)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref a) = self.alias {
            f.write_str(" AS ")?;
            write_ident(f, a)?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            Some(SortDirection::Asc) => f.write_str(" ASC")?,
            Some(SortDirection::Desc) => f.write_str(" DESC")?,
            None => {}
        }
        match self.nulls {
            Some(NullsOrder::First) => f.write_str(" NULLS FIRST")?,
            Some(NullsOrder::Last) => f.write_str(" NULLS LAST")?,
            None => {}
        }
        Ok(())
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        comma_list(f, &self.columns)?;
        if !self.from.is_empty() {
            f.write_str(" FROM ")?;
            for (i, table) in self.from.iter().enumerate() {
                match &table.join {
                    None if i == 0 => {}
                    None | Some(JoinSpec {
                        kind: JoinKind::Cross,
                        on: None,
                    }) if i > 0 => f.write_str(", ")?,
                    Some(join) => write!(f, " {} ", join.kind)?,
                    _ => {}
                }
                write!(f, "{table}")?;
                if let Some(JoinSpec { on: Some(cond), .. }) = &table.join {
                    write!(f, " ON {cond}")?;
                }
            }
        }
        if let Some(ref w) = self.where_clause {
            write!(f, " WHERE {w}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            comma_list(f, &self.group_by)?;
        }
        if let Some(ref h) = self.having {
            write!(f, " HAVING {h}")?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            comma_list(f, &self.order_by)?;
        }
        if let Some(ref l) = self.limit {
            if let Some(ref n) = l.limit {
                write!(f, " LIMIT {n}")?;
            }
            if let Some(ref o) = l.offset {
                write!(f, " OFFSET {o}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// INSERT / UPDATE / DELETE
// ---------------------------------------------------------------------------

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            f.write_str(" (")?;
            for (i, c) in self.columns.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_ident(f, c)?;
            }
            f.write_str(")")?;
        }
        match &self.source {
            InsertSource::Values(rows) => {
                f.write_str(" VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    comma_list(f, row)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            InsertSource::Select(q) => write!(f, " {q}"),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, &self.column)?;
        write!(f, " = {}", self.value)
    }
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {}", self.table)?;
        if let Some(ref a) = self.alias {
            f.write_str(" AS ")?;
            write_ident(f, a)?;
        }
        f.write_str(" SET ")?;
        comma_list(f, &self.assignments)?;
        if let Some(ref w) = self.where_clause {
            write!(f, " WHERE {w}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(ref a) = self.alias {
            f.write_str(" AS ")?;
            write_ident(f, a)?;
        }
        if let Some(ref w) = self.where_clause {
            write!(f, " WHERE {w}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CREATE TABLE
// ---------------------------------------------------------------------------

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref n) = self.name {
            f.write_str("CONSTRAINT ")?;
            write_ident(f, n)?;
            f.write_str(" ")?;
        }
        match &self.kind {
            ColumnConstraintKind::PrimaryKey => f.write_str("PRIMARY KEY"),
            ColumnConstraintKind::NotNull => f.write_str("NOT NULL"),
            ColumnConstraintKind::Null => f.write_str("NULL"),
            ColumnConstraintKind::Unique => f.write_str("UNIQUE"),
            ColumnConstraintKind::Default(e) => write!(f, "DEFAULT {e}"),
            ColumnConstraintKind::Check(e) => write!(f, "CHECK ({e})"),
            ColumnConstraintKind::References { table, columns } => {
                write!(f, "REFERENCES {table}")?;
                if !columns.is_empty() {
                    f.write_str(" (")?;
                    for (i, c) in columns.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write_ident(f, c)?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
            ColumnConstraintKind::Identity { seed, increment } => {
                f.write_str("IDENTITY")?;
                if let (Some(s), Some(i)) = (seed, increment) {
                    write!(f, "({s}, {i})")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, &self.name)?;
        write!(f, " {}", self.data_type)?;
        for c in &self.constraints {
            write!(f, " {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref n) = self.name {
            f.write_str("CONSTRAINT ")?;
            write_ident(f, n)?;
            f.write_str(" ")?;
        }
        fn name_list(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
            f.write_str("(")?;
            for (i, n) in names.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_ident(f, n)?;
            }
            f.write_str(")")
        }
        match &self.kind {
            TableConstraintKind::PrimaryKey(cols) => {
                f.write_str("PRIMARY KEY ")?;
                name_list(f, cols)
            }
            TableConstraintKind::Unique(cols) => {
                f.write_str("UNIQUE ")?;
                name_list(f, cols)
            }
            TableConstraintKind::Check(e) => write!(f, "CHECK ({e})"),
            TableConstraintKind::ForeignKey {
                columns,
                table,
                ref_columns,
            } => {
                f.write_str("FOREIGN KEY ")?;
                name_list(f, columns)?;
                write!(f, " REFERENCES {table}")?;
                if !ref_columns.is_empty() {
                    f.write_str(" ")?;
                    name_list(f, ref_columns)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE TABLE ")?;
        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }
        write!(f, "{} (", self.name)?;
        let mut first = true;
        for c in &self.columns {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{c}")?;
        }
        for c in &self.constraints {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(s) => write!(f, "{s}"),
            Self::Update(s) => write!(f, "{s}"),
            Self::Delete(s) => write!(f, "{s}"),
            Self::CreateTable(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn sp() -> Span {
        Span::ZERO
    }

    fn col(name: &str) -> Expr {
        Expr::Column(ColumnRef::bare(name), sp())
    }

    fn int(n: i64) -> Expr {
        Expr::Literal(Literal::Integer(n), sp())
    }

    #[test]
    fn binary_expr_renders_with_parens() {
        let e = Expr::Binary {
            left: Box::new(Expr::Binary {
                left: Box::new(col("a")),
                op: BinaryOp::Add,
                right: Box::new(int(1)),
                span: sp(),
            }),
            op: BinaryOp::Gt,
            right: Box::new(int(10)),
            span: sp(),
        };
        assert_eq!(e.to_string(), "(a + 1) > 10");
    }

    #[test]
    fn string_literal_escapes_embedded_quote() {
        let e = Expr::Literal(Literal::String("it's".into()), sp());
        assert_eq!(e.to_string(), "'it''s'");
    }

    #[test]
    fn select_statement_renders_all_clauses() {
        let stmt = SelectStatement {
            distinct: false,
            columns: vec![
                SelectColumn::Expr {
                    expr: col("id"),
                    alias: None,
                    span: sp(),
                },
                SelectColumn::Expr {
                    expr: col("name"),
                    alias: Some("n".into()),
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
            order_by: vec![OrderingTerm {
                expr: col("name"),
                direction: Some(SortDirection::Desc),
                nulls: Some(NullsOrder::Last),
                span: sp(),
            }],
            limit: Some(LimitClause {
                limit: Some(int(10)),
                offset: None,
            }),
            span: sp(),
        };
        assert_eq!(
            stmt.to_string(),
            "SELECT id, name AS n FROM Customers WHERE id = 1 \
             ORDER BY name DESC NULLS LAST LIMIT 10"
        );
    }

    #[test]
    fn case_expression_renders_both_forms() {
        let e = Expr::Case {
            operand: None,
            branches: vec![CaseBranch {
                when: Expr::IsNull {
                    expr: Box::new(col("x")),
                    not: false,
                    span: sp(),
                },
                then: int(0),
            }],
            else_expr: Some(Box::new(int(1))),
            span: sp(),
        };
        assert_eq!(e.to_string(), "CASE WHEN x IS NULL THEN 0 ELSE 1 END");
    }
}
