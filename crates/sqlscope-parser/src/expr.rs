//! Pratt expression parser.
//!
//! Precedence table, lowest to highest:
//!   OR
//!   AND  (also `&&`)
//!   NOT (prefix)
//!   = != <> < <= > >= LIKE ILIKE IN IS BETWEEN
//!   + - ||
//!   * / %
//!   - + (unary prefix)
//!   :: (postfix cast)

use sqlscope_ast::{
    BinaryOp, CaseBranch, ColumnRef, Expr, FunctionArgs, Literal, UnaryOp,
};

use crate::lexer::unquote;
use crate::parser::{ErrorCode, ParseError, Parser, WarningCode};
use crate::token::{Token, TokenKind};
use crate::Dialect;

// Binding powers: higher = tighter binding.
// Left BP is checked against min_bp; right BP is passed to recursive call.
mod bp {
    // Infix: (left, right)
    pub const OR: (u8, u8) = (1, 2);
    pub const AND: (u8, u8) = (3, 4);
    // Prefix NOT right BP:
    pub const NOT_PREFIX: u8 = 5;
    // Comparison / pattern / membership:
    pub const COMPARISON: (u8, u8) = (7, 8);
    // Addition / subtraction / concatenation:
    pub const ADD: (u8, u8) = (9, 10);
    // Multiplication / division / modulo:
    pub const MUL: (u8, u8) = (11, 12);
    // Unary prefix (- +) right BP:
    pub const UNARY: u8 = 13;
    // Postfix `::` cast left BP:
    pub const CAST: u8 = 15;
}

impl Parser {
    /// Parse a single SQL expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    // ── Pratt core ──────────────────────────────────────────────────────

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            // Postfix: `::` cast
            if self.check(&TokenKind::DoubleColon) {
                if bp::CAST < min_bp {
                    break;
                }
                lhs = self.parse_cast_postfix(lhs)?;
                continue;
            }

            // Infix: binary operators, IS, LIKE, BETWEEN, IN
            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                lhs = self.parse_infix(lhs, r_bp)?;
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    // ── Prefix (nud) ────────────────────────────────────────────────────

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let tok = self.bump();
        match &tok.kind {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::Number => self.number_literal(&tok),
            TokenKind::Str { .. } => Ok(Expr::Literal(
                Literal::String(unquote(&tok.text)),
                tok.span,
            )),
            TokenKind::KwNull => Ok(Expr::Literal(Literal::Null, tok.span)),
            TokenKind::KwTrue => Ok(Expr::Literal(Literal::Boolean(true), tok.span)),
            TokenKind::KwFalse => Ok(Expr::Literal(Literal::Boolean(false), tok.span)),

            // ── Unary prefix: - + ───────────────────────────────────────
            TokenKind::Minus => {
                let inner = self.parse_expr_bp(bp::UNARY)?;
                let span = tok.span.merge(inner.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Negate,
                    expr: Box::new(inner),
                    span,
                })
            }
            TokenKind::Plus => {
                let inner = self.parse_expr_bp(bp::UNARY)?;
                let span = tok.span.merge(inner.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Plus,
                    expr: Box::new(inner),
                    span,
                })
            }

            // ── Prefix NOT ──────────────────────────────────────────────
            TokenKind::KwNot => {
                // NOT EXISTS (subquery)
                if self.check(&TokenKind::KwExists) {
                    self.advance();
                    return self.parse_exists(tok.span, true);
                }
                let inner = self.parse_expr_bp(bp::NOT_PREFIX)?;
                let span = tok.span.merge(inner.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(inner),
                    span,
                })
            }

            // ── EXISTS (subquery) ───────────────────────────────────────
            TokenKind::KwExists => self.parse_exists(tok.span, false),

            // ── CAST(expr AS type) ──────────────────────────────────────
            TokenKind::KwCast => {
                self.expect(&TokenKind::LeftParen, "`(` after CAST")?;
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::KwAs, "AS in CAST")?;
                let data_type = self.parse_data_type()?;
                let end = self.expect(&TokenKind::RightParen, "`)` after CAST")?;
                Ok(Expr::Cast {
                    expr: Box::new(inner),
                    data_type,
                    span: tok.span.merge(end),
                })
            }

            // ── CASE [operand] WHEN ... THEN ... [ELSE ...] END ─────────
            TokenKind::KwCase => self.parse_case(tok.span),

            // ── Parenthesized expr / scalar subquery ────────────────────
            TokenKind::LeftParen => {
                if self.check(&TokenKind::KwSelect) {
                    let query = self.parse_select()?;
                    let end = self.expect(&TokenKind::RightParen, "`)` after subquery")?;
                    return Ok(Expr::Subquery(Box::new(query), tok.span.merge(end)));
                }
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RightParen, "`)`")?;
                Ok(inner)
            }

            // ── Identifier: column ref or function call ─────────────────
            TokenKind::Ident => {
                let name = tok.text.clone();
                self.parse_ident_expr(name, &tok)
            }
            TokenKind::QuotedIdent => {
                let name = unquote(&tok.text);
                self.parse_ident_expr(name, &tok)
            }

            _ => Err(ParseError {
                message: format!("expected an expression, found {:?}", tok.text),
                position: tok.span.start,
                code: ErrorCode::ExpectedExpression,
            }),
        }
    }

    /// Parse `name`, `name.column`, or `name(args)`.
    fn parse_ident_expr(&mut self, name: String, tok: &Token) -> Result<Expr, ParseError> {
        // Function call: name(...)
        if self.check(&TokenKind::LeftParen) {
            return self.parse_function_call(name, tok);
        }
        // Table-qualified column: name.column
        if self.check(&TokenKind::Dot) {
            self.advance();
            let (column, col_span) = self.parse_ident("a column name after `.`")?;
            let span = tok.span.merge(col_span);
            return Ok(Expr::Column(ColumnRef::qualified(name, column), span));
        }
        Ok(Expr::Column(ColumnRef::bare(name), tok.span))
    }

    fn parse_function_call(&mut self, name: String, tok: &Token) -> Result<Expr, ParseError> {
        self.advance(); // `(`
        let args = if self.check(&TokenKind::Star) {
            self.advance();
            FunctionArgs::Star
        } else if self.check(&TokenKind::RightParen) {
            FunctionArgs::List(Vec::new())
        } else {
            let mut items = vec![self.parse_expr()?];
            while self.eat(&TokenKind::Comma) {
                items.push(self.parse_expr()?);
            }
            FunctionArgs::List(items)
        };
        let end = self.expect(&TokenKind::RightParen, "`)` after function arguments")?;
        Ok(Expr::FunctionCall {
            name,
            args,
            span: tok.span.merge(end),
        })
    }

    fn parse_exists(&mut self, start: sqlscope_ast::Span, not: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(` after EXISTS")?;
        let query = self.parse_select()?;
        let end = self.expect(&TokenKind::RightParen, "`)` after EXISTS subquery")?;
        Ok(Expr::Exists {
            query: Box::new(query),
            not,
            span: start.merge(end),
        })
    }

    fn parse_case(&mut self, start: sqlscope_ast::Span) -> Result<Expr, ParseError> {
        let operand = if self.check(&TokenKind::KwWhen) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut branches = Vec::new();
        while self.eat(&TokenKind::KwWhen) {
            let when = self.parse_expr()?;
            self.expect(&TokenKind::KwThen, "THEN after WHEN")?;
            let then = self.parse_expr()?;
            branches.push(CaseBranch { when, then });
        }
        if branches.is_empty() {
            return Err(self.err_expected("at least one WHEN branch"));
        }
        let else_expr = if self.eat(&TokenKind::KwElse) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let end = self.expect(&TokenKind::KwEnd, "END to close CASE")?;
        Ok(Expr::Case {
            operand,
            branches,
            else_expr,
            span: start.merge(end),
        })
    }

    // ── Postfix ─────────────────────────────────────────────────────────

    fn parse_cast_postfix(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        if self.dialect == Dialect::SqlServer {
            self.warn(
                WarningCode::DialectMismatch,
                "`::` casts are PostgreSQL syntax; T-SQL uses CAST(expr AS type)",
            );
        }
        self.advance(); // `::`
        let data_type = self.parse_data_type()?;
        let span = lhs.span().merge(data_type.span);
        Ok(Expr::Cast {
            expr: Box::new(lhs),
            data_type,
            span,
        })
    }

    // ── Infix ───────────────────────────────────────────────────────────

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.peek() {
            TokenKind::KwOr => Some(bp::OR),
            TokenKind::KwAnd | TokenKind::AndAnd => Some(bp::AND),

            TokenKind::Eq
            | TokenKind::Ne
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge
            | TokenKind::KwIs
            | TokenKind::KwLike
            | TokenKind::KwIlike
            | TokenKind::KwBetween
            | TokenKind::KwIn => Some(bp::COMPARISON),

            // NOT LIKE / NOT ILIKE / NOT BETWEEN / NOT IN
            TokenKind::KwNot => match self.peek_nth(1) {
                TokenKind::KwLike
                | TokenKind::KwIlike
                | TokenKind::KwBetween
                | TokenKind::KwIn => Some(bp::COMPARISON),
                _ => None,
            },

            TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => Some(bp::ADD),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(bp::MUL),

            _ => None,
        }
    }

    fn parse_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr, ParseError> {
        let tok = self.bump();
        match &tok.kind {
            // ── Simple binary operators ─────────────────────────────────
            TokenKind::KwOr => self.make_binop(lhs, BinaryOp::Or, r_bp),
            TokenKind::KwAnd | TokenKind::AndAnd => self.make_binop(lhs, BinaryOp::And, r_bp),
            TokenKind::Eq => self.make_binop(lhs, BinaryOp::Eq, r_bp),
            TokenKind::Ne => self.make_binop(lhs, BinaryOp::Ne, r_bp),
            TokenKind::Lt => self.make_binop(lhs, BinaryOp::Lt, r_bp),
            TokenKind::Le => self.make_binop(lhs, BinaryOp::Le, r_bp),
            TokenKind::Gt => self.make_binop(lhs, BinaryOp::Gt, r_bp),
            TokenKind::Ge => self.make_binop(lhs, BinaryOp::Ge, r_bp),
            TokenKind::Plus => self.make_binop(lhs, BinaryOp::Add, r_bp),
            TokenKind::Minus => self.make_binop(lhs, BinaryOp::Subtract, r_bp),
            TokenKind::Concat => self.make_binop(lhs, BinaryOp::Concat, r_bp),
            TokenKind::Star => self.make_binop(lhs, BinaryOp::Multiply, r_bp),
            TokenKind::Slash => self.make_binop(lhs, BinaryOp::Divide, r_bp),
            TokenKind::Percent => self.make_binop(lhs, BinaryOp::Modulo, r_bp),

            // ── expr IS [NOT] NULL ──────────────────────────────────────
            TokenKind::KwIs => {
                let not = self.eat(&TokenKind::KwNot);
                let end = self.expect(&TokenKind::KwNull, "NULL after IS")?;
                let span = lhs.span().merge(end);
                Ok(Expr::IsNull {
                    expr: Box::new(lhs),
                    not,
                    span,
                })
            }

            // ── LIKE / ILIKE / BETWEEN / IN ─────────────────────────────
            TokenKind::KwLike => self.parse_like(lhs, false, false),
            TokenKind::KwIlike => self.parse_like(lhs, false, true),
            TokenKind::KwBetween => self.parse_between(lhs, false),
            TokenKind::KwIn => self.parse_in(lhs, false),

            // ── NOT LIKE / ILIKE / BETWEEN / IN ─────────────────────────
            TokenKind::KwNot => {
                let next = self.bump();
                match &next.kind {
                    TokenKind::KwLike => self.parse_like(lhs, true, false),
                    TokenKind::KwIlike => self.parse_like(lhs, true, true),
                    TokenKind::KwBetween => self.parse_between(lhs, true),
                    TokenKind::KwIn => self.parse_in(lhs, true),
                    _ => Err(ParseError {
                        message: format!(
                            "expected LIKE, ILIKE, BETWEEN, or IN after NOT, found {:?}",
                            next.text
                        ),
                        position: next.span.start,
                        code: ErrorCode::UnexpectedToken,
                    }),
                }
            }

            _ => Err(ParseError {
                message: format!("unexpected operator {:?}", tok.text),
                position: tok.span.start,
                code: ErrorCode::UnexpectedToken,
            }),
        }
    }

    fn make_binop(&mut self, lhs: Expr, op: BinaryOp, r_bp: u8) -> Result<Expr, ParseError> {
        let rhs = self.parse_expr_bp(r_bp)?;
        let span = lhs.span().merge(rhs.span());
        Ok(Expr::Binary {
            left: Box::new(lhs),
            op,
            right: Box::new(rhs),
            span,
        })
    }

    // ── Special expression forms ────────────────────────────────────────

    fn parse_like(
        &mut self,
        lhs: Expr,
        not: bool,
        case_insensitive: bool,
    ) -> Result<Expr, ParseError> {
        let pattern = self.parse_expr_bp(bp::COMPARISON.1)?;
        let span = lhs.span().merge(pattern.span());
        Ok(Expr::Like {
            expr: Box::new(lhs),
            pattern: Box::new(pattern),
            not,
            case_insensitive,
            span,
        })
    }

    fn parse_between(&mut self, lhs: Expr, not: bool) -> Result<Expr, ParseError> {
        // Parse the low bound above AND level so the AND keyword between the
        // bounds is not consumed as a conjunction.
        let low = self.parse_expr_bp(bp::NOT_PREFIX)?;
        self.expect(&TokenKind::KwAnd, "AND between BETWEEN bounds")?;
        let high = self.parse_expr_bp(bp::NOT_PREFIX)?;
        let span = lhs.span().merge(high.span());
        Ok(Expr::Between {
            expr: Box::new(lhs),
            low: Box::new(low),
            high: Box::new(high),
            not,
            span,
        })
    }

    fn parse_in(&mut self, lhs: Expr, not: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(` after IN")?;

        if self.check(&TokenKind::KwSelect) {
            let query = self.parse_select()?;
            let end = self.expect(&TokenKind::RightParen, "`)` after IN subquery")?;
            let span = lhs.span().merge(end);
            return Ok(Expr::InSelect {
                expr: Box::new(lhs),
                query: Box::new(query),
                not,
                span,
            });
        }

        let mut items = vec![self.parse_expr()?];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_expr()?);
        }
        let end = self.expect(&TokenKind::RightParen, "`)` after IN list")?;
        let span = lhs.span().merge(end);
        Ok(Expr::InList {
            expr: Box::new(lhs),
            items,
            not,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lexer, TokenizeOptions};

    fn expr(sql: &str) -> Expr {
        expr_in(sql, Dialect::Postgresql).0
    }

    fn expr_in(sql: &str, dialect: Dialect) -> (Expr, Parser) {
        let tokens: Vec<Token> = Lexer::tokenize(sql, &TokenizeOptions::new(dialect))
            .into_iter()
            .filter(|t| !t.is_trivia())
            .collect();
        let mut p = Parser::new(tokens, dialect);
        let e = p.parse_expr().expect("expression should parse");
        (e, p)
    }

    fn binop(e: &Expr) -> (&Expr, BinaryOp, &Expr) {
        match e {
            Expr::Binary {
                left, op, right, ..
            } => (left, *op, right),
            other => panic!("expected binary expr, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let e = expr("1 + 2 * 3");
        let (left, op, right) = binop(&e);
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(left, Expr::Literal(Literal::Integer(1), _)));
        let (_, inner_op, _) = binop(right);
        assert_eq!(inner_op, BinaryOp::Multiply);
    }

    #[test]
    fn integer_and_float_literals_mix_in_one_expression() {
        let e = expr("1 + 2.5");
        let (left, op, right) = binop(&e);
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(left, Expr::Literal(Literal::Integer(1), _)));
        match right {
            Expr::Literal(Literal::Float(v), _) => assert!((v - 2.5).abs() < f64::EPSILON),
            other => panic!("expected a float literal, got {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let e = expr("a OR b AND c");
        let (_, op, right) = binop(&e);
        assert_eq!(op, BinaryOp::Or);
        let (_, inner_op, _) = binop(right);
        assert_eq!(inner_op, BinaryOp::And);
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        // NOT (a = b), not (NOT a) = b
        let e = expr("NOT a = b");
        match e {
            Expr::Unary {
                op: UnaryOp::Not,
                expr: inner,
                ..
            } => {
                let (_, op, _) = binop(&inner);
                assert_eq!(op, BinaryOp::Eq);
            }
            other => panic!("expected NOT at the root, got {other:?}"),
        }
    }

    #[test]
    fn concat_sits_at_additive_level() {
        let e = expr("a || b || c");
        // Left-associative: (a || b) || c
        let (left, op, _) = binop(&e);
        assert_eq!(op, BinaryOp::Concat);
        let (_, inner_op, _) = binop(left);
        assert_eq!(inner_op, BinaryOp::Concat);
    }

    #[test]
    fn unary_minus_binds_tighter_than_multiplication() {
        let e = expr("-a * b");
        let (left, op, _) = binop(&e);
        assert_eq!(op, BinaryOp::Multiply);
        assert!(matches!(
            left,
            Expr::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn parentheses_override_precedence() {
        let e = expr("(1 + 2) * 3");
        let (left, op, _) = binop(&e);
        assert_eq!(op, BinaryOp::Multiply);
        let (_, inner_op, _) = binop(left);
        assert_eq!(inner_op, BinaryOp::Add);
    }

    #[test]
    fn like_and_not_like() {
        assert!(matches!(
            expr("name LIKE 'a%'"),
            Expr::Like {
                not: false,
                case_insensitive: false,
                ..
            }
        ));
        assert!(matches!(
            expr("name NOT LIKE 'a%'"),
            Expr::Like { not: true, .. }
        ));
        assert!(matches!(
            expr("name ILIKE 'a%'"),
            Expr::Like {
                case_insensitive: true,
                ..
            }
        ));
    }

    #[test]
    fn between_keeps_its_and_separate() {
        let e = expr("x BETWEEN 1 AND 10 AND y");
        // The outer AND conjoins the BETWEEN with y.
        let (left, op, _) = binop(&e);
        assert_eq!(op, BinaryOp::And);
        assert!(matches!(left, Expr::Between { not: false, .. }));
    }

    #[test]
    fn in_list_and_in_subquery() {
        match expr("x IN (1, 2, 3)") {
            Expr::InList { items, not, .. } => {
                assert_eq!(items.len(), 3);
                assert!(!not);
            }
            other => panic!("expected IN list, got {other:?}"),
        }
        assert!(matches!(
            expr("x NOT IN (SELECT id FROM t)"),
            Expr::InSelect { not: true, .. }
        ));
    }

    #[test]
    fn is_null_and_is_not_null() {
        assert!(matches!(expr("x IS NULL"), Expr::IsNull { not: false, .. }));
        assert!(matches!(
            expr("x IS NOT NULL"),
            Expr::IsNull { not: true, .. }
        ));
    }

    #[test]
    fn case_with_and_without_operand() {
        match expr("CASE x WHEN 1 THEN 'a' ELSE 'b' END") {
            Expr::Case {
                operand, branches, ..
            } => {
                assert!(operand.is_some());
                assert_eq!(branches.len(), 1);
            }
            other => panic!("expected CASE, got {other:?}"),
        }
        match expr("CASE WHEN x > 0 THEN 1 WHEN x < 0 THEN -1 END") {
            Expr::Case {
                operand,
                branches,
                else_expr,
                ..
            } => {
                assert!(operand.is_none());
                assert_eq!(branches.len(), 2);
                assert!(else_expr.is_none());
            }
            other => panic!("expected CASE, got {other:?}"),
        }
    }

    #[test]
    fn function_calls_including_count_star() {
        match expr("COUNT(*)") {
            Expr::FunctionCall { name, args, .. } => {
                assert_eq!(name, "COUNT");
                assert_eq!(args, FunctionArgs::Star);
            }
            other => panic!("expected function call, got {other:?}"),
        }
        match expr("coalesce(a, b, 0)") {
            Expr::FunctionCall { name, args, .. } => {
                assert_eq!(name, "coalesce");
                assert!(matches!(args, FunctionArgs::List(items) if items.len() == 3));
            }
            other => panic!("expected function call, got {other:?}"),
        }
    }

    #[test]
    fn cast_call_and_double_colon_agree() {
        let call = expr("CAST(x AS INT)");
        let colon = expr("x::INT");
        match (&call, &colon) {
            (
                Expr::Cast { data_type: a, .. },
                Expr::Cast { data_type: b, .. },
            ) => assert_eq!(a.name, b.name),
            other => panic!("expected two casts, got {other:?}"),
        }
    }

    #[test]
    fn double_colon_under_sql_server_warns() {
        let (_, p) = expr_in("x::INT", Dialect::SqlServer);
        assert!(p
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::DialectMismatch));
    }

    #[test]
    fn exists_and_not_exists() {
        assert!(matches!(
            expr("EXISTS (SELECT 1 FROM t)"),
            Expr::Exists { not: false, .. }
        ));
        assert!(matches!(
            expr("NOT EXISTS (SELECT 1 FROM t)"),
            Expr::Exists { not: true, .. }
        ));
    }

    #[test]
    fn qualified_columns_and_string_escapes() {
        match expr("t.name") {
            Expr::Column(c, _) => {
                assert_eq!(c.table.as_deref(), Some("t"));
                assert_eq!(c.column, "name");
            }
            other => panic!("expected column, got {other:?}"),
        }
        assert!(matches!(
            expr("'it''s'"),
            Expr::Literal(Literal::String(s), _) if s == "it's"
        ));
    }

    #[test]
    fn spans_nest_inside_parent_expressions() {
        let e = expr("a + b * c");
        let (left, _, right) = binop(&e);
        assert!(e.span().contains(left.span()));
        assert!(e.span().contains(right.span()));
    }
}
