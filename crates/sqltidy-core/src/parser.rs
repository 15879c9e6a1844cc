//! Tolerant recursive-descent parser for single `SELECT` statements,
//! optionally headed by a `WITH` block.
//!
//! The parser works over the lossless token stream from
//! [`crate::tokenize`], skipping trivia through a precomputed index of
//! significant tokens. It checks structural well-formedness only; nothing
//! resolves names or types. Spans on the produced nodes are byte offsets
//! into the tokenized text.

use crate::ast::*;
use crate::error::{ParseError, Position};
use crate::tokens::{Token, TokenKind};
use crate::violation::Span;

/// Parse a token stream into one statement.
///
/// Trailing semicolons are consumed; any other trailing token is an error.
pub fn parse(tokens: &[Token]) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(tokens);
    let stmt = parser.parse_statement()?;
    parser.finish()?;
    Ok(stmt)
}

struct Parser<'a> {
    tokens: &'a [Token],
    /// Indices of significant (non-trivia) tokens.
    sig: Vec<usize>,
    /// Cursor into `sig`.
    pos: usize,
    /// End offset of the last consumed significant token.
    last_end: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let sig = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            sig,
            pos: 0,
            last_end: 0,
        }
    }

    // -- cursor helpers --

    fn cur(&self) -> Option<&'a Token> {
        self.sig.get(self.pos).map(|&i| &self.tokens[i])
    }

    fn nth(&self, n: usize) -> Option<&'a Token> {
        self.sig.get(self.pos + n).map(|&i| &self.tokens[i])
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.cur();
        if let Some(t) = tok {
            self.last_end = t.end;
            self.pos += 1;
        }
        tok
    }

    fn cur_start(&self) -> usize {
        self.cur().map(|t| t.start).unwrap_or(self.last_end)
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.cur().is_some_and(|t| t.matches_keyword(kw))
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.cur().is_some_and(|t| t.kind == kind)
    }

    fn at_operator(&self, op: &str) -> bool {
        self.cur().is_some_and(|t| t.matches_operator(op))
    }

    fn eat_keyword(&mut self, kw: &str) -> Option<Span> {
        if self.at_keyword(kw) {
            let t = self.bump().expect("token present");
            Some(Span::new(t.start, t.end))
        } else {
            None
        }
    }

    fn eat_kind(&mut self, kind: TokenKind) -> Option<&'a Token> {
        if self.at_kind(kind) {
            self.bump()
        } else {
            None
        }
    }

    fn eat_operator(&mut self, op: &str) -> Option<Span> {
        if self.at_operator(op) {
            let t = self.bump().expect("token present");
            Some(Span::new(t.start, t.end))
        } else {
            None
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<Span, ParseError> {
        self.eat_keyword(kw)
            .ok_or_else(|| self.err(format!("keyword {kw}")))
    }

    fn expect_kind(&mut self, kind: TokenKind, expected: &str) -> Result<&'a Token, ParseError> {
        self.eat_kind(kind).ok_or_else(|| self.err(expected))
    }

    fn err(&self, expected: impl Into<String>) -> ParseError {
        let (found, position) = match self.cur() {
            Some(t) => (format!("'{}'", t.text), t.position()),
            None => ("end of statement".to_string(), self.end_position()),
        };
        ParseError::new(expected, found, position)
    }

    fn end_position(&self) -> Position {
        match self.tokens.last() {
            None => Position::new(0, 1, 1),
            Some(t) => {
                let mut line = t.line;
                let mut column = t.column;
                for b in t.text.bytes() {
                    if b == b'\n' {
                        line += 1;
                        column = 1;
                    } else if b & 0xC0 != 0x80 {
                        column += 1;
                    }
                }
                Position::new(t.end, line, column)
            }
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end)
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        while self.at_kind(TokenKind::Semicolon) {
            self.bump();
        }
        if self.cur().is_some() {
            return Err(self.err("end of statement"));
        }
        Ok(())
    }

    // -- statements --

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        if self.at_keyword("WITH") {
            self.parse_cte_block().map(Statement::With)
        } else {
            self.parse_select_chain().map(Statement::Select)
        }
    }

    fn parse_cte_block(&mut self) -> Result<CteBlock, ParseError> {
        let start = self.cur_start();
        let with_span = self.expect_keyword("WITH")?;
        let recursive = self.eat_keyword("RECURSIVE").is_some();
        let mut ctes = vec![self.parse_cte()?];
        while self.eat_kind(TokenKind::Comma).is_some() {
            ctes.push(self.parse_cte()?);
        }
        let body = self.parse_select_chain()?;
        Ok(CteBlock {
            span: self.span_from(start),
            with_span,
            recursive,
            ctes,
            body,
        })
    }

    fn parse_cte(&mut self) -> Result<Cte, ParseError> {
        let start = self.cur_start();
        let name = self.expect_ident("CTE name")?;
        let mut columns = Vec::new();
        if !self.at_keyword("AS") && self.at_kind(TokenKind::LParen) {
            self.bump();
            columns.push(self.expect_ident("column name")?);
            while self.eat_kind(TokenKind::Comma).is_some() {
                columns.push(self.expect_ident("column name")?);
            }
            self.expect_kind(TokenKind::RParen, "')'")?;
        }
        let as_span = self.expect_keyword("AS")?;
        self.expect_kind(TokenKind::LParen, "'('")?;
        let query = self.parse_select_chain()?;
        self.expect_kind(TokenKind::RParen, "')'")?;
        Ok(Cte {
            span: self.span_from(start),
            name,
            columns,
            as_span,
            query,
        })
    }

    /// A select plus any trailing `UNION` / `INTERSECT` / `EXCEPT` arms.
    fn parse_select_chain(&mut self) -> Result<SelectStatement, ParseError> {
        let start = self.cur_start();
        let mut select = self.parse_select_core()?;
        loop {
            let (operator, keyword_span) = if let Some(kw) = self.eat_keyword("UNION") {
                if let Some(all) = self.eat_keyword("ALL") {
                    (SetOperator::UnionAll, Span::new(kw.start, all.end))
                } else {
                    (SetOperator::Union, kw)
                }
            } else if let Some(kw) = self.eat_keyword("INTERSECT") {
                (SetOperator::Intersect, kw)
            } else if let Some(kw) = self.eat_keyword("EXCEPT") {
                (SetOperator::Except, kw)
            } else {
                break;
            };
            let query = self.parse_select_core()?;
            select.set_ops.push(SetOperation {
                span: Span::new(keyword_span.start, self.last_end),
                operator,
                keyword_span,
                query,
            });
        }
        select.span = self.span_from(start);
        Ok(select)
    }

    fn parse_select_core(&mut self) -> Result<SelectStatement, ParseError> {
        let start = self.cur_start();
        let select_span = self.expect_keyword("SELECT")?;
        let distinct = if self.eat_keyword("DISTINCT").is_some() {
            true
        } else {
            self.eat_keyword("ALL");
            false
        };

        let mut items = vec![self.parse_select_item()?];
        while self.eat_kind(TokenKind::Comma).is_some() {
            items.push(self.parse_select_item()?);
        }

        let from = if self.at_keyword("FROM") {
            Some(self.parse_from()?)
        } else {
            None
        };
        let where_clause = if let Some(keyword_span) = self.eat_keyword("WHERE") {
            let condition = self.parse_expr()?;
            Some(WhereClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                condition,
            })
        } else {
            None
        };
        let group_by = if let Some(group) = self.eat_keyword("GROUP") {
            let by = self.expect_keyword("BY")?;
            let keyword_span = Span::new(group.start, by.end);
            let mut group_items = vec![self.parse_expr()?];
            while self.eat_kind(TokenKind::Comma).is_some() {
                group_items.push(self.parse_expr()?);
            }
            Some(GroupByClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                items: group_items,
            })
        } else {
            None
        };
        let having = if let Some(keyword_span) = self.eat_keyword("HAVING") {
            let condition = self.parse_expr()?;
            Some(HavingClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                condition,
            })
        } else {
            None
        };
        let order_by = if let Some(order) = self.eat_keyword("ORDER") {
            let by = self.expect_keyword("BY")?;
            let keyword_span = Span::new(order.start, by.end);
            let mut order_items = vec![self.parse_order_item()?];
            while self.eat_kind(TokenKind::Comma).is_some() {
                order_items.push(self.parse_order_item()?);
            }
            Some(OrderByClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                items: order_items,
            })
        } else {
            None
        };
        let limit = if let Some(keyword_span) = self.eat_keyword("LIMIT") {
            let count = self.parse_expr()?;
            let offset = if let Some(off_span) = self.eat_keyword("OFFSET") {
                let value = self.parse_expr()?;
                Some(OffsetClause {
                    span: Span::new(off_span.start, self.last_end),
                    keyword_span: off_span,
                    value,
                })
            } else {
                None
            };
            Some(LimitClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                count,
                offset,
            })
        } else {
            None
        };

        Ok(SelectStatement {
            span: self.span_from(start),
            select_span,
            distinct,
            items,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            set_ops: Vec::new(),
        })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        let start = self.cur_start();
        if let Some(star) = self.eat_operator("*") {
            return Ok(SelectItem {
                span: star,
                expr: Expression::Wildcard {
                    span: star,
                    qualifier: None,
                },
                alias: None,
            });
        }
        let expr = self.parse_expr()?;
        let alias = self.parse_alias_opt()?;
        Ok(SelectItem {
            span: self.span_from(start),
            expr,
            alias,
        })
    }

    fn parse_alias_opt(&mut self) -> Result<Option<Alias>, ParseError> {
        if let Some(as_span) = self.eat_keyword("AS") {
            let name = self.expect_ident("alias")?;
            Ok(Some(Alias {
                span: Span::new(as_span.start, self.last_end),
                name,
                as_span: Some(as_span),
            }))
        } else if self.at_kind(TokenKind::Identifier) || self.at_kind(TokenKind::QuotedIdentifier)
        {
            let name = self.expect_ident("alias")?;
            Ok(Some(Alias {
                span: name.span,
                name,
                as_span: None,
            }))
        } else {
            Ok(None)
        }
    }

    // -- table expressions --

    fn parse_from(&mut self) -> Result<FromClause, ParseError> {
        let start = self.cur_start();
        let keyword_span = self.expect_keyword("FROM")?;
        let base = self.parse_table_expr()?;
        let mut joins = Vec::new();
        while self.at_join_keywords() {
            joins.push(self.parse_join()?);
        }
        Ok(FromClause {
            span: self.span_from(start),
            keyword_span,
            base,
            joins,
        })
    }

    fn at_join_keywords(&self) -> bool {
        ["JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS"]
            .iter()
            .any(|kw| self.at_keyword(kw))
    }

    fn parse_join(&mut self) -> Result<Join, ParseError> {
        let start = self.cur_start();
        let join_type = if self.eat_keyword("JOIN").is_some() {
            JoinType::Bare
        } else if self.eat_keyword("INNER").is_some() {
            self.expect_keyword("JOIN")?;
            JoinType::Inner
        } else if self.eat_keyword("LEFT").is_some() {
            self.eat_keyword("OUTER");
            self.expect_keyword("JOIN")?;
            JoinType::Left
        } else if self.eat_keyword("RIGHT").is_some() {
            self.eat_keyword("OUTER");
            self.expect_keyword("JOIN")?;
            JoinType::Right
        } else if self.eat_keyword("FULL").is_some() {
            self.eat_keyword("OUTER");
            self.expect_keyword("JOIN")?;
            JoinType::Full
        } else {
            self.expect_keyword("CROSS")?;
            self.expect_keyword("JOIN")?;
            JoinType::Cross
        };
        let keywords_span = self.span_from(start);
        let table = self.parse_table_expr()?;
        let constraint = if let Some(keyword_span) = self.eat_keyword("ON") {
            let condition = self.parse_expr()?;
            Some(JoinConstraint::On(OnClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                condition,
            }))
        } else if let Some(keyword_span) = self.eat_keyword("USING") {
            self.expect_kind(TokenKind::LParen, "'('")?;
            let mut columns = vec![self.expect_ident("column name")?];
            while self.eat_kind(TokenKind::Comma).is_some() {
                columns.push(self.expect_ident("column name")?);
            }
            self.expect_kind(TokenKind::RParen, "')'")?;
            Some(JoinConstraint::Using(UsingClause {
                span: Span::new(keyword_span.start, self.last_end),
                keyword_span,
                columns,
            }))
        } else {
            None
        };
        Ok(Join {
            span: self.span_from(start),
            join_type,
            keywords_span,
            table,
            constraint,
        })
    }

    fn parse_table_expr(&mut self) -> Result<TableExpression, ParseError> {
        let start = self.cur_start();
        if self.at_kind(TokenKind::LParen) {
            self.bump();
            let subquery = self.parse_select_chain()?;
            self.expect_kind(TokenKind::RParen, "')'")?;
            let alias = self.parse_alias_opt()?;
            return Ok(TableExpression::Derived(DerivedTable {
                span: self.span_from(start),
                subquery: Box::new(subquery),
                alias,
            }));
        }
        let mut parts = vec![self.expect_ident("table name")?];
        while self.eat_kind(TokenKind::Dot).is_some() {
            parts.push(self.expect_ident("identifier after '.'")?);
        }
        let name = QualifiedName {
            span: self.span_from(start),
            parts,
        };
        let alias = self.parse_alias_opt()?;
        Ok(TableExpression::Table(TableRef {
            span: self.span_from(start),
            name,
            alias,
        }))
    }

    // -- expressions, loosest binding first --

    fn parse_expr(&mut self) -> Result<Expression, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;
        while let Some(op_span) = self.eat_keyword("OR") {
            let right = self.parse_and()?;
            left = Expression::BinaryOp {
                span: Span::new(left.span().start, self.last_end),
                left: Box::new(left),
                op: BinaryOperator::Or,
                op_span,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not()?;
        while let Some(op_span) = self.eat_keyword("AND") {
            let right = self.parse_not()?;
            left = Expression::BinaryOp {
                span: Span::new(left.span().start, self.last_end),
                left: Box::new(left),
                op: BinaryOperator::And,
                op_span,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, ParseError> {
        if let Some(not_span) = self.eat_keyword("NOT") {
            if self.at_keyword("EXISTS") {
                return self.parse_exists(not_span.start, true);
            }
            let operand = self.parse_not()?;
            return Ok(Expression::UnaryOp {
                span: Span::new(not_span.start, self.last_end),
                op: UnaryOperator::Not,
                op_span: not_span,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_additive()?;

        // Infix negation: `x NOT IN (...)`, `x NOT LIKE ...`, `x NOT BETWEEN ...`.
        let mut negated = false;
        let mut not_span = None;
        if self.at_keyword("NOT")
            && self.nth(1).is_some_and(|t| {
                t.matches_keyword("IN")
                    || t.matches_keyword("LIKE")
                    || t.matches_keyword("ILIKE")
                    || t.matches_keyword("BETWEEN")
            })
        {
            let t = self.bump().expect("token present");
            not_span = Some(Span::new(t.start, t.end));
            negated = true;
        }

        if self.at_keyword("IN") {
            return self.parse_in_tail(left, negated);
        }
        if self.eat_keyword("BETWEEN").is_some() {
            let low = self.parse_additive()?;
            self.expect_keyword("AND")?;
            let high = self.parse_additive()?;
            return Ok(Expression::Between {
                span: Span::new(left.span().start, self.last_end),
                expr: Box::new(left),
                negated,
                low: Box::new(low),
                high: Box::new(high),
            });
        }
        for (kw, op) in [("LIKE", BinaryOperator::Like), ("ILIKE", BinaryOperator::ILike)] {
            if let Some(op_span) = self.eat_keyword(kw) {
                let right = self.parse_additive()?;
                let inner = Expression::BinaryOp {
                    span: Span::new(left.span().start, self.last_end),
                    left: Box::new(left),
                    op,
                    op_span,
                    right: Box::new(right),
                };
                return Ok(if negated {
                    Expression::UnaryOp {
                        span: inner.span(),
                        op: UnaryOperator::Not,
                        op_span: not_span.unwrap_or(op_span),
                        operand: Box::new(inner),
                    }
                } else {
                    inner
                });
            }
        }
        if negated {
            return Err(self.err("keyword IN, LIKE, ILIKE, or BETWEEN"));
        }

        if let Some(is_span) = self.eat_keyword("IS") {
            let (op, op_span) = if let Some(not_span) = self.eat_keyword("NOT") {
                (BinaryOperator::IsNot, Span::new(is_span.start, not_span.end))
            } else {
                (BinaryOperator::Is, is_span)
            };
            let right = if let Some(span) = self.eat_keyword("NULL") {
                Expression::NullLiteral { span }
            } else if let Some(span) = self.eat_keyword("TRUE") {
                Expression::BooleanLiteral { span, value: true }
            } else if let Some(span) = self.eat_keyword("FALSE") {
                Expression::BooleanLiteral { span, value: false }
            } else {
                return Err(self.err("NULL, TRUE, or FALSE"));
            };
            return Ok(Expression::BinaryOp {
                span: Span::new(left.span().start, self.last_end),
                left: Box::new(left),
                op,
                op_span,
                right: Box::new(right),
            });
        }

        let comparison_ops = [
            ("=", BinaryOperator::Eq),
            ("!=", BinaryOperator::NotEq),
            ("<>", BinaryOperator::NotEqAngle),
            ("<=", BinaryOperator::LtEq),
            (">=", BinaryOperator::GtEq),
            ("<", BinaryOperator::Lt),
            (">", BinaryOperator::Gt),
        ];
        for (text, op) in comparison_ops {
            if let Some(op_span) = self.eat_operator(text) {
                let right = self.parse_additive()?;
                return Ok(Expression::BinaryOp {
                    span: Span::new(left.span().start, self.last_end),
                    left: Box::new(left),
                    op,
                    op_span,
                    right: Box::new(right),
                });
            }
        }

        Ok(left)
    }

    fn parse_in_tail(&mut self, left: Expression, negated: bool) -> Result<Expression, ParseError> {
        self.expect_keyword("IN")?;
        self.expect_kind(TokenKind::LParen, "'('")?;
        if self.at_keyword("SELECT") || self.at_keyword("WITH") {
            let subquery = match self.parse_statement()? {
                Statement::Select(s) => s,
                Statement::With(w) => {
                    // Flatten: rules treat the body as the subquery shape.
                    let mut body = w.body;
                    body.span = w.span;
                    body
                }
            };
            self.expect_kind(TokenKind::RParen, "')'")?;
            return Ok(Expression::InSubquery {
                span: Span::new(left.span().start, self.last_end),
                expr: Box::new(left),
                negated,
                subquery: Box::new(subquery),
            });
        }
        let mut items = vec![self.parse_expr()?];
        while self.eat_kind(TokenKind::Comma).is_some() {
            items.push(self.parse_expr()?);
        }
        self.expect_kind(TokenKind::RParen, "')'")?;
        Ok(Expression::InList {
            span: Span::new(left.span().start, self.last_end),
            expr: Box::new(left),
            negated,
            items,
        })
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let (op, op_span) = if let Some(span) = self.eat_operator("+") {
                (BinaryOperator::Add, span)
            } else if let Some(span) = self.eat_operator("-") {
                (BinaryOperator::Sub, span)
            } else if let Some(span) = self.eat_operator("||") {
                (BinaryOperator::Concat, span)
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expression::BinaryOp {
                span: Span::new(left.span().start, self.last_end),
                left: Box::new(left),
                op,
                op_span,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let (op, op_span) = if let Some(span) = self.eat_operator("*") {
                (BinaryOperator::Mul, span)
            } else if let Some(span) = self.eat_operator("/") {
                (BinaryOperator::Div, span)
            } else if let Some(span) = self.eat_operator("%") {
                (BinaryOperator::Mod, span)
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expression::BinaryOp {
                span: Span::new(left.span().start, self.last_end),
                left: Box::new(left),
                op,
                op_span,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let (op, op_span) = if let Some(span) = self.eat_operator("-") {
            (UnaryOperator::Minus, span)
        } else if let Some(span) = self.eat_operator("+") {
            (UnaryOperator::Plus, span)
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        Ok(Expression::UnaryOp {
            span: Span::new(op_span.start, self.last_end),
            op,
            op_span,
            operand: Box::new(operand),
        })
    }

    /// `::type` casts bind tighter than any operator.
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_atom()?;
        while self.eat_operator("::").is_some() {
            let name_tok = self.expect_kind(TokenKind::Identifier, "type name")?;
            let type_name = TypeName {
                span: Span::new(name_tok.start, name_tok.end),
                name: name_tok.text.clone(),
            };
            expr = Expression::Cast {
                span: Span::new(expr.span().start, self.last_end),
                expr: Box::new(expr),
                type_name,
            };
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expression, ParseError> {
        let start = self.cur_start();
        if let Some(tok) = self.eat_kind(TokenKind::Number) {
            return Ok(Expression::NumberLiteral {
                span: Span::new(tok.start, tok.end),
                text: tok.text.clone(),
            });
        }
        if let Some(tok) = self.eat_kind(TokenKind::StringLiteral) {
            return Ok(Expression::StringLiteral {
                span: Span::new(tok.start, tok.end),
                value: unquote(&tok.text, '\''),
            });
        }
        if let Some(span) = self.eat_keyword("TRUE") {
            return Ok(Expression::BooleanLiteral { span, value: true });
        }
        if let Some(span) = self.eat_keyword("FALSE") {
            return Ok(Expression::BooleanLiteral { span, value: false });
        }
        if let Some(span) = self.eat_keyword("NULL") {
            return Ok(Expression::NullLiteral { span });
        }
        if self.at_keyword("CASE") {
            return self.parse_case().map(Expression::Case);
        }
        if self.eat_keyword("CAST").is_some() {
            self.expect_kind(TokenKind::LParen, "'('")?;
            let inner = self.parse_expr()?;
            self.expect_keyword("AS")?;
            let name_tok = self.expect_kind(TokenKind::Identifier, "type name")?;
            let type_name = TypeName {
                span: Span::new(name_tok.start, name_tok.end),
                name: name_tok.text.clone(),
            };
            self.expect_kind(TokenKind::RParen, "')'")?;
            return Ok(Expression::Cast {
                span: self.span_from(start),
                expr: Box::new(inner),
                type_name,
            });
        }
        if self.at_keyword("EXISTS") {
            return self.parse_exists(start, false);
        }
        if self.eat_kind(TokenKind::LParen).is_some() {
            if self.at_keyword("SELECT") || self.at_keyword("WITH") {
                let subquery = match self.parse_statement()? {
                    Statement::Select(s) => s,
                    Statement::With(w) => {
                        let mut body = w.body;
                        body.span = w.span;
                        body
                    }
                };
                self.expect_kind(TokenKind::RParen, "')'")?;
                return Ok(Expression::Subquery {
                    span: self.span_from(start),
                    query: Box::new(subquery),
                });
            }
            let inner = self.parse_expr()?;
            self.expect_kind(TokenKind::RParen, "')'")?;
            return Ok(Expression::Grouped {
                span: self.span_from(start),
                inner: Box::new(inner),
            });
        }
        if self.at_kind(TokenKind::Identifier) || self.at_kind(TokenKind::QuotedIdentifier) {
            return self.parse_name_or_call();
        }
        Err(self.err("expression"))
    }

    fn parse_exists(&mut self, start: usize, negated: bool) -> Result<Expression, ParseError> {
        self.expect_keyword("EXISTS")?;
        self.expect_kind(TokenKind::LParen, "'('")?;
        let subquery = self.parse_select_chain()?;
        self.expect_kind(TokenKind::RParen, "')'")?;
        Ok(Expression::Exists {
            span: self.span_from(start),
            negated,
            subquery: Box::new(subquery),
        })
    }

    fn parse_name_or_call(&mut self) -> Result<Expression, ParseError> {
        let start = self.cur_start();
        let first = self.expect_ident("expression")?;

        // A bare name directly followed by `(` is a call.
        if !first.quoted && self.at_kind(TokenKind::LParen) {
            return self.parse_call(start, first);
        }

        let mut parts = vec![first];
        while self.eat_kind(TokenKind::Dot).is_some() {
            if self.eat_operator("*").is_some() {
                let qualifier = parts.pop().expect("at least one part before '*'");
                return Ok(Expression::Wildcard {
                    span: self.span_from(start),
                    qualifier: Some(qualifier),
                });
            }
            parts.push(self.expect_ident("identifier after '.'")?);
        }
        Ok(Expression::Column(ColumnRef {
            span: self.span_from(start),
            parts,
        }))
    }

    fn parse_call(&mut self, start: usize, name: Ident) -> Result<Expression, ParseError> {
        self.expect_kind(TokenKind::LParen, "'('")?;
        let distinct = self.eat_keyword("DISTINCT").is_some();
        let mut args = Vec::new();
        if let Some(star) = self.eat_operator("*") {
            args.push(Expression::Wildcard {
                span: star,
                qualifier: None,
            });
        } else if !self.at_kind(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.eat_kind(TokenKind::Comma).is_some() {
                args.push(self.parse_expr()?);
            }
        }
        self.expect_kind(TokenKind::RParen, "')'")?;

        let over = if let Some(over_span) = self.eat_keyword("OVER") {
            self.expect_kind(TokenKind::LParen, "'('")?;
            let mut partition_by = Vec::new();
            if self.eat_keyword("PARTITION").is_some() {
                self.expect_keyword("BY")?;
                partition_by.push(self.parse_expr()?);
                while self.eat_kind(TokenKind::Comma).is_some() {
                    partition_by.push(self.parse_expr()?);
                }
            }
            let mut order_by = Vec::new();
            if self.eat_keyword("ORDER").is_some() {
                self.expect_keyword("BY")?;
                order_by.push(self.parse_order_item()?);
                while self.eat_kind(TokenKind::Comma).is_some() {
                    order_by.push(self.parse_order_item()?);
                }
            }
            self.expect_kind(TokenKind::RParen, "')'")?;
            Some(WindowSpec {
                span: Span::new(over_span.start, self.last_end),
                partition_by,
                order_by,
            })
        } else {
            None
        };

        Ok(Expression::Function(FunctionCall {
            span: self.span_from(start),
            name,
            distinct,
            args,
            over,
        }))
    }

    fn parse_case(&mut self) -> Result<CaseExpression, ParseError> {
        let start = self.cur_start();
        let case_span = self.expect_keyword("CASE")?;
        let operand = if self.at_keyword("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut branches = Vec::new();
        while let Some(when_span) = self.eat_keyword("WHEN") {
            let condition = self.parse_expr()?;
            let then_span = self.expect_keyword("THEN")?;
            let result = self.parse_expr()?;
            branches.push(WhenBranch {
                span: Span::new(when_span.start, self.last_end),
                when_span,
                condition,
                then_span,
                result,
            });
        }
        if branches.is_empty() {
            return Err(self.err("keyword WHEN"));
        }
        let else_branch = if let Some(else_span) = self.eat_keyword("ELSE") {
            let result = Box::new(self.parse_expr()?);
            Some(ElseBranch {
                span: Span::new(else_span.start, self.last_end),
                else_span,
                result,
            })
        } else {
            None
        };
        let end_span = self.expect_keyword("END")?;
        Ok(CaseExpression {
            span: self.span_from(start),
            case_span,
            operand,
            branches,
            else_branch,
            end_span,
        })
    }

    fn parse_order_item(&mut self) -> Result<OrderByItem, ParseError> {
        let start = self.cur_start();
        let expr = self.parse_expr()?;
        let direction = if self.eat_keyword("ASC").is_some() {
            Some(OrderDirection::Asc)
        } else if self.eat_keyword("DESC").is_some() {
            Some(OrderDirection::Desc)
        } else {
            None
        };
        if self.eat_keyword("NULLS").is_some() {
            if self.eat_keyword("FIRST").is_none() {
                self.expect_keyword("LAST")?;
            }
        }
        Ok(OrderByItem {
            span: self.span_from(start),
            expr,
            direction,
        })
    }

    fn expect_ident(&mut self, what: &str) -> Result<Ident, ParseError> {
        if let Some(tok) = self.eat_kind(TokenKind::Identifier) {
            return Ok(Ident {
                span: Span::new(tok.start, tok.end),
                name: tok.text.clone(),
                quoted: false,
            });
        }
        if let Some(tok) = self.eat_kind(TokenKind::QuotedIdentifier) {
            return Ok(Ident {
                span: Span::new(tok.start, tok.end),
                name: unquote(&tok.text, '"'),
                quoted: true,
            });
        }
        Err(self.err(what))
    }
}

/// Strip surrounding quotes and collapse doubled quote characters.
fn unquote(text: &str, quote: char) -> String {
    let inner = &text[1..text.len() - 1];
    let doubled = format!("{quote}{quote}");
    inner.replace(&doubled, &quote.to_string())
}
