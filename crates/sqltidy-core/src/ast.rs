//! Statement tree produced by the parser.
//!
//! Every node carries a [`Span`] in statement-relative bytes covering its
//! first through last significant token. Trivia between tokens belongs to no
//! node; the formatter reads it straight from the token stream. Child spans
//! always sit inside their parent's span, and sibling spans never overlap.

use crate::violation::Span;

/// One parsed statement of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    With(CteBlock),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Select(s) => s.span,
            Statement::With(w) => w.span,
        }
    }

    /// The outermost select: the statement itself, or the body after `WITH`.
    pub fn body(&self) -> &SelectStatement {
        match self {
            Statement::Select(s) => s,
            Statement::With(w) => &w.body,
        }
    }
}

/// `WITH [RECURSIVE] name AS (...), ... <select>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CteBlock {
    pub span: Span,
    pub with_span: Span,
    pub recursive: bool,
    pub ctes: Vec<Cte>,
    pub body: SelectStatement,
}

/// A single common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub span: Span,
    pub name: Ident,
    /// Optional explicit column list after the name.
    pub columns: Vec<Ident>,
    pub as_span: Span,
    pub query: SelectStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub span: Span,
    /// The `SELECT` keyword itself.
    pub select_span: Span,
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: Option<FromClause>,
    pub where_clause: Option<WhereClause>,
    pub group_by: Option<GroupByClause>,
    pub having: Option<HavingClause>,
    pub order_by: Option<OrderByClause>,
    pub limit: Option<LimitClause>,
    /// Chained `UNION` / `INTERSECT` / `EXCEPT` arms, in source order.
    pub set_ops: Vec<SetOperation>,
}

impl SelectStatement {
    /// Keyword spans of the clauses present, in source order. These are the
    /// positions layout rules expect at the start of a line.
    pub fn clause_keyword_spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        if let Some(f) = &self.from {
            spans.push(f.keyword_span);
            for join in &f.joins {
                spans.push(join.keywords_span);
            }
        }
        if let Some(w) = &self.where_clause {
            spans.push(w.keyword_span);
        }
        if let Some(g) = &self.group_by {
            spans.push(g.keyword_span);
        }
        if let Some(h) = &self.having {
            spans.push(h.keyword_span);
        }
        if let Some(o) = &self.order_by {
            spans.push(o.keyword_span);
        }
        if let Some(l) = &self.limit {
            spans.push(l.keyword_span);
        }
        for op in &self.set_ops {
            spans.push(op.keyword_span);
        }
        spans
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub span: Span,
    pub expr: Expression,
    pub alias: Option<Alias>,
}

/// An alias, with or without the `AS` keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub span: Span,
    pub name: Ident,
    /// Present only when the alias was introduced with `AS`.
    pub as_span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub span: Span,
    pub keyword_span: Span,
    pub base: TableExpression,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableExpression {
    Table(TableRef),
    Derived(DerivedTable),
}

impl TableExpression {
    pub fn span(&self) -> Span {
        match self {
            TableExpression::Table(t) => t.span,
            TableExpression::Derived(d) => d.span,
        }
    }

    pub fn alias(&self) -> Option<&Alias> {
        match self {
            TableExpression::Table(t) => t.alias.as_ref(),
            TableExpression::Derived(d) => d.alias.as_ref(),
        }
    }
}

/// A plain table (or CTE) reference, possibly schema-qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub span: Span,
    pub name: QualifiedName,
    pub alias: Option<Alias>,
}

/// A parenthesized subquery in table position.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub span: Span,
    pub subquery: Box<SelectStatement>,
    pub alias: Option<Alias>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub span: Span,
    pub join_type: JoinType,
    /// The full keyword run, e.g. `LEFT OUTER JOIN`.
    pub keywords_span: Span,
    pub table: TableExpression,
    pub constraint: Option<JoinConstraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `JOIN` with no qualifier.
    Bare,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(OnClause),
    Using(UsingClause),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnClause {
    pub span: Span,
    pub keyword_span: Span,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsingClause {
    pub span: Span,
    pub keyword_span: Span,
    pub columns: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub span: Span,
    pub keyword_span: Span,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    pub span: Span,
    /// Covers `GROUP` through `BY`.
    pub keyword_span: Span,
    pub items: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub span: Span,
    pub keyword_span: Span,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub span: Span,
    /// Covers `ORDER` through `BY`.
    pub keyword_span: Span,
    pub items: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub span: Span,
    pub expr: Expression,
    pub direction: Option<OrderDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitClause {
    pub span: Span,
    pub keyword_span: Span,
    pub count: Expression,
    pub offset: Option<OffsetClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OffsetClause {
    pub span: Span,
    pub keyword_span: Span,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub span: Span,
    pub operator: SetOperator,
    /// Covers the operator keywords, e.g. `UNION ALL`.
    pub keyword_span: Span,
    pub query: SelectStatement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// An identifier, bare or double-quoted.
///
/// For quoted identifiers `name` holds the inner text with doubled quotes
/// collapsed; `span` still covers the quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub span: Span,
    pub name: String,
    pub quoted: bool,
}

impl Ident {
    /// Case-insensitive comparison against a bare name.
    pub fn matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

/// A dotted name in table position, e.g. `analytics.users`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub span: Span,
    pub parts: Vec<Ident>,
}

impl QualifiedName {
    /// The unqualified table name (the last part).
    pub fn base(&self) -> &Ident {
        self.parts.last().expect("qualified name has at least one part")
    }
}

/// A column reference, e.g. `id` or `users.id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub span: Span,
    pub parts: Vec<Ident>,
}

impl ColumnRef {
    pub fn column(&self) -> &Ident {
        self.parts.last().expect("column ref has at least one part")
    }

    /// The table qualifier, when present.
    pub fn qualifier(&self) -> Option<&Ident> {
        if self.parts.len() >= 2 {
            Some(&self.parts[self.parts.len() - 2])
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnRef),
    /// `*` or `alias.*`.
    Wildcard {
        span: Span,
        qualifier: Option<Ident>,
    },
    StringLiteral {
        span: Span,
        /// Inner text with doubled quotes collapsed.
        value: String,
    },
    NumberLiteral {
        span: Span,
        text: String,
    },
    BooleanLiteral {
        span: Span,
        value: bool,
    },
    NullLiteral {
        span: Span,
    },
    BinaryOp {
        span: Span,
        left: Box<Expression>,
        op: BinaryOperator,
        op_span: Span,
        right: Box<Expression>,
    },
    UnaryOp {
        span: Span,
        op: UnaryOperator,
        op_span: Span,
        operand: Box<Expression>,
    },
    InList {
        span: Span,
        expr: Box<Expression>,
        negated: bool,
        items: Vec<Expression>,
    },
    InSubquery {
        span: Span,
        expr: Box<Expression>,
        negated: bool,
        subquery: Box<SelectStatement>,
    },
    Between {
        span: Span,
        expr: Box<Expression>,
        negated: bool,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    Case(CaseExpression),
    Function(FunctionCall),
    /// `expr::type` or `CAST(expr AS type)`.
    Cast {
        span: Span,
        expr: Box<Expression>,
        type_name: TypeName,
    },
    /// A parenthesized subexpression.
    Grouped {
        span: Span,
        inner: Box<Expression>,
    },
    /// A parenthesized scalar subquery.
    Subquery {
        span: Span,
        query: Box<SelectStatement>,
    },
    Exists {
        span: Span,
        negated: bool,
        subquery: Box<SelectStatement>,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Column(c) => c.span,
            Expression::Wildcard { span, .. }
            | Expression::StringLiteral { span, .. }
            | Expression::NumberLiteral { span, .. }
            | Expression::BooleanLiteral { span, .. }
            | Expression::NullLiteral { span }
            | Expression::BinaryOp { span, .. }
            | Expression::UnaryOp { span, .. }
            | Expression::InList { span, .. }
            | Expression::InSubquery { span, .. }
            | Expression::Between { span, .. }
            | Expression::Cast { span, .. }
            | Expression::Grouped { span, .. }
            | Expression::Subquery { span, .. }
            | Expression::Exists { span, .. } => *span,
            Expression::Case(c) => c.span,
            Expression::Function(f) => f.span,
        }
    }

    /// True for literal atoms: strings, numbers, booleans, `NULL`.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::StringLiteral { .. }
                | Expression::NumberLiteral { .. }
                | Expression::BooleanLiteral { .. }
                | Expression::NullLiteral { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    pub span: Span,
    /// The `CASE` keyword.
    pub case_span: Span,
    /// Present in the simple form `CASE expr WHEN ...`.
    pub operand: Option<Box<Expression>>,
    pub branches: Vec<WhenBranch>,
    pub else_branch: Option<ElseBranch>,
    /// The `END` keyword.
    pub end_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenBranch {
    pub span: Span,
    pub when_span: Span,
    pub condition: Expression,
    pub then_span: Span,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseBranch {
    pub span: Span,
    pub else_span: Span,
    pub result: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub span: Span,
    pub name: Ident,
    pub distinct: bool,
    pub args: Vec<Expression>,
    pub over: Option<WindowSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub span: Span,
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub span: Span,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    /// `!=`.
    NotEq,
    /// `<>`, kept distinct so convention rules can tell them apart.
    NotEqAngle,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Like,
    ILike,
    Is,
    IsNot,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `||`.
    Concat,
}

impl BinaryOperator {
    /// Operators whose operands are value comparisons rather than
    /// logical connectives or arithmetic.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::NotEqAngle
                | BinaryOperator::Lt
                | BinaryOperator::LtEq
                | BinaryOperator::Gt
                | BinaryOperator::GtEq
                | BinaryOperator::Like
                | BinaryOperator::ILike
        )
    }

    pub fn is_connective(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

/// Visit every select in `stmt`, outer before inner: the top-level body,
/// CTE queries, set-operation arms, derived tables, and subqueries inside
/// expressions.
pub fn walk_selects<'a>(stmt: &'a Statement, f: &mut impl FnMut(&'a SelectStatement)) {
    match stmt {
        Statement::Select(s) => walk_select_tree(s, f),
        Statement::With(w) => {
            for cte in &w.ctes {
                walk_select_tree(&cte.query, f);
            }
            walk_select_tree(&w.body, f);
        }
    }
}

fn walk_select_tree<'a>(select: &'a SelectStatement, f: &mut impl FnMut(&'a SelectStatement)) {
    f(select);
    if let Some(from) = &select.from {
        walk_table_expr(&from.base, f);
        for join in &from.joins {
            walk_table_expr(&join.table, f);
        }
    }
    walk_expressions(select, &mut |expr| match expr {
        Expression::Subquery { query, .. } => walk_select_tree(query, f),
        Expression::InSubquery { subquery, .. } => walk_select_tree(subquery, f),
        Expression::Exists { subquery, .. } => walk_select_tree(subquery, f),
        _ => {}
    });
    for op in &select.set_ops {
        walk_select_tree(&op.query, f);
    }
}

fn walk_table_expr<'a>(table: &'a TableExpression, f: &mut impl FnMut(&'a SelectStatement)) {
    if let TableExpression::Derived(d) = table {
        walk_select_tree(&d.subquery, f);
    }
}

/// Visit every expression belonging to `select` itself, parents before
/// children. Does not descend into nested select statements; pair with
/// [`walk_selects`] when those matter.
pub fn walk_expressions<'a>(
    select: &'a SelectStatement,
    f: &mut impl FnMut(&'a Expression),
) {
    for item in &select.items {
        walk_expr_tree(&item.expr, f);
    }
    if let Some(from) = &select.from {
        for join in &from.joins {
            if let Some(JoinConstraint::On(on)) = &join.constraint {
                walk_expr_tree(&on.condition, f);
            }
        }
    }
    if let Some(w) = &select.where_clause {
        walk_expr_tree(&w.condition, f);
    }
    if let Some(g) = &select.group_by {
        for item in &g.items {
            walk_expr_tree(item, f);
        }
    }
    if let Some(h) = &select.having {
        walk_expr_tree(&h.condition, f);
    }
    if let Some(o) = &select.order_by {
        for item in &o.items {
            walk_expr_tree(&item.expr, f);
        }
    }
    if let Some(l) = &select.limit {
        walk_expr_tree(&l.count, f);
        if let Some(off) = &l.offset {
            walk_expr_tree(&off.value, f);
        }
    }
}

/// Visit `expr` and its subexpressions, parents before children. Stops at
/// nested select statements.
pub fn walk_expr_tree<'a>(expr: &'a Expression, f: &mut impl FnMut(&'a Expression)) {
    f(expr);
    match expr {
        Expression::BinaryOp { left, right, .. } => {
            walk_expr_tree(left, f);
            walk_expr_tree(right, f);
        }
        Expression::UnaryOp { operand, .. } => walk_expr_tree(operand, f),
        Expression::InList { expr, items, .. } => {
            walk_expr_tree(expr, f);
            for item in items {
                walk_expr_tree(item, f);
            }
        }
        Expression::InSubquery { expr, .. } => walk_expr_tree(expr, f),
        Expression::Between {
            expr, low, high, ..
        } => {
            walk_expr_tree(expr, f);
            walk_expr_tree(low, f);
            walk_expr_tree(high, f);
        }
        Expression::Case(case) => {
            if let Some(operand) = &case.operand {
                walk_expr_tree(operand, f);
            }
            for branch in &case.branches {
                walk_expr_tree(&branch.condition, f);
                walk_expr_tree(&branch.result, f);
            }
            if let Some(else_branch) = &case.else_branch {
                walk_expr_tree(&else_branch.result, f);
            }
        }
        Expression::Function(call) => {
            for arg in &call.args {
                walk_expr_tree(arg, f);
            }
            if let Some(over) = &call.over {
                for part in &over.partition_by {
                    walk_expr_tree(part, f);
                }
                for item in &over.order_by {
                    walk_expr_tree(&item.expr, f);
                }
            }
        }
        Expression::Cast { expr, .. } => walk_expr_tree(expr, f),
        Expression::Grouped { inner, .. } => walk_expr_tree(inner, f),
        Expression::Column(_)
        | Expression::Wildcard { .. }
        | Expression::StringLiteral { .. }
        | Expression::NumberLiteral { .. }
        | Expression::BooleanLiteral { .. }
        | Expression::NullLiteral { .. }
        | Expression::Subquery { .. }
        | Expression::Exists { .. } => {}
    }
}
