use std::fmt;

/// A complete statement: one query plus any number of UNION arms.
#[derive(Debug, PartialEq, Clone)]
pub struct Statement<'a> {
    pub query: Query<'a>,
    pub unions: Vec<UnionArm<'a>>,
}

/// One `UNION [ALL] <query>` arm.
#[derive(Debug, PartialEq, Clone)]
pub struct UnionArm<'a> {
    /// UNION ALL keeps duplicates; plain UNION deduplicates.
    pub all: bool,
    pub query: Query<'a>,
}

/// A single query: clauses in textual order, optional EXPLAIN prefix.
#[derive(Debug, PartialEq, Clone)]
pub struct Query<'a> {
    pub clauses: Vec<Clause<'a>>,
    pub explain: bool,
}

impl<'a> Query<'a> {
    pub fn find_match(&self) -> Option<&MatchClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Match(m) => Some(m),
            _ => None,
        })
    }

    pub fn find_return(&self) -> Option<&ReturnClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Return(r) => Some(r),
            _ => None,
        })
    }

    pub fn find_create(&self) -> Option<&CreateClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Create(c) => Some(c),
            _ => None,
        })
    }

    pub fn find_merge(&self) -> Option<&MergeClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Merge(m) => Some(m),
            _ => None,
        })
    }

    pub fn find_set(&self) -> Option<&SetClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Set(s) => Some(s),
            _ => None,
        })
    }

    pub fn find_delete(&self) -> Option<&DeleteClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Delete(d) => Some(d),
            _ => None,
        })
    }

    pub fn find_remove(&self) -> Option<&RemoveClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Remove(r) => Some(r),
            _ => None,
        })
    }

    pub fn find_unwind(&self) -> Option<&UnwindClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Unwind(u) => Some(u),
            _ => None,
        })
    }

    pub fn find_foreach(&self) -> Option<&ForeachClause<'a>> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Foreach(f) => Some(f),
            _ => None,
        })
    }
}

/// One clause of a query. The order inside `Query::clauses` is the textual
/// order, which write execution relies on.
#[derive(Debug, PartialEq, Clone)]
pub enum Clause<'a> {
    Match(MatchClause<'a>),
    Return(ReturnClause<'a>),
    With(WithClause<'a>),
    Create(CreateClause<'a>),
    Merge(MergeClause<'a>),
    Set(SetClause<'a>),
    Delete(DeleteClause<'a>),
    Remove(RemoveClause<'a>),
    Unwind(UnwindClause<'a>),
    Foreach(ForeachClause<'a>),
    LoadCsv(LoadCsvClause<'a>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct MatchClause<'a> {
    pub patterns: Vec<PathPattern<'a>>,
    pub where_clause: Option<Expression<'a>>,
    pub optional: bool,
    /// Source graph from a leading USE clause, if any.
    pub source_graph: Option<&'a str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnClause<'a> {
    pub distinct: bool,
    pub items: Vec<ReturnItem<'a>>,
    pub order_by: Vec<OrderByItem<'a>>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnItem<'a> {
    pub expression: Expression<'a>,
    pub alias: Option<&'a str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WithClause<'a> {
    pub distinct: bool,
    pub items: Vec<ReturnItem<'a>>,
    pub order_by: Vec<OrderByItem<'a>>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    /// WHERE after the projection, filtering the intermediate rows.
    pub where_clause: Option<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CreateClause<'a> {
    pub patterns: Vec<PathPattern<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MergeClause<'a> {
    pub pattern: PathPattern<'a>,
    pub on_create: Vec<SetItem<'a>>,
    pub on_match: Vec<SetItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SetClause<'a> {
    pub items: Vec<SetItem<'a>>,
}

/// `n.prop = expr` or `n:Label`.
#[derive(Debug, PartialEq, Clone)]
pub enum SetItem<'a> {
    Property {
        target: PropertyAccess<'a>,
        value: Expression<'a>,
    },
    Label {
        variable: &'a str,
        label: &'a str,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct DeleteClause<'a> {
    pub detach: bool,
    pub items: Vec<&'a str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RemoveClause<'a> {
    pub items: Vec<RemoveItem<'a>>,
}

/// `n.prop` (property removal) or `n:Label` (label removal).
#[derive(Debug, PartialEq, Clone)]
pub enum RemoveItem<'a> {
    Property(PropertyAccess<'a>),
    Label {
        variable: &'a str,
        label: &'a str,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct UnwindClause<'a> {
    pub expression: Expression<'a>,
    pub alias: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForeachClause<'a> {
    pub variable: &'a str,
    pub list: Expression<'a>,
    /// Update clauses executed once per element.
    pub body: Vec<Clause<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct LoadCsvClause<'a> {
    pub path: &'a str,
    pub alias: &'a str,
    pub with_headers: bool,
    pub terminator: Option<&'a str>,
}

/// How a path is to be matched.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PathKind {
    Normal,
    Shortest,
    AllShortest,
}

/// A path pattern: alternating node and relationship elements (odd length,
/// node-first), optionally bound to a path variable.
#[derive(Debug, PartialEq, Clone)]
pub struct PathPattern<'a> {
    pub variable: Option<&'a str>,
    pub kind: PathKind,
    pub elements: Vec<PathElement<'a>>,
}

impl<'a> PathPattern<'a> {
    pub fn single_node(node: NodePattern<'a>) -> Self {
        PathPattern {
            variable: None,
            kind: PathKind::Normal,
            elements: vec![PathElement::Node(node)],
        }
    }

    pub fn is_single_node(&self) -> bool {
        self.elements.len() == 1
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum PathElement<'a> {
    Node(NodePattern<'a>),
    Rel(RelPattern<'a>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodePattern<'a> {
    pub variable: Option<&'a str>,
    /// Labels stack conjunctively: `(:A:B)` requires both.
    pub labels: Vec<&'a str>,
    pub properties: Option<Vec<Property<'a>>>,
}

impl<'a> NodePattern<'a> {
    pub fn first_label(&self) -> Option<&'a str> {
        self.labels.first().copied()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RelPattern<'a> {
    pub variable: Option<&'a str>,
    /// Types stack disjunctively: `[:A|B]` matches either.
    pub types: Vec<&'a str>,
    pub properties: Option<Vec<Property<'a>>>,
    pub left_arrow: bool,
    pub right_arrow: bool,
    pub varlen: Option<VarlenRange>,
}

impl<'a> RelPattern<'a> {
    pub fn direction(&self) -> Direction {
        match (self.left_arrow, self.right_arrow) {
            (true, false) => Direction::Incoming,
            (false, true) => Direction::Outgoing,
            _ => Direction::Either,
        }
    }

    pub fn first_type(&self) -> Option<&'a str> {
        self.types.first().copied()
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Direction {
    /// `<-[..]-`
    Incoming,
    /// `-[..]->`
    Outgoing,
    /// `-[..]-` or both arrows
    Either,
}

/// Variable-length range. `-1` on either bound means unbounded; the minimum
/// defaults to 1 when unspecified.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct VarlenRange {
    pub min_hops: i32,
    pub max_hops: i32,
}

impl VarlenRange {
    pub fn fixed(hops: i32) -> Self {
        VarlenRange {
            min_hops: hops,
            max_hops: hops,
        }
    }

    pub fn unbounded() -> Self {
        VarlenRange {
            min_hops: -1,
            max_hops: -1,
        }
    }

    pub fn effective_min(&self) -> u32 {
        if self.min_hops < 0 {
            1
        } else {
            self.min_hops as u32
        }
    }

    pub fn has_max(&self) -> bool {
        self.max_hops >= 0
    }
}

/// Inline property on a node or relationship pattern: either a literal map
/// entry or a whole-map parameter (`{props: $param}` style `$param`).
#[derive(Debug, PartialEq, Clone)]
pub enum Property<'a> {
    Pair(PropertyPair<'a>),
    Param(&'a str),
}

#[derive(Debug, PartialEq, Clone)]
pub struct PropertyPair<'a> {
    pub key: &'a str,
    pub value: Expression<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal<'a> {
    Integer(i64),
    Decimal(f64),
    String(&'a str),
    Boolean(bool),
    Null,
}

/// Binary operators; unary NOT and null checks are separate AST variants.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    And,
    Or,
    Xor,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    In,
    StartsWith,
    EndsWith,
    Contains,
    Regex,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Xor => "XOR",
            Operator::Eq => "=",
            Operator::Neq => "<>",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::In => "IN",
            Operator::StartsWith => "STARTS WITH",
            Operator::EndsWith => "ENDS WITH",
            Operator::Contains => "CONTAINS",
            Operator::Regex => "=~",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct OperatorApplication<'a> {
    pub operator: Operator,
    pub operands: Vec<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PropertyAccess<'a> {
    pub base: &'a str,
    pub key: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub args: Vec<Expression<'a>>,
    pub distinct: bool,
}

/// `EXISTS((pattern))` or `EXISTS(n.prop)`.
#[derive(Debug, PartialEq, Clone)]
pub enum ExistsExpr<'a> {
    Pattern {
        pattern: Box<PathPattern<'a>>,
        where_clause: Option<Box<Expression<'a>>>,
    },
    Property(PropertyAccess<'a>),
}

/// `all/any/none/single(x IN list WHERE pred)`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ListPredicateKind {
    All,
    Any,
    None,
    Single,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ListPredicate<'a> {
    pub kind: ListPredicateKind,
    pub variable: &'a str,
    pub list: Box<Expression<'a>>,
    pub predicate: Box<Expression<'a>>,
}

/// `reduce(acc = init, x IN list | expr)`.
#[derive(Debug, PartialEq, Clone)]
pub struct ReduceExpression<'a> {
    pub accumulator: &'a str,
    pub initial: Box<Expression<'a>>,
    pub variable: &'a str,
    pub list: Box<Expression<'a>>,
    pub body: Box<Expression<'a>>,
}

/// `[x IN list WHERE cond | transform]`.
#[derive(Debug, PartialEq, Clone)]
pub struct ListComprehension<'a> {
    pub variable: &'a str,
    pub list: Box<Expression<'a>>,
    pub where_clause: Option<Box<Expression<'a>>>,
    pub transform: Option<Box<Expression<'a>>>,
}

/// `[(a)-[r]->(b) WHERE cond | proj]`.
#[derive(Debug, PartialEq, Clone)]
pub struct PatternComprehension<'a> {
    pub pattern: Box<PathPattern<'a>>,
    pub where_clause: Option<Box<Expression<'a>>>,
    pub projection: Box<Expression<'a>>,
}

/// `n{.a, .b}` / `n{alias: expr, .prop}`.
#[derive(Debug, PartialEq, Clone)]
pub struct MapProjection<'a> {
    pub base: &'a str,
    pub items: Vec<MapProjectionItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum MapProjectionItem<'a> {
    /// `.prop`
    Property(&'a str),
    /// `key: expr`
    Entry { key: &'a str, value: Expression<'a> },
}

#[derive(Debug, PartialEq, Clone)]
pub struct CaseExpression<'a> {
    /// Scrutinee of a simple CASE; None for the searched form.
    pub scrutinee: Option<Box<Expression<'a>>>,
    pub when_then: Vec<(Expression<'a>, Expression<'a>)>,
    pub else_expr: Option<Box<Expression<'a>>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression<'a> {
    Literal(Literal<'a>),
    Identifier(&'a str),
    Parameter(&'a str),
    Property(PropertyAccess<'a>),
    Label {
        variable: &'a str,
        label: &'a str,
    },
    Not(Box<Expression<'a>>),
    NullCheck {
        expr: Box<Expression<'a>>,
        is_not: bool,
    },
    BinaryOp(OperatorApplication<'a>),
    FunctionCall(FunctionCall<'a>),
    Exists(ExistsExpr<'a>),
    ListPredicate(ListPredicate<'a>),
    Reduce(ReduceExpression<'a>),
    List(Vec<Expression<'a>>),
    ListComprehension(ListComprehension<'a>),
    PatternComprehension(PatternComprehension<'a>),
    Map(Vec<(&'a str, Expression<'a>)>),
    MapProjection(MapProjection<'a>),
    Case(CaseExpression<'a>),
    Subscript {
        base: Box<Expression<'a>>,
        index: Box<Expression<'a>>,
    },
    Slice {
        base: Box<Expression<'a>>,
        from: Option<Box<Expression<'a>>>,
        to: Option<Box<Expression<'a>>>,
    },
}

impl fmt::Display for Expression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Parameter(name) => write!(f, "${}", name),
            Expression::Property(p) => write!(f, "{}.{}", p.base, p.key),
            Expression::FunctionCall(func) => {
                write!(f, "{}(", func.name)?;
                for (i, arg) in func.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Literal(Literal::Integer(i)) => write!(f, "{}", i),
            Expression::Literal(Literal::Decimal(d)) => write!(f, "{}", d),
            Expression::Literal(Literal::String(s)) => write!(f, "'{}'", s),
            Expression::Literal(Literal::Boolean(b)) => write!(f, "{}", b),
            Expression::Literal(Literal::Null) => write!(f, "null"),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderByItem<'a> {
    pub expression: Expression<'a>,
    pub descending: bool,
}
