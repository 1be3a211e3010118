use indexmap::IndexMap;

/// A position in the source: 1-based line and column (in characters),
/// 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub byte: usize,
}

/// A half-open source range; `end` points just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: Pos,
    pub end: Pos,
}

impl Range {
    pub fn new(start: Pos, end: Pos) -> Self {
        Range { start, end }
    }

    /// Smallest range covering both `self` and `other`.
    pub fn join(&self, other: &Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub filename: String,
    pub source: String,
    pub body: Body,
}

impl File {
    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

/// Attribute and block container, at the top level or inside a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub attributes: IndexMap<String, Attribute>,
    pub blocks: Vec<Block>,
    pub src_range: Range,
    pub end_range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub expr: Expression,
    pub src_range: Range,
    pub name_range: Range,
    pub equals_range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub block_type: String,
    pub labels: Vec<String>,
    pub body: Body,
    pub type_range: Range,
    pub label_ranges: Vec<Range>,
    pub open_brace_range: Range,
    pub close_brace_range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl LiteralValue {
    /// The value forced to a string, as template assembly needs it.
    /// `None` for null, which has no string form.
    pub fn to_template_string(&self) -> Option<String> {
        match self {
            LiteralValue::Null => None,
            LiteralValue::Bool(b) => Some(b.to_string()),
            LiteralValue::Number(n) => Some(n.as_str().to_string()),
            LiteralValue::String(s) => Some(s.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Number(_) => "number",
            LiteralValue::String(_) => "string",
        }
    }
}

/// Largest decimal exponent a number literal may carry. Canonical text is
/// written out in full, so this bounds its length.
const MAX_EXPONENT: u64 = 10_000;

/// An exact number literal, kept as canonical decimal text: no exponent,
/// no leading zeros in the integer part, no trailing zeros in the fraction.
/// `1e3` is `1000`, `2.50` is `2.5`, `12345678901234567890` stays as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    /// Canonicalize a literal of the form `digits[.digits][(e|E)[+-]digits]`.
    /// `None` when the text is not such a literal or its exponent is out of range.
    pub fn parse(literal: &str) -> Option<Number> {
        let (mantissa, exponent) = match literal.find(['e', 'E']) {
            Some(i) => (&literal[..i], literal[i + 1..].parse::<i64>().ok()?),
            None => (literal, 0),
        };
        if exponent.unsigned_abs() > MAX_EXPONENT {
            return None;
        }

        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = |text: &str| text.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return None;
        }

        let digits = format!("{}{}", int_part, frac_part);
        let point = int_part.len() as i64 + exponent;

        let (int_digits, frac_digits) = if point <= 0 {
            (String::new(), format!("{}{}", "0".repeat((-point) as usize), digits))
        } else if point as usize >= digits.len() {
            (format!("{}{}", digits, "0".repeat(point as usize - digits.len())), String::new())
        } else {
            let (i, f) = digits.split_at(point as usize);
            (i.to_string(), f.to_string())
        };

        let int_digits = int_digits.trim_start_matches('0');
        let frac_digits = frac_digits.trim_end_matches('0');

        let int_digits = if int_digits.is_empty() { "0" } else { int_digits };
        Some(if frac_digits.is_empty() {
            Number(int_digits.to_string())
        } else {
            Number(format!("{}.{}", int_digits, frac_digits))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One step after the root of a traversal: `.name`, `[key]` or a legacy `.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum TraversalStep {
    Attr { name: String, range: Range },
    Index { key: LiteralValue, range: Range },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal | BinaryOp::NotEqual => 3,
            BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual => 4,
            BinaryOp::Add | BinaryOp::Subtract => 5,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 6,
        }
    }
}

/// A string template: literal text mixed with interpolations and directives.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExpr {
    pub parts: Vec<Expression>,
    pub src_range: Range,
}

impl TemplateExpr {
    /// True when the template is exactly one literal string part.
    pub fn is_string_literal(&self) -> bool {
        matches!(
            self.parts.as_slice(),
            [Expression::Literal { value: LiteralValue::String(_), .. }]
        )
    }

    pub fn start_range(&self) -> Range {
        self.parts
            .first()
            .map(Expression::start_range)
            .unwrap_or(self.src_range)
    }
}

/// `[for k, v in coll : expr if cond]` or `{for k, v in coll : key => value}`.
/// Also the body of a template `%{for}` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub key_var: Option<String>,
    pub val_var: String,
    pub coll_expr: Box<Expression>,
    pub key_expr: Option<Box<Expression>>,
    pub val_expr: Box<Expression>,
    pub cond_expr: Option<Box<Expression>>,
    pub group: bool,
    pub src_range: Range,
    pub open_range: Range,
    pub close_range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectItem {
    pub key_expr: Expression,
    pub value_expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        value: LiteralValue,
        src_range: Range,
    },
    Template(TemplateExpr),
    /// A template holding exactly one interpolation, e.g. `"${x}"`.
    TemplateWrap {
        wrapped: Box<Expression>,
        src_range: Range,
    },
    Tuple {
        exprs: Vec<Expression>,
        src_range: Range,
        open_range: Range,
    },
    Object {
        items: Vec<ObjectItem>,
        src_range: Range,
        open_range: Range,
    },
    /// Wraps every object constructor key so a bare identifier stays a name.
    ObjectKey {
        wrapped: Box<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
        expand_final: bool,
        name_range: Range,
        open_paren_range: Range,
        close_paren_range: Range,
    },
    ScopeTraversal {
        root: String,
        steps: Vec<TraversalStep>,
        src_range: Range,
    },
    RelativeTraversal {
        source: Box<Expression>,
        steps: Vec<TraversalStep>,
        src_range: Range,
    },
    Index {
        collection: Box<Expression>,
        key: Box<Expression>,
        src_range: Range,
        bracket_range: Range,
    },
    Splat {
        source: Box<Expression>,
        steps: Vec<TraversalStep>,
        full: bool,
        src_range: Range,
        marker_range: Range,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        src_range: Range,
        symbol_range: Range,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
        src_range: Range,
    },
    Conditional {
        condition: Box<Expression>,
        true_result: Box<Expression>,
        false_result: Box<Expression>,
        src_range: Range,
    },
    For(ForExpr),
    /// A template `%{for}` directive: joins the rendered loop body.
    TemplateJoin(ForExpr),
    Parentheses {
        inner: Box<Expression>,
        src_range: Range,
    },
}

impl Expression {
    /// The full source range of the expression.
    pub fn range(&self) -> Range {
        match self {
            Expression::Literal { src_range, .. }
            | Expression::TemplateWrap { src_range, .. }
            | Expression::Tuple { src_range, .. }
            | Expression::Object { src_range, .. }
            | Expression::ScopeTraversal { src_range, .. }
            | Expression::RelativeTraversal { src_range, .. }
            | Expression::Index { src_range, .. }
            | Expression::Splat { src_range, .. }
            | Expression::Unary { src_range, .. }
            | Expression::Binary { src_range, .. }
            | Expression::Conditional { src_range, .. }
            | Expression::Parentheses { src_range, .. } => *src_range,
            Expression::Template(t) => t.src_range,
            Expression::For(f) | Expression::TemplateJoin(f) => f.src_range,
            Expression::ObjectKey { wrapped } => wrapped.range(),
            Expression::FunctionCall { name_range, close_paren_range, .. } => {
                name_range.join(close_paren_range)
            }
        }
    }

    /// The range of the expression's first significant token.
    pub fn start_range(&self) -> Range {
        match self {
            Expression::Literal { src_range, .. }
            | Expression::ScopeTraversal { src_range, .. }
            | Expression::Parentheses { src_range, .. } => *src_range,
            Expression::Template(t) => t.start_range(),
            Expression::TemplateWrap { wrapped, .. } => wrapped.start_range(),
            Expression::Tuple { open_range, .. } | Expression::Object { open_range, .. } => {
                *open_range
            }
            Expression::ObjectKey { wrapped } => wrapped.start_range(),
            Expression::FunctionCall { name_range, .. } => *name_range,
            Expression::RelativeTraversal { source, .. }
            | Expression::Splat { source, .. } => source.start_range(),
            Expression::Index { collection, .. } => collection.start_range(),
            Expression::Unary { symbol_range, .. } => *symbol_range,
            Expression::Binary { lhs, .. } => lhs.start_range(),
            Expression::Conditional { condition, .. } => condition.start_range(),
            Expression::For(f) | Expression::TemplateJoin(f) => f.open_range,
        }
    }

    /// Short human-readable name of the expression kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Literal { .. } => "literal",
            Expression::Template(_) => "template",
            Expression::TemplateWrap { .. } => "template wrap",
            Expression::Tuple { .. } => "tuple",
            Expression::Object { .. } => "object",
            Expression::ObjectKey { .. } => "object key",
            Expression::FunctionCall { .. } => "function call",
            Expression::ScopeTraversal { .. } => "scope traversal",
            Expression::RelativeTraversal { .. } => "relative traversal",
            Expression::Index { .. } => "index",
            Expression::Splat { .. } => "splat",
            Expression::Unary { .. } => "unary operation",
            Expression::Binary { .. } => "binary operation",
            Expression::Conditional { .. } => "conditional",
            Expression::For(_) => "for expression",
            Expression::TemplateJoin(_) => "template for directive",
            Expression::Parentheses { .. } => "parentheses",
        }
    }
}
