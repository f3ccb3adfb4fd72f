/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
    Null,

    /// A name bound in the evaluation environment
    ///
    /// # Example
    /// ```text
    /// item
    /// ```
    Identifier(String),

    /// Field access by name
    ///
    /// # Example
    /// ```text
    /// item.name
    /// ```
    Member { object: Box<Expr>, property: String },

    /// Computed access
    ///
    /// # Examples
    /// ```text
    /// items[0]
    /// config["log-level"]
    /// ```
    Index { object: Box<Expr>, index: Box<Expr> },

    /// Builtin function call
    ///
    /// # Example
    /// ```text
    /// len(items)
    /// ```
    Call { function: String, args: Vec<Expr> },

    /// Builtin called with method syntax; the receiver becomes the first
    /// argument
    ///
    /// # Example
    /// ```text
    /// name.upper()
    /// ```
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },

    Unary { op: UnaryOp, operand: Box<Expr> },

    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `condition ? then : otherwise`
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {name: item, "full-name": first + " " + last}
    /// ```
    Object(Vec<(String, Expr)>),

    Array(Vec<Expr>),
}

impl Expr {
    /// Collect the free identifiers referenced by this expression, in
    /// first-seen order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Member { object, .. } => object.collect_identifiers(names),
            Expr::Index { object, index } => {
                object.collect_identifiers(names);
                index.collect_identifiers(names);
            }
            Expr::Call { args, .. } => args.iter().for_each(|a| a.collect_identifiers(names)),
            Expr::MethodCall { object, args, .. } => {
                object.collect_identifiers(names);
                args.iter().for_each(|a| a.collect_identifiers(names));
            }
            Expr::Unary { operand, .. } => operand.collect_identifiers(names),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_identifiers(names);
                then.collect_identifiers(names);
                otherwise.collect_identifiers(names);
            }
            Expr::Object(pairs) => pairs.iter().for_each(|(_, v)| v.collect_identifiers(names)),
            Expr::Array(items) => items.iter().for_each(|v| v.collect_identifiers(names)),
            Expr::Float(_) | Expr::Integer(_) | Expr::String(_) | Expr::Boolean(_) | Expr::Null => {}
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    // Comparison
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Membership
    In,
    NotIn,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Logical
    And,
    Or,

    /// Null-coalescing (`??`)
    NullCoalesce,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::In => "in",
            BinOp::NotIn => "not in",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::NullCoalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// `!` / `not`
    Not,
    /// `-`
    Negate,
}
