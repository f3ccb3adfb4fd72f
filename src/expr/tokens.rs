/// Lexical tokens of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(f64),

    Integer(i64),

    /// String literal in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'linux'
    /// ```
    String(String),

    Boolean(bool),

    /// `null` or `nil`
    Null,

    /// Variable, field or function name
    ///
    /// Must start with a letter or underscore, followed by letters, digits,
    /// or underscores.
    Identifier(String),

    // Arithmetic
    /// Addition or string concatenation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Logical
    /// `and` or `&&`
    And,
    /// `or` or `||`
    Or,
    /// `not` or `!`
    Not,
    /// Membership (`in`)
    In,

    /// Ternary condition marker
    Question,
    /// Null coalescing (`??`)
    QuestionQuestion,

    // Delimiters
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,

    Eof,
}
