//! Unevaluated expressions as produced by the reader

use std::fmt;

/// An unevaluated datum.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    /// String body without the surrounding delimiters
    Str(String),
    Symbol(String),
    List(Vec<Expr>),
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric literal as f64, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Int(i) => Some(*i as f64),
            Expr::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Short name of the expression's syntactic kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Int(_) => "integer",
            Expr::Float(_) => "float",
            Expr::Str(_) => "string",
            Expr::Symbol(_) => "symbol",
            Expr::List(_) => "list",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(i) => write!(f, "{}", i),
            Expr::Float(x) => write!(f, "{:?}", x),
            Expr::Str(s) => write!(f, "{:?}", s),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
