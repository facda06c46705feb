//! Runtime values and the procedure capability

use crate::env::Env;
use crate::error::Result;
use crate::eval::Evaluator;
use crate::expr::Expr;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A first-class callable value.
///
/// `apply` receives the argument expressions unevaluated: the receiver
/// decides which positions to evaluate (method-dispatch calling convention).
pub trait Procedure: fmt::Display + fmt::Debug {
    /// Receiver-kind name used in diagnostics, e.g. `"capture"`.
    fn kind(&self) -> &'static str;

    fn apply(&self, args: &[Expr], env: &Env, evaluator: &dyn Evaluator) -> Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Vec<Value>),
    Procedure(Rc<dyn Procedure>),
}

impl Value {
    pub fn procedure<P: Procedure + 'static>(procedure: P) -> Self {
        Value::Procedure(Rc::new(procedure))
    }

    /// Literal expressions that evaluate to themselves.
    pub fn from_literal(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Int(i) => Some(Value::Int(*i)),
            Expr::Float(f) => Some(Value::Float(*f)),
            Expr::Str(s) => Some(Value::Str(s.clone())),
            Expr::Symbol(_) | Expr::List(_) => None,
        }
    }

    /// Convert an expression to data without evaluating it (`quote`).
    pub fn quoted(expr: &Expr) -> Self {
        match expr {
            Expr::Int(i) => Value::Int(*i),
            Expr::Float(f) => Value::Float(*f),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Symbol(s) => Value::Symbol(s.clone()),
            Expr::List(items) => Value::List(items.iter().map(Value::quoted).collect()),
        }
    }

    /// Downcast a procedure value to a concrete procedure kind.
    pub fn downcast<P: Procedure + 'static>(&self) -> Option<&P> {
        match self {
            Value::Procedure(p) => p.as_any().downcast_ref::<P>(),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Short name of the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Procedure(p) => p.kind(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Procedure(p) => write!(f, "{}", p),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Procedures compare by identity
            (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
