//! Method dispatch for foreign procedures
//!
//! A method call `(receiver token arg...)` reaches a foreign procedure with
//! its tail unevaluated. Each procedure kind declares a closed enum of the
//! methods it understands; resolving a token against it either yields a
//! variant the procedure matches on exhaustively or fails with
//! `MethodNotFound`.

use crate::error::VisionError;
use iris_core::Expr;

/// Closed set of methods understood by one receiver kind.
pub trait MethodSet: Sized + Copy + 'static {
    /// Receiver-kind name reported in errors.
    const RECEIVER: &'static str;
    const ALL: &'static [Self];

    fn token(self) -> &'static str;

    /// Number of arguments after the method token.
    fn arity(self) -> usize;

    fn parse(token: &str) -> Result<Self, VisionError> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.token().eq_ignore_ascii_case(token))
            .ok_or_else(|| VisionError::MethodNotFound {
                kind: Self::RECEIVER,
                method: token.to_string(),
            })
    }
}

/// Split a method-call tail into the resolved method and its arguments.
pub fn resolve<M: MethodSet>(args: &[Expr]) -> Result<(M, &[Expr]), VisionError> {
    let Some((head, rest)) = args.split_first() else {
        return Err(VisionError::Arity {
            form: M::RECEIVER,
            expected: 1,
            actual: 0,
        });
    };

    let method = match literal_token(head) {
        Some(token) => M::parse(&token)?,
        None => {
            return Err(VisionError::MethodNotFound {
                kind: M::RECEIVER,
                method: head.to_string(),
            })
        }
    };

    if rest.len() != method.arity() {
        return Err(VisionError::Arity {
            form: method.token(),
            expected: method.arity(),
            actual: rest.len(),
        });
    }

    Ok((method, rest))
}

/// Read an enumerated-token argument: a symbol, a string, or a quoted symbol.
pub fn literal_token(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Symbol(s) => Some(s.clone()),
        Expr::Str(s) => Some(strip_quotes(s).to_string()),
        Expr::List(items) => match items.as_slice() {
            [Expr::Symbol(q), inner] if q == "quote" => literal_token(inner),
            _ => None,
        },
        Expr::Int(_) | Expr::Float(_) => None,
    }
}

/// Strip enclosing quote characters (`"` and `'`) from a literal.
pub fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"').trim_matches('\'')
}
