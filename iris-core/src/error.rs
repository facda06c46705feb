use thiserror::Error;

/// Boxed error raised by an evaluator extension (special forms, foreign
/// procedures). Carried through the host unchanged so callers can downcast.
pub type ExtensionError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("Unbound symbol: {0}")]
    Unbound(String),

    #[error("Not callable: {0}")]
    NotCallable(String),

    #[error("Arity error in {form}: expected {expected} argument(s), got {actual}")]
    Arity { form: String, expected: usize, actual: usize },

    #[error("Type error in {form}: expected {expected}, got {actual}")]
    Type { form: String, expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Extension(ExtensionError),
}

impl Error {
    /// Downcast an extension error back to its concrete type.
    pub fn extension<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Extension(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
