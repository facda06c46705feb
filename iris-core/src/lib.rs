//! iris-core: host evaluator surface for iris
//!
//! Value and expression model, reader, environment frames and the
//! reference interpreter that special-form extensions plug into.

pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod expr;
pub mod reader;
pub mod value;

pub use config::{ConfigError, IrisConfig, LogConfig};
pub use env::{Env, Environment};
pub use error::{Error, ExtensionError, Result};
pub use eval::{Evaluator, Interpreter, SpecialForm};
pub use expr::Expr;
pub use reader::read_all;
pub use value::{Procedure, Value};
