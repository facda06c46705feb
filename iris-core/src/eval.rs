//! Evaluator trait and the reference interpreter

use crate::env::Env;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::reader::read_all;
use crate::value::Value;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Entry point handlers use to resolve nested sub-expressions.
pub trait Evaluator {
    fn eval(&self, expr: &Expr, env: &Env) -> Result<Value>;
}

/// Handler for an operator that receives its sub-expressions unevaluated.
pub type SpecialForm = Rc<dyn Fn(&[Expr], &Env, &dyn Evaluator) -> Result<Value>>;

/// Forms built into the host evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostForm {
    Define,
    Quote,
    Begin,
    Repeat,
}

impl HostForm {
    const ALL: [HostForm; 4] = [HostForm::Define, HostForm::Quote, HostForm::Begin, HostForm::Repeat];

    fn name(self) -> &'static str {
        match self {
            HostForm::Define => "define",
            HostForm::Quote => "quote",
            HostForm::Begin => "begin",
            HostForm::Repeat => "repeat",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Reference evaluator with a pluggable special-form table.
#[derive(Default)]
pub struct Interpreter {
    forms: BTreeMap<String, SpecialForm>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a special form under `name`.
    ///
    /// Fails if `name` is already taken, either by another registered form or
    /// by a built-in host form.
    pub fn register_form(&mut self, name: impl Into<String>, handler: SpecialForm) -> Result<()> {
        let name = name.into();
        if HostForm::lookup(&name).is_some() || self.forms.contains_key(&name) {
            return Err(Error::Configuration(format!(
                "special form '{}' already registered",
                name
            )));
        }
        debug!("Registered special form {}", name);
        self.forms.insert(name, handler);
        Ok(())
    }

    /// Merge a table of special forms into the dispatch table.
    pub fn register_forms<I>(&mut self, forms: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, SpecialForm)>,
    {
        for (name, handler) in forms {
            self.register_form(name, handler)?;
        }
        Ok(())
    }

    pub fn has_form(&self, name: &str) -> bool {
        HostForm::lookup(name).is_some() || self.forms.contains_key(name)
    }

    /// Names of the registered (non-host) special forms, sorted.
    pub fn form_names(&self) -> Vec<&str> {
        self.forms.keys().map(String::as_str).collect()
    }

    /// Read and evaluate every form in `source`, returning the last value.
    pub fn eval_source(&self, source: &str, env: &Env) -> Result<Value> {
        let mut last = Value::Nil;
        for form in read_all(source)? {
            last = self.eval(&form, env)?;
        }
        Ok(last)
    }

    fn eval_list(&self, items: &[Expr], env: &Env) -> Result<Value> {
        let Some((head, tail)) = items.split_first() else {
            return Ok(Value::Nil);
        };

        if let Some(name) = head.as_symbol() {
            if let Some(form) = HostForm::lookup(name) {
                return self.eval_host_form(form, tail, env);
            }
            if let Some(handler) = self.forms.get(name) {
                trace!("Dispatching special form {}", name);
                return handler(tail, env, self);
            }
        }

        match self.eval(head, env)? {
            Value::Procedure(procedure) => procedure.apply(tail, env, self),
            other => Err(Error::NotCallable(other.to_string())),
        }
    }

    fn eval_host_form(&self, form: HostForm, tail: &[Expr], env: &Env) -> Result<Value> {
        match form {
            HostForm::Define => {
                check_arity(form.name(), 2, tail)?;
                let name = tail[0].as_symbol().ok_or_else(|| Error::Type {
                    form: form.name().to_string(),
                    expected: "symbol".to_string(),
                    actual: tail[0].kind().to_string(),
                })?;
                let value = self.eval(&tail[1], env)?;
                env.define(name, value);
                Ok(Value::Nil)
            }
            HostForm::Quote => {
                check_arity(form.name(), 1, tail)?;
                Ok(Value::quoted(&tail[0]))
            }
            HostForm::Begin => {
                let mut last = Value::Nil;
                for expr in tail {
                    last = self.eval(expr, env)?;
                }
                Ok(last)
            }
            HostForm::Repeat => {
                let Some((count, body)) = tail.split_first() else {
                    return Err(Error::Arity {
                        form: form.name().to_string(),
                        expected: 1,
                        actual: 0,
                    });
                };
                let count = match self.eval(count, env)? {
                    Value::Int(n) if n >= 0 => n,
                    other => {
                        return Err(Error::Type {
                            form: form.name().to_string(),
                            expected: "non-negative integer".to_string(),
                            actual: other.to_string(),
                        })
                    }
                };
                let mut last = Value::Nil;
                for _ in 0..count {
                    for expr in body {
                        last = self.eval(expr, env)?;
                    }
                }
                Ok(last)
            }
        }
    }
}

impl Evaluator for Interpreter {
    fn eval(&self, expr: &Expr, env: &Env) -> Result<Value> {
        match expr {
            Expr::Symbol(name) => env.lookup(name),
            Expr::List(items) => self.eval_list(items, env),
            literal => Ok(Value::from_literal(literal).unwrap_or(Value::Nil)),
        }
    }
}

fn check_arity(form: &str, expected: usize, tail: &[Expr]) -> Result<()> {
    if tail.len() != expected {
        return Err(Error::Arity {
            form: form.to_string(),
            expected,
            actual: tail.len(),
        });
    }
    Ok(())
}
