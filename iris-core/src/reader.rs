//! S-expression reader.
//!
//! Supports integers, floats, double-quoted strings (with `\"`, `\\`, `\n`,
//! `\t` escapes), symbols, lists, quote (`'x` reads as `(quote x)`) and line
//! comments (`;`).

use crate::error::{Error, Result};
use crate::expr::Expr;

/// Read every top-level form in `input`.
pub fn read_all(input: &str) -> Result<Vec<Expr>> {
    let mut reader = Reader::new(input);
    let mut forms = Vec::new();
    while reader.skip_ws_and_comments() {
        forms.push(reader.read_expr()?);
    }
    Ok(forms)
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.current() {
            self.pos += ch.len_utf8();
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Parse { offset: self.pos, message: message.to_string() }
    }

    /// Returns false at end of input.
    fn skip_ws_and_comments(&mut self) -> bool {
        loop {
            let Some(ch) = self.current() else {
                return false;
            };
            if ch.is_whitespace() {
                self.bump();
                continue;
            }
            if ch == ';' {
                while let Some(c) = self.current() {
                    self.bump();
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            return true;
        }
    }

    fn read_expr(&mut self) -> Result<Expr> {
        self.skip_ws_and_comments();
        let Some(ch) = self.current() else {
            return Err(self.error("unexpected end of input"));
        };

        match ch {
            '(' => self.read_list(),
            ')' => Err(self.error("unexpected ')'")),
            '\'' => {
                self.bump();
                let quoted = self.read_expr()?;
                Ok(Expr::List(vec![Expr::symbol("quote"), quoted]))
            }
            '"' => self.read_string(),
            _ => self.read_atom(),
        }
    }

    fn read_list(&mut self) -> Result<Expr> {
        self.bump(); // (
        let mut items = Vec::new();
        loop {
            if !self.skip_ws_and_comments() {
                return Err(self.error("unterminated list"));
            }
            match self.current() {
                Some(')') => {
                    self.bump();
                    return Ok(Expr::List(items));
                }
                Some(_) => items.push(self.read_expr()?),
                None => return Err(self.error("unterminated list")),
            }
        }
    }

    fn read_string(&mut self) -> Result<Expr> {
        self.bump(); // "
        let mut s = String::new();
        loop {
            let Some(ch) = self.current() else {
                return Err(self.error("unterminated string"));
            };
            self.bump();
            match ch {
                '"' => return Ok(Expr::Str(s)),
                '\\' => {
                    let Some(esc) = self.current() else {
                        return Err(self.error("unterminated escape in string"));
                    };
                    self.bump();
                    match esc {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        other => s.push(other),
                    }
                }
                other => s.push(other),
            }
        }
    }

    fn read_atom(&mut self) -> Result<Expr> {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '\'') {
                break;
            }
            self.bump();
        }
        let token = &self.input[start..self.pos];
        if token.is_empty() {
            return Err(self.error("empty token"));
        }
        if let Ok(i) = token.parse::<i64>() {
            return Ok(Expr::Int(i));
        }
        // Only treat tokens that start like a number as floats so that
        // symbols such as `inf` or `nan` stay symbols.
        let numeric_start = token
            .trim_start_matches(['-', '+'])
            .starts_with(|c: char| c.is_ascii_digit() || c == '.');
        if numeric_start {
            if let Ok(f) = token.parse::<f64>() {
                return Ok(Expr::Float(f));
            }
        }
        Ok(Expr::Symbol(token.to_string()))
    }
}
