//! Special form registry
//!
//! Associates each vision operator symbol with its form, validated once at
//! construction and read-only afterwards.

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::forms::{FormContext, FormKind, FormSpec};
use crate::session::CaptureSession;
use iris_core::{Env, Evaluator, Expr, Interpreter, SpecialForm};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};

/// Operator symbols.
pub mod symbols {
    pub const OPEN_CAPTURE: &str = "open-capture";
    pub const SHOW_BUFFER: &str = "show-buffer";
    pub const CONVERT_COLOR: &str = "convert-color";
    pub const THRESHOLD_RANGE: &str = "threshold-range";
    pub const DETECT_AND_ANNOTATE_CONTOURS: &str = "detect-and-annotate-contours";
}

const BUILTIN: [(&str, FormKind); 5] = [
    (symbols::OPEN_CAPTURE, FormKind::OpenCapture),
    (symbols::SHOW_BUFFER, FormKind::ShowBuffer),
    (symbols::CONVERT_COLOR, FormKind::ConvertColor),
    (symbols::THRESHOLD_RANGE, FormKind::ThresholdRange),
    (symbols::DETECT_AND_ANNOTATE_CONTOURS, FormKind::DetectAndAnnotateContours),
];

/// Special form registry
pub struct SpecialFormRegistry {
    /// Symbol to form
    forms: BTreeMap<&'static str, FormKind>,
    /// Settings and capture session shared by every installed form
    context: FormContext,
}

impl SpecialFormRegistry {
    /// Create a registry holding every vision form.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;

        let mut registry = Self {
            forms: BTreeMap::new(),
            context: FormContext::new(config),
        };
        for (symbol, kind) in BUILTIN {
            registry.register(symbol, kind)?;
        }

        info!("Special form registry ready with {} form(s)", registry.forms.len());
        Ok(registry)
    }

    fn register(&mut self, symbol: &'static str, kind: FormKind) -> Result<(), VisionError> {
        if self.forms.contains_key(symbol) {
            return Err(VisionError::Config(format!(
                "Special form '{}' already registered",
                symbol
            )));
        }
        if let Some((existing, _)) = self.forms.iter().find(|(_, k)| **k == kind) {
            return Err(VisionError::Config(format!(
                "Handler for '{}' already registered under '{}'",
                symbol, existing
            )));
        }

        self.forms.insert(symbol, kind);
        debug!("Registered special form '{}'", symbol);
        Ok(())
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.forms.keys().copied()
    }

    pub fn get(&self, symbol: &str) -> Option<FormKind> {
        self.forms.get(symbol).copied()
    }

    /// Argument policy of a registered form.
    pub fn spec(&self, symbol: &str) -> Option<&'static FormSpec> {
        self.get(symbol).map(FormKind::spec)
    }

    pub fn config(&self) -> &VisionConfig {
        &self.context.config
    }

    /// Captures opened by the installed forms, for release at teardown.
    pub fn session(&self) -> Rc<CaptureSession> {
        Rc::clone(&self.context.session)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Host-callable closures for every registered form.
    pub fn special_forms(&self) -> Vec<(String, SpecialForm)> {
        self.forms
            .iter()
            .map(|(symbol, kind)| {
                let kind = *kind;
                let context = self.context.clone();
                let form: SpecialForm = Rc::new(
                    move |tail: &[Expr], env: &Env, evaluator: &dyn Evaluator| {
                        kind.evaluate(tail, env, evaluator, &context)
                            .map_err(iris_core::Error::from)
                    },
                );
                (symbol.to_string(), form)
            })
            .collect()
    }

    /// Merge every form into the interpreter's dispatch table.
    pub fn install(&self, interpreter: &mut Interpreter) -> Result<(), VisionError> {
        interpreter.register_forms(self.special_forms())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_holds_all_forms() {
        let registry = SpecialFormRegistry::new(VisionConfig::default()).unwrap();
        let symbols: Vec<_> = registry.symbols().collect();
        assert_eq!(
            symbols,
            vec![
                "convert-color",
                "detect-and-annotate-contours",
                "open-capture",
                "show-buffer",
                "threshold-range",
            ]
        );
        assert_eq!(registry.get("show-buffer"), Some(FormKind::ShowBuffer));
        assert_eq!(registry.spec("threshold-range").unwrap().arity(), 7);
        assert!(registry.get("imshow").is_none());
    }

    #[test]
    fn test_symbol_matches_form_name() {
        let registry = SpecialFormRegistry::new(VisionConfig::default()).unwrap();
        for symbol in registry.symbols() {
            assert_eq!(registry.spec(symbol).unwrap().name, symbol);
        }
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut registry = SpecialFormRegistry::new(VisionConfig::default()).unwrap();
        let result = registry.register(symbols::OPEN_CAPTURE, FormKind::OpenCapture);
        assert!(matches!(result, Err(VisionError::Config(_))));
    }

    #[test]
    fn test_handler_under_second_symbol_rejected() {
        let mut registry = SpecialFormRegistry::new(VisionConfig::default()).unwrap();
        let result = registry.register("capture", FormKind::OpenCapture);
        match result {
            Err(VisionError::Config(msg)) => assert!(msg.contains("open-capture")),
            other => panic!("Expected Config error, got {:?}", other),
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VisionConfig {
            max_polygon_vertices: 2,
            ..VisionConfig::default()
        };
        assert!(matches!(
            SpecialFormRegistry::new(config),
            Err(VisionError::Config(_))
        ));
    }

    #[test]
    fn test_install_into_interpreter() {
        let registry = SpecialFormRegistry::new(VisionConfig::default()).unwrap();
        let mut interp = Interpreter::new();
        registry.install(&mut interp).unwrap();
        for symbol in registry.symbols() {
            assert!(interp.has_form(symbol));
        }
        // a second install clashes with the first
        assert!(registry.install(&mut interp).is_err());
    }
}
