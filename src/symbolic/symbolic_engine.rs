//! # Symbolic Engine Module
//!
//! The `Formula` façade ties the passes together for a UI that edits one formula at a time.
//!
//! ## Purpose
//!
//! A `Formula` always holds a *valid* state: the source text, its tree and the GLSL
//! fragment lowered from it for the current [`InputMode`]. Edits go through
//! [`Formula::update`], which parses and lowers the new text and only swaps it in when
//! both steps succeed; otherwise the previous tree and shader stay active and the error
//! is handed back so the UI can show `error.kind().message()` next to the input field.
//!
//! ## Key Methods
//! - `new(text, mode)` - parse + lower, fails when the first formula is invalid
//! - `update(text)` - replace the formula, keeping the previous one on error
//! - `set_mode(mode)` - re-lower for another variable whitelist
//! - `evaluate(bindings)` / `evaluate_with_state(bindings, state)` - numeric value
//! - `derivative(var)` - simplified symbolic derivative
//! - `shader(template)` - the fragment spliced into a shader template
use crate::Utils::config::EngineConfig;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine_derivatives::{differentiate, newton_step_tree};
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_eval::{Bindings, IterationState, evaluate, evaluate_with_state};
use crate::symbolic::symbolic_glsl::{InputMode, lower, splice_into_template};
use crate::symbolic::symbolic_simplify::simplify_to_fixpoint;
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::Tree;
use log::warn;
use num_complex::Complex64;

#[derive(Clone, Debug, PartialEq)]
pub struct Formula<N = Complex64> {
    source: String,
    tree: Tree<N>,
    glsl: String,
    mode: InputMode,
    simplify_passes: usize,
}

impl<N: ExprScalar> Formula<N> {
    pub fn new(text: &str, mode: InputMode) -> Result<Self, ExprError> {
        let (tree, glsl) = Self::compile(text, mode)?;
        Ok(Formula {
            source: text.to_string(),
            tree,
            glsl,
            mode,
            simplify_passes: EngineConfig::default().simplify_passes,
        })
    }

    /// mode and simplification budget taken from `config`
    pub fn with_config(text: &str, config: &EngineConfig) -> Result<Self, ExprError> {
        let mut formula = Formula::new(text, config.input_mode)?;
        formula.simplify_passes = config.simplify_passes;
        Ok(formula)
    }

    fn compile(text: &str, mode: InputMode) -> Result<(Tree<N>, String), ExprError> {
        let tree = parse_expression(text)?;
        let glsl = lower(&tree, mode)?;
        Ok((tree, glsl))
    }

    /// Replaces the formula with `text`. On error nothing changes.
    pub fn update(&mut self, text: &str) -> Result<(), ExprError> {
        match Self::compile(text, self.mode) {
            Ok((tree, glsl)) => {
                self.source = text.to_string();
                self.tree = tree;
                self.glsl = glsl;
                Ok(())
            }
            Err(err) => {
                warn!("keeping formula '{}', rejected '{}': {}", self.source, text, err);
                Err(err)
            }
        }
    }

    /// Switches the variable whitelist. Fails, keeping the old mode, when the current
    /// formula uses a name the new mode does not allow.
    pub fn set_mode(&mut self, mode: InputMode) -> Result<(), ExprError> {
        match lower(&self.tree, mode) {
            Ok(glsl) => {
                self.mode = mode;
                self.glsl = glsl;
                Ok(())
            }
            Err(err) => {
                warn!("keeping {} mode for '{}': {}", self.mode, self.source, err);
                Err(err)
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree<N> {
        &self.tree
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// the lowered GLSL expression
    pub fn glsl(&self) -> &str {
        &self.glsl
    }

    /// full shader source: `template` with the formula (and the prelude) spliced in
    pub fn shader(&self, template: &str) -> Result<String, ExprError> {
        splice_into_template(template, &self.glsl)
    }

    pub fn evaluate(&self, bindings: &Bindings<N>) -> Result<N, ExprError> {
        evaluate(&self.tree, bindings)
    }

    pub fn evaluate_with_state(
        &self,
        bindings: &Bindings<N>,
        state: &IterationState<N>,
    ) -> Result<N, ExprError> {
        evaluate_with_state(&self.tree, bindings, state)
    }

    /// derivative with respect to `var`, simplified
    pub fn derivative(&self, var: &str) -> Result<Tree<N>, ExprError> {
        let mut derivative = differentiate(&self.tree, var)?;
        simplify_to_fixpoint(&mut derivative, self.simplify_passes);
        Ok(derivative)
    }

    /// the Newton map `var - f/f'` of this formula
    pub fn newton_map(&self, var: &str) -> Result<Tree<N>, ExprError> {
        newton_step_tree(&self.tree, var)
    }
}
