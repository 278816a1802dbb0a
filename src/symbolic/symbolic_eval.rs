//! # Evaluation
//!
//! Post-order walk computing the value of a tree for given variable values.
//!
//! Two sources of values are consulted, in this order:
//! 1. [`IterationState`] - an explicit `name -> value` map for per-iteration state
//!    (the iterate `z` of `z_{n+1} = f(z_n)`, the pixel `c`, ...), owned and updated by
//!    the caller that runs the iteration loop;
//! 2. [`Bindings`] - an ordered list of `(name, value)` pairs where the *last* entry with a
//!    matching name wins, so later bindings shadow earlier ones.
//!
//! A name found in neither is an `UNIDENTIFIED_VARIABLE` error; nothing is silently
//! substituted. Singular inputs (division by zero, `log(0)`, overflow) are not errors:
//! NaN and infinities propagate, divergence is meaningful output for escape-time rendering.
//!
//! The evaluator never mutates the tree, so one tree can be shared read-only between
//! threads, each with its own bindings and state.
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_registry::{Function, Operation};
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::{NodeValue, Tree};
use std::collections::HashMap;

/// ordered `(name, value)` pairs, resolved by last match
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings<N> {
    entries: Vec<(String, N)>,
}

impl<N: ExprScalar> Bindings<N> {
    pub fn new() -> Self {
        Bindings {
            entries: Vec::new(),
        }
    }

    /// bindings pre-filled with `pi`, `e` and (for complex scalars) `i`
    pub fn with_constants() -> Self {
        let mut bindings = Bindings::new();
        for name in ["pi", "e", "i"] {
            if let Some(value) = N::named_constant(name) {
                bindings.bind(name, value);
            }
        }
        bindings
    }

    pub fn from_pairs(pairs: &[(&str, N)]) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in pairs {
            bindings.bind(name, *value);
        }
        bindings
    }

    /// appends a binding; it shadows any earlier one with the same name
    pub fn bind(&mut self, name: &str, value: N) -> &mut Self {
        self.entries.push((name.to_string(), value));
        self
    }

    /// removes the most recent binding, uncovering what it shadowed
    pub fn unbind_last(&mut self) -> Option<(String, N)> {
        self.entries.pop()
    }

    pub fn lookup(&self, name: &str) -> Option<N> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, N)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// Per-iteration values, looked up before [`Bindings`]. Unlike bindings a name holds
/// exactly one value; `set` overwrites it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IterationState<N> {
    values: HashMap<String, N>,
}

impl<N: ExprScalar> IterationState<N> {
    pub fn new() -> Self {
        IterationState {
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: N) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<N> {
        self.values.get(name).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<N> {
        self.values.remove(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Evaluates `tree` with the given bindings.
pub fn evaluate<N: ExprScalar>(tree: &Tree<N>, bindings: &Bindings<N>) -> Result<N, ExprError> {
    eval_node(tree, bindings, None)
}

/// Evaluates `tree`, resolving names in `state` first and in `bindings` second.
pub fn evaluate_with_state<N: ExprScalar>(
    tree: &Tree<N>,
    bindings: &Bindings<N>,
    state: &IterationState<N>,
) -> Result<N, ExprError> {
    eval_node(tree, bindings, Some(state))
}

fn eval_node<N: ExprScalar>(
    tree: &Tree<N>,
    bindings: &Bindings<N>,
    state: Option<&IterationState<N>>,
) -> Result<N, ExprError> {
    match tree.value() {
        NodeValue::Number(n) => Ok(*n),
        NodeValue::Variable(name) => state
            .and_then(|s| s.get(name))
            .or_else(|| bindings.lookup(name))
            .ok_or_else(|| ExprError::UnidentifiedVariable { name: name.clone() }),
        NodeValue::Operation(op) => match tree.branches() {
            [operand] => Ok(eval_node(operand, bindings, state)?.negated()),
            [left, right] => {
                let l = eval_node(left, bindings, state)?;
                let r = eval_node(right, bindings, state)?;
                apply_operation(*op, l, r).ok_or(ExprError::MalformedNode { arity: 2 })
            }
            other => Err(ExprError::MalformedNode { arity: other.len() }),
        },
        NodeValue::Function(func) => {
            let argument = match tree.branches() {
                [argument] => argument,
                other => return Err(ExprError::MalformedNode { arity: other.len() }),
            };
            if *func == Function::ERROR {
                return Err(ExprError::UnidentifiedFunction {
                    name: func.token().to_string(),
                });
            }
            Ok(eval_node(argument, bindings, state)?.apply(*func))
        }
    }
}

/// `None` only for the `ERROR` sentinel
pub fn apply_operation<N: ExprScalar>(op: Operation, left: N, right: N) -> Option<N> {
    match op {
        Operation::Add => Some(left + right),
        Operation::Sub => Some(left - right),
        Operation::Mul => Some(left * right),
        Operation::Div => Some(left / right),
        Operation::Pow => Some(left.pow(right)),
        Operation::ERROR => None,
    }
}

/// Turns `tree` into a closure of one variable, the way an iteration step `z -> f(z)`
/// is called: every call evaluates with `var` set in a fresh [`IterationState`].
pub fn lambdify<'a, N: ExprScalar>(
    tree: &'a Tree<N>,
    var: &'a str,
    bindings: &'a Bindings<N>,
) -> impl Fn(N) -> Result<N, ExprError> + 'a {
    move |value: N| {
        let mut state = IterationState::new();
        state.set(var, value);
        evaluate_with_state(tree, bindings, &state)
    }
}
