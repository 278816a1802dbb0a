//! # Symbolic Derivatives Module
//!
//! Structural differentiation of an expression tree with respect to one variable.
//!
//! ## Purpose
//!
//! - **Analytical Differentiation**: `differentiate(tree, var)` builds `d tree / d var`
//!   as a new tree, rule by rule over the node kind. The result is not simplified; run
//!   [`crate::symbolic::symbolic_simplify::simplify`] over it when a readable form is needed
//! - **Higher derivatives**: `nth_derivative` differentiates and simplifies repeatedly
//! - **Newton formulas**: `newton_step_tree(f, var)` builds `var - f/f'`, the iteration
//!   map of Newton fractals
//! - **Numerical Validation**: `compare_with_numerical` checks an analytical derivative
//!   against a central difference along the real axis
//!
//! ## Rules
//!
//! - sum, difference, unary minus: linear
//! - product rule, quotient rule
//! - power: `d(L^R) = L^R (R' ln L + R L'/L)`, with the two cheaper forms used when one
//!   side does not depend on `var` (`R L^(R-1) L'` and `L^R ln(L) R'`)
//! - every catalogue function has its own chain-rule formula
//!
//! Subtrees of the input are cloned into the result, never shared, so the input and the
//! derivative can be simplified independently.
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_eval::{Bindings, IterationState, evaluate_with_state};
use crate::symbolic::symbolic_registry::{Function, Operation};
use crate::symbolic::symbolic_simplify::{simplify, simplify_to_fixpoint};
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::{NodeValue, Tree};

/// Computes the analytical derivative of `tree` with respect to `var`.
///
/// Fails only on hand-built nodes whose child count does not fit their kind, or on the
/// `ERROR` sentinels of the registry.
///
/// # Examples
/// ```rust, ignore
/// let f: Tree<Complex64> = parse_expression("sin(x)")?;
/// let df = differentiate(&f, "x")?; // (cos(x)*1)
/// ```
pub fn differentiate<N: ExprScalar>(tree: &Tree<N>, var: &str) -> Result<Tree<N>, ExprError> {
    match tree.value() {
        NodeValue::Number(_) => Ok(Tree::zero()),
        NodeValue::Variable(name) => {
            if name == var {
                Ok(Tree::one())
            } else {
                Ok(Tree::zero())
            }
        }
        NodeValue::Operation(op) => match tree.branches() {
            [operand] => Ok(-differentiate(operand, var)?),
            [left, right] => diff_operation(*op, left, right, var),
            other => Err(ExprError::MalformedNode { arity: other.len() }),
        },
        NodeValue::Function(func) => match tree.branches() {
            [argument] => diff_function(*func, argument, var),
            other => Err(ExprError::MalformedNode { arity: other.len() }),
        },
    }
} // end of differentiate

fn diff_operation<N: ExprScalar>(
    op: Operation,
    l: &Tree<N>,
    r: &Tree<N>,
    var: &str,
) -> Result<Tree<N>, ExprError> {
    let dl = differentiate(l, var)?;
    let dr = differentiate(r, var)?;
    let derivative = match op {
        Operation::Add => dl + dr,
        Operation::Sub => dl - dr,
        Operation::Mul => dl * r.clone() + l.clone() * dr,
        Operation::Div => (dl * r.clone() - l.clone() * dr) / r.clone().pow(Tree::real(2.0)),
        Operation::Pow => {
            let base_depends = l.contains_variable(var);
            let exponent_depends = r.contains_variable(var);
            if !exponent_depends {
                // R L^(R-1) L'
                r.clone() * l.clone().pow(r.clone() - Tree::one()) * dl
            } else if !base_depends {
                // L^R ln(L) R'
                l.clone().pow(r.clone()) * Tree::function(Function::Log, l.clone()) * dr
            } else {
                l.clone().pow(r.clone())
                    * (dr * Tree::function(Function::Log, l.clone())
                        + r.clone() * dl / l.clone())
            }
        }
        Operation::ERROR => return Err(ExprError::MalformedNode { arity: 2 }),
    };
    Ok(derivative)
}

fn diff_function<N: ExprScalar>(
    func: Function,
    u: &Tree<N>,
    var: &str,
) -> Result<Tree<N>, ExprError> {
    let du = differentiate(u, var)?;
    let f = |function: Function| Tree::function(function, u.clone());
    let square = |t: Tree<N>| t.pow(Tree::real(2.0));
    let u_squared = || square(u.clone());
    let derivative = match func {
        Function::Sin => f(Function::Cos) * du,
        Function::Cos => -f(Function::Sin) * du,
        Function::Tan => du / square(f(Function::Cos)),
        Function::Cot => -(du / square(f(Function::Sin))),
        Function::Asin => du / Tree::function(Function::Sqrt, Tree::one() - u_squared()),
        Function::Acos => (-du) / Tree::function(Function::Sqrt, Tree::one() - u_squared()),
        Function::Atan => du / (Tree::one() + u_squared()),
        Function::Acot => (-du) / (Tree::one() + u_squared()),
        Function::Sinh => f(Function::Cosh) * du,
        Function::Cosh => f(Function::Sinh) * du,
        Function::Tanh => du / square(f(Function::Cosh)),
        Function::Coth => -(du / square(f(Function::Sinh))),
        Function::Asinh => du / Tree::function(Function::Sqrt, u_squared() + Tree::one()),
        Function::Acosh => {
            du / (Tree::function(Function::Sqrt, u.clone() - Tree::one())
                * Tree::function(Function::Sqrt, u.clone() + Tree::one()))
        }
        Function::Atanh => du / (Tree::one() - u_squared()),
        Function::Exp => f(Function::Exp) * du,
        Function::Log => du / u.clone(),
        Function::Sqrt => du / (Tree::real(2.0) * f(Function::Sqrt)),
        // |u|' = re(conj(u) u') / |u|
        Function::Abs => {
            Tree::function(Function::Re, f(Function::Conj) * du) / f(Function::Abs)
        }
        // arg(u)' = im(u'/u)
        Function::Arg => Tree::function(Function::Im, du / u.clone()),
        Function::Re => Tree::function(Function::Re, du),
        Function::Im => Tree::function(Function::Im, du),
        Function::Conj => Tree::function(Function::Conj, du),
        Function::ERROR => {
            return Err(ExprError::UnidentifiedFunction {
                name: func.token().to_string(),
            });
        }
    };
    Ok(derivative)
}

/// `n`-th derivative; every intermediate result is simplified to keep the trees small.
pub fn nth_derivative<N: ExprScalar>(
    tree: &Tree<N>,
    var: &str,
    n: usize,
) -> Result<Tree<N>, ExprError> {
    let mut current = tree.clone();
    for _ in 0..n {
        current = differentiate(&current, var)?;
        simplify(&mut current);
    }
    Ok(current)
}

/// Builds the Newton iteration map `var - f/f'` for `f`.
pub fn newton_step_tree<N: ExprScalar>(f: &Tree<N>, var: &str) -> Result<Tree<N>, ExprError> {
    let mut df = differentiate(f, var)?;
    simplify_to_fixpoint(&mut df, 16);
    let mut step = Tree::variable(var) - f.clone() / df;
    simplify_to_fixpoint(&mut step, 16);
    Ok(step)
}

/// Compares the analytical derivative of `tree` with a central difference at the real
/// points `xs`. Returns the largest absolute deviation.
pub fn compare_with_numerical<N: ExprScalar>(
    tree: &Tree<N>,
    var: &str,
    bindings: &Bindings<N>,
    xs: &[f64],
    step: f64,
) -> Result<f64, ExprError> {
    let derivative = differentiate(tree, var)?;
    let mut state = IterationState::new();
    let mut eval_at = |t: &Tree<N>, x: f64| -> Result<N, ExprError> {
        state.set(var, N::from_real(x));
        evaluate_with_state(t, bindings, &state)
    };
    let mut max_deviation = 0.0f64;
    for &x in xs {
        let analytical = eval_at(&derivative, x)?;
        let forward = eval_at(tree, x + step)?;
        let backward = eval_at(tree, x - step)?;
        let numerical = (forward - backward) / N::from_real(2.0 * step);
        let deviation = (analytical - numerical).norm_sqr().sqrt();
        max_deviation = max_deviation.max(deviation);
    }
    Ok(max_deviation)
}
