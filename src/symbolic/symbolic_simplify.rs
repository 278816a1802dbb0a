//! # Symbolic Expression Simplification Module
//!
//! Bottom-up local rewriting of an expression tree, in place.
//!
//! ## Simplification Strategy
//!
//! Children are simplified before their parent, then the parent is rewritten once:
//!
//! 1. **Constant Folding**: a node whose children are all numbers becomes a number, as long
//!    as the result is finite (`1/0` and `log(0)` stay symbolic). Unary minus of a number
//!    always folds
//! 2. **Additive identities**: `x+0`, `0+x`, `x-0` become `x`; `0-x` becomes `-x`;
//!    `-(-x)` becomes `x`
//! 3. **Multiplicative identities**: `x*1`, `1*x`, `x/1` become `x`; `x*0`, `0*x` become `0`;
//!    `x*(-1)`, `(-1)*x`, `x/(-1)` become `-x`
//! 4. **Self-combination** (structural equality): `x+x -> 2*x`, `x-x -> 0`, `x*x -> x^2`,
//!    `x/x -> 1`
//! 5. **Power Rules**: `x^0 -> 1`, `0^x -> 0`, `1^x -> 1`, `x^1 -> x`, `x^(-1) -> 1/x`,
//!    `(a^b)^c -> a^(b*c)` with `b*c` simplified again
//!
//! A rewritten node is not rewritten a second time in the same pass, so some expressions
//! need more than one pass: `(x^2)^0.5` gives `x^1` after the first and `x` after the
//! second. [`simplify_to_fixpoint`] repeats passes until nothing changes.
//!
//! This is a fixed rule set, not a normal form: `x+1-(1+x)` stays as it is.
use crate::symbolic::symbolic_eval::apply_operation;
use crate::symbolic::symbolic_registry::{Function, Operation};
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::{NodeValue, Tree};

/// One simplification pass over `tree`.
pub fn simplify<N: ExprScalar>(tree: &mut Tree<N>) {
    for branch in tree.branches_mut() {
        simplify(branch);
    }
    let node = std::mem::replace(tree, Tree::zero());
    *tree = rewrite(node);
}

/// Repeats [`simplify`] until the tree stops changing or `max_passes` passes have run.
/// Returns the number of passes that changed the tree.
pub fn simplify_to_fixpoint<N: ExprScalar>(tree: &mut Tree<N>, max_passes: usize) -> usize {
    let mut changed = 0;
    for _ in 0..max_passes {
        let before = tree.clone();
        simplify(tree);
        if *tree == before {
            break;
        }
        changed += 1;
    }
    changed
}

fn rewrite<N: ExprScalar>(node: Tree<N>) -> Tree<N> {
    if let Some(value) = fold_constants(&node) {
        return Tree::number(value);
    }
    let (value, branches) = node.into_parts();
    match value {
        NodeValue::Operation(op) => match <[Tree<N>; 2]>::try_from(branches) {
            Ok([left, right]) => rewrite_binary(op, left, right),
            Err(branches) => match <[Tree<N>; 1]>::try_from(branches) {
                Ok([operand]) => negate(operand),
                Err(branches) => Tree::with_branches(NodeValue::Operation(op), branches),
            },
        },
        other => Tree::with_branches(other, branches),
    }
}

fn fold_constants<N: ExprScalar>(node: &Tree<N>) -> Option<N> {
    if node.is_leaf() {
        return None;
    }
    let values = node
        .branches()
        .iter()
        .map(|b| b.as_number())
        .collect::<Option<Vec<N>>>()?;
    let folded = match (node.value(), values.as_slice()) {
        (NodeValue::Operation(_), [v]) => return Some(v.negated()),
        (NodeValue::Operation(op), [l, r]) => apply_operation(*op, *l, *r)?,
        (NodeValue::Function(func), [v]) if *func != Function::ERROR => v.apply(*func),
        _ => return None,
    };
    if folded.is_finite() { Some(folded) } else { None }
}

fn negate<N: ExprScalar>(tree: Tree<N>) -> Tree<N> {
    if let Some(n) = tree.as_number() {
        return Tree::number(n.negated());
    }
    if !tree.is_negation() {
        return Tree::negation(tree);
    }
    // -(-x) -> x
    let (value, branches) = tree.into_parts();
    match <[Tree<N>; 1]>::try_from(branches) {
        Ok([inner]) => inner,
        Err(branches) => Tree::negation(Tree::with_branches(value, branches)),
    }
}

fn rewrite_binary<N: ExprScalar>(op: Operation, l: Tree<N>, r: Tree<N>) -> Tree<N> {
    match op {
        Operation::Add => {
            if r.is_zero() {
                l
            } else if l.is_zero() {
                r
            } else if l == r {
                Tree::real(2.0) * l
            } else {
                l + r
            }
        }
        Operation::Sub => {
            if r.is_zero() {
                l
            } else if l.is_zero() {
                negate(r)
            } else if l == r {
                Tree::zero()
            } else {
                l - r
            }
        }
        Operation::Mul => {
            if l.is_zero() || r.is_zero() {
                Tree::zero()
            } else if r.is_one() {
                l
            } else if l.is_one() {
                r
            } else if r.is_minus_one() {
                negate(l)
            } else if l.is_minus_one() {
                negate(r)
            } else if l == r {
                l.pow(Tree::real(2.0))
            } else {
                l * r
            }
        }
        Operation::Div => {
            if r.is_one() {
                l
            } else if r.is_minus_one() {
                negate(l)
            } else if l == r {
                Tree::one()
            } else {
                l / r
            }
        }
        Operation::Pow => rewrite_power(l, r),
        Operation::ERROR => Tree::binary(op, l, r),
    }
}

fn rewrite_power<N: ExprScalar>(base: Tree<N>, exponent: Tree<N>) -> Tree<N> {
    if exponent.is_zero() {
        return Tree::one();
    }
    if base.is_zero() {
        return Tree::zero();
    }
    if base.is_one() {
        return Tree::one();
    }
    if exponent.is_one() {
        return base;
    }
    if exponent.is_minus_one() {
        return Tree::one() / base;
    }
    let nested = matches!(base.value(), NodeValue::Operation(Operation::Pow))
        && base.num_branches() == 2;
    if !nested {
        return base.pow(exponent);
    }
    // (a^b)^c -> a^(b*c)
    let (value, branches) = base.into_parts();
    match <[Tree<N>; 2]>::try_from(branches) {
        Ok([a, b]) => {
            let mut new_exponent = b * exponent;
            simplify(&mut new_exponent);
            a.pow(new_exponent)
        }
        Err(branches) => Tree::with_branches(value, branches).pow(exponent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression;
    use crate::symbolic::symbolic_eval::{Bindings, evaluate};
    use num_complex::Complex64;

    fn simplified(input: &str) -> String {
        let mut t: Tree<Complex64> = parse_expression(input).unwrap();
        simplify(&mut t);
        t.to_string()
    }

    #[test]
    fn test_identity_collapses_to_variable() {
        let mut t: Tree<Complex64> = parse_expression("x*1+0").unwrap();
        simplify(&mut t);
        assert_eq!(t, Tree::variable("x"));
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(simplified("2*3+x"), "(6+x)");
        assert_eq!(simplified("2^3^2"), "512");
        assert_eq!(simplified("-2"), "(-2)");
        assert_eq!(simplified("1i*1i"), "(-1)");
        // singular results stay symbolic
        assert_eq!(simplified("1/0"), "(1/0)");
        assert_eq!(simplified("log(0)"), "log(0)");
    }

    #[test]
    fn test_function_folding() {
        assert_eq!(simplified("sqrt(4)+sin(0)"), "2");
        assert_eq!(simplified("exp(0)*z"), "z");
        assert_eq!(simplified("sqrt(-4)"), "2i");
        assert_eq!(simplified("cosh(0.5i)"), format!("{}", 0.5f64.cos()));
        assert_eq!(simplified("conj(2i)+x"), "((-2i)+x)");
    }

    #[test]
    fn test_negation_keeps_the_value() {
        let b = Bindings::from_pairs(&[("x", Complex64::new(4.0, 0.0))]);
        for input in ["sqrt(0-x)", "sqrt(0-4)", "log(0-1)", "(0-1)^0.5", "sqrt(x*(-1))"] {
            let raw: Tree<Complex64> = parse_expression(input).unwrap();
            let mut t = raw.clone();
            simplify_to_fixpoint(&mut t, 8);
            assert_eq!(evaluate(&t, &b).unwrap(), evaluate(&raw, &b).unwrap(), "{}", input);
        }
    }

    #[test]
    fn test_additive() {
        assert_eq!(simplified("x+0"), "x");
        assert_eq!(simplified("0+x"), "x");
        assert_eq!(simplified("x-0"), "x");
        assert_eq!(simplified("0-x"), "(-x)");
        assert_eq!(simplified("x-x"), "0");
    }

    #[test]
    fn test_double_negation() {
        assert_eq!(simplified("-(-x)"), "x");
        assert_eq!(simplified("0-(-x)"), "x");
        assert_eq!(simplified("(-sin(z))*(-1)"), "sin(z)");
        assert_eq!(simplified("-(-(-x))"), "(-x)");
        let odd: Tree<Complex64> =
            Tree::with_branches(NodeValue::Operation(Operation::Add), vec![Tree::variable("x")]);
        let mut t = -odd;
        simplify(&mut t);
        assert_eq!(t, Tree::variable("x"));
    }

    #[test]
    fn test_multiplicative() {
        assert_eq!(simplified("x*1"), "x");
        assert_eq!(simplified("1*x"), "x");
        assert_eq!(simplified("x*0"), "0");
        assert_eq!(simplified("0*sin(x)"), "0");
        assert_eq!(simplified("x*(-1)"), "(-x)");
        assert_eq!(simplified("(-1)*x"), "(-x)");
        assert_eq!(simplified("x/1"), "x");
        assert_eq!(simplified("x/(-1)"), "(-x)");
    }

    #[test]
    fn test_self_combination_is_structural() {
        assert_eq!(simplified("x+x"), "(2*x)");
        assert_eq!(simplified("x*x"), "(x^2)");
        assert_eq!(simplified("sin(z)/sin(z)"), "1");
        assert_eq!(simplified("(x+1)-(x+1)"), "0");
        assert_eq!(simplified("(x+1)-(1+x)"), "((x+1)-(1+x))");
    }

    #[test]
    fn test_power_identities() {
        assert_eq!(simplified("x^0"), "1");
        assert_eq!(simplified("0^x"), "0");
        assert_eq!(simplified("1^x"), "1");
        assert_eq!(simplified("x^1"), "x");
        assert_eq!(simplified("x^(-1)"), "(1/x)");
        assert_eq!(simplified("(x^2)^3"), "(x^6)");
        assert_eq!(simplified("(x^y)^2"), "(x^(y*2))");
    }

    #[test]
    fn test_single_pass_leaves_work_for_the_next() {
        let mut t: Tree<Complex64> = parse_expression("(x^2)^0.5").unwrap();
        simplify(&mut t);
        assert_eq!(t.to_string(), "(x^1)");
        simplify(&mut t);
        assert_eq!(t, Tree::variable("x"));

        let mut t: Tree<Complex64> = parse_expression("(x^2)^0.5").unwrap();
        assert_eq!(simplify_to_fixpoint(&mut t, 10), 2);
        assert_eq!(t, Tree::variable("x"));
    }

    #[test]
    fn test_fixpoint_respects_pass_limit() {
        let mut t: Tree<Complex64> = parse_expression("(x^2)^0.5").unwrap();
        assert_eq!(simplify_to_fixpoint(&mut t, 1), 1);
        assert_eq!(t.to_string(), "(x^1)");
        let mut done: Tree<Complex64> = parse_expression("z^2+c").unwrap();
        assert_eq!(simplify_to_fixpoint(&mut done, 10), 0);
    }

    #[test]
    fn test_real_scalar() {
        let mut t: Tree<f64> = parse_expression("(y*1)*(y+0)").unwrap();
        simplify(&mut t);
        assert_eq!(t.to_string(), "(y^2)");
    }
}
