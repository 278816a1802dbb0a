//___________________________________TESTS____________________________________
// properties that involve several passes at once

#[cfg(test)]
mod tests {
    use crate::symbolic::parse_expr::parse_expression;
    use crate::symbolic::symbolic_engine_derivatives::differentiate;
    use crate::symbolic::symbolic_errors::{ErrorKind, ExprError};
    use crate::symbolic::symbolic_eval::{Bindings, evaluate};
    use crate::symbolic::symbolic_glsl::{InputMode, lower};
    use crate::symbolic::symbolic_registry::{Function, Operation};
    use crate::symbolic::symbolic_simplify::simplify;
    use crate::symbolic::symbolic_tree::{NodeValue, Tree};
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rayon::prelude::*;
    use strum::IntoEnumIterator;

    type C = Complex64;

    fn parse(input: &str) -> Tree<C> {
        parse_expression(input).unwrap()
    }

    /// random formula text the parser accepts; compound operands are bracketed
    fn random_formula(rng: &mut StdRng, depth: usize) -> String {
        let space = |rng: &mut StdRng| if rng.random_bool(0.2) { " " } else { "" };
        if depth == 0 || rng.random_bool(0.25) {
            return match rng.random_range(0..5) {
                0 => ["z", "c", "x", "pi"][rng.random_range(0..4)].to_string(),
                1 => rng.random_range(0..100).to_string(),
                2 => format!("{}", rng.random_range(1..64) as f64 / 8.0),
                3 => format!("{}i", rng.random_range(1..20)),
                _ => format!("{}e-3", rng.random_range(1..9)),
            };
        }
        let a = random_formula(rng, depth - 1);
        match rng.random_range(0..4) {
            0 | 1 => {
                let b = random_formula(rng, depth - 1);
                let op = ['+', '-', '*', '/', '^'][rng.random_range(0..5)];
                format!("({}){}{}{}({})", a, space(rng), op, space(rng), b)
            }
            2 => {
                let functions: Vec<Function> =
                    Function::iter().filter(|f| *f != Function::ERROR).collect();
                let f = functions[rng.random_range(0..functions.len())];
                format!("{}({})", f.token(), a)
            }
            _ => format!("(-{}({}))", space(rng), a),
        }
    }

    #[test]
    fn test_print_then_parse_is_structurally_stable() {
        let mut rng = StdRng::seed_from_u64(20240611);
        for _ in 0..500 {
            let text = random_formula(&mut rng, 4);
            let tree = parse(&text);
            let printed = tree.to_string();
            let reparsed: Tree<C> = parse_expression(&printed)
                .unwrap_or_else(|e| panic!("{} -> {}: {}", text, printed, e));
            assert_eq!(tree, reparsed, "{} -> {}", text, printed);
        }
    }

    #[test]
    fn test_round_trip_modulo_whitespace() {
        let tree = parse("sin( z ) ^ 2 + c * 0.5i");
        assert_eq!(tree, parse("sin(z)^2+c*0.5i"));
        assert_eq!(tree, parse(&tree.to_string()));
    }

    #[test]
    fn test_sum_structure_and_value() {
        let tree = parse("2+3");
        assert_eq!(tree.value(), &NodeValue::Operation(Operation::Add));
        assert_eq!(tree.left(), Some(&Tree::real(2.0)));
        assert_eq!(tree.right(), Some(&Tree::real(3.0)));
        assert_eq!(evaluate(&tree, &Bindings::new()).unwrap(), C::new(5.0, 0.0));
    }

    #[test]
    fn test_power_is_right_associative() {
        let v = evaluate(&parse("2^3^2"), &Bindings::new()).unwrap();
        assert_eq!(v, C::new(512.0, 0.0));
    }

    #[test]
    fn test_negated_variable() {
        let b = Bindings::from_pairs(&[("x", C::new(5.0, 0.0))]);
        assert_eq!(evaluate(&parse("-x"), &b).unwrap(), C::new(-5.0, 0.0));
    }

    #[test]
    fn test_derivative_of_sin_is_cos() {
        let mut d = differentiate(&parse("sin(x)"), "x").unwrap();
        simplify(&mut d);
        assert_eq!(d, Tree::function(Function::Cos, Tree::variable("x")));
    }

    #[test]
    fn test_identities_leave_one_variable() {
        let mut t = parse("x*1+0");
        simplify(&mut t);
        assert_eq!(t.value(), &NodeValue::Variable("x".to_string()));
        assert!(t.is_leaf());
    }

    #[test]
    fn test_lowering() {
        let glsl = lower(&parse("z^2+c"), InputMode::SingleComplex).unwrap();
        assert!(glsl.starts_with("cadd(cpow("));
        assert!(glsl.ends_with("), c)"));
        assert!(!glsl.contains('+') && !glsl.contains('^'));
        let err = lower(&parse("w+1"), InputMode::SingleComplex).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVariable);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_expression::<C>("foo(1)").unwrap_err();
        assert_eq!(
            err,
            ExprError::UnidentifiedFunction {
                name: "foo".to_string()
            }
        );
        let err = parse_expression::<C>("(1+2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCloseBracket);
    }

    #[test]
    fn test_evaluation_is_pure() {
        let tree = parse("exp(z)/(c-z^3) + atan(z*c)");
        let b = Bindings::from_pairs(&[("z", C::new(0.1, -0.4)), ("c", C::new(1.5, 0.2))]);
        let before = tree.clone();
        let first = evaluate(&tree, &b).unwrap();
        assert_eq!(evaluate(&tree, &b).unwrap(), first);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_shared_tree_parallel_evaluation() {
        let tree = parse("z^3 - 2*z + c");
        let inputs: Vec<C> = (0..256)
            .map(|k| C::new(k as f64 / 128.0 - 1.0, (k % 7) as f64 / 7.0))
            .collect();
        let sequential: Vec<C> = inputs
            .iter()
            .map(|z| {
                let b = Bindings::from_pairs(&[("z", *z), ("c", C::new(0.3, 0.0))]);
                evaluate(&tree, &b).unwrap()
            })
            .collect();
        let parallel: Vec<C> = inputs
            .par_iter()
            .map(|z| {
                let b = Bindings::from_pairs(&[("z", *z), ("c", C::new(0.3, 0.0))]);
                evaluate(&tree, &b).unwrap()
            })
            .collect();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_derivative_and_simplified_derivative_agree() {
        let tree = parse("z^3*sin(z) + exp(2*z)/z");
        let raw = differentiate(&tree, "z").unwrap();
        let mut simplified = raw.clone();
        simplify(&mut simplified);
        assert!(simplified.size() < raw.size());
        let b = Bindings::from_pairs(&[("z", C::new(0.7, 0.3))]);
        let a = evaluate(&raw, &b).unwrap();
        let s = evaluate(&simplified, &b).unwrap();
        assert_relative_eq!(a.re, s.re, epsilon = 1e-10);
        assert_relative_eq!(a.im, s.im, epsilon = 1e-10);
    }
}
