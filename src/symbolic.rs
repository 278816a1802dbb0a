#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into an expression tree
///
///# Example
/// ```
/// use RustedFractals::symbolic::parse_expr::parse_expression;
/// use num_complex::Complex64;
/// let input = "z^2 + sin(c)*0.5i";
/// let tree = parse_expression::<Complex64>(input).unwrap();
/// println!("parsed expression {}", tree);
/// // re-printing gives text the parser reads back into the same tree
/// let again = parse_expression::<Complex64>(&tree.to_string()).unwrap();
/// assert_eq!(tree, again);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) keeps the last valid formula together with its GLSL fragment
/// 2) evaluates, differentiates and lowers it
/// 3) refuses edits that do not parse or lower, keeping the previous formula
///# Example#
/// ```
/// use RustedFractals::symbolic::symbolic_engine::Formula;
/// use RustedFractals::symbolic::symbolic_eval::Bindings;
/// use RustedFractals::symbolic::symbolic_glsl::InputMode;
/// use num_complex::Complex64;
/// let mut formula: Formula = Formula::new("z^2+c", InputMode::SingleComplex).unwrap();
/// println!("glsl = {}", formula.glsl());
/// // a broken edit is rejected, the old formula stays
/// let err = formula.update("z^2+").unwrap_err();
/// println!("{}: {}", err, err.kind().message());
/// assert_eq!(formula.source(), "z^2+c");
/// let bindings = Bindings::from_pairs(&[
///     ("z", Complex64::new(0.5, 0.0)),
///     ("c", Complex64::new(0.0, 1.0)),
/// ]);
/// let value = formula.evaluate(&bindings).unwrap();
/// assert_eq!(value, Complex64::new(0.25, 1.0));
/// let dz = formula.derivative("z").unwrap();
/// assert_eq!(dz.to_string(), "(2*z)");
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// differentiate, nth_derivative, newton_step_tree
pub mod symbolic_engine_derivatives;
mod symbolic_engine_tests;
pub mod symbolic_errors;
///________________________________________________________________________________________________________________________________________________
///
/// evaluate a tree with shadowing bindings and an explicit iteration state
/// Example#
/// ```
/// use RustedFractals::symbolic::parse_expr::parse_expression;
/// use RustedFractals::symbolic::symbolic_eval::{evaluate_with_state, Bindings, IterationState};
/// use num_complex::Complex64;
/// let tree = parse_expression::<Complex64>("z*z + c").unwrap();
/// let bindings = Bindings::from_pairs(&[("c", Complex64::new(-1.0, 0.0))]);
/// let mut state = IterationState::new();
/// let mut z = Complex64::new(0.0, 0.0);
/// for _ in 0..4 {
///     state.set("z", z);
///     z = evaluate_with_state(&tree, &bindings, &state).unwrap();
/// }
/// assert_eq!(z, Complex64::new(0.0, 0.0));
/// ```
pub mod symbolic_eval;
pub mod symbolic_glsl;
pub mod symbolic_registry;
pub mod symbolic_simplify;
pub mod symbolic_traits;
pub mod symbolic_tree;
