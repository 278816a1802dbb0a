///  iteration of a formula: orbits, escape time, parallel escape-time grids
///  Example#1
/// ```
/// use RustedFractals::numerical::orbit::{escape_time_grid, EscapeParams, PlaneRole, Viewport};
/// use RustedFractals::symbolic::parse_expr::parse_expression;
/// use RustedFractals::symbolic::symbolic_eval::Bindings;
/// use num_complex::Complex64;
/// // Mandelbrot set: pixel is c, orbit starts at 0
/// let tree = parse_expression::<Complex64>("z^2+c").unwrap();
/// let viewport = Viewport { center: Complex64::new(-0.5, 0.0), span: 3.0, width: 32, height: 24 };
/// let params = EscapeParams { max_iterations: 100, bailout: 2.0, seed: Complex64::new(0.0, 0.0) };
/// let grid = escape_time_grid(&tree, &Bindings::new(), &viewport, &params, PlaneRole::Parameter).unwrap();
/// let inside = grid.iter().filter(|r| !r.escaped).count();
/// println!("{} of {} pixels are in the set", inside, grid.len());
/// ```
pub mod orbit;
