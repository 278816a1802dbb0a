//! # Orbits and escape time
//!
//! The fixed-point iteration `z_{n+1} = f(z_n)` behind orbit fractals, driven by an
//! expression tree. The iterate lives in an [`IterationState`] owned by the loop, so the
//! tree and the bindings stay read-only and one tree can serve many pixels in parallel.
//!
//! An orbit *escapes* once `|z| > bailout` or `z` stops being finite. Escaping ends the
//! loop; it is a result, not an error. Errors only come from the formula itself
//! (an unbound name, a malformed node).
use crate::Utils::config::EngineConfig;
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_eval::{Bindings, IterationState, evaluate_with_state};
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::Tree;
use log::info;
use num_complex::Complex64;
use rayon::prelude::*;
use std::time::Instant;

/// name of the iterate in formulas
pub const ITERATE_VARIABLE: &str = "z";
/// name of the plane parameter in formulas
pub const PARAMETER_VARIABLE: &str = "c";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeParams<N> {
    pub max_iterations: usize,
    /// escape radius
    pub bailout: f64,
    /// starting iterate for [`PlaneRole::Parameter`] grids
    pub seed: N,
}

impl<N: ExprScalar> From<&EngineConfig> for EscapeParams<N> {
    fn from(config: &EngineConfig) -> Self {
        EscapeParams {
            max_iterations: config.max_iterations,
            bailout: config.bailout,
            seed: N::zero(),
        }
    }
}

impl<N: ExprScalar> EscapeParams<N> {
    fn diverged(&self, z: &N) -> bool {
        !z.is_finite() || z.norm_sqr() > self.bailout * self.bailout
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeResult<N> {
    /// number of steps taken before the orbit escaped (or `max_iterations`)
    pub iterations: usize,
    pub escaped: bool,
    /// last iterate computed
    pub last: N,
}

/// The orbit of `z0` under `tree`: `z0` followed by every iterate up to and including
/// the first one that escapes, at most `max_iterations + 1` points.
pub fn orbit<N: ExprScalar>(
    tree: &Tree<N>,
    bindings: &Bindings<N>,
    params: &EscapeParams<N>,
    z0: N,
) -> Result<Vec<N>, ExprError> {
    let mut state = IterationState::new();
    let mut points = Vec::with_capacity(params.max_iterations + 1);
    let mut z = z0;
    points.push(z);
    for _ in 0..params.max_iterations {
        if params.diverged(&z) {
            break;
        }
        state.set(ITERATE_VARIABLE, z);
        z = evaluate_with_state(tree, bindings, &state)?;
        points.push(z);
    }
    Ok(points)
}

/// Iterates `tree` from `z0` until the orbit escapes or `max_iterations` steps are done.
pub fn escape_time<N: ExprScalar>(
    tree: &Tree<N>,
    bindings: &Bindings<N>,
    params: &EscapeParams<N>,
    z0: N,
) -> Result<EscapeResult<N>, ExprError> {
    let mut state = IterationState::new();
    escape_time_in(tree, bindings, params, z0, &mut state)
}

fn escape_time_in<N: ExprScalar>(
    tree: &Tree<N>,
    bindings: &Bindings<N>,
    params: &EscapeParams<N>,
    z0: N,
    state: &mut IterationState<N>,
) -> Result<EscapeResult<N>, ExprError> {
    let mut z = z0;
    for n in 0..params.max_iterations {
        if params.diverged(&z) {
            return Ok(EscapeResult {
                iterations: n,
                escaped: true,
                last: z,
            });
        }
        state.set(ITERATE_VARIABLE, z);
        z = evaluate_with_state(tree, bindings, state)?;
    }
    Ok(EscapeResult {
        iterations: params.max_iterations,
        escaped: params.diverged(&z),
        last: z,
    })
}

/// What a pixel of the grid stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneRole {
    /// pixel is `c`, every orbit starts at `params.seed` (Mandelbrot-type images)
    Parameter,
    /// pixel is `z0`, `c` comes from the bindings (Julia-type images)
    Dynamic,
}

/// A `width x height` pixel window onto the complex plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Complex64,
    /// extent of the real axis covered by the full width
    pub span: f64,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    /// plane point at the centre of pixel `(px, py)`; `py` grows downwards
    pub fn pixel_to_point(&self, px: usize, py: usize) -> Complex64 {
        let step = self.span / self.width as f64;
        let re = self.center.re + (px as f64 + 0.5 - self.width as f64 / 2.0) * step;
        let im = self.center.im - (py as f64 + 0.5 - self.height as f64 / 2.0) * step;
        Complex64::new(re, im)
    }
}

/// Escape time of every pixel, row-major. Pixels are independent and run in parallel,
/// each with its own iteration state; the first formula error aborts the whole grid.
pub fn escape_time_grid(
    tree: &Tree<Complex64>,
    bindings: &Bindings<Complex64>,
    viewport: &Viewport,
    params: &EscapeParams<Complex64>,
    role: PlaneRole,
) -> Result<Vec<EscapeResult<Complex64>>, ExprError> {
    info!(
        "escape-time grid {}x{} ({:?} plane, {} iterations max)",
        viewport.width, viewport.height, role, params.max_iterations
    );
    let begin = Instant::now();
    let width = viewport.width;
    let grid = (0..width * viewport.height)
        .into_par_iter()
        .map(|idx| {
            let point = viewport.pixel_to_point(idx % width, idx / width);
            let mut state = IterationState::new();
            match role {
                PlaneRole::Parameter => {
                    state.set(PARAMETER_VARIABLE, point);
                    escape_time_in(tree, bindings, params, params.seed, &mut state)
                }
                PlaneRole::Dynamic => escape_time_in(tree, bindings, params, point, &mut state),
            }
        })
        .collect::<Result<Vec<_>, ExprError>>()?;
    info!(
        "escape-time grid done in {} ms",
        begin.elapsed().as_millis()
    );
    Ok(grid)
}
