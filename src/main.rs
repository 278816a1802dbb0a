#![allow(non_snake_case)]
use RustedFractals::Utils::config::EngineConfig;
use RustedFractals::numerical::orbit::{
    EscapeParams, PlaneRole, Viewport, escape_time_grid, orbit,
};
use RustedFractals::symbolic::parse_expr::parse_expression;
use RustedFractals::symbolic::symbolic_engine::Formula;
use RustedFractals::symbolic::symbolic_engine_derivatives::differentiate;
use RustedFractals::symbolic::symbolic_eval::{Bindings, evaluate};
use RustedFractals::symbolic::symbolic_glsl::{InputMode, lower};
use RustedFractals::symbolic::symbolic_simplify::simplify;
use RustedFractals::symbolic::symbolic_tree::Tree;
use num_complex::Complex64;
use std::path::Path;

fn main() {
    // example number can be passed as the first argument, config path as the second
    let args: Vec<String> = std::env::args().collect();
    let example: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(3);
    let config = match args.get(2) {
        Some(path) => match EngineConfig::from_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        },
        None => EngineConfig::default(),
    };
    if let Err(e) = config.init_logging() {
        eprintln!("{}", e);
    }
    match example {
        0 => {
            // PARSE, PRINT, EVALUATE
            let input = "2^3^2 - sin(pi/2)*i";
            let tree: Tree<Complex64> = match parse_expression(input) {
                Ok(tree) => tree,
                Err(e) => {
                    println!("{}: {}", e, e.kind().message());
                    return;
                }
            };
            println!("parsed expression {}", tree);
            let bindings = Bindings::with_constants();
            println!("{} = {:?}", input, evaluate(&tree, &bindings));
            // errors are tagged, the UI shows a short message
            for bad in ["foo(1)", "(1+2", "2 $ 3", "z +"] {
                if let Err(e) = parse_expression::<Complex64>(bad) {
                    println!("{:>8} -> {} ({})", bad, e, e.kind().message());
                }
            }
        }
        1 => {
            // DIFFERENTIATE AND SIMPLIFY
            let input = "sin(z)*z^3 + exp(c*z)";
            let tree: Tree<Complex64> = parse_expression(input).expect("valid formula");
            let mut dz = differentiate(&tree, "z").expect("well-formed tree");
            println!("raw derivative: {}", dz);
            simplify(&mut dz);
            println!("after one pass: {}", dz);
            let f: Formula = Formula::new(input, InputMode::SingleComplex).expect("valid formula");
            println!("simplified to fixpoint: {}", f.derivative("z").expect("derivative"));
            println!("newton map: {}", f.newton_map("z").expect("newton map"));
        }
        2 => {
            // GLSL LOWERING
            let tree: Tree<Complex64> = parse_expression("z^2+c").expect("valid formula");
            println!("{}", lower(&tree, InputMode::SingleComplex).expect("lowered"));
            let tree: Tree<Complex64> = parse_expression("x*x - y*y + cx").expect("valid formula");
            println!("{}", lower(&tree, InputMode::TwoReal).expect("lowered"));
            match lower(&tree, InputMode::SingleComplex) {
                Ok(glsl) => println!("{}", glsl),
                Err(e) => println!("rejected: {}", e),
            }
            let mut f: Formula = Formula::new("z^3+c", InputMode::SingleComplex).expect("valid formula");
            let template = "{{PRELUDE}}\nvec2 step(vec2 z, vec2 c) { return {{FORMULA}}; }\n";
            println!("{}", f.shader(template).expect("template has a marker"));
            // a broken edit keeps the previous shader
            if let Err(e) = f.update("z^3+") {
                println!("kept '{}' after: {}", f.source(), e);
            }
        }
        3 => {
            // MANDELBROT IN THE TERMINAL
            let tree: Tree<Complex64> = parse_expression("z^2+c").expect("valid formula");
            let viewport = Viewport {
                center: Complex64::new(-0.6, 0.0),
                span: 3.2,
                width: 78,
                height: 32,
            };
            let mut params: EscapeParams<Complex64> = EscapeParams::from(&config);
            params.bailout = 2.0;
            let grid = escape_time_grid(
                &tree,
                &Bindings::new(),
                &viewport,
                &params,
                PlaneRole::Parameter,
            )
            .expect("escape-time grid");
            let shades: Vec<char> = " .:-=+*#%@".chars().collect();
            for row in grid.chunks(viewport.width) {
                let line: String = row
                    .iter()
                    .map(|r| {
                        if !r.escaped {
                            '@'
                        } else {
                            shades[(r.iterations * (shades.len() - 1)) / params.max_iterations]
                        }
                    })
                    .collect();
                println!("{}", line);
            }
        }
        4 => {
            // ORBIT OF A POINT (what the sonifier plays)
            let tree: Tree<Complex64> = parse_expression("z^2+c").expect("valid formula");
            let bindings = Bindings::from_pairs(&[("c", Complex64::new(-0.12, 0.75))]);
            let params: EscapeParams<Complex64> = EscapeParams::from(&config);
            let points = orbit(&tree, &bindings, &params, Complex64::new(0.0, 0.0))
                .expect("orbit");
            for (n, z) in points.iter().take(16).enumerate() {
                println!("z_{} = {:.6} {:+.6}i", n, z.re, z.im);
            }
        }
        _ => {
            println!("example must be 0..=4");
        }
    }
}
