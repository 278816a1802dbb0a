//! # GLSL lowering
//!
//! Turns an expression tree into a GLSL expression over `vec2` complex numbers, so the
//! formula the user typed runs per pixel in a fragment shader.
//!
//! Every node becomes a call of a complex-arithmetic intrinsic: `a+b` is `cadd(a, b)`,
//! `sin(a)` is `csin(a)`, a number is `vec2(re, im)`. The intrinsics are defined in
//! [`GLSL_COMPLEX_PRELUDE`], which has to be part of the shader the fragment is
//! spliced into (see [`splice_into_template`]).
//!
//! Variables are checked against the whitelist of the [`InputMode`]; a name outside it
//! aborts lowering with `INVALID_VARIABLE` and no text is returned at all.
//!
//! # Example
//! ```
//! use RustedFractals::symbolic::parse_expr::parse_expression;
//! use RustedFractals::symbolic::symbolic_glsl::{lower, InputMode};
//! use num_complex::Complex64;
//! let tree = parse_expression::<Complex64>("z^2+c").unwrap();
//! let glsl = lower(&tree, InputMode::SingleComplex).unwrap();
//! assert_eq!(glsl, "cadd(cpow(z, vec2(2.0, 0.0)), c)");
//! ```
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_registry::{Function, Operation};
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::{NodeValue, Tree};
use log::{debug, warn};
use strum_macros::{Display, EnumIter, EnumString};

/// Which variable names a formula may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum InputMode {
    /// one complex iterate `z` and the complex parameter `c`
    #[default]
    SingleComplex,
    /// real coordinates `x`, `y` and real parameters `cx`, `cy`
    TwoReal,
}

const SINGLE_COMPLEX_VARIABLES: [&str; 5] = ["z", "c", "pi", "e", "i"];
const TWO_REAL_VARIABLES: [&str; 7] = ["x", "y", "cx", "cy", "pi", "e", "i"];

impl InputMode {
    pub fn allowed_variables(&self) -> &'static [&'static str] {
        match self {
            InputMode::SingleComplex => &SINGLE_COMPLEX_VARIABLES,
            InputMode::TwoReal => &TWO_REAL_VARIABLES,
        }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed_variables().contains(&name)
    }
}

/// Marker replaced by the lowered formula in a shader template.
pub const FORMULA_MARKER: &str = "{{FORMULA}}";
/// Optional marker replaced by [`GLSL_COMPLEX_PRELUDE`].
pub const PRELUDE_MARKER: &str = "{{PRELUDE}}";

/// GLSL definitions of every intrinsic [`lower`] emits. Each function only calls
/// functions defined above it.
pub const GLSL_COMPLEX_PRELUDE: &str = r#"
vec2 cadd(vec2 a, vec2 b) { return a + b; }
vec2 csub(vec2 a, vec2 b) { return a - b; }
vec2 cmul(vec2 a, vec2 b) { return vec2(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x); }
vec2 cdiv(vec2 a, vec2 b) { return vec2(a.x * b.x + a.y * b.y, a.y * b.x - a.x * b.y) / dot(b, b); }
vec2 cconj(vec2 a) { return vec2(a.x, -a.y); }
vec2 cre(vec2 a) { return vec2(a.x, 0.0); }
vec2 cim(vec2 a) { return vec2(a.y, 0.0); }
vec2 cabs(vec2 a) { return vec2(length(a), 0.0); }
vec2 carg(vec2 a) { return vec2(atan(a.y, a.x), 0.0); }
vec2 cexp(vec2 a) { return exp(a.x) * vec2(cos(a.y), sin(a.y)); }
vec2 clog(vec2 a) { return vec2(log(length(a)), atan(a.y, a.x)); }
vec2 cpow(vec2 a, vec2 b) {
    if (b.x == 0.0 && b.y == 0.0) { return vec2(1.0, 0.0); }
    if (a.x == 0.0 && a.y == 0.0 && b.x > 0.0) { return vec2(0.0, 0.0); }
    return cexp(cmul(b, clog(a)));
}
vec2 csqrt(vec2 a) {
    float r = length(a);
    float s = a.y < 0.0 ? -1.0 : 1.0;
    return vec2(sqrt(0.5 * (r + a.x)), s * sqrt(0.5 * (r - a.x)));
}
vec2 csin(vec2 a) { return vec2(sin(a.x) * cosh(a.y), cos(a.x) * sinh(a.y)); }
vec2 ccos(vec2 a) { return vec2(cos(a.x) * cosh(a.y), -sin(a.x) * sinh(a.y)); }
vec2 ctan(vec2 a) { return cdiv(csin(a), ccos(a)); }
vec2 ccot(vec2 a) { return cdiv(ccos(a), csin(a)); }
vec2 csinh(vec2 a) { return vec2(sinh(a.x) * cos(a.y), cosh(a.x) * sin(a.y)); }
vec2 ccosh(vec2 a) { return vec2(cosh(a.x) * cos(a.y), sinh(a.x) * sin(a.y)); }
vec2 ctanh(vec2 a) { return cdiv(csinh(a), ccosh(a)); }
vec2 ccoth(vec2 a) { return cdiv(ccosh(a), csinh(a)); }
vec2 casin(vec2 a) {
    vec2 w = clog(vec2(-a.y, a.x) + csqrt(vec2(1.0, 0.0) - cmul(a, a)));
    return vec2(w.y, -w.x);
}
vec2 cacos(vec2 a) { return vec2(1.5707963267948966, 0.0) - casin(a); }
vec2 catan(vec2 a) {
    vec2 iz = vec2(-a.y, a.x);
    vec2 w = clog(vec2(1.0, 0.0) - iz) - clog(vec2(1.0, 0.0) + iz);
    return 0.5 * vec2(-w.y, w.x);
}
vec2 cacot(vec2 a) { return catan(cdiv(vec2(1.0, 0.0), a)); }
vec2 casinh(vec2 a) { return clog(a + csqrt(cmul(a, a) + vec2(1.0, 0.0))); }
vec2 cacosh(vec2 a) { return clog(a + cmul(csqrt(a + vec2(1.0, 0.0)), csqrt(a - vec2(1.0, 0.0)))); }
vec2 catanh(vec2 a) { return 0.5 * (clog(vec2(1.0, 0.0) + a) - clog(vec2(1.0, 0.0) - a)); }
"#;

/// Lowers `tree` to a GLSL `vec2` expression, checking variables against `mode`.
pub fn lower<N: ExprScalar>(tree: &Tree<N>, mode: InputMode) -> Result<String, ExprError> {
    let mut out = String::new();
    emit(tree, mode, &mut out)?;
    debug!("lowered formula to {} bytes of GLSL in {} mode", out.len(), mode);
    Ok(out)
}

fn emit<N: ExprScalar>(tree: &Tree<N>, mode: InputMode, out: &mut String) -> Result<(), ExprError> {
    match tree.value() {
        NodeValue::Number(n) => {
            let (re, im) = n.parts();
            out.push_str(&format!("vec2({}, {})", glsl_float(re), glsl_float(im)));
        }
        NodeValue::Variable(name) => emit_variable(name, mode, out)?,
        NodeValue::Operation(op) => match tree.branches() {
            // implicit zero for the missing left operand
            [operand] => {
                out.push_str(Operation::Sub.glsl_intrinsic());
                out.push_str("(vec2(0.0, 0.0), ");
                emit(operand, mode, out)?;
                out.push(')');
            }
            [left, right] => {
                if *op == Operation::ERROR {
                    return Err(ExprError::MalformedNode { arity: 2 });
                }
                out.push_str(op.glsl_intrinsic());
                out.push('(');
                emit(left, mode, out)?;
                out.push_str(", ");
                emit(right, mode, out)?;
                out.push(')');
            }
            other => return Err(ExprError::MalformedNode { arity: other.len() }),
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
            out.push_str(&func.glsl_intrinsic());
            out.push('(');
            emit(argument, mode, out)?;
            out.push(')');
        }
    }
    Ok(())
}

fn emit_variable(name: &str, mode: InputMode, out: &mut String) -> Result<(), ExprError> {
    if !mode.is_allowed(name) {
        warn!("variable '{}' is not allowed in {} mode", name, mode);
        return Err(ExprError::InvalidVariable {
            name: name.to_string(),
            mode,
        });
    }
    match name {
        "pi" => out.push_str("vec2(3.141592653589793, 0.0)"),
        "e" => out.push_str("vec2(2.718281828459045, 0.0)"),
        "i" => out.push_str("vec2(0.0, 1.0)"),
        _ => match mode {
            InputMode::SingleComplex => out.push_str(name),
            InputMode::TwoReal => out.push_str(&format!("vec2({}, 0.0)", name)),
        },
    }
    Ok(())
}

/// float literal GLSL accepts: always with a decimal point or an exponent
fn glsl_float(v: f64) -> String {
    if v.is_nan() {
        "(0.0/0.0)".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "(1.0/0.0)" } else { "(-1.0/0.0)" }.to_string()
    } else {
        format!("{:?}", v)
    }
}

/// Replaces [`FORMULA_MARKER`] in `template` with `fragment` and, if present,
/// [`PRELUDE_MARKER`] with [`GLSL_COMPLEX_PRELUDE`].
pub fn splice_into_template(template: &str, fragment: &str) -> Result<String, ExprError> {
    if !template.contains(FORMULA_MARKER) {
        return Err(ExprError::config(format!(
            "shader template has no {} marker",
            FORMULA_MARKER
        )));
    }
    Ok(template
        .replace(PRELUDE_MARKER, GLSL_COMPLEX_PRELUDE)
        .replace(FORMULA_MARKER, fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression;
    use num_complex::Complex64;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn lowered(input: &str, mode: InputMode) -> Result<String, ExprError> {
        let tree: Tree<Complex64> = parse_expression(input)?;
        lower(&tree, mode)
    }

    #[test]
    fn test_quadratic_map() {
        let glsl = lowered("z^2+c", InputMode::SingleComplex).unwrap();
        assert!(glsl.contains("cadd(cpow("));
        assert!(glsl.contains("), c)"));
        assert!(!glsl.contains('+'));
        assert!(!glsl.contains('^'));
    }

    #[test]
    fn test_invalid_variable_gives_no_text() {
        let err = lowered("w+1", InputMode::SingleComplex).unwrap_err();
        assert_eq!(
            err,
            ExprError::InvalidVariable {
                name: "w".to_string(),
                mode: InputMode::SingleComplex
            }
        );
        assert!(lowered("sin(z)*x", InputMode::SingleComplex).is_err());
        assert!(lowered("z+1", InputMode::TwoReal).is_err());
    }

    #[test]
    fn test_two_real_mode() {
        assert_eq!(
            lowered("x*y+cx", InputMode::TwoReal).unwrap(),
            "cadd(cmul(vec2(x, 0.0), vec2(y, 0.0)), vec2(cx, 0.0))"
        );
    }

    #[test]
    fn test_constants_and_numbers() {
        assert_eq!(
            lowered("pi*i", InputMode::SingleComplex).unwrap(),
            "cmul(vec2(3.141592653589793, 0.0), vec2(0.0, 1.0))"
        );
        assert_eq!(
            lowered("2i-0.5", InputMode::TwoReal).unwrap(),
            "csub(vec2(0.0, 2.0), vec2(0.5, 0.0))"
        );
        let nan: Tree<Complex64> = Tree::number(Complex64::new(f64::NAN, 1.0));
        assert_eq!(
            lower(&nan, InputMode::SingleComplex).unwrap(),
            "vec2((0.0/0.0), 1.0)"
        );
    }

    #[test]
    fn test_unary_minus_gets_implicit_zero() {
        assert_eq!(
            lowered("-z", InputMode::SingleComplex).unwrap(),
            "csub(vec2(0.0, 0.0), z)"
        );
    }

    #[test]
    fn test_functions_and_aliases() {
        assert_eq!(
            lowered("tg(z)/exp(c)", InputMode::SingleComplex).unwrap(),
            "cdiv(ctan(z), cexp(c))"
        );
    }

    #[test]
    fn test_prelude_defines_every_intrinsic() {
        for op in Operation::iter().filter(|op| *op != Operation::ERROR) {
            let signature = format!("vec2 {}(", op.glsl_intrinsic());
            assert!(GLSL_COMPLEX_PRELUDE.contains(&signature), "{}", signature);
        }
        for func in Function::iter().filter(|f| *f != Function::ERROR) {
            let signature = format!("vec2 {}(", func.glsl_intrinsic());
            assert!(GLSL_COMPLEX_PRELUDE.contains(&signature), "{}", signature);
        }
    }

    #[test]
    fn test_cpow_zero_base_matches_evaluator() {
        use crate::symbolic::symbolic_eval::{Bindings, evaluate};
        let b = Bindings::new();
        let at = |input: &str| -> Complex64 {
            evaluate(&parse_expression(input).unwrap(), &b).unwrap()
        };
        assert_eq!(at("0^0"), Complex64::new(1.0, 0.0));
        assert_eq!(at("0^0i"), Complex64::new(1.0, 0.0));
        assert_eq!(at("0^0.5"), Complex64::new(0.0, 0.0));
        assert!(!at("0^(-0.5)").is_finite());
        let cpow = GLSL_COMPLEX_PRELUDE
            .split("vec2 cpow(")
            .nth(1)
            .and_then(|body| body.split("\n}").next())
            .unwrap();
        let zero_exponent = cpow.find("if (b.x == 0.0 && b.y == 0.0) { return vec2(1.0, 0.0); }");
        let zero_base = cpow.find("if (a.x == 0.0 && a.y == 0.0 && b.x > 0.0) { return vec2(0.0, 0.0); }");
        assert!(zero_exponent.is_some() && zero_base.is_some());
        assert!(zero_exponent < zero_base);
    }

    #[test]
    fn test_splice() {
        let template = "{{PRELUDE}}\nvoid main() { vec2 z = {{FORMULA}}; }";
        let shader = splice_into_template(template, "cmul(z, z)").unwrap();
        assert!(shader.contains("vec2 z = cmul(z, z);"));
        assert!(shader.contains("vec2 cmul(vec2 a, vec2 b)"));
        let err = splice_into_template("void main() {}", "z").unwrap_err();
        assert_eq!(err.kind(), crate::symbolic::symbolic_errors::ErrorKind::Config);
    }

    #[test]
    fn test_input_mode_names() {
        assert_eq!(InputMode::SingleComplex.to_string(), "single_complex");
        assert_eq!(InputMode::from_str("two_real").unwrap(), InputMode::TwoReal);
        assert!(InputMode::from_str("three_real").is_err());
        for mode in InputMode::iter() {
            assert!(mode.is_allowed("pi"));
            assert!(mode.is_allowed("i"));
        }
    }
}
