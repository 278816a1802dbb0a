// SYMBOLIC TRAITS //////////////////////////////////////////////////////////////////
// Numeric side of the expression engine. A Tree<N> stores its literals as N, and the
// evaluator, simplifier and code generator only talk to N through ExprScalar.
// Implemented for Complex64 (the fractal plane) and f64 (real maps, cheap tests);
// add other scalar types here as needed

use crate::symbolic::symbolic_registry::Function;
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::f64::consts::{E, PI};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub trait ExprScalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// value of a number literal; `imaginary` is set by a trailing `i`.
    /// `None` when the scalar cannot hold a pure-imaginary value.
    fn from_literal(value: f64, imaginary: bool) -> Option<Self>;
    fn from_real(value: f64) -> Self;
    /// (re, im)
    fn parts(&self) -> (f64, f64);
    /// value of the predeclared names `pi`, `e`, `i`
    fn named_constant(name: &str) -> Option<Self>;
    fn pow(self, exponent: Self) -> Self;
    fn apply(self, function: Function) -> Self;

    fn is_finite(&self) -> bool {
        let (re, im) = self.parts();
        re.is_finite() && im.is_finite()
    }
    fn norm_sqr(&self) -> f64 {
        let (re, im) = self.parts();
        re * re + im * im
    }
    /// unary minus as `0 - v`; a negated real keeps `+0` as its imaginary part
    fn negated(self) -> Self {
        Self::zero() - self
    }
    fn is_minus_one(&self) -> bool {
        *self == -Self::one()
    }
}

impl ExprScalar for Complex64 {
    fn from_literal(value: f64, imaginary: bool) -> Option<Self> {
        if imaginary {
            Some(Complex64::new(0.0, value))
        } else {
            Some(Complex64::new(value, 0.0))
        }
    }

    fn from_real(value: f64) -> Self {
        Complex64::new(value, 0.0)
    }

    fn parts(&self) -> (f64, f64) {
        (self.re, self.im)
    }

    fn named_constant(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Complex64::new(PI, 0.0)),
            "e" => Some(Complex64::new(E, 0.0)),
            "i" => Some(Complex64::i()),
            _ => None,
        }
    }

    fn pow(self, exponent: Self) -> Self {
        // integer powers are the common case (z^2 + c) and powi keeps them exact
        if exponent.im == 0.0 && exponent.re.fract() == 0.0 && exponent.re.abs() <= 64.0 {
            return self.powi(exponent.re as i32);
        }
        if self.is_zero() {
            return if exponent.re > 0.0 {
                Complex64::zero()
            } else {
                Complex64::new(f64::NAN, f64::NAN)
            };
        }
        self.powc(exponent)
    }

    fn apply(self, function: Function) -> Self {
        let one = Complex64::one();
        match function {
            Function::Sin => self.sin(),
            Function::Cos => self.cos(),
            Function::Tan => self.tan(),
            Function::Cot => one / self.tan(),
            Function::Asin => self.asin(),
            Function::Acos => self.acos(),
            Function::Atan => self.atan(),
            Function::Acot => (one / self).atan(),
            Function::Sinh => self.sinh(),
            Function::Cosh => self.cosh(),
            Function::Tanh => self.tanh(),
            Function::Coth => one / self.tanh(),
            Function::Asinh => self.asinh(),
            Function::Acosh => self.acosh(),
            Function::Atanh => self.atanh(),
            Function::Exp => self.exp(),
            Function::Log => self.ln(),
            Function::Sqrt => self.sqrt(),
            Function::Abs => Complex64::new(self.norm(), 0.0),
            Function::Arg => Complex64::new(self.arg(), 0.0),
            Function::Re => Complex64::new(self.re, 0.0),
            Function::Im => Complex64::new(self.im, 0.0),
            Function::Conj => self.conj(),
            Function::ERROR => Complex64::new(f64::NAN, f64::NAN),
        }
    }
}

impl ExprScalar for f64 {
    fn from_literal(value: f64, imaginary: bool) -> Option<Self> {
        if imaginary { None } else { Some(value) }
    }

    fn from_real(value: f64) -> Self {
        value
    }

    fn parts(&self) -> (f64, f64) {
        (*self, 0.0)
    }

    fn named_constant(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(PI),
            "e" => Some(E),
            _ => None,
        }
    }

    fn pow(self, exponent: Self) -> Self {
        self.powf(exponent)
    }

    fn apply(self, function: Function) -> Self {
        match function {
            Function::Sin => self.sin(),
            Function::Cos => self.cos(),
            Function::Tan => self.tan(),
            Function::Cot => 1.0 / self.tan(),
            Function::Asin => self.asin(),
            Function::Acos => self.acos(),
            Function::Atan => self.atan(),
            Function::Acot => (1.0 / self).atan(),
            Function::Sinh => self.sinh(),
            Function::Cosh => self.cosh(),
            Function::Tanh => self.tanh(),
            Function::Coth => 1.0 / self.tanh(),
            Function::Asinh => self.asinh(),
            Function::Acosh => self.acosh(),
            Function::Atanh => self.atanh(),
            Function::Exp => self.exp(),
            Function::Log => self.ln(),
            Function::Sqrt => self.sqrt(),
            Function::Abs => self.abs(),
            Function::Arg => {
                if self.is_nan() {
                    f64::NAN
                } else if self < 0.0 {
                    PI
                } else {
                    0.0
                }
            }
            Function::Re | Function::Conj => self,
            Function::Im => 0.0,
            Function::ERROR => f64::NAN,
        }
    }
}
