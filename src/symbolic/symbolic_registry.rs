//! # Operation/Function Registry
//!
//! Closed enumerations of the binary operators and of the transcendental function
//! catalogue, together with the symbol tables the parser and the GLSL code generator share.
//!
//! Every code has one canonical token (used when printing a tree and when naming the
//! GLSL intrinsic `c<token>`). The function table additionally accepts a few aliases
//! (`tg`, `ctg`, `arcsin`, `ln`, ...) so formulas written in either notation parse.
//!
//! Lookup is an exact-string binary search over tables sorted by symbol. An unknown
//! symbol yields the `ERROR` sentinel; lookup never fails loudly. The tables are
//! `static` slices, so they are initialised once and can be read from any thread.
#![allow(non_camel_case_types)]

use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Binary arithmetic operators. A single-child `Operation` node is a negation,
/// whatever its code (the parser always uses `Sub`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Operation {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "^")]
    Pow,
    #[strum(serialize = "ERROR")]
    ERROR,
}

/// The transcendental function catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Asin,
    Acos,
    Atan,
    Acot,
    Sinh,
    Cosh,
    Tanh,
    Coth,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Log,
    Sqrt,
    Abs,
    Arg,
    Re,
    Im,
    Conj,
    #[strum(serialize = "ERROR")]
    ERROR,
}

/// operator symbols, sorted by symbol for binary search
static OPERATION_TABLE: [(&str, Operation); 5] = [
    ("*", Operation::Mul),
    ("+", Operation::Add),
    ("-", Operation::Sub),
    ("/", Operation::Div),
    ("^", Operation::Pow),
];

/// function symbols including aliases, sorted by symbol for binary search
static FUNCTION_TABLE: [(&str, Function); 35] = [
    ("abs", Function::Abs),
    ("acos", Function::Acos),
    ("acosh", Function::Acosh),
    ("acot", Function::Acot),
    ("arccos", Function::Acos),
    ("arccot", Function::Acot),
    ("arcctg", Function::Acot),
    ("arcosh", Function::Acosh),
    ("arcsin", Function::Asin),
    ("arctan", Function::Atan),
    ("arctg", Function::Atan),
    ("arg", Function::Arg),
    ("arsinh", Function::Asinh),
    ("artanh", Function::Atanh),
    ("asin", Function::Asin),
    ("asinh", Function::Asinh),
    ("atan", Function::Atan),
    ("atanh", Function::Atanh),
    ("conj", Function::Conj),
    ("cos", Function::Cos),
    ("cosh", Function::Cosh),
    ("cot", Function::Cot),
    ("coth", Function::Coth),
    ("ctg", Function::Cot),
    ("exp", Function::Exp),
    ("im", Function::Im),
    ("ln", Function::Log),
    ("log", Function::Log),
    ("re", Function::Re),
    ("sin", Function::Sin),
    ("sinh", Function::Sinh),
    ("sqrt", Function::Sqrt),
    ("tan", Function::Tan),
    ("tanh", Function::Tanh),
    ("tg", Function::Tan),
];

/// Finds the operator for an exact symbol, `Operation::ERROR` when unknown.
pub fn lookup_operation(symbol: &str) -> Operation {
    OPERATION_TABLE
        .binary_search_by(|(s, _)| s.cmp(&symbol))
        .map(|idx| OPERATION_TABLE[idx].1)
        .unwrap_or(Operation::ERROR)
}

/// Finds the function for an exact symbol (canonical name or alias),
/// `Function::ERROR` when unknown.
pub fn lookup_function(symbol: &str) -> Function {
    FUNCTION_TABLE
        .binary_search_by(|(s, _)| s.cmp(&symbol))
        .map(|idx| FUNCTION_TABLE[idx].1)
        .unwrap_or(Function::ERROR)
}

impl Operation {
    /// single character form, as it appears in formulas
    pub fn token(&self) -> &'static str {
        self.into()
    }

    pub fn from_char(c: char) -> Operation {
        let mut buf = [0u8; 4];
        lookup_operation(c.encode_utf8(&mut buf))
    }

    /// name of the GLSL complex-arithmetic intrinsic implementing this operator
    pub fn glsl_intrinsic(&self) -> &'static str {
        match self {
            Operation::Add => "cadd",
            Operation::Sub => "csub",
            Operation::Mul => "cmul",
            Operation::Div => "cdiv",
            Operation::Pow => "cpow",
            Operation::ERROR => "ERROR",
        }
    }
}

impl Function {
    /// canonical name; aliases all map back to it
    pub fn token(&self) -> &'static str {
        self.into()
    }

    pub fn glsl_intrinsic(&self) -> String {
        format!("c{}", self.token())
    }
}
