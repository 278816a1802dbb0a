//! a module turns a String expression into an expression tree
//!# Example
//! ```
//! use RustedFractals::symbolic::parse_expr::parse_expression;
//! use RustedFractals::symbolic::symbolic_tree::Tree;
//! use num_complex::Complex64;
//! let tree: Tree<Complex64> = parse_expression("z^2 + c").unwrap();
//! println!("parsed expression {}", tree);
//! ```
//                  recursion diagram (precedence grows downwards)
//                "-z^2^3*c+sin(z)"
//                |_________________________________|
//                |  Expr  := '-'? Term (+|- Term)* |   left-assoc
//                |_________________________________|
//                |   -(z^2^3*c)   |    sin(z)      |
//                |_______________\|/_______________|
//                |  Term  := Power (*|/ Power)*    |   left-assoc
//                |_________________________________|
//                |   z^2^3        |       c        |
//                |_______________\|/_______________|
//                |  Power := Atom ('^' Power)      |   right-assoc
//                |_________________________________|
//                |   z   ^ (2 ^ 3)                 |
//                |_______________\|/_______________|
//                |  Atom  := (Expr) | id(Expr) | number | id
//                |_________________________________|
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_registry::{Function, Operation, lookup_function};
use crate::symbolic::symbolic_traits::ExprScalar;
use crate::symbolic::symbolic_tree::Tree;
use log::debug;

/// deepest tree the parser builds; deeper formulas are a `SyntaxError`
pub const MAX_DEPTH: usize = 256;
/// recursion limit of the parser; the printed form of any tree within [`MAX_DEPTH`]
/// nests at most this far
const MAX_NESTING: usize = 2 * MAX_DEPTH + 1;

/// Parses a formula into a tree. Whitespace is ignored; no backtracking, the first
/// error is returned. Error positions are char indices into `input`.
pub fn parse_expression<N: ExprScalar>(input: &str) -> Result<Tree<N>, ExprError> {
    let mut cursor = Cursor::new(input);
    debug!("parsing '{}'", cursor.stripped());
    let (tree, _depth) = cursor.parse_expr()?;
    match cursor.peek() {
        None => Ok(tree),
        Some(token) => Err(ExprError::UnidentifiedOperation {
            position: cursor.position(),
            token,
        }),
    }
}

/// shared cursor over the whitespace-stripped input; keeps original char indices
struct Cursor {
    chars: Vec<(usize, char)>,
    pos: usize,
    input_len: usize,
    nesting: usize,
}

/// a subtree with its depth
type Parsed<N> = (Tree<N>, usize);

impl Cursor {
    fn new(input: &str) -> Self {
        let chars: Vec<(usize, char)> = input
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .collect();
        Cursor {
            chars,
            pos: 0,
            input_len: input.chars().count(),
            nesting: 0,
        }
    }

    fn stripped(&self) -> String {
        self.chars.iter().map(|(_, c)| *c).collect()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    /// position in the original input; end of input maps to its length
    fn position(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.input_len)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// depth of a new node over children of depth `below`
    fn parent_depth(&self, below: usize) -> Result<usize, ExprError> {
        if below >= MAX_DEPTH {
            return Err(ExprError::SyntaxError {
                position: self.position(),
            });
        }
        Ok(below + 1)
    }

    // Expr := '-'? Term (('+'|'-') Term)*
    fn parse_expr<N: ExprScalar>(&mut self) -> Result<Parsed<N>, ExprError> {
        let negate = self.eat('-');
        let (mut tree, mut depth) = self.parse_term()?;
        if negate {
            tree = Tree::negation(tree);
            depth = self.parent_depth(depth)?;
        }
        while let Some(c @ ('+' | '-')) = self.peek() {
            self.advance();
            let (rhs, rhs_depth) = self.parse_term()?;
            tree = Tree::binary(Operation::from_char(c), tree, rhs);
            depth = self.parent_depth(depth.max(rhs_depth))?;
        }
        Ok((tree, depth))
    }

    // Term := Power (('*'|'/') Power)*
    fn parse_term<N: ExprScalar>(&mut self) -> Result<Parsed<N>, ExprError> {
        let (mut tree, mut depth) = self.parse_power()?;
        while let Some(c @ ('*' | '/')) = self.peek() {
            self.advance();
            let (rhs, rhs_depth) = self.parse_power()?;
            tree = Tree::binary(Operation::from_char(c), tree, rhs);
            depth = self.parent_depth(depth.max(rhs_depth))?;
        }
        Ok((tree, depth))
    }

    // every bracket, call and exponent passes through here
    fn parse_power<N: ExprScalar>(&mut self) -> Result<Parsed<N>, ExprError> {
        if self.nesting >= MAX_NESTING {
            return Err(ExprError::SyntaxError {
                position: self.position(),
            });
        }
        self.nesting += 1;
        let parsed = self.parse_power_unguarded();
        self.nesting -= 1;
        parsed
    }

    // Power := Atom ('^' Power)*   -- the recursion makes '^' right-associative
    fn parse_power_unguarded<N: ExprScalar>(&mut self) -> Result<Parsed<N>, ExprError> {
        let (base, base_depth) = self.parse_atom()?;
        if self.eat('^') {
            let (exponent, exponent_depth) = self.parse_power()?;
            let depth = self.parent_depth(base_depth.max(exponent_depth))?;
            return Ok((Tree::binary(Operation::Pow, base, exponent), depth));
        }
        Ok((base, base_depth))
    }

    // Atom := '(' Expr ')' | Call | Number | Variable
    fn parse_atom<N: ExprScalar>(&mut self) -> Result<Parsed<N>, ExprError> {
        match self.peek() {
            Some('(') => {
                let open = self.position();
                self.advance();
                let inner = self.parse_expr()?;
                if !self.eat(')') {
                    return Err(ExprError::NoCloseBracket { position: open });
                }
                Ok(inner)
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_identifier(),
            Some(c) if c.is_ascii_digit() || c == '.' => Ok((self.parse_number()?, 1)),
            _ => Err(ExprError::SyntaxError {
                position: self.position(),
            }),
        }
    }

    // Call := identifier '(' Expr ')'   |   Variable := identifier
    fn parse_identifier<N: ExprScalar>(&mut self) -> Result<Parsed<N>, ExprError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() != Some('(') {
            // unknown names are fine here, the evaluator or code generator decides
            return Ok((Tree::variable(&name), 1));
        }
        let function = lookup_function(&name);
        if function == Function::ERROR {
            return Err(ExprError::UnidentifiedFunction { name });
        }
        let open = self.position();
        self.advance();
        let (argument, depth) = self.parse_expr()?;
        if !self.eat(')') {
            return Err(ExprError::NoCloseBracket { position: open });
        }
        let depth = self.parent_depth(depth)?;
        Ok((Tree::function(function, argument), depth))
    }

    // Number := float-literal ('i')?
    fn parse_number<N: ExprScalar>(&mut self) -> Result<Tree<N>, ExprError> {
        let start = self.position();
        let mut literal = String::new();
        let mut digits = 0;
        self.take_digits(&mut literal, &mut digits);
        if self.eat('.') {
            literal.push('.');
            self.take_digits(&mut literal, &mut digits);
        }
        if digits == 0 {
            return Err(ExprError::SyntaxError { position: start });
        }
        // an exponent only when digits follow, so "2e" stays "2" followed by 'e'
        if let Some(e @ ('e' | 'E')) = self.peek() {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let first_digit = if signed { self.peek_at(2) } else { self.peek_at(1) };
            if first_digit.is_some_and(|c| c.is_ascii_digit()) {
                literal.push(e);
                self.advance();
                if signed {
                    if let Some(sign) = self.peek() {
                        literal.push(sign);
                    }
                    self.advance();
                }
                let mut exp_digits = 0;
                self.take_digits(&mut literal, &mut exp_digits);
            }
        }
        let value: f64 = literal
            .parse()
            .map_err(|_| ExprError::SyntaxError { position: start })?;
        // "1e400" would become inf, which prints as a name
        if !value.is_finite() {
            return Err(ExprError::SyntaxError { position: start });
        }
        let imaginary = self.eat('i');
        N::from_literal(value, imaginary)
            .map(Tree::number)
            .ok_or(ExprError::SyntaxError { position: start })
    }

    fn take_digits(&mut self, literal: &mut String, count: &mut usize) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                literal.push(c);
                *count += 1;
                self.advance();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_errors::ErrorKind;
    use num_complex::Complex64;

    type T = Tree<Complex64>;

    fn parse(input: &str) -> Result<T, ExprError> {
        parse_expression(input)
    }
    fn var(name: &str) -> T {
        Tree::variable(name)
    }
    fn num(v: f64) -> T {
        Tree::real(v)
    }

    #[test]
    fn test_parse_constant() {
        assert_eq!(parse("42").unwrap(), num(42.0));
        assert_eq!(parse("0.5").unwrap(), num(0.5));
        assert_eq!(parse(".5").unwrap(), num(0.5));
        assert_eq!(parse("3.").unwrap(), num(3.0));
        assert_eq!(parse("1.5e3").unwrap(), num(1500.0));
        assert_eq!(parse("2E-2").unwrap(), num(0.02));
    }

    #[test]
    fn test_parse_imaginary_literal() {
        assert_eq!(
            parse("2.5i").unwrap(),
            Tree::number(Complex64::new(0.0, 2.5))
        );
        assert_eq!(
            parse("1 + 1i").unwrap(),
            num(1.0) + Tree::number(Complex64::new(0.0, 1.0))
        );
    }

    #[test]
    fn test_imaginary_literal_rejected_for_real_scalar() {
        let result: Result<Tree<f64>, _> = parse_expression("2i");
        assert_eq!(result, Err(ExprError::SyntaxError { position: 0 }));
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(parse("x").unwrap(), var("x"));
        assert_eq!(parse("cx").unwrap(), var("cx"));
        assert_eq!(parse("z_1").unwrap(), var("z_1"));
        // unknown names are not a parse error
        assert_eq!(parse("w").unwrap(), var("w"));
    }

    #[test]
    fn test_parse_addition() {
        assert_eq!(parse("2+3").unwrap(), num(2.0) + num(3.0));
        assert_eq!(parse("x + 2").unwrap(), var("x") + num(2.0));
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(
            parse("x^2 - x - 1").unwrap(),
            (var("x").pow(num(2.0)) - var("x")) - num(1.0)
        );
        assert_eq!(
            parse("8/4/2").unwrap(),
            (num(8.0) / num(4.0)) / num(2.0)
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse("2^3^2").unwrap(),
            num(2.0).pow(num(3.0).pow(num(2.0)))
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("a+b*c^2").unwrap(),
            var("a") + var("b") * var("c").pow(num(2.0))
        );
        assert_eq!(
            parse("(x + y) * z").unwrap(),
            (var("x") + var("y")) * var("z")
        );
    }

    #[test]
    fn test_leading_minus_binds_first_term() {
        assert_eq!(parse("-x").unwrap(), -var("x"));
        assert_eq!(
            parse("-x*y+1").unwrap(),
            -(var("x") * var("y")) + num(1.0)
        );
        assert_eq!(parse("2*(-x)").unwrap(), num(2.0) * -var("x"));
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(
            parse("sin(x)").unwrap(),
            Tree::function(Function::Sin, var("x"))
        );
        assert_eq!(
            parse("tg(x)").unwrap(),
            Tree::function(Function::Tan, var("x"))
        );
        assert_eq!(
            parse("sin(cos(x))").unwrap(),
            Tree::function(Function::Sin, Tree::function(Function::Cos, var("x")))
        );
        assert_eq!(
            parse("exp(z)*c").unwrap(),
            Tree::function(Function::Exp, var("z")) * var("c")
        );
    }

    #[test]
    fn test_whitespace_is_stripped() {
        assert_eq!(parse(" z ^ 2\t+\nc ").unwrap(), parse("z^2+c").unwrap());
        assert_eq!(parse("s i n ( x )").unwrap(), parse("sin(x)").unwrap());
    }

    #[test]
    fn test_unknown_function() {
        let err = parse("foo(1)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnidentifiedFunction);
        assert_eq!(
            err,
            ExprError::UnidentifiedFunction {
                name: "foo".to_string()
            }
        );
    }

    #[test]
    fn test_unclosed_brackets() {
        assert_eq!(
            parse("(1+2").unwrap_err(),
            ExprError::NoCloseBracket { position: 0 }
        );
        assert_eq!(
            parse("sin(x").unwrap_err(),
            ExprError::NoCloseBracket { position: 3 }
        );
        assert_eq!(parse("((x)").unwrap_err().kind(), ErrorKind::NoCloseBracket);
    }

    #[test]
    fn test_trailing_tokens() {
        assert_eq!(
            parse("1+2)").unwrap_err(),
            ExprError::UnidentifiedOperation {
                position: 3,
                token: ')'
            }
        );
        assert_eq!(
            parse("2 $ 3").unwrap_err(),
            ExprError::UnidentifiedOperation {
                position: 2,
                token: '$'
            }
        );
        assert_eq!(parse("2x").unwrap_err().kind(), ErrorKind::UnidentifiedOperation);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse("").unwrap_err(), ExprError::SyntaxError { position: 0 });
        assert_eq!(parse("x +").unwrap_err(), ExprError::SyntaxError { position: 3 });
        assert_eq!(parse("2+*3").unwrap_err(), ExprError::SyntaxError { position: 2 });
        assert_eq!(parse(".").unwrap_err(), ExprError::SyntaxError { position: 0 });
        assert_eq!(parse("--x").unwrap_err().kind(), ErrorKind::SyntaxError);
        assert_eq!(parse("2^-1").unwrap_err().kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_overflowing_literal() {
        assert_eq!(parse("1e400+z").unwrap_err(), ExprError::SyntaxError { position: 0 });
        assert_eq!(parse("z*2e999i").unwrap_err(), ExprError::SyntaxError { position: 2 });
        let large = parse("1e300+z").unwrap();
        assert_eq!(parse(&large.to_string()).unwrap(), large);
    }

    #[test]
    fn test_depth_limit() {
        let chain = vec!["x"; MAX_DEPTH].join("+");
        let tree = parse(&chain).unwrap();
        assert_eq!(tree.depth(), MAX_DEPTH);
        assert_eq!(parse(&tree.to_string()).unwrap(), tree);
        let too_long = vec!["x"; MAX_DEPTH + 1].join("+");
        assert_eq!(parse(&too_long).unwrap_err().kind(), ErrorKind::SyntaxError);

        // exponents print with the deepest bracketing
        let tower = vec!["x"; MAX_DEPTH].join("^");
        let tree = parse(&tower).unwrap();
        assert_eq!(tree.depth(), MAX_DEPTH);
        assert_eq!(parse(&tree.to_string()).unwrap(), tree);
    }

    #[test]
    fn test_nesting_limit() {
        let wrapped = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&wrapped).unwrap(), var("x"));
        let n = MAX_NESTING + 1;
        let deep = format!("{}x{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse(&deep).unwrap_err().kind(), ErrorKind::SyntaxError);
        let calls = format!("{}x{}", "sin(".repeat(n), ")".repeat(n));
        assert_eq!(parse(&calls).unwrap_err().kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_exponent_needs_digits() {
        // "2e" is the number 2 followed by the variable e, which is trailing input
        assert_eq!(parse("2e").unwrap_err().kind(), ErrorKind::UnidentifiedOperation);
        assert_eq!(parse("2*e").unwrap(), num(2.0) * var("e"));
    }
}
