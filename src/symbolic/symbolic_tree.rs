//! # Expression Tree
//!
//! Generic container for a parsed formula: a tagged node value plus an ordered list of
//! owned child subtrees. The tree carries no behaviour of its own; evaluation,
//! differentiation, simplification and GLSL lowering are separate passes that match on
//! [`NodeValue`].
//!
//! ## Operand order
//! Children are stored in reading order:
//! - binary `Operation`: `branches[0]` is the left operand, `branches[1]` the right one
//!   (`a - b` is `[a, b]`, `a ^ b` is `[base, exponent]`);
//! - single-child `Operation`: `branches[0]` is the negated operand;
//! - `Function`: `branches[0]` is the argument.
//!
//! Passes use [`Tree::left`], [`Tree::right`] and [`Tree::operand`] instead of raw indices.
//!
//! Equality is structural (`#[derive(PartialEq)]`), clones are deep.
use crate::symbolic::symbolic_registry::{Function, Operation};
use crate::symbolic::symbolic_traits::ExprScalar;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue<N> {
    Operation(Operation),
    Function(Function),
    Variable(String),
    Number(N),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tree<N> {
    value: NodeValue<N>,
    branches: Vec<Tree<N>>,
}

impl<N> Tree<N> {
    /// a node without children
    pub fn new(value: NodeValue<N>) -> Self {
        Tree {
            value,
            branches: Vec::new(),
        }
    }

    pub fn with_branches(value: NodeValue<N>, branches: Vec<Tree<N>>) -> Self {
        Tree { value, branches }
    }

    pub fn number(value: N) -> Self {
        Tree::new(NodeValue::Number(value))
    }

    pub fn variable(name: &str) -> Self {
        Tree::new(NodeValue::Variable(name.to_string()))
    }

    pub fn function(function: Function, argument: Tree<N>) -> Self {
        Tree::with_branches(NodeValue::Function(function), vec![argument])
    }

    pub fn binary(operation: Operation, left: Tree<N>, right: Tree<N>) -> Self {
        Tree::with_branches(NodeValue::Operation(operation), vec![left, right])
    }

    /// unary minus: a `Sub` node with a single child
    pub fn negation(operand: Tree<N>) -> Self {
        Tree::with_branches(NodeValue::Operation(Operation::Sub), vec![operand])
    }

    pub fn pow(self, exponent: Tree<N>) -> Self {
        Tree::binary(Operation::Pow, self, exponent)
    }

    pub fn value(&self) -> &NodeValue<N> {
        &self.value
    }

    pub fn branches(&self) -> &[Tree<N>] {
        &self.branches
    }

    pub fn branches_mut(&mut self) -> &mut [Tree<N>] {
        &mut self.branches
    }

    pub fn push_branch(&mut self, branch: Tree<N>) {
        self.branches.push(branch);
    }

    pub fn pop_branch(&mut self) -> Option<Tree<N>> {
        self.branches.pop()
    }

    /// moves the value and the children out, for rewrites that reuse subtrees
    pub fn into_parts(self) -> (NodeValue<N>, Vec<Tree<N>>) {
        (self.value, self.branches)
    }

    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }

    /// left operand of a binary node
    pub fn left(&self) -> Option<&Tree<N>> {
        if self.branches.len() == 2 {
            self.branches.first()
        } else {
            None
        }
    }

    /// right operand of a binary node
    pub fn right(&self) -> Option<&Tree<N>> {
        if self.branches.len() == 2 {
            self.branches.get(1)
        } else {
            None
        }
    }

    /// the only child of a unary operation or a function call
    pub fn operand(&self) -> Option<&Tree<N>> {
        if self.branches.len() == 1 {
            self.branches.first()
        } else {
            None
        }
    }

    pub fn is_negation(&self) -> bool {
        matches!(self.value, NodeValue::Operation(_)) && self.branches.len() == 1
    }

    /// number of nodes
    pub fn size(&self) -> usize {
        1 + self.branches.iter().map(|b| b.size()).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.branches.iter().map(|b| b.depth()).max().unwrap_or(0)
    }

    pub fn is_leaf(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        match &self.value {
            NodeValue::Variable(v) => v == name,
            _ => self.branches.iter().any(|b| b.contains_variable(name)),
        }
    }

    /// names of all variables, sorted
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        if let NodeValue::Variable(v) = &self.value {
            names.insert(v.clone());
        }
        for branch in &self.branches {
            branch.collect_variables(names);
        }
    }
}

impl<N: Copy> Tree<N> {
    pub fn as_number(&self) -> Option<N> {
        match self.value {
            NodeValue::Number(n) if self.branches.is_empty() => Some(n),
            _ => None,
        }
    }
}

impl<N: ExprScalar> Tree<N> {
    pub fn real(value: f64) -> Self {
        Tree::number(N::from_real(value))
    }

    pub fn zero() -> Self {
        Tree::number(N::zero())
    }

    pub fn one() -> Self {
        Tree::number(N::one())
    }

    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(|n| n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(|n| n.is_one())
    }

    pub fn is_minus_one(&self) -> bool {
        self.as_number().is_some_and(|n| n.is_minus_one())
    }
}

//___________________________________OPERATORS____________________________________

impl<N> std::ops::Add for Tree<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Tree::binary(Operation::Add, self, rhs)
    }
}

impl<N> std::ops::Sub for Tree<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Tree::binary(Operation::Sub, self, rhs)
    }
}

impl<N> std::ops::Mul for Tree<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Tree::binary(Operation::Mul, self, rhs)
    }
}

impl<N> std::ops::Div for Tree<N> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Tree::binary(Operation::Div, self, rhs)
    }
}

impl<N> std::ops::Neg for Tree<N> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Tree::negation(self)
    }
}

//___________________________________PRINTING____________________________________

/// Fully parenthesised text that the parser reads back into the same tree:
/// `(l op r)`, `(-x)`, `fn(x)`, `2`, `0.5i`.
impl<N: ExprScalar> fmt::Display for Tree<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            NodeValue::Number(n) => write_number(f, *n),
            NodeValue::Variable(name) => write!(f, "{}", name),
            NodeValue::Function(func) => {
                write!(f, "{}({})", func.token(), self.branches.iter().join(", "))
            }
            NodeValue::Operation(op) => match self.branches.as_slice() {
                [operand] => write!(f, "(-{})", operand),
                [left, right] => write!(f, "({}{}{})", left, op.token(), right),
                _ => write!(f, "{}", op.token()),
            },
        }
    }
}

fn write_number<N: ExprScalar>(f: &mut fmt::Formatter, n: N) -> fmt::Result {
    let (re, im) = n.parts();
    match (re == 0.0, im == 0.0) {
        (true, true) => write!(f, "0"),
        (_, true) if re < 0.0 => write!(f, "(-{})", -re),
        (_, true) => write!(f, "{}", re),
        (true, false) if im < 0.0 => write!(f, "(-{}i)", -im),
        (true, false) => write!(f, "{}i", im),
        (false, false) => {
            let sign = if im < 0.0 { '-' } else { '+' };
            write!(f, "({}{}{}i)", re, sign, im.abs())
        }
    }
}
