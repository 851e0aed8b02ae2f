/*
Descriptors
===========

Every signal can print itself as a one-line expression, its descriptor:

  (sine(220) + sine(274.8)) * decay(4)/2

Descriptors use the same alphabet the parser accepts, so a printed
patch reloads as the tree that printed it. Parenthesization is decided
structurally from each node's binding power rather than by inspecting
the rendered text, and the renderer parenthesizes a right operand of
equal precedence, so `a - (b - c)` and `(a - b) - c` stay distinct
through a round trip.

A `Patch` is an ordered set of name bindings. Rendering a patch writes
one `name = expression` line per binding, substituting the name of any
earlier binding whose tree is shared (by pointer) inside a later one.
Nothing is discovered from ambient state: a signal only appears in a
script because someone bound it.
*/

use std::fmt;
use std::sync::Arc;

use super::{BinaryOp, Generator, Signal, SignalNode, UnaryOp};

/// Binding power of a rendered node. Atoms are 4, `**` is 3,
/// `*` and `/` are 2, `+` and `-` are 1.
fn node_bp(node: &SignalNode) -> u8 {
    match node {
        // a negative literal prints with a leading minus, which binds
        // like a unary below `**`
        SignalNode::Const(c) if c.is_sign_negative() => 3,
        SignalNode::Const(_)
        | SignalNode::Rule { .. }
        | SignalNode::Gen(_)
        | SignalNode::Labeled { .. }
        | SignalNode::Track(_) => 4,
        SignalNode::Unary { .. } => 4,
        SignalNode::Binary { op, .. } => match op {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow => 3,
        },
    }
}

fn push_gen(out: &mut String, gen: &Generator) {
    use std::fmt::Write;
    match gen {
        Generator::Sine { freq } => write!(out, "sine({freq})"),
        Generator::Square { freq } => write!(out, "square({freq})"),
        Generator::Saw { freq } => write!(out, "saw({freq})"),
        Generator::Decay { amount } => write!(out, "decay({amount})"),
        Generator::Noise => write!(out, "noise()"),
        Generator::ShotNoise { rate, .. } => write!(out, "shot_noise({rate})"),
    }
    .expect("writing to a String cannot fail");
}

/// Renders `sig` into `out`, parenthesizing when its binding power is
/// below what the surrounding operator requires. Trees that are
/// pointer-equal to a binding in `env` render as that binding's name.
fn push_expr(out: &mut String, sig: &Signal, env: &[(String, Signal)], min_bp: u8) {
    use std::fmt::Write;

    if let Some((name, _)) = env
        .iter()
        .rev()
        .find(|(_, bound)| Arc::ptr_eq(&sig.node, &bound.node))
    {
        out.push_str(name);
        return;
    }

    if node_bp(sig.node()) < min_bp {
        out.push('(');
        push_expr(out, sig, env, 0);
        out.push(')');
        return;
    }

    match sig.node() {
        SignalNode::Const(c) => write!(out, "{c}").expect("writing to a String cannot fail"),
        SignalNode::Rule { label, .. } => out.push_str(label),
        SignalNode::Gen(gen) => push_gen(out, gen),
        SignalNode::Labeled { label, .. } => out.push_str(label),
        SignalNode::Track(track) => {
            write!(out, "{track}").expect("writing to a String cannot fail")
        }
        SignalNode::Unary {
            op: UnaryOp::Neg,
            operand,
        } => {
            out.push_str("(-");
            push_expr(out, operand, env, 4);
            out.push(')');
        }
        SignalNode::Binary { op, lhs, rhs } => {
            let (token, lbp, rbp) = match op {
                BinaryOp::Add => (" + ", 1, 2),
                BinaryOp::Sub => (" - ", 1, 2),
                BinaryOp::Mul => (" * ", 2, 3),
                BinaryOp::Div => ("/", 2, 3),
                BinaryOp::Pow => ("**", 4, 3),
            };
            push_expr(out, lhs, env, lbp);
            out.push_str(token);
            push_expr(out, rhs, env, rbp);
        }
    }
}

impl Signal {
    /// The expression this tree prints as. Same as `to_string`.
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        push_expr(&mut out, self, &[], 0);
        out
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.descriptor())
    }
}

/// An ordered set of named signals.
///
/// Later bindings may build on earlier ones, and [`Patch::script`]
/// prints the set in definition order, reusing earlier names wherever
/// a later expression shares their tree. [`parse_patch`] reads the
/// same format back.
///
/// [`parse_patch`]: super::parse_patch
#[derive(Clone, Default)]
pub struct Patch {
    bindings: Vec<(String, Signal)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `signal`. Rebinding an existing name shadows
    /// the earlier definition for lookups while keeping both lines in
    /// the script.
    pub fn bind(&mut self, name: impl Into<String>, signal: Signal) {
        self.bindings.push((name.into(), signal));
    }

    /// Builder-style [`bind`](Self::bind).
    pub fn with(mut self, name: impl Into<String>, signal: Signal) -> Self {
        self.bind(name, signal);
        self
    }

    /// Most recent binding for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Signal)> {
        self.bindings.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Renders the patch as a reloadable script, one binding per line.
    pub fn script(&self) -> String {
        let mut out = String::from("#!blockwave\n");
        for (i, (name, signal)) in self.bindings.iter().enumerate() {
            out.push_str(name);
            out.push_str(" = ");
            push_expr(&mut out, signal, &self.bindings[..i], 0);
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|(n, _)| n))
            .finish()
    }
}
