/*
Signal Expressions
==================

A `Signal` is a pure function from time (seconds) to amplitude, built
compositionally: leaves are constants, generators, or user-supplied rules,
and interior nodes apply pointwise arithmetic to their operands.

    let tone = sine(440.0) * decay(3.0) * 0.5;
    let s = tone.at(0.25);            // one sample
    let block = tone.eval(&ts);       // one per timestamp

Handles are cheap to clone (an `Arc` around an immutable node), so a signal
can sit in several graphs at once. Nothing is ever mutated after
construction; the noise generators are the only leaves that behave
stochastically, redrawing randomness on every call.

Every node also renders a textual descriptor (see `describe`) that the
parser in `parse` can turn back into an equivalent tree.
*/

use std::sync::Arc;

use crate::sequencing::pitcher::NoteTrack;

/// Descriptor rendering (`Display` for [`Signal`]) and named patch scripts.
pub mod describe;
/// Parametrized leaf signals: oscillators, decay, noise sources.
pub mod generators;
/// Arithmetic operator overloads (`+ - * /`, `pow`, unary `-`).
pub mod ops;
/// Descriptor parser turning saved text back into signal trees.
pub mod parse;

pub use describe::Patch;
pub use generators::{decay, noise, saw, shot_noise, sine, square, Generator};
pub use parse::{parse, parse_patch, ParseError};

/// Evaluation rule for user-supplied leaves.
pub type RuleFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Immutable handle to a node in a signal expression tree.
#[derive(Clone)]
pub struct Signal {
    node: Arc<SignalNode>,
}

/// The expression tree behind a [`Signal`] handle.
pub enum SignalNode {
    /// Constant amplitude, independent of time.
    Const(f64),
    /// User-supplied rule; `label` stands in as its descriptor.
    Rule { f: RuleFn, label: String },
    /// Parametrized generator leaf.
    Gen(Generator),
    /// Composite wrapped under a short descriptor name (instruments).
    Labeled { label: String, inner: Signal },
    /// Unary combinator applied to one operand.
    Unary { op: UnaryOp, operand: Signal },
    /// Binary combinator applied pointwise to two operands.
    Binary { op: BinaryOp, lhs: Signal, rhs: Signal },
    /// A base signal rendered against a note stream.
    Track(NoteTrack),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub(crate) fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }
}

impl Signal {
    pub(crate) fn from_node(node: SignalNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Leaf with a fixed amplitude.
    pub fn constant(value: f64) -> Self {
        Self::from_node(SignalNode::Const(value))
    }

    /// Leaf evaluating a user-supplied rule. The label is used verbatim as
    /// the node's descriptor.
    pub fn from_rule(
        label: impl Into<String>,
        f: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::from_node(SignalNode::Rule {
            f: Arc::new(f),
            label: label.into(),
        })
    }

    /// Wrap a composed signal under a short descriptor name.
    pub(crate) fn labeled(label: impl Into<String>, inner: Signal) -> Self {
        Self::from_node(SignalNode::Labeled {
            label: label.into(),
            inner,
        })
    }

    pub fn node(&self) -> &SignalNode {
        &self.node
    }

    /// Amplitude at a single point in time.
    pub fn at(&self, t: f64) -> f64 {
        match self.node.as_ref() {
            SignalNode::Const(v) => *v,
            SignalNode::Rule { f, .. } => f(t),
            SignalNode::Gen(g) => g.sample(t),
            SignalNode::Labeled { inner, .. } => inner.at(t),
            SignalNode::Unary {
                op: UnaryOp::Neg,
                operand,
            } => -operand.at(t),
            SignalNode::Binary { op, lhs, rhs } => op.apply(lhs.at(t), rhs.at(t)),
            SignalNode::Track(track) => track.render_at(t),
        }
    }

    /// Evaluate at every timestamp in `ts`, writing into `out`.
    ///
    /// `ts` must be ordered; note tracks use its first and last entries to
    /// window out notes that cannot contribute to the batch.
    pub fn eval_into(&self, ts: &[f64], out: &mut [f64]) {
        debug_assert_eq!(ts.len(), out.len());
        match self.node.as_ref() {
            SignalNode::Const(v) => out.fill(*v),
            SignalNode::Rule { f, .. } => {
                for (o, &t) in out.iter_mut().zip(ts) {
                    *o = f(t);
                }
            }
            SignalNode::Gen(g) => g.fill(ts, out),
            SignalNode::Labeled { inner, .. } => inner.eval_into(ts, out),
            SignalNode::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                operand.eval_into(ts, out);
                for o in out.iter_mut() {
                    *o = -*o;
                }
            }
            SignalNode::Binary { op, lhs, rhs } => {
                lhs.eval_into(ts, out);
                let mut rhs_vals = vec![0.0; ts.len()];
                rhs.eval_into(ts, &mut rhs_vals);
                for (o, r) in out.iter_mut().zip(&rhs_vals) {
                    *o = op.apply(*o, *r);
                }
            }
            SignalNode::Track(track) => track.render(ts, out),
        }
    }

    /// Evaluate at every timestamp in `ts` into a fresh buffer.
    pub fn eval(&self, ts: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; ts.len()];
        self.eval_into(ts, &mut out);
        out
    }
}

/// Evenly spaced timestamps from `start` to `end`, endpoints included.
pub fn axis(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn constant_leaf_is_flat() {
        let c = Signal::constant(0.25);
        assert_eq!(c.at(0.0), 0.25);
        assert_eq!(c.at(17.3), 0.25);
        assert_eq!(c.eval(&[0.0, 1.0, 2.0]), vec![0.25, 0.25, 0.25]);
    }

    #[test]
    fn rule_leaf_applies_closure() {
        let ramp = Signal::from_rule("ramp", |t| 2.0 * t);
        assert_eq!(ramp.at(0.5), 1.0);
        assert_eq!(ramp.eval(&[0.0, 0.25]), vec![0.0, 0.5]);
    }

    #[test]
    fn scalar_and_batch_eval_agree() {
        let sig = sine(3.0) * 0.5 + decay(1.0);
        let ts = [0.0, 0.01, 0.02, 0.5, 1.0];
        let batch = sig.eval(&ts);
        for (&t, &v) in ts.iter().zip(&batch) {
            assert!((sig.at(t) - v).abs() < 1e-12);
        }
    }

    #[test]
    fn handles_share_the_tree() {
        let a = sine(440.0);
        let b = a.clone();
        let t = 1.0 / 1760.0;
        let expected = (TAU * 440.0 * t).sin();
        assert!((a.at(t) - expected).abs() < 1e-12);
        assert!((b.at(t) - expected).abs() < 1e-12);
    }

    #[test]
    fn axis_includes_both_endpoints() {
        let ts = axis(0.0, 1.0, 5);
        assert_eq!(ts, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(axis(2.0, 3.0, 1), vec![2.0]);
        assert!(axis(0.0, 1.0, 0).is_empty());
    }
}
