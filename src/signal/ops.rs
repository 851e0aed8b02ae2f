/*
Signal Algebra
==============

Arithmetic over signals builds trees instead of evaluating anything.
`sine(220.0) * decay(4.0) + 0.1` allocates three nodes and returns a
handle; the samples only exist once someone calls `at` or `eval`.

Plain numbers lift into constant signals on either side of an operator,
so `2.0 * s` and `s * 2.0` both work. Negating a constant folds
immediately, which keeps `-1.0` a single leaf rather than a unary node
wrapping one.
*/

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::{BinaryOp, Signal, SignalNode, UnaryOp};

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        Signal::constant(value)
    }
}

impl From<i32> for Signal {
    fn from(value: i32) -> Self {
        Signal::constant(value as f64)
    }
}

fn binary(op: BinaryOp, lhs: Signal, rhs: Signal) -> Signal {
    if op == BinaryOp::Div {
        if let SignalNode::Const(c) = rhs.node() {
            assert!(*c != 0.0, "division by the zero signal");
        }
    }
    Signal::from_node(SignalNode::Binary { op, lhs, rhs })
}

impl<T: Into<Signal>> Add<T> for Signal {
    type Output = Signal;

    fn add(self, rhs: T) -> Signal {
        binary(BinaryOp::Add, self, rhs.into())
    }
}

impl<T: Into<Signal>> Sub<T> for Signal {
    type Output = Signal;

    fn sub(self, rhs: T) -> Signal {
        binary(BinaryOp::Sub, self, rhs.into())
    }
}

impl<T: Into<Signal>> Mul<T> for Signal {
    type Output = Signal;

    fn mul(self, rhs: T) -> Signal {
        binary(BinaryOp::Mul, self, rhs.into())
    }
}

impl<T: Into<Signal>> Div<T> for Signal {
    type Output = Signal;

    fn div(self, rhs: T) -> Signal {
        binary(BinaryOp::Div, self, rhs.into())
    }
}

impl Add<Signal> for f64 {
    type Output = Signal;

    fn add(self, rhs: Signal) -> Signal {
        binary(BinaryOp::Add, Signal::constant(self), rhs)
    }
}

impl Sub<Signal> for f64 {
    type Output = Signal;

    fn sub(self, rhs: Signal) -> Signal {
        binary(BinaryOp::Sub, Signal::constant(self), rhs)
    }
}

impl Mul<Signal> for f64 {
    type Output = Signal;

    fn mul(self, rhs: Signal) -> Signal {
        binary(BinaryOp::Mul, Signal::constant(self), rhs)
    }
}

impl Div<Signal> for f64 {
    type Output = Signal;

    fn div(self, rhs: Signal) -> Signal {
        binary(BinaryOp::Div, Signal::constant(self), rhs)
    }
}

impl Neg for Signal {
    type Output = Signal;

    fn neg(self) -> Signal {
        // fold so that -2.0 is a constant leaf, not a node over one
        if let SignalNode::Const(c) = self.node() {
            return Signal::constant(-c);
        }
        Signal::from_node(SignalNode::Unary {
            op: UnaryOp::Neg,
            operand: self,
        })
    }
}

impl Signal {
    /// Pointwise power, `self(t).powf(exp(t))`.
    pub fn pow(self, exp: impl Into<Signal>) -> Signal {
        binary(BinaryOp::Pow, self, exp.into())
    }
}
