use crate::hatanaka::Error;

/// Highest differential order we accept
pub const MAX_ORDER: usize = 7;

/// `NumDiff` recovers numerical data compressed with the recursive
/// differential equations defined by Y. Hatanaka.
/// Each observation (one satellite, one code) is an independent arc:
/// the first value is a literal, the following ones are Nth order
/// differences accumulated back into the literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NumDiff {
    order: usize,
    /// Accumulated differences: [0] is the current literal
    history: Vec<i64>,
}

impl NumDiff {
    /// Initializes a new arc of given differential order, from a literal value.
    /// RNX2CRX uses order 3 by default.
    pub fn new(order: usize, literal: i64) -> Result<Self, Error> {
        if order == 0 || order > MAX_ORDER {
            return Err(Error::InvalidOrder(order));
        }
        let mut history = Vec::with_capacity(order);
        history.push(literal);
        Ok(Self { order, history })
    }

    /// Differential order of this arc
    pub fn order(&self) -> usize {
        self.order
    }

    /// Latest recovered value
    pub fn value(&self) -> i64 {
        self.history[0]
    }

    /// Accumulates a new difference, returns the recovered value.
    /// While the arc is younger than its order, the differential order
    /// grows by one on each new sample.
    pub fn decompress(&mut self, delta: i64) -> i64 {
        if self.history.len() < self.order {
            self.history.push(delta);
        } else {
            self.history[self.order - 1] += delta;
        }
        for i in (0..self.history.len() - 1).rev() {
            self.history[i] += self.history[i + 1];
        }
        self.history[0]
    }
}
