//! Discrete random variables with numeric outcomes.
//!
//! A [`Dice`] maps every outcome ("eyes") to its probability. Dice combine
//! like numbers: `&a + &b` is the distribution of the sum of two independent
//! throws, and `&a * 2` doubles every outcome of a single throw.
//!
//! Integer eyes stay integers under `+ - *` unless the result overflows
//! `i64`; any float operand makes the result a float.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use causetable_foundation::{Error, Result, Value};
use causetable_storage::ProbabilityTable;

/// A probability mass function over numeric outcomes.
#[derive(Clone, Debug, PartialEq)]
pub struct Dice {
    probs: BTreeMap<Value, f64>,
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    fn apply(self, a: &Value, b: &Value) -> Value {
        if let (Value::Int(x), Value::Int(y)) = (a, b) {
            let exact = match self {
                Self::Add => x.checked_add(*y),
                Self::Sub => x.checked_sub(*y),
                Self::Mul => x.checked_mul(*y),
            };
            if let Some(n) = exact {
                return Value::Int(n);
            }
        }
        // Eyes are numeric by construction.
        let x = a.as_number().unwrap_or(0.0);
        let y = b.as_number().unwrap_or(0.0);
        Value::Float(match self {
            Self::Add => x + y,
            Self::Sub => x - y,
            Self::Mul => x * y,
        })
    }
}

impl Dice {
    /// Builds dice from `(eyes, probability)` pairs.
    ///
    /// Repeated eyes have their probabilities summed. Probabilities are
    /// taken as given and not renormalized.
    ///
    /// # Errors
    ///
    /// Returns a shape error if an outcome is not a finite number or a
    /// probability is negative or not finite.
    pub fn new<I, K>(probs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<Value>,
    {
        let mut merged = BTreeMap::new();
        for (eyes, prob) in probs {
            let eyes = eyes.into();
            if !eyes.as_number().is_some_and(f64::is_finite) {
                return Err(Error::shape(format!("dice eyes must be finite numbers, got {eyes:?}")));
            }
            if !prob.is_finite() || prob < 0.0 {
                return Err(Error::shape(format!("invalid probability {prob} for eyes {eyes}")));
            }
            *merged.entry(eyes).or_insert(0.0) += prob;
        }
        Ok(Self { probs: merged })
    }

    /// Dice that always show `eyes`.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `eyes` is not a finite number.
    pub fn constant(eyes: impl Into<Value>) -> Result<Self> {
        Self::new([(eyes, 1.0)])
    }

    fn scalar(eyes: Value) -> Self {
        Self {
            probs: BTreeMap::from([(eyes, 1.0)]),
        }
    }

    /// Fair dice with eyes `1..=max_eyes`.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `max_eyes` is less than one.
    #[allow(clippy::cast_precision_loss)]
    pub fn make_simple_dice(max_eyes: i64) -> Result<Self> {
        if max_eyes < 1 {
            return Err(Error::shape(format!("dice need at least one eye, got {max_eyes}")));
        }
        let p = 1.0 / max_eyes as f64;
        Self::new((1..=max_eyes).map(|eyes| (eyes, p)))
    }

    /// Empirical dice from a string of digits: `"11223"` shows 1 and 2 with
    /// probability 0.4 each and 3 with probability 0.2.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the string is empty or contains anything
    /// other than ASCII digits.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_string(throws: &str) -> Result<Self> {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for c in throws.chars() {
            let eyes = c
                .to_digit(10)
                .ok_or_else(|| Error::shape(format!("'{c}' is not a digit")))?;
            *counts.entry(i64::from(eyes)).or_insert(0) += 1;
        }
        let total: usize = counts.values().sum();
        if total == 0 {
            return Err(Error::shape("dice need at least one throw"));
        }
        Self::new(
            counts
                .into_iter()
                .map(|(eyes, n)| (eyes, n as f64 / total as f64)),
        )
    }

    /// Probability of `eyes`; zero for outcomes the dice never show.
    #[must_use]
    pub fn prob(&self, eyes: impl Into<Value>) -> f64 {
        self.probs.get(&eyes.into()).copied().unwrap_or(0.0)
    }

    /// Outcomes with their probabilities, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, f64)> + '_ {
        self.probs.iter().map(|(k, p)| (k, *p))
    }

    /// Number of distinct outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Returns true if the dice have no outcomes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Expected value.
    #[must_use]
    pub fn exp(&self) -> f64 {
        self.iter()
            .map(|(x, p)| p * x.as_number().unwrap_or(0.0))
            .sum()
    }

    /// Variance around [`Dice::exp`].
    #[must_use]
    pub fn var(&self) -> f64 {
        let mu = self.exp();
        self.iter()
            .map(|(x, p)| p * (x.as_number().unwrap_or(0.0) - mu).powi(2))
            .sum()
    }

    /// The distribution as a one-column probability table.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `column` is the reserved name `prob`.
    pub fn to_table(&self, column: &str) -> Result<ProbabilityTable> {
        ProbabilityTable::from_rows([column], self.iter().map(|(x, p)| (vec![x.clone()], p)))
    }

    fn combine(&self, other: &Self, op: Op) -> Self {
        let mut probs = BTreeMap::new();
        for (x, p) in &self.probs {
            for (y, q) in &other.probs {
                *probs.entry(op.apply(x, y)).or_insert(0.0) += p * q;
            }
        }
        Self { probs }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.probs.keys().next(), self.probs.keys().next_back()) {
            (Some(lo), Some(hi)) => write!(f, "<Dice with eyes {lo}-{hi}>"),
            _ => write!(f, "<Dice with no eyes>"),
        }
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

macro_rules! dice_ops {
    ($($trait:ident :: $method:ident => $op:expr),* $(,)?) => {$(
        impl $trait<&Dice> for &Dice {
            type Output = Dice;

            fn $method(self, rhs: &Dice) -> Dice {
                self.combine(rhs, $op)
            }
        }

        impl $trait for Dice {
            type Output = Dice;

            fn $method(self, rhs: Dice) -> Dice {
                self.combine(&rhs, $op)
            }
        }

        impl $trait<i64> for &Dice {
            type Output = Dice;

            fn $method(self, rhs: i64) -> Dice {
                self.combine(&Dice::scalar(Value::Int(rhs)), $op)
            }
        }

        impl $trait<f64> for &Dice {
            type Output = Dice;

            fn $method(self, rhs: f64) -> Dice {
                self.combine(&Dice::scalar(Value::Float(rhs)), $op)
            }
        }

        impl $trait<&Dice> for i64 {
            type Output = Dice;

            fn $method(self, rhs: &Dice) -> Dice {
                Dice::scalar(Value::Int(self)).combine(rhs, $op)
            }
        }

        impl $trait<&Dice> for f64 {
            type Output = Dice;

            fn $method(self, rhs: &Dice) -> Dice {
                Dice::scalar(Value::Float(self)).combine(rhs, $op)
            }
        }
    )*};
}

dice_ops! {
    Add::add => Op::Add,
    Sub::sub => Op::Sub,
    Mul::mul => Op::Mul,
}
