use rand::{seq::SliceRandom, Rng};

use crate::{OracleErr, Result};

/// Supervised examples cut out of a single series with a sliding window.
///
/// Example `i` uses `series[i..i + lag]` as input and `series[i + lag]` as its
/// target, so a series of `n` points yields `n - lag` examples. The visiting
/// order is kept apart from the data and reshuffled every epoch.
#[derive(Debug, Clone)]
pub struct Windows {
    series: Vec<f64>,
    lag: usize,
    order: Vec<usize>,
}

impl Windows {
    /// Creates the windows of `series`.
    ///
    /// # Errors
    /// `OracleErr::LagTooLarge` if the series cannot hold a single example.
    pub fn new(series: Vec<f64>, lag: usize) -> Result<Self> {
        if lag == 0 || series.len() <= lag {
            return Err(OracleErr::LagTooLarge {
                lag,
                len: series.len(),
            });
        }

        let order = (0..series.len() - lag).collect();
        Ok(Self { series, lag, order })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn lag(&self) -> usize {
        self.lag
    }

    #[inline]
    fn input(&self, i: usize) -> &[f64] {
        &self.series[i..i + self.lag]
    }

    #[inline]
    fn target(&self, i: usize) -> f64 {
        self.series[i + self.lag]
    }

    /// Randomizes the order `shuffled` yields the examples in.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }

    /// Iterates the examples in their natural order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        (0..self.len()).map(move |i| (self.input(i), self.target(i)))
    }

    /// Iterates the examples in the order of the last `shuffle`.
    pub fn shuffled(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        self.order
            .iter()
            .map(move |&i| (self.input(i), self.target(i)))
    }
}
