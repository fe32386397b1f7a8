use ndarray::{linalg, Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::activations::Tanh;
use crate::{OracleErr, Result};

/// A single hidden layer regression network: `lag` inputs, `tanh` hidden units
/// and one linear output.
///
/// `w1` is `hidden × input`, `b1` and `w2` have `hidden` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    pub(crate) w1: Array2<f64>,
    pub(crate) b1: Array1<f64>,
    pub(crate) w2: Array1<f64>,
    pub(crate) b2: f64,
    act_fn: Tanh,
}

/// Parameter gradients of one example, shaped like the `Mlp` they belong to.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub(crate) w1: Array2<f64>,
    pub(crate) b1: Array1<f64>,
    pub(crate) w2: Array1<f64>,
    pub(crate) b2: f64,
}

impl Gradients {
    /// Creates a zeroed gradient buffer for `model`.
    pub fn zeros_like(model: &Mlp) -> Self {
        Self {
            w1: Array2::zeros(model.w1.dim()),
            b1: Array1::zeros(model.hidden_size()),
            w2: Array1::zeros(model.hidden_size()),
            b2: 0.,
        }
    }
}

impl Mlp {
    /// Creates a new randomly initialized `Mlp`.
    ///
    /// Each hidden unit gets its `input_size` input weights and then its output
    /// weight, all drawn uniformly from `[-s, s)` with `s = 1/sqrt(input_size)`.
    /// Biases start at zero.
    ///
    /// # Arguments
    /// * `input_size` - The amount of inputs (the lag).
    /// * `hidden_size` - The amount of hidden units.
    /// * `rng` - The generator the weights are drawn from.
    ///
    /// # Returns
    /// A new `Mlp` or an error if any size is zero.
    pub fn random<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 || hidden_size == 0 {
            return Err(OracleErr::InvalidConfig(format!(
                "network sizes must be positive, got input {input_size} and hidden {hidden_size}"
            )));
        }

        let scale = 1. / (input_size as f64).sqrt();
        let distribution =
            Uniform::new(-scale, scale).map_err(|e| OracleErr::InvalidConfig(e.to_string()))?;

        let mut w1 = Array2::zeros((hidden_size, input_size));
        let mut w2 = Array1::zeros(hidden_size);

        for (mut row, w) in w1.rows_mut().into_iter().zip(w2.iter_mut()) {
            row.iter_mut().for_each(|v| *v = distribution.sample(rng));
            *w = distribution.sample(rng);
        }

        Ok(Self {
            w1,
            b1: Array1::zeros(hidden_size),
            w2,
            b2: 0.,
            act_fn: Tanh::new(),
        })
    }

    /// Builds an `Mlp` out of explicit parameters.
    ///
    /// # Errors
    /// `OracleErr::ShapeMismatch` if `b1` or `w2` disagree with the rows of
    /// `w1`, `OracleErr::MalformedModel` if any dimension is zero.
    pub fn from_parts(w1: Array2<f64>, b1: Array1<f64>, w2: Array1<f64>, b2: f64) -> Result<Self> {
        let (hidden, input) = w1.dim();
        if hidden == 0 || input == 0 {
            return Err(OracleErr::MalformedModel(format!(
                "w1 must not be empty, got shape ({hidden}, {input})"
            )));
        }
        if b1.len() != hidden {
            return Err(OracleErr::ShapeMismatch {
                what: "b1",
                got: b1.len(),
                expected: hidden,
            });
        }
        if w2.len() != hidden {
            return Err(OracleErr::ShapeMismatch {
                what: "w2",
                got: w2.len(),
                expected: hidden,
            });
        }

        Ok(Self {
            w1,
            b1,
            w2,
            b2,
            act_fn: Tanh::new(),
        })
    }

    pub fn input_size(&self) -> usize {
        self.w1.ncols()
    }

    pub fn hidden_size(&self) -> usize {
        self.w1.nrows()
    }

    pub fn w1(&self) -> &Array2<f64> {
        &self.w1
    }

    pub fn b1(&self) -> &Array1<f64> {
        &self.b1
    }

    pub fn w2(&self) -> &Array1<f64> {
        &self.w2
    }

    pub fn b2(&self) -> f64 {
        self.b2
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `x` - One input window, exactly `input_size` long.
    ///
    /// # Returns
    /// The hidden activations together with the output.
    pub fn forward(&self, x: &[f64]) -> Result<(Array1<f64>, f64)> {
        self.check_input(x)?;

        let x = ArrayView1::from(x);
        let mut h = self.w1.dot(&x) + &self.b1;
        h.mapv_inplace(|z| self.act_fn.f(z));

        let out = self.b2 + self.w2.dot(&h);
        Ok((h, out))
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        self.forward(x).map(|(_, out)| out)
    }

    /// Backpropagates the output error signal of one example.
    ///
    /// # Arguments
    /// * `x` - The input the forward pass was made with.
    /// * `h` - The hidden activations that pass produced.
    /// * `d_out` - Gradient of the loss with respect to the output.
    /// * `grad` - Buffer the parameter gradients are written to.
    pub fn backward(
        &self,
        x: &[f64],
        h: &Array1<f64>,
        d_out: f64,
        grad: &mut Gradients,
    ) -> Result<()> {
        self.check_input(x)?;
        if h.len() != self.hidden_size() {
            return Err(OracleErr::ShapeMismatch {
                what: "hidden activations",
                got: h.len(),
                expected: self.hidden_size(),
            });
        }
        if grad.w1.dim() != self.w1.dim() || grad.w2.len() != self.hidden_size() {
            return Err(OracleErr::ShapeMismatch {
                what: "gradient buffer",
                got: grad.w1.len(),
                expected: self.w1.len(),
            });
        }

        // Hidden deltas use the output weights from before this step's update.
        grad.b1
            .iter_mut()
            .zip(self.w2.iter().zip(h))
            .for_each(|(dz, (&w, &a))| *dz = d_out * w * self.act_fn.df(a));

        let dz = grad.b1.view().insert_axis(Axis(1));
        let x = ArrayView1::from(x).insert_axis(Axis(0));
        linalg::general_mat_mul(1., &dz, &x, 0., &mut grad.w1);

        grad.w2.assign(h);
        grad.w2 *= d_out;
        grad.b2 = d_out;

        Ok(())
    }

    /// Returns whether every parameter is a finite number.
    pub fn is_finite(&self) -> bool {
        self.b2.is_finite()
            && self.w1.iter().all(|v| v.is_finite())
            && self.b1.iter().all(|v| v.is_finite())
            && self.w2.iter().all(|v| v.is_finite())
    }

    fn check_input(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.input_size() {
            return Err(OracleErr::ShapeMismatch {
                what: "input",
                got: x.len(),
                expected: self.input_size(),
            });
        }
        Ok(())
    }
}
