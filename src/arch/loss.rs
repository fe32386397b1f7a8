/// Squared error of a single scalar prediction.
#[derive(Default, Clone, Copy)]
pub struct SquaredError;

impl SquaredError {
    /// Returns a new `SquaredError`.
    pub fn new() -> Self {
        Self
    }

    pub fn loss(&self, y_pred: f64, y: f64) -> f64 {
        (y_pred - y).powi(2)
    }

    /// Gradient of the loss with respect to the prediction.
    pub fn loss_prime(&self, y_pred: f64, y: f64) -> f64 {
        2. * (y_pred - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_and_gradient() {
        let loss = SquaredError::new();
        assert_eq!(loss.loss(3., 1.), 4.);
        assert_eq!(loss.loss_prime(3., 1.), 4.);
        assert_eq!(loss.loss_prime(1., 3.), -4.);
    }
}
