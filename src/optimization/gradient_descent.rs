use crate::arch::{Gradients, Mlp};

/// Plain stochastic gradient descent: no momentum, no decay.
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Updates the model's parameters in place, making a step in the opposite
    /// direction of the gradient with a length of `learning_rate`.
    ///
    /// # Arguments
    /// * `model` - The model whose parameters are going to be modified.
    /// * `grad` - The gradient used for taking the step.
    pub fn update_params(&self, model: &mut Mlp, grad: &Gradients) {
        let lr = self.learning_rate;

        model.w2.scaled_add(-lr, &grad.w2);
        model.b2 -= lr * grad.b2;
        model.w1.scaled_add(-lr, &grad.w1);
        model.b1.scaled_add(-lr, &grad.b1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn steps_against_the_gradient() {
        let mut model =
            Mlp::from_parts(arr2(&[[1.0, 2.0]]), arr1(&[0.5]), arr1(&[-1.0]), 0.).unwrap();
        let mut grad = Gradients::zeros_like(&model);
        grad.w1 = arr2(&[[1.0, -1.0]]);
        grad.b1 = arr1(&[2.0]);
        grad.w2 = arr1(&[4.0]);
        grad.b2 = -3.0;

        GradientDescent::new(0.5).update_params(&mut model, &grad);

        assert_eq!(model.w1(), &arr2(&[[0.5, 2.5]]));
        assert_eq!(model.b1(), &arr1(&[-0.5]));
        assert_eq!(model.w2(), &arr1(&[-3.0]));
        assert_eq!(model.b2(), 1.5);
    }
}
