/// Hyperbolic tangent activation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tanh;

impl Tanh {
    pub fn new() -> Self {
        Self
    }

    pub fn f(&self, z: f64) -> f64 {
        z.tanh()
    }

    /// Derivative expressed through the activation's output `a = f(z)`.
    pub fn df(&self, a: f64) -> f64 {
        1. - a * a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_matches_finite_difference() {
        let act = Tanh::new();
        let eps = 1e-6;

        for z in [-2., -0.5, 0., 0.3, 1.7] {
            let numeric = (act.f(z + eps) - act.f(z - eps)) / (2. * eps);
            assert!((act.df(act.f(z)) - numeric).abs() < 1e-8);
        }
    }
}
