pub mod activations;
pub mod loss;
mod mlp;
mod standardizer;

pub use mlp::{Gradients, Mlp};
pub use standardizer::Standardizer;
