mod config;
mod trainer;
mod windows;

pub use config::{
    TrainConfig, DEFAULT_EPOCHS, DEFAULT_HIDDEN, DEFAULT_LAG, DEFAULT_LEARNING_RATE, DEFAULT_SEED,
};
pub use trainer::{train, TrainResult, Trainer, MIN_SERIES_LEN};
pub use windows::Windows;
