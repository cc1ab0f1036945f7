//! Component G: daily per-scope weight training (§4.G). Collects realised Prediction/Outcome
//! pairs, trains a candidate `WeightVector` by manual gradient descent, validates it with 5-fold
//! CV and a chronological backtest split, gates deployment behind a paired-t-test A/B test
//! against the currently active vector, and -- on a win -- exponential-smooths the candidate
//! into the active vector before persisting.

pub mod abgate;
pub mod cv;
pub mod gradient;
pub mod samples;
pub mod smoothing;
pub mod trainer;

pub use samples::{from_window, mape, r_squared, TrainingSample};
pub use trainer::{train_scope, TrainRunResult, MIN_SAMPLES_GLOBAL, MIN_SAMPLES_INDUSTRY};
