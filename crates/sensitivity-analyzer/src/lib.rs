//! Component I: sensitivity and Monte Carlo analysis (§4.I). Reruns the ensemble at fixed model
//! weights while sweeping one parameter (`one_way`), two parameters (`two_way`), a base±pct band
//! per variable (`tornado`), or independently-sampled distributions per variable (`monte_carlo`).

pub mod distribution;
pub mod monte_carlo;
pub mod one_way;
pub mod reval;
pub mod tornado;
pub mod two_way;
pub mod variable;

pub use distribution::Distribution;
pub use monte_carlo::monte_carlo;
pub use one_way::one_way;
pub use reval::revalue;
pub use tornado::tornado;
pub use two_way::two_way;
pub use variable::Variable;
