use rand::Rng;
use rand::rngs::StdRng;

/// The three distribution families §4.I's Monte Carlo step names. None of the five example
/// repos depend on `rand_distr`, so sampling is implemented directly against `rand::Rng` via
/// closed-form inverse-transform / Box-Muller rather than introducing that crate.
#[derive(Debug, Clone, Copy)]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Uniform { min: f64, max: f64 },
}

impl Distribution {
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        match *self {
            Distribution::Normal { mean, std_dev } => mean + std_dev * standard_normal(rng),
            Distribution::Triangular { min, mode, max } => triangular(rng, min, mode, max),
            Distribution::Uniform { min, max } => min + rng.gen::<f64>() * (max - min),
        }
    }
}

/// Box-Muller transform: two independent uniforms on (0, 1] yield one standard-normal sample.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Inverse-CDF sampling of the triangular distribution.
fn triangular(rng: &mut StdRng, min: f64, mode: f64, max: f64) -> f64 {
    let u: f64 = rng.gen::<f64>();
    let span = max - min;
    if span <= 0.0 {
        return min;
    }
    let split = (mode - min) / span;
    if u < split {
        min + (u * span * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * span * (max - mode)).sqrt()
    }
}
