//! Growth ratios, all year-over-year; see `sum_ttm::yoy_growth` for the sign-change guard.

pub use crate::sum_ttm::yoy_growth;
