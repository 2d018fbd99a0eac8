//! DSP primitives
//!
//! Biquad coefficient design and the direct-form filter state used by the
//! software host to render and to answer response queries.

mod biquad;

pub use biquad::{BiquadCoeffs, BiquadState, MIN_FREQUENCY};
