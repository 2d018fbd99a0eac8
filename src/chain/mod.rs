//! Filter chain topology
//!
//! The live graph side of the equalizer: slot-ordered stages, the splice
//! primitive every structural change goes through, the manager that keeps
//! settings and graph in step, and the read-only response probe.

mod manager;
mod probe;
mod splice;
mod stage;

pub use manager::{ChainState, ListenerId, TopologyManager};
pub use probe::{log_spaced_frequencies, ChainResponse, RESPONSE_MIN_FREQUENCY};
pub use stage::{Stage, StageSet};
