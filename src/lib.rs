//! EQChain - Live Parametric Equalizer Topology
//!
//! EQChain keeps an 8-slot parametric equalizer wired into a running audio
//! graph. Each slot holds a filter family and its tuning; active slots own
//! one or two biquad sections connected in series between a fixed head and
//! tail node.
//!
//! # Architecture
//!
//! - [`model`]: slot settings, filter families and JSON presets
//! - [`host`]: the [`FilterHost`] boundary and the in-process [`SoftwareHost`]
//! - [`chain`]: the [`TopologyManager`], which splices sections in and out
//!   of the live graph as settings change, and the response probe
//! - [`dsp`]: biquad design used by the software host

pub mod audio;
pub mod chain;
pub mod cli;
pub mod dsp;
pub mod error;
pub mod host;
pub mod model;

pub use chain::{ChainResponse, ChainState, ListenerId, Stage, StageSet, TopologyManager};
pub use error::{ChainError, Result};
pub use host::{FilterHost, HostConfig, NodeId, SectionParams, SoftwareHost};
pub use model::{ChainSettings, FilterFamily, SectionKind, SlotSetting, SLOT_COUNT};
