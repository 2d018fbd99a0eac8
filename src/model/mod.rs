//! Filter descriptor model
//!
//! Family catalogue and the per-slot settings array.

mod family;
mod settings;

pub use family::{FilterFamily, SectionKind};
pub use settings::{ChainSettings, SlotSetting, SLOT_COUNT};
