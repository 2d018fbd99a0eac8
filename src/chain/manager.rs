//! Topology manager
//!
//! Owns the settings array and the live stage set as one aggregate and keeps
//! them in step: a slot has a live stage exactly when its family is active
//! and it is not bypassed. Every mutation validates its preconditions before
//! the first graph operation, so an aborted call never leaves a half-spliced
//! chain behind.

use std::fmt;

use tracing::{debug, error, info, trace};

use super::splice::splice_replace;
use super::stage::{Stage, StageSet};
use crate::error::{ChainError, Result};
use crate::host::{FilterHost, SectionParams, SoftwareHost};
use crate::model::{ChainSettings, FilterFamily, SlotSetting, SLOT_COUNT};

/// Settings and live stages of a chain, updated together
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState<N> {
    settings: ChainSettings,
    stages: StageSet<N>,
}

impl<N: Copy> ChainState<N> {
    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn stages(&self) -> &StageSet<N> {
        &self.stages
    }
}

/// Handle returned by [`TopologyManager::on_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut() + Send>;

/// Manager of a live 8-slot filter chain between fixed head and tail nodes
pub struct TopologyManager<H: FilterHost> {
    host: H,
    head: H::Node,
    tail: H::Node,
    state: ChainState<H::Node>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    revision: u64,
}

impl<H: FilterHost> fmt::Debug for TopologyManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyManager")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl<H: FilterHost> TopologyManager<H> {
    /// Build the chain described by `settings` between `head` and `tail`.
    ///
    /// `head` and `tail` must not be connected to each other yet; the manager
    /// makes every edge of the path itself.
    pub fn new(mut host: H, head: H::Node, tail: H::Node, settings: ChainSettings) -> Self {
        let mut stages = StageSet::new();
        for (slot, setting) in settings.iter().enumerate() {
            if setting.is_live() {
                let sections = create_sections(&mut host, setting, setting.family.section_count());
                stages.insert(Stage::new(slot, sections));
            }
        }

        let path = stages.signal_path(head, tail);
        for pair in path.windows(2) {
            host.connect(pair[0], pair[1]);
        }

        info!(
            "Filter chain built: {} live stages, {} sections",
            stages.len(),
            path.len() - 2
        );

        Self {
            host,
            head,
            tail,
            state: ChainState { settings, stages },
            listeners: Vec::new(),
            next_listener: 0,
            revision: 0,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Input endpoint, for attaching an external source
    pub fn head(&self) -> H::Node {
        self.head
    }

    /// Output endpoint, for attaching an external destination
    pub fn tail(&self) -> H::Node {
        self.tail
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> &ChainState<H::Node> {
        &self.state
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.state.settings
    }

    pub fn setting(&self, index: usize) -> Result<&SlotSetting> {
        self.state
            .settings
            .get(index)
            .ok_or(ChainError::SlotOutOfRange {
                index,
                slot_count: SLOT_COUNT,
            })
    }

    /// Sections of the live stage in `index`, `None` if the slot has none
    pub fn stage_sections(&self, index: usize) -> Option<&[H::Node]> {
        self.state.stages.get(index).map(|stage| stage.sections())
    }

    /// Slots with a live stage, ascending
    pub fn active_slots(&self) -> Vec<usize> {
        self.state.stages.slots().collect()
    }

    /// Every node from head to tail as the manager has wired them
    pub fn signal_path(&self) -> Vec<H::Node> {
        self.state.stages.signal_path(self.head, self.tail)
    }

    /// Number of successful mutations so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Node feeding the stage of `index` (exit of the nearest lower stage, or head)
    pub fn previous_node(&self, index: usize) -> H::Node {
        self.state.stages.previous_node(index, self.head)
    }

    /// Node fed by the stage of `index` (entry of the nearest higher stage, or tail)
    pub fn next_node(&self, index: usize) -> H::Node {
        self.state.stages.next_node(index, self.tail)
    }

    // ========================================================================
    // Change notification
    // ========================================================================

    /// Register a callback run after every successful mutation
    pub fn on_change(&mut self, listener: impl FnMut() + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Change the family of a slot, splicing sections in or out as needed
    pub fn set_family(&mut self, index: usize, family: FilterFamily) -> Result<()> {
        self.apply_family(index, family)?;
        self.notify();
        Ok(())
    }

    /// Bypass or restore a slot without touching its family
    pub fn set_bypass(&mut self, index: usize, bypassed: bool) -> Result<()> {
        self.apply_bypass(index, bypassed)?;
        self.notify();
        Ok(())
    }

    pub fn set_frequency(&mut self, index: usize, frequency: f32) -> Result<()> {
        self.check_index(index)?;
        self.state.settings.slot_mut(index).frequency = frequency;
        if let Some(stage) = self.state.stages.get(index) {
            for &section in stage.sections() {
                self.host.set_frequency(section, frequency);
            }
            trace!("Slot {} frequency -> {:.1} Hz", index, frequency);
        }
        self.notify();
        Ok(())
    }

    pub fn set_q(&mut self, index: usize, q: f32) -> Result<()> {
        self.check_index(index)?;
        self.state.settings.slot_mut(index).q = q;
        if let Some(stage) = self.state.stages.get(index) {
            for &section in stage.sections() {
                self.host.set_q(section, q);
            }
            trace!("Slot {} Q -> {:.3}", index, q);
        }
        self.notify();
        Ok(())
    }

    pub fn set_gain(&mut self, index: usize, gain: f32) -> Result<()> {
        self.check_index(index)?;
        self.state.settings.slot_mut(index).gain = gain;
        if let Some(stage) = self.state.stages.get(index) {
            for &section in stage.sections() {
                self.host.set_gain(section, gain);
            }
            trace!("Slot {} gain -> {:.1} dB", index, gain);
        }
        self.notify();
        Ok(())
    }

    /// Apply a whole slot descriptor through the regular splice rules.
    ///
    /// Tuning is written first so a stage built by this call starts with the
    /// new values. Raises a single change notification.
    pub fn apply(&mut self, index: usize, setting: SlotSetting) -> Result<()> {
        self.check_index(index)?;

        let current = self.state.settings[index];
        if current.frequency != setting.frequency {
            self.retune(index, |host, node| host.set_frequency(node, setting.frequency));
            self.state.settings.slot_mut(index).frequency = setting.frequency;
        }
        if current.q != setting.q {
            self.retune(index, |host, node| host.set_q(node, setting.q));
            self.state.settings.slot_mut(index).q = setting.q;
        }
        if current.gain != setting.gain {
            self.retune(index, |host, node| host.set_gain(node, setting.gain));
            self.state.settings.slot_mut(index).gain = setting.gain;
        }

        if setting.bypassed {
            self.apply_bypass(index, true)?;
            self.apply_family(index, setting.family)?;
        } else {
            self.apply_family(index, setting.family)?;
            self.apply_bypass(index, false)?;
        }

        self.notify();
        Ok(())
    }

    /// Explicit teardown; equivalent to dropping the manager
    pub fn teardown(self) {
        drop(self);
    }

    // ========================================================================
    // Graph surgery
    // ========================================================================

    fn check_index(&self, index: usize) -> Result<()> {
        if index < SLOT_COUNT {
            Ok(())
        } else {
            Err(self.invariant(ChainError::SlotOutOfRange {
                index,
                slot_count: SLOT_COUNT,
            }))
        }
    }

    fn invariant(&self, err: ChainError) -> ChainError {
        error!("Filter chain invariant violated: {}", err);
        err
    }

    fn retune(&mut self, index: usize, mut update: impl FnMut(&mut H, H::Node)) {
        if let Some(stage) = self.state.stages.get(index) {
            for &section in stage.sections() {
                update(&mut self.host, section);
            }
        }
    }

    fn apply_family(&mut self, index: usize, family: FilterFamily) -> Result<()> {
        self.check_index(index)?;
        let current = self.state.settings[index];

        if current.bypassed {
            // No live stage to touch; takes effect when bypass is cleared
            self.state.settings.slot_mut(index).family = family;
            return Ok(());
        }

        match (current.family.is_active(), family.is_active()) {
            (false, true) => {
                self.ensure_stage(index, false)?;
                self.state.settings.slot_mut(index).family = family;
                self.splice_in(index);
            }
            (true, false) => {
                self.ensure_stage(index, true)?;
                self.splice_out(index)?;
                self.state.settings.slot_mut(index).family = family;
            }
            (true, true) => {
                self.ensure_stage(index, true)?;
                self.state.settings.slot_mut(index).family = family;
                self.reshape(index)?;
            }
            (false, false) => {
                self.state.settings.slot_mut(index).family = family;
            }
        }
        Ok(())
    }

    fn apply_bypass(&mut self, index: usize, bypassed: bool) -> Result<()> {
        self.check_index(index)?;
        let current = self.state.settings[index];

        if current.family.is_active() {
            if bypassed && !current.bypassed {
                self.ensure_stage(index, true)?;
                self.splice_out(index)?;
            } else if !bypassed && current.bypassed {
                self.ensure_stage(index, false)?;
                self.state.settings.slot_mut(index).bypassed = false;
                self.splice_in(index);
            }
        }

        self.state.settings.slot_mut(index).bypassed = bypassed;
        Ok(())
    }

    fn ensure_stage(&self, index: usize, expected: bool) -> Result<()> {
        match (self.state.stages.contains(index), expected) {
            (true, false) => Err(self.invariant(ChainError::StageAlreadyLive { slot: index })),
            (false, true) => Err(self.invariant(ChainError::StageMissing { slot: index })),
            _ => Ok(()),
        }
    }

    /// Build a stage from the slot's current settings and splice it in
    fn splice_in(&mut self, index: usize) {
        let setting = self.state.settings[index];
        let prev = self.previous_node(index);
        let next = self.next_node(index);

        let sections = create_sections(&mut self.host, &setting, setting.family.section_count());
        splice_replace(&mut self.host, prev, &[], &sections, next);

        debug!(
            "Slot {} spliced in as {} ({} sections)",
            index,
            setting.family,
            sections.len()
        );
        self.state.stages.insert(Stage::new(index, sections));
    }

    /// Splice the slot's stage out and release its sections
    fn splice_out(&mut self, index: usize) -> Result<()> {
        let prev = self.previous_node(index);
        let next = self.next_node(index);
        let stage = self
            .state
            .stages
            .remove(index)
            .ok_or_else(|| self.invariant(ChainError::StageMissing { slot: index }))?;

        splice_replace(&mut self.host, prev, stage.sections(), &[], next);
        for &section in stage.sections() {
            self.host.destroy_section(section);
        }

        debug!("Slot {} spliced out ({} sections released)", index, stage.len());
        Ok(())
    }

    /// Retune every section of a live stage to the slot's family and grow or
    /// shrink it at the exit end. The entry edge is never touched.
    fn reshape(&mut self, index: usize) -> Result<()> {
        let setting = self.state.settings[index];
        let Some(kind) = setting.family.concrete_kind() else {
            return Ok(());
        };
        let target = setting.family.section_count();

        self.retune(index, |host, node| host.set_kind(node, kind));

        loop {
            let next = self.next_node(index);
            let stage = self
                .state
                .stages
                .get_mut(index)
                .ok_or(ChainError::StageMissing { slot: index })?;

            if stage.len() > target {
                let Some(removed) = stage.pop() else {
                    break;
                };
                let exit = stage.last();
                splice_replace(&mut self.host, exit, &[removed], &[], next);
                self.host.destroy_section(removed);
                debug!("Slot {} shrunk to {} sections", index, stage.len());
            } else if stage.len() < target {
                let added = create_sections(&mut self.host, &setting, 1);
                let exit = stage.last();
                splice_replace(&mut self.host, exit, &[], &added, next);
                stage.push(added[0]);
                debug!("Slot {} grown to {} sections", index, stage.len());
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Disconnect every edge of the path and release all sections and both
    /// endpoints
    fn release_all(&mut self) {
        let path = self.signal_path();
        for pair in path.windows(2) {
            self.host.disconnect(pair[0], pair[1]);
        }

        let stages = self.state.stages.take_all();
        let mut released = 0;
        for stage in &stages {
            for &section in stage.sections() {
                self.host.destroy_section(section);
                released += 1;
            }
        }

        self.host.release_endpoint(self.head);
        self.host.release_endpoint(self.tail);
        info!("Filter chain torn down: {} sections released", released);
    }
}

impl<H: FilterHost> Drop for TopologyManager<H> {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl TopologyManager<SoftwareHost> {
    /// Render a mono block through the live chain
    pub fn render(&mut self, buffer: &mut [f32]) {
        self.host.render(buffer);
    }

    /// Clear filter history, e.g. between channels of a file
    pub fn reset(&mut self) {
        self.host.reset();
    }
}

/// Create `count` sections tuned like `setting`
fn create_sections<H: FilterHost>(host: &mut H, setting: &SlotSetting, count: usize) -> Vec<H::Node> {
    let Some(kind) = setting.family.concrete_kind() else {
        return Vec::new();
    };
    let params = SectionParams {
        kind,
        frequency: setting.frequency,
        q: setting.q,
        gain: setting.gain,
    };
    (0..count).map(|_| host.create_section(params)).collect()
}
