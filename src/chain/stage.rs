//! Live stages and the slot-ordered stage set

use std::collections::BTreeMap;

/// The live counterpart of an active, non-bypassed slot: one or two
/// sections wired in series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage<N> {
    slot: usize,
    sections: Vec<N>,
}

impl<N: Copy> Stage<N> {
    pub(crate) fn new(slot: usize, sections: Vec<N>) -> Self {
        debug_assert!(!sections.is_empty(), "a stage needs at least one section");
        Self { slot, sections }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn sections(&self) -> &[N] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Entry node of the stage
    pub fn first(&self) -> N {
        self.sections[0]
    }

    /// Exit node of the stage
    pub fn last(&self) -> N {
        self.sections[self.sections.len() - 1]
    }

    pub(crate) fn push(&mut self, section: N) {
        self.sections.push(section);
    }

    /// Remove the exit section, never the only one
    pub(crate) fn pop(&mut self) -> Option<N> {
        if self.sections.len() > 1 {
            self.sections.pop()
        } else {
            None
        }
    }
}

/// Stages keyed by slot index.
///
/// Iteration and neighbor lookups follow slot order, never creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSet<N> {
    stages: BTreeMap<usize, Stage<N>>,
}

impl<N> Default for StageSet<N> {
    fn default() -> Self {
        Self {
            stages: BTreeMap::new(),
        }
    }
}

impl<N: Copy> StageSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: usize) -> Option<&Stage<N>> {
        self.stages.get(&slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Stage<N>> {
        self.stages.get_mut(&slot)
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.stages.contains_key(&slot)
    }

    pub(crate) fn insert(&mut self, stage: Stage<N>) {
        self.stages.insert(stage.slot, stage);
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Option<Stage<N>> {
        self.stages.remove(&slot)
    }

    pub(crate) fn take_all(&mut self) -> Vec<Stage<N>> {
        std::mem::take(&mut self.stages).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = &Stage<N>> {
        self.stages.values()
    }

    /// Slots that currently have a live stage, ascending
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.stages.keys().copied()
    }

    /// Exit node of the nearest stage below `slot`, or `head`
    pub fn previous_node(&self, slot: usize, head: N) -> N {
        self.stages
            .range(..slot)
            .next_back()
            .map(|(_, stage)| stage.last())
            .unwrap_or(head)
    }

    /// Entry node of the nearest stage above `slot`, or `tail`
    pub fn next_node(&self, slot: usize, tail: N) -> N {
        self.stages
            .range(slot + 1..)
            .next()
            .map(|(_, stage)| stage.first())
            .unwrap_or(tail)
    }

    /// Every node from head to tail in signal order
    pub fn signal_path(&self, head: N, tail: N) -> Vec<N> {
        let mut path = vec![head];
        for stage in self.stages.values() {
            path.extend_from_slice(&stage.sections);
        }
        path.push(tail);
        path
    }
}
