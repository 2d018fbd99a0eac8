//! In-process reference host
//!
//! A small graph of biquad sections between fixed head and tail endpoints.
//! It renders mono blocks along the current head-to-tail path, answers
//! frequency-response queries, and journals every graph operation so callers
//! can check the order in which a chain was rewired.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{FilterHost, SectionParams};
use crate::dsp::{BiquadCoeffs, BiquadState};
use crate::model::SectionKind;

/// Handle of a node inside a [`SoftwareHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    const HEAD: NodeId = NodeId(0);
    const TAIL: NodeId = NodeId(1);
}

/// Host engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
        }
    }
}

/// One recorded graph operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOp {
    Create(NodeId),
    Destroy(NodeId),
    Connect(NodeId, NodeId),
    Disconnect(NodeId, NodeId),
    Retune(NodeId),
    Release(NodeId),
}

#[derive(Debug, Clone)]
struct Section {
    params: SectionParams,
    coeffs: BiquadCoeffs,
    state: BiquadState,
}

impl Section {
    fn new(params: SectionParams, sample_rate: f64) -> Self {
        let mut section = Self {
            params,
            coeffs: BiquadCoeffs::default(),
            state: BiquadState::default(),
        };
        section.update_coefficients(sample_rate);
        section
    }

    fn update_coefficients(&mut self, sample_rate: f64) {
        self.coeffs = BiquadCoeffs::calculate(
            self.params.kind,
            sample_rate,
            self.params.frequency as f64,
            self.params.gain as f64,
            self.params.q as f64,
        );
    }
}

/// Reference implementation of [`FilterHost`]
#[derive(Debug, Clone)]
pub struct SoftwareHost {
    config: HostConfig,
    sections: BTreeMap<NodeId, Section>,
    edges: BTreeSet<(NodeId, NodeId)>,
    next_id: u32,
    journal: Vec<HostOp>,
    released: BTreeSet<NodeId>,
}

impl Default for SoftwareHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl SoftwareHost {
    /// Create a host with an empty graph (head and tail unconnected)
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            sections: BTreeMap::new(),
            edges: BTreeSet::new(),
            next_id: 2,
            journal: Vec::new(),
            released: BTreeSet::new(),
        }
    }

    /// Input endpoint
    pub fn head(&self) -> NodeId {
        NodeId::HEAD
    }

    /// Output endpoint
    pub fn tail(&self) -> NodeId {
        NodeId::TAIL
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Current tuning of a section
    pub fn section(&self, node: NodeId) -> Option<&SectionParams> {
        self.sections.get(&node).map(|s| &s.params)
    }

    /// Number of sections that have been created and not destroyed
    pub fn live_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Direct successors of `node`, in id order
    pub fn successors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges
            .range((node, NodeId(0))..=(node, NodeId(u32::MAX)))
            .map(|&(_, to)| to)
            .collect()
    }

    /// The unique path from head to tail, endpoints included.
    ///
    /// Returns `None` when the graph branches, dead-ends or loops before
    /// reaching the tail.
    pub fn path(&self) -> Option<Vec<NodeId>> {
        let mut path = vec![NodeId::HEAD];
        let mut visited = BTreeSet::from([NodeId::HEAD]);
        let mut current = NodeId::HEAD;

        while current != NodeId::TAIL {
            let next = match self.successors(current).as_slice() {
                [only] => *only,
                _ => return None,
            };
            if !visited.insert(next) {
                return None;
            }
            path.push(next);
            current = next;
        }

        if self.successors(NodeId::TAIL).is_empty() {
            Some(path)
        } else {
            None
        }
    }

    /// Sections on the head-to-tail path, endpoints excluded
    pub fn path_sections(&self) -> Option<Vec<NodeId>> {
        self.path()
            .map(|path| path[1..path.len() - 1].to_vec())
    }

    pub fn is_released(&self, node: NodeId) -> bool {
        self.released.contains(&node)
    }

    /// Recorded operations since the last drain
    pub fn journal(&self) -> &[HostOp] {
        &self.journal
    }

    /// Drain the operation journal
    pub fn take_journal(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.journal)
    }

    /// Process a mono block in place along the current path.
    ///
    /// A graph without a single head-to-tail path renders silence.
    pub fn render(&mut self, buffer: &mut [f32]) {
        let Some(sections) = self.path_sections() else {
            warn!("No single path from head to tail, rendering silence");
            buffer.fill(0.0);
            return;
        };

        for sample in buffer.iter_mut() {
            let mut value = *sample as f64;
            for node in &sections {
                if let Some(section) = self.sections.get_mut(node) {
                    value = section.state.process(value, &section.coeffs);
                }
            }
            *sample = value as f32;
        }
    }

    /// Clear the filter history of every section
    pub fn reset(&mut self) {
        for section in self.sections.values_mut() {
            section.state.reset();
        }
    }

    fn is_endpoint(node: NodeId) -> bool {
        node == NodeId::HEAD || node == NodeId::TAIL
    }

    fn retune(&mut self, node: NodeId, update: impl FnOnce(&mut SectionParams)) {
        let sample_rate = self.config.sample_rate;
        match self.sections.get_mut(&node) {
            Some(section) => {
                update(&mut section.params);
                section.update_coefficients(sample_rate);
                self.journal.push(HostOp::Retune(node));
            }
            None => warn!("Retune of unknown section {:?}", node),
        }
    }
}

impl FilterHost for SoftwareHost {
    type Node = NodeId;

    fn create_section(&mut self, params: SectionParams) -> NodeId {
        let node = NodeId(self.next_id);
        self.next_id += 1;
        self.sections
            .insert(node, Section::new(params, self.config.sample_rate));
        self.journal.push(HostOp::Create(node));
        trace!("Created {} section {:?}", params.kind, node);
        node
    }

    fn destroy_section(&mut self, node: NodeId) {
        if self.sections.remove(&node).is_none() {
            warn!("Destroy of unknown section {:?}", node);
            return;
        }
        let dangling = self
            .edges
            .iter()
            .filter(|(from, to)| *from == node || *to == node)
            .count();
        if dangling > 0 {
            warn!("Section {:?} destroyed with {} edges attached", node, dangling);
            self.edges.retain(|(from, to)| *from != node && *to != node);
        }
        self.journal.push(HostOp::Destroy(node));
    }

    fn set_kind(&mut self, node: NodeId, kind: SectionKind) {
        self.retune(node, |params| params.kind = kind);
    }

    fn set_frequency(&mut self, node: NodeId, frequency: f32) {
        self.retune(node, |params| params.frequency = frequency);
    }

    fn set_q(&mut self, node: NodeId, q: f32) {
        self.retune(node, |params| params.q = q);
    }

    fn set_gain(&mut self, node: NodeId, gain: f32) {
        self.retune(node, |params| params.gain = gain);
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        if !self.edges.insert((from, to)) {
            warn!("Edge {:?} -> {:?} already connected", from, to);
        }
        self.journal.push(HostOp::Connect(from, to));
    }

    fn disconnect(&mut self, from: NodeId, to: NodeId) {
        if !self.edges.remove(&(from, to)) {
            warn!("Edge {:?} -> {:?} was not connected", from, to);
        }
        self.journal.push(HostOp::Disconnect(from, to));
    }

    fn frequency_response(
        &self,
        node: NodeId,
        frequencies: &[f32],
        magnitude: &mut [f32],
        phase: &mut [f32],
    ) {
        let coeffs = match self.sections.get(&node) {
            Some(section) => section.coeffs,
            None if Self::is_endpoint(node) => BiquadCoeffs::default(),
            None => {
                warn!("Response query for unknown section {:?}", node);
                magnitude.fill(f32::NAN);
                phase.fill(f32::NAN);
                return;
            }
        };

        for ((&f, mag), ph) in frequencies
            .iter()
            .zip(magnitude.iter_mut())
            .zip(phase.iter_mut())
        {
            match coeffs.response(f as f64, self.config.sample_rate) {
                Some(h) => {
                    *mag = h.norm() as f32;
                    *ph = h.arg() as f32;
                }
                None => {
                    *mag = f32::NAN;
                    *ph = f32::NAN;
                }
            }
        }
    }

    fn release_endpoint(&mut self, node: NodeId) {
        self.released.insert(node);
        self.journal.push(HostOp::Release(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    fn peaking(gain: f32) -> SectionParams {
        SectionParams {
            kind: SectionKind::Peaking,
            frequency: 1000.0,
            q: 1.0,
            gain,
        }
    }

    #[test]
    fn test_empty_host_has_no_path() {
        let host = SoftwareHost::default();
        assert_eq!(host.path(), None);
        assert_eq!(host.live_sections(), 0);
    }

    #[test]
    fn test_linear_path() {
        let mut host = SoftwareHost::default();
        let a = host.create_section(peaking(3.0));
        let b = host.create_section(peaking(-3.0));
        host.connect(host.head(), a);
        host.connect(a, b);
        host.connect(b, host.tail());

        assert_eq!(host.path(), Some(vec![host.head(), a, b, host.tail()]));
        assert_eq!(host.path_sections(), Some(vec![a, b]));
    }

    #[test]
    fn test_branch_is_not_a_path() {
        let mut host = SoftwareHost::default();
        let a = host.create_section(peaking(0.0));
        host.connect(host.head(), a);
        host.connect(host.head(), host.tail());
        host.connect(a, host.tail());
        assert_eq!(host.path(), None);
    }

    #[test]
    fn test_journal_records_order() {
        let mut host = SoftwareHost::default();
        let (head, tail) = (host.head(), host.tail());
        host.connect(head, tail);
        let a = host.create_section(peaking(0.0));
        host.disconnect(head, tail);
        host.connect(head, a);
        host.connect(a, tail);

        assert_eq!(
            host.take_journal(),
            vec![
                HostOp::Connect(head, tail),
                HostOp::Create(a),
                HostOp::Disconnect(head, tail),
                HostOp::Connect(head, a),
                HostOp::Connect(a, tail),
            ]
        );
        assert!(host.journal().is_empty());
    }

    #[test]
    fn test_destroy_drops_dangling_edges() {
        let mut host = SoftwareHost::default();
        let a = host.create_section(peaking(0.0));
        host.connect(host.head(), a);
        host.destroy_section(a);
        assert_eq!(host.edge_count(), 0);
        assert_eq!(host.live_sections(), 0);
    }

    #[test]
    fn test_retune_updates_response() {
        let mut host = SoftwareHost::default();
        let a = host.create_section(peaking(0.0));
        let freqs = [1000.0_f32];
        let mut mag = [0.0_f32];
        let mut phase = [0.0_f32];

        host.frequency_response(a, &freqs, &mut mag, &mut phase);
        assert_abs_diff_eq!(mag[0], 1.0, epsilon = 1e-5);

        host.set_gain(a, 6.0);
        host.frequency_response(a, &freqs, &mut mag, &mut phase);
        assert_abs_diff_eq!(20.0 * mag[0].log10(), 6.0, epsilon = 0.01);
        assert_eq!(host.section(a).unwrap().gain, 6.0);
    }

    #[test]
    fn test_response_out_of_range_is_nan() {
        let mut host = SoftwareHost::default();
        let a = host.create_section(peaking(0.0));
        let freqs = [-1.0_f32, 30000.0];
        let mut mag = [0.0_f32; 2];
        let mut phase = [0.0_f32; 2];
        host.frequency_response(a, &freqs, &mut mag, &mut phase);
        assert!(mag.iter().all(|m| m.is_nan()));
        assert!(phase.iter().all(|p| p.is_nan()));
    }

    #[test]
    fn test_render_follows_path() {
        let mut host = SoftwareHost::default();
        let (head, tail) = (host.head(), host.tail());
        host.connect(head, tail);

        let mut block = [0.5_f32, -0.5, 0.25];
        host.render(&mut block);
        assert_eq!(block, [0.5, -0.5, 0.25]);

        let a = host.create_section(SectionParams {
            kind: SectionKind::LowPass,
            frequency: 100.0,
            q: 0.7,
            gain: 0.0,
        });
        host.disconnect(head, tail);
        host.connect(head, a);
        host.connect(a, tail);

        let mut impulse = [1.0_f32, 0.0, 0.0];
        host.render(&mut impulse);
        assert!(impulse[0] < 0.01, "lowpass should smear the impulse");
    }

    #[test]
    fn test_render_disconnected_is_silent() {
        let mut host = SoftwareHost::default();
        let mut block = [0.5_f32; 4];
        host.render(&mut block);
        assert_eq!(block, [0.0; 4]);
    }
}
