//! Host audio engine boundary
//!
//! The topology manager never computes audio itself. It drives a host that
//! creates and destroys filter sections, wires directed edges between nodes,
//! and answers frequency-response queries. The host renders on its own
//! context and picks up changes by the start of its next block.

mod software;

pub use software::{HostConfig, HostOp, NodeId, SoftwareHost};

use std::fmt::Debug;

use crate::model::SectionKind;

/// Initial tuning of a newly created section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionParams {
    pub kind: SectionKind,
    pub frequency: f32,
    pub q: f32,
    pub gain: f32,
}

/// Capability a host engine supplies to the topology manager.
///
/// Node handles are cheap copyable ids. Head and tail endpoints are created
/// by the host and handed to the manager at construction; every other node
/// the manager sees was returned by [`FilterHost::create_section`].
pub trait FilterHost {
    /// Handle of a graph node (endpoint or section)
    type Node: Copy + Eq + Debug;

    /// Create a section with the given shape and tuning
    fn create_section(&mut self, params: SectionParams) -> Self::Node;

    /// Release a section; it must already be disconnected
    fn destroy_section(&mut self, node: Self::Node);

    fn set_kind(&mut self, node: Self::Node, kind: SectionKind);

    fn set_frequency(&mut self, node: Self::Node, frequency: f32);

    fn set_q(&mut self, node: Self::Node, q: f32);

    fn set_gain(&mut self, node: Self::Node, gain: f32);

    /// Add the directed edge `from -> to`
    fn connect(&mut self, from: Self::Node, to: Self::Node);

    /// Remove the directed edge `from -> to`
    fn disconnect(&mut self, from: Self::Node, to: Self::Node);

    /// Write per-frequency magnitude (linear) and phase (radians) of a single
    /// section into the output slices.
    fn frequency_response(
        &self,
        node: Self::Node,
        frequencies: &[f32],
        magnitude: &mut [f32],
        phase: &mut [f32],
    );

    /// Called once per endpoint when the chain is torn down
    fn release_endpoint(&mut self, _node: Self::Node) {}
}

impl<H: FilterHost + ?Sized> FilterHost for &mut H {
    type Node = H::Node;

    fn create_section(&mut self, params: SectionParams) -> Self::Node {
        (**self).create_section(params)
    }

    fn destroy_section(&mut self, node: Self::Node) {
        (**self).destroy_section(node)
    }

    fn set_kind(&mut self, node: Self::Node, kind: SectionKind) {
        (**self).set_kind(node, kind)
    }

    fn set_frequency(&mut self, node: Self::Node, frequency: f32) {
        (**self).set_frequency(node, frequency)
    }

    fn set_q(&mut self, node: Self::Node, q: f32) {
        (**self).set_q(node, q)
    }

    fn set_gain(&mut self, node: Self::Node, gain: f32) {
        (**self).set_gain(node, gain)
    }

    fn connect(&mut self, from: Self::Node, to: Self::Node) {
        (**self).connect(from, to)
    }

    fn disconnect(&mut self, from: Self::Node, to: Self::Node) {
        (**self).disconnect(from, to)
    }

    fn frequency_response(
        &self,
        node: Self::Node,
        frequencies: &[f32],
        magnitude: &mut [f32],
        phase: &mut [f32],
    ) {
        (**self).frequency_response(node, frequencies, magnitude, phase)
    }

    fn release_endpoint(&mut self, node: Self::Node) {
        (**self).release_endpoint(node)
    }
}
