//! Splice primitive
//!
//! Every structural change to the chain is a replacement of the run of nodes
//! between two fixed neighbors. All stale edges are removed before any fresh
//! edge is added, so no node is ever fed by two paths at once.

use tracing::trace;

use crate::host::FilterHost;

/// Consecutive edges of `prev -> path... -> next`
fn path_edges<N: Copy>(prev: N, path: &[N], next: N) -> Vec<(N, N)> {
    let mut nodes = Vec::with_capacity(path.len() + 2);
    nodes.push(prev);
    nodes.extend_from_slice(path);
    nodes.push(next);
    nodes.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Replace `prev -> old_path -> next` with `prev -> new_path -> next`.
///
/// Either path may be empty, in which case the corresponding side is the
/// direct edge `prev -> next`. Edges are re-made even when both sides are
/// identical.
pub(crate) fn splice_replace<H: FilterHost>(
    host: &mut H,
    prev: H::Node,
    old_path: &[H::Node],
    new_path: &[H::Node],
    next: H::Node,
) {
    trace!(
        "Splice {:?} -> {:?} -> {:?} into {:?}",
        prev,
        old_path,
        next,
        new_path
    );

    for (from, to) in path_edges(prev, old_path, next) {
        host.disconnect(from, to);
    }
    for (from, to) in path_edges(prev, new_path, next) {
        host.connect(from, to);
    }
}
