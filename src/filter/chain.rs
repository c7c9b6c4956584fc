// SPDX-License-Identifier: GPL-3.0-only

//! Filter chains and the filter graph that owns and executes them (spec.md
//! §3 "FilterChain", §4.6 "Filter graph"), grounded on `kf_add_filter_chain`
//! / `kf_apply_filter_chain` (`filter.cpp`).
//!
//! Per §9's redesign note ("smart-pointer/GC ownership of filter nodes"),
//! the graph owns [`FilterNode`] instances by value in a `Vec` arena; a
//! chain references its nodes by stable index rather than by pointer.

use tracing::{debug, warn};

use crate::capture::types::Resolution;
use crate::filter::node::FilterNode;
use crate::filter::registry::FilterKind;

/// An ordered chain of filter-node indices, gated by an input resolution
/// (the frame's capture resolution) and an output resolution (the
/// resolution the scaler will produce). A frame matches iff both gates
/// equal its resolutions by `(w, h)` — bit depth is irrelevant once frames
/// reach the filter graph, since the core's runtime pixel format is fixed
/// 32-bit BGRA (spec.md §3).
#[derive(Debug, Clone)]
pub struct FilterChain {
    pub input_gate: Resolution,
    pub output_gate: Resolution,
    pub node_indices: Vec<usize>,
}

impl FilterChain {
    pub fn new(input_gate: Resolution, output_gate: Resolution, node_indices: Vec<usize>) -> Self {
        Self { input_gate, output_gate, node_indices }
    }

    fn matches(&self, input: Resolution, output: Resolution) -> bool {
        self.input_gate.w == input.w
            && self.input_gate.h == input.h
            && self.output_gate.w == output.w
            && self.output_gate.h == output.h
    }
}

/// Owns every filter-node instance referenced by any registered chain, the
/// chains themselves (in registration order), and the global filtering
/// enabled/disabled flag (spec.md §3 "AppState": "the active filter
/// enabled/disabled flag").
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
    chains: Vec<FilterChain>,
    enabled: bool,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), chains: Vec::new(), enabled: true }
    }

    /// Adds a node to the arena, returning the stable index chains should
    /// reference it by.
    pub fn add_node(&mut self, node: FilterNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Convenience: creates and adds a default-parameter node of `kind` in
    /// one step.
    pub fn add_default_node(&mut self, kind: FilterKind) -> usize {
        self.add_node(FilterNode::new(kind))
    }

    pub fn node(&self, index: usize) -> Option<&FilterNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut FilterNode> {
        self.nodes.get_mut(index)
    }

    /// Registers a chain. Chains are tried in the order they were added —
    /// "the first matching chain in insertion order is applied" (spec.md
    /// §3).
    pub fn add_chain(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    pub fn remove_all_chains(&mut self) {
        self.chains.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Applies the first chain whose gates match `(input_resolution,
    /// output_resolution)` to `pixels`, in place, node by node. A no-op if
    /// filtering is globally disabled or no chain matches (spec.md §4.6).
    ///
    /// A node whose `apply` returns an error (a filter-configuration error,
    /// spec.md §7) is logged at debug level and skipped; the rest of the
    /// chain still runs.
    pub fn apply(&mut self, pixels: &mut [u8], input_resolution: Resolution, output_resolution: Resolution) {
        if !self.enabled {
            return;
        }

        let Some(chain_idx) = self.chains.iter().position(|c| c.matches(input_resolution, output_resolution)) else {
            return;
        };

        let node_indices = self.chains[chain_idx].node_indices.clone();
        for idx in node_indices {
            let Some(node) = self.nodes.get_mut(idx) else {
                warn!(index = idx, "filter chain references a node index outside the arena");
                continue;
            };
            if let Err(err) = node.apply(pixels, input_resolution) {
                debug!(uuid = node.uuid(), %err, "filter configuration error, leaving pixels unmodified for this node");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_chain_matches_is_a_passthrough() {
        let mut graph = FilterGraph::new();
        let resolution = Resolution::new(4, 4, 32);
        let original = vec![7u8; resolution.byte_size()];
        let mut pixels = original.clone();
        graph.apply(&mut pixels, resolution, resolution);
        assert_eq!(pixels, original);
    }

    #[test]
    fn disabled_graph_is_a_passthrough_even_with_a_matching_chain() {
        let mut graph = FilterGraph::new();
        let resolution = Resolution::new(4, 4, 32);
        let flip = graph.add_default_node(FilterKind::Flip);
        graph.add_chain(FilterChain::new(resolution, resolution, vec![flip]));
        graph.set_enabled(false);

        let original: Vec<u8> = (0..resolution.byte_size() as u32).map(|i| (i % 251) as u8).collect();
        let mut pixels = original.clone();
        graph.apply(&mut pixels, resolution, resolution);
        assert_eq!(pixels, original);
    }

    #[test]
    fn first_matching_chain_in_insertion_order_wins() {
        let mut graph = FilterGraph::new();
        let resolution = Resolution::new(2, 2, 32);

        let flip = graph.add_default_node(FilterKind::Flip);
        graph.add_chain(FilterChain::new(resolution, resolution, vec![flip]));
        // A second, later chain with the same gates should never run, since
        // the first match wins.
        let sharpen = graph.add_default_node(FilterKind::Sharpen);
        graph.add_chain(FilterChain::new(resolution, resolution, vec![sharpen]));

        let mut pixels = vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
        graph.apply(&mut pixels, resolution, resolution);
        // Flip (vertical, default axis) reverses row order; sharpen would
        // not produce this exact byte pattern.
        assert_eq!(pixels, vec![3, 3, 3, 3, 4, 4, 4, 4, 1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn chain_never_resizes_the_buffer() {
        let mut graph = FilterGraph::new();
        let resolution = Resolution::new(6, 6, 32);
        let blur = graph.add_default_node(FilterKind::Blur);
        let median = graph.add_default_node(FilterKind::Median);
        graph.add_chain(FilterChain::new(resolution, resolution, vec![blur, median]));

        let mut pixels = vec![3u8; resolution.byte_size()];
        graph.apply(&mut pixels, resolution, resolution);
        assert_eq!(pixels.len(), resolution.byte_size());
    }
}
