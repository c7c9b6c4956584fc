// SPDX-License-Identifier: GPL-3.0-only

//! A filter instance: a [`FilterKind`] paired with its own parameter values
//! and any private per-instance state (spec.md §3, "FilterNode"), grounded
//! on `filter_c` (`filter.h`).
//!
//! Multiple instances of the same [`FilterKind`] are independent — each
//! holds its own parameter map and, for the stateful filters, its own
//! previous-frame buffer. The filter graph owns instances by value in an
//! arena (see [`super::chain::FilterGraph`]); nothing outside this module
//! holds a pointer to one.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::capture::types::Resolution;
use crate::errors::{FilterError, VcsResult};
use crate::filter::funcs;
use crate::filter::registry::{metadata_for, FilterKind};

/// Private state a filter instance carries across frames. Most filters are
/// pure functions of their parameters and are paired with [`FilterState::None`];
/// the temporal/statistical filters named in spec.md §4.6
/// ("denoise_temporal", "delta_histogram", "unique_count") hold a previous
/// frame, and `unique_count` additionally holds a sliding window of change
/// timestamps.
#[derive(Debug, Clone)]
pub enum FilterState {
    None,
    PreviousFrame(Option<Vec<u8>>),
    UniqueCount { previous_frame: Option<Vec<u8>>, changes: VecDeque<Instant> },
}

impl FilterState {
    fn for_kind(kind: FilterKind) -> Self {
        match kind {
            FilterKind::DenoiseTemporal | FilterKind::DeltaHistogram => FilterState::PreviousFrame(None),
            FilterKind::UniqueCount => FilterState::UniqueCount { previous_frame: None, changes: VecDeque::new() },
            _ => FilterState::None,
        }
    }
}

/// One filter instance within a [`super::chain::FilterGraph`]: a kind,
/// per-instance parameter values (initialized from the kind's schema
/// defaults), and any private state the kind requires.
#[derive(Debug, Clone)]
pub struct FilterNode {
    kind: FilterKind,
    parameters: HashMap<u32, f64>,
    state: FilterState,
}

impl FilterNode {
    /// Creates a new instance of `kind` with every parameter set to its
    /// schema default.
    pub fn new(kind: FilterKind) -> Self {
        let parameters = metadata_for(kind).parameters.iter().map(|p| (p.id, p.default)).collect();
        Self { kind, parameters, state: FilterState::for_kind(kind) }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// The filter type's permanent UUID (spec.md §3: "FilterNode: { uuid,
    /// type, parameters }" — the uuid identifies the *type*; distinct
    /// instances of the same type share it).
    pub fn uuid(&self) -> &'static str {
        metadata_for(self.kind).uuid
    }

    /// Reads a parameter's current value, or `None` if `id` isn't part of
    /// this filter type's schema.
    pub fn parameter(&self, id: u32) -> Option<f64> {
        self.parameters.get(&id).copied()
    }

    /// Sets a parameter, validating it against the filter type's declared
    /// `[min, max]` range. `fire_change_event` is accepted for API symmetry
    /// with spec.md §4.6 ("set operations may optionally suppress a change
    /// event") but this crate doesn't itself wire a change-notification bus
    /// for individual parameters — callers that need one can bridge through
    /// [`crate::events::Bus`] themselves.
    pub fn set_parameter(&mut self, id: u32, value: f64, fire_change_event: bool) -> VcsResult<()> {
        let _ = fire_change_event;
        let spec = metadata_for(self.kind)
            .parameters
            .iter()
            .find(|p| p.id == id)
            .ok_or(FilterError::UnknownParameter { filter_uuid: self.uuid(), parameter_id: id })?;

        if value < spec.min || value > spec.max {
            return Err(FilterError::ParameterOutOfRange {
                filter_uuid: self.uuid(),
                parameter_id: id,
                value,
                min: spec.min,
                max: spec.max,
            }
            .into());
        }

        self.parameters.insert(id, value);
        Ok(())
    }

    /// Applies this filter to `pixels` in place. Never changes `pixels`'
    /// length; a configuration error (e.g. an out-of-bounds crop rectangle)
    /// is recovered locally — the frame is left unmodified and the error is
    /// returned for the caller to log, per spec.md §7.
    pub fn apply(&mut self, pixels: &mut [u8], resolution: Resolution) -> VcsResult<()> {
        funcs::apply(self.kind, &mut self.state, &self.parameters, pixels, resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_starts_at_schema_defaults() {
        let node = FilterNode::new(FilterKind::Blur);
        let spec = metadata_for(FilterKind::Blur).parameters[0];
        assert_eq!(node.parameter(spec.id), Some(spec.default));
    }

    #[test]
    fn set_parameter_rejects_unknown_id() {
        let mut node = FilterNode::new(FilterKind::Sharpen);
        assert!(node.set_parameter(999, 1.0, true).is_err());
    }

    #[test]
    fn set_parameter_rejects_out_of_range_value() {
        let mut node = FilterNode::new(FilterKind::Median);
        let spec = metadata_for(FilterKind::Median).parameters[0];
        assert!(node.set_parameter(spec.id, spec.max + 1000.0, true).is_err());
    }

    #[test]
    fn set_parameter_accepts_in_range_value() {
        let mut node = FilterNode::new(FilterKind::Median);
        let spec = metadata_for(FilterKind::Median).parameters[0];
        node.set_parameter(spec.id, spec.max, true).unwrap();
        assert_eq!(node.parameter(spec.id), Some(spec.max));
    }

    #[test]
    fn apply_never_changes_buffer_length() {
        let resolution = Resolution::new(8, 8, 32);
        let mut node = FilterNode::new(FilterKind::Flip);
        let mut pixels = vec![0u8; resolution.byte_size()];
        node.apply(&mut pixels, resolution).unwrap();
        assert_eq!(pixels.len(), resolution.byte_size());
    }
}
