// SPDX-License-Identifier: GPL-3.0-only

//! The filter subsystem (spec.md §3 "FilterNode"/"FilterChain", §4.6
//! "Filter graph"): a registry of filter kinds and their parameter schemas,
//! filter-node instances built from that registry, and the graph that owns
//! and executes them.

mod funcs;

pub mod chain;
pub mod node;
pub mod registry;

pub use chain::{FilterChain, FilterGraph};
pub use node::{FilterNode, FilterState};
pub use registry::{metadata_for, param, FilterCategory, FilterKind, FilterMetadata, ParameterSpec, ALL_KINDS};
