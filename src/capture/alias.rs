// SPDX-License-Identifier: GPL-3.0-only

//! Resolution aliasing (spec.md §4.4): substituting a user-pinned
//! resolution when the capture device misreports a signal's native
//! resolution.

use crate::capture::types::Resolution;
use serde::{Deserialize, Serialize};

/// A single `from -> to` resolution substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAlias {
    pub from: Resolution,
    pub to: Resolution,
}

/// An ordered collection of [`ResolutionAlias`] entries, looked up by
/// first-match `(w, h)` equality on `from`. Established once from an
/// external source at startup and immutable thereafter, unless explicitly
/// replaced wholesale via [`AliasTable::replace`].
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<ResolutionAlias>,
}

impl AliasTable {
    pub fn new(entries: Vec<ResolutionAlias>) -> Self {
        Self { entries }
    }

    /// Returns the first alias whose `from` resolution matches `resolution`
    /// by `(w, h)` only (bit depth is ignored, matching the bit-depth-free
    /// resolutions a capture device proposes).
    pub fn lookup(&self, resolution: Resolution) -> Option<Resolution> {
        self.entries
            .iter()
            .find(|alias| alias.from.w == resolution.w && alias.from.h == resolution.h)
            .map(|alias| alias.to)
    }

    /// Replaces the entire alias set.
    pub fn replace(&mut self, entries: Vec<ResolutionAlias>) {
        self.entries = entries;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let table = AliasTable::new(vec![
            ResolutionAlias { from: Resolution::new(720, 400, 32), to: Resolution::new(640, 400, 32) },
            ResolutionAlias { from: Resolution::new(720, 400, 32), to: Resolution::new(800, 400, 32) },
        ]);
        assert_eq!(table.lookup(Resolution::new(720, 400, 32)), Some(Resolution::new(640, 400, 32)));
    }

    #[test]
    fn no_match_returns_none() {
        let table = AliasTable::new(vec![ResolutionAlias {
            from: Resolution::new(720, 400, 32),
            to: Resolution::new(640, 400, 32),
        }]);
        assert_eq!(table.lookup(Resolution::new(640, 480, 32)), None);
    }

    #[test]
    fn bit_depth_is_ignored_in_lookup() {
        let table = AliasTable::new(vec![ResolutionAlias {
            from: Resolution::new(720, 400, 32),
            to: Resolution::new(640, 400, 32),
        }]);
        assert_eq!(table.lookup(Resolution::new(720, 400, 16)), Some(Resolution::new(640, 400, 32)));
    }
}
