// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference resolution outcome types

use serde::{Deserialize, Serialize};

/// Terminal state of a resolution run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// A pass found no missing references
    Resolved,
    /// The pass cap was reached; references may still be missing
    Exhausted,
}

/// Summary of a reference resolution run
///
/// Exhaustion and fetch failures are not errors: the caller receives a
/// partially-resolved set and this report says how partial it is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// How resolution stopped
    pub outcome: ResolutionOutcome,
    /// Number of passes run
    pub passes: usize,
    /// Ids fetched and appended to the working set, in append order
    pub fetched: Vec<String>,
    /// Ids whose fetch failed at least once
    pub failed: Vec<String>,
    /// Ids still referenced but absent when resolution stopped
    pub unresolved: Vec<String>,
}

impl ResolutionReport {
    /// Create an empty report for a run that has not started
    pub fn new() -> Self {
        Self {
            outcome: ResolutionOutcome::Exhausted,
            passes: 0,
            fetched: Vec::new(),
            failed: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Check if every reference was satisfied
    pub fn is_resolved(&self) -> bool {
        self.outcome == ResolutionOutcome::Resolved
    }
}

impl Default for ResolutionReport {
    fn default() -> Self {
        Self::new()
    }
}
