// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference resolution over a partially-fetched object graph
//!
//! Objects point at each other through `referencedId` fields at any depth.
//! The resolver repeatedly scans the working set, fetches every referenced
//! id that is not present yet, and appends what it gets back. Passes are
//! capped, so cyclic or unresolvable chains terminate without cycle
//! detection.

use futures_util::stream::{self, StreamExt};
use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde_json::Value;
use speckle_lite_model::fields::{MAX_RESOLVE_ITERATIONS, REFERENCED_ID};
use speckle_lite_model::{
    ObjectFetcher, ResolutionOutcome, ResolutionReport, Result, SpeckleObject,
};

/// Default number of fetches in flight per pass
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Iterative `referencedId` resolver
#[derive(Clone, Debug)]
pub struct ReferenceResolver {
    /// Maximum number of scan/fetch passes
    pub max_iterations: usize,
    /// Maximum number of concurrent fetches within a pass
    pub concurrency: usize,
}

impl ReferenceResolver {
    /// Create a resolver with the default pass cap and concurrency
    pub fn new() -> Self {
        Self {
            max_iterations: MAX_RESOLVE_ITERATIONS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the pass cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the per-pass fetch concurrency (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Complete `objects` in place by fetching referenced-but-missing ids
    ///
    /// Fetch failures are logged and the id is dropped for that pass; it is
    /// attempted again on a later pass while it is still referenced. The
    /// returned report describes how resolution stopped.
    pub async fn resolve(
        &self,
        objects: &mut Vec<SpeckleObject>,
        fetcher: &dyn ObjectFetcher,
    ) -> ResolutionReport {
        let mut report = ResolutionReport::new();
        let mut failed: FxHashSet<String> = FxHashSet::default();

        for pass in 1..=self.max_iterations {
            report.passes = pass;

            let missing = missing_references(objects);
            if missing.is_empty() {
                debug!("Resolver pass {}: all references resolved", pass);
                report.outcome = ResolutionOutcome::Resolved;
                return report;
            }
            debug!("Resolver pass {}: fetching {} missing objects", pass, missing.len());

            for (id, result) in self.fetch_batch(missing, fetcher).await {
                let error = match result {
                    Ok(object) if object.id() == Some(id.as_str()) => {
                        report.fetched.push(id);
                        objects.push(object);
                        continue;
                    }
                    Ok(object) => format!(
                        "store returned object with id {:?}",
                        object.id().unwrap_or("<none>")
                    ),
                    Err(e) => e.to_string(),
                };
                // Mismatched objects are dropped so ids stay unique in the set
                warn!("Failed to fetch referenced object {}: {}", id, error);
                if failed.insert(id.clone()) {
                    report.failed.push(id);
                }
            }
        }

        report.outcome = ResolutionOutcome::Exhausted;
        report.unresolved = missing_references(objects);
        if !report.unresolved.is_empty() {
            warn!(
                "Reference resolution stopped after {} passes with {} unresolved references",
                report.passes,
                report.unresolved.len()
            );
        }
        report
    }

    /// Fetch every id, settling all of them before returning
    ///
    /// Results keep the order of `ids` regardless of completion order.
    async fn fetch_batch(
        &self,
        ids: Vec<String>,
        fetcher: &dyn ObjectFetcher,
    ) -> Vec<(String, Result<SpeckleObject>)> {
        stream::iter(ids)
            .map(|id| async move {
                let result = fetcher.fetch(&id).await;
                (id, result)
            })
            .buffered(self.concurrency.max(1))
            .collect()
            .await
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Every `referencedId` string found at any depth, in discovery order
///
/// Each id appears once.
pub fn referenced_ids(objects: &[SpeckleObject]) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut found = Vec::new();

    for object in objects {
        // Explicit stack: nesting depth is unbounded
        let mut stack: Vec<&Value> = object.as_map().values().rev().collect();
        visit_map_refs(object.as_map(), &mut seen, &mut found);

        while let Some(value) = stack.pop() {
            match value {
                Value::Object(map) => {
                    visit_map_refs(map, &mut seen, &mut found);
                    stack.extend(map.values().rev());
                }
                Value::Array(items) => stack.extend(items.iter().rev()),
                _ => {}
            }
        }
    }

    found.into_iter().map(str::to_string).collect()
}

/// Referenced ids with no matching object `id` in the set
pub fn missing_references(objects: &[SpeckleObject]) -> Vec<String> {
    let present: FxHashSet<&str> = objects.iter().filter_map(SpeckleObject::id).collect();
    referenced_ids(objects)
        .into_iter()
        .filter(|id| !present.contains(id.as_str()))
        .collect()
}

fn visit_map_refs<'a>(
    map: &'a serde_json::Map<String, Value>,
    seen: &mut FxHashSet<&'a str>,
    found: &mut Vec<&'a str>,
) {
    if let Some(Value::String(id)) = map.get(REFERENCED_ID) {
        if seen.insert(id.as_str()) {
            found.push(id.as_str());
        }
    }
}
