//! Reconciliation of synthesized artifacts against a destination store
//!
//! Artifacts are matched to what the store already holds by kind and stable
//! name. A match is updated in place so its id survives, anything new is
//! created, and anything the run no longer produces is deleted. Sprites and
//! timelines of patterns that failed in this run are left untouched, and the
//! selector state of such a pattern stays bound to its stored timeline.

use crate::models::{Artifact, ArtifactId, ArtifactKind, SELECTOR_NAME};
use crate::store::{ArtifactStore, StoreError};
use crate::synth::SynthesisOutput;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Error during reconciliation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconcileError {
    /// Two artifacts would be stored under the same name
    #[error("name '{name}' is used by a {first} and a {second}")]
    NameCollision { name: String, first: ArtifactKind, second: ArtifactKind },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to the artifacts of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
}

impl KindReport {
    /// Whether the store content of this kind changed.
    pub fn changed(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    pub fn summary(&self) -> String {
        format_counts([
            self.created.len(),
            self.updated.len(),
            self.unchanged.len(),
            self.deleted.len(),
            self.retained.len(),
        ])
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub sprites: KindReport,
    pub timelines: KindReport,
    pub selectors: KindReport,
    /// Id of the selector, set as the container's primary object
    pub primary: Option<ArtifactId>,
}

impl ReconcileReport {
    pub fn kind(&self, kind: ArtifactKind) -> &KindReport {
        match kind {
            ArtifactKind::Sprite => &self.sprites,
            ArtifactKind::Timeline => &self.timelines,
            ArtifactKind::Selector => &self.selectors,
        }
    }

    fn kind_mut(&mut self, kind: ArtifactKind) -> &mut KindReport {
        match kind {
            ArtifactKind::Sprite => &mut self.sprites,
            ArtifactKind::Timeline => &mut self.timelines,
            ArtifactKind::Selector => &mut self.selectors,
        }
    }

    pub fn changed(&self) -> bool {
        ArtifactKind::ALL.iter().any(|&kind| self.kind(kind).changed())
    }

    /// One-line summary, e.g. `2 created, 1 updated, 3 unchanged, 0 deleted`.
    pub fn summary(&self) -> String {
        let count = |f: fn(&KindReport) -> usize| -> usize {
            ArtifactKind::ALL.iter().map(|&kind| f(self.kind(kind))).sum()
        };
        format_counts([
            count(|k| k.created.len()),
            count(|k| k.updated.len()),
            count(|k| k.unchanged.len()),
            count(|k| k.deleted.len()),
            count(|k| k.retained.len()),
        ])
    }
}

/// Retained artifacts are only mentioned when there are some.
fn format_counts([created, updated, unchanged, deleted, retained]: [usize; 5]) -> String {
    let mut summary =
        format!("{} created, {} updated, {} unchanged, {} deleted", created, updated, unchanged, deleted);
    if retained > 0 {
        summary.push_str(&format!(", {} retained", retained));
    }
    summary
}

/// Bring `store` in line with `output`.
///
/// Name collisions are checked before the store is touched.
pub fn reconcile<S: ArtifactStore + ?Sized>(
    store: &mut S,
    output: &SynthesisOutput,
) -> Result<ReconcileReport, ReconcileError> {
    let mut generated = output.artifacts();
    bind_retained_motions(store, output, &mut generated);
    check_names(store, output, &generated)?;

    let mut report = ReconcileReport::default();

    for kind in ArtifactKind::ALL {
        let existing = store.enumerate(kind);
        let by_name: HashMap<&str, usize> =
            existing.iter().enumerate().map(|(i, stored)| (stored.artifact.name(), i)).collect();
        let mut matched = HashSet::new();
        let kind_report = report.kind_mut(kind);

        for artifact in generated.iter().filter(|a| a.kind() == kind) {
            let name = artifact.name().to_string();
            match by_name.get(artifact.name()) {
                Some(&i) => {
                    let stored = &existing[i];
                    matched.insert(i);
                    if stored.artifact == *artifact {
                        kind_report.unchanged.push(name);
                    } else {
                        log::debug!("updating {} {}", artifact.key(), stored.id);
                        store.update_in_place(stored.id, artifact.clone())?;
                        kind_report.updated.push(name);
                    }
                }
                None => {
                    let id = store.create(artifact.clone())?;
                    log::debug!("created {} {}", artifact.key(), id);
                    kind_report.created.push(name);
                }
            }
        }

        for (i, stored) in existing.iter().enumerate() {
            if matched.contains(&i) {
                continue;
            }
            let name = stored.artifact.name().to_string();
            if output.is_retained(&stored.key()) {
                log::debug!("retaining {} {}", stored.key(), stored.id);
                kind_report.retained.push(name);
            } else {
                log::debug!("deleting {} {}", stored.key(), stored.id);
                store.delete(stored.id)?;
                kind_report.deleted.push(name);
            }
        }
    }

    if let Some(selector) = store.load(ArtifactKind::Selector, SELECTOR_NAME) {
        store.set_primary(selector.id)?;
        report.primary = Some(selector.id);
    }

    Ok(report)
}

/// Point the states of failed patterns at the timelines the store keeps for
/// them. States of patterns that never produced a timeline stay unbound.
fn bind_retained_motions<S: ArtifactStore + ?Sized>(
    store: &S,
    output: &SynthesisOutput,
    generated: &mut [Artifact],
) {
    for artifact in generated.iter_mut() {
        let Artifact::Selector(machine) = artifact else {
            continue;
        };
        for failure in &output.failures {
            if store.load(ArtifactKind::Timeline, &failure.pattern).is_none() {
                continue;
            }
            if let Some(state) = machine.states.get_mut(failure.index) {
                if state.motion.is_none() {
                    log::debug!("keeping {} bound to stored timeline '{}'", state.name, failure.pattern);
                    state.motion = Some(failure.pattern.clone());
                }
            }
        }
    }
}

/// Every name the store will hold afterwards must belong to one artifact.
fn check_names<S: ArtifactStore + ?Sized>(
    store: &S,
    output: &SynthesisOutput,
    generated: &[Artifact],
) -> Result<(), ReconcileError> {
    let mut seen: HashMap<String, ArtifactKind> = HashMap::new();
    let mut claim = |name: &str, kind: ArtifactKind| match seen.get(name) {
        Some(&first) => Err(ReconcileError::NameCollision { name: name.to_string(), first, second: kind }),
        None => {
            seen.insert(name.to_string(), kind);
            Ok(())
        }
    };

    for artifact in generated {
        claim(artifact.name(), artifact.kind())?;
    }

    let regenerated: HashSet<_> = generated.iter().map(Artifact::key).collect();
    for kind in ArtifactKind::ALL {
        for stored in store.enumerate(kind) {
            let key = stored.key();
            if output.is_retained(&key) && !regenerated.contains(&key) {
                claim(&key.name, key.kind)?;
            }
        }
    }

    Ok(())
}
