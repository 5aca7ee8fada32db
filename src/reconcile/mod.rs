//! Load-time reconciliation of stored and bundled catalog data.
//!
//! The bundle is authoritative for structural metadata (names, codes,
//! titles, objectives, links) so catalog fixes ship forward to existing
//! installations. Contributions are authoritative remotely and are never
//! replaced or merged from the bundle: user content must not regress.

use crate::models::{Department, Experiment, Subject, CatalogDocument, CATALOG_VERSION};
use crate::store::RawDocument;

/// What the reconciler decided about the loaded document.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub tree: Vec<Department>,
    /// The surviving tree differs from the stored document; writing it back
    /// lets the store self-heal.
    pub needs_writeback: bool,
    /// Contributions whose stored timestamp did not parse.
    pub flagged_timestamps: usize,
}

/// Decide what to trust: the stored document, a merge of it with the bundled
/// structure, or the bundle alone.
pub fn reconcile(stored: Option<RawDocument>, fallback: &[Department]) -> ReconcileOutcome {
    let Some(document) = stored else {
        tracing::info!("No stored catalog available; starting from the bundled catalog");
        return ReconcileOutcome {
            tree: fallback.to_vec(),
            needs_writeback: true,
            flagged_timestamps: 0,
        };
    };

    let Some((version, mut tree)) = parse_document(document) else {
        tracing::warn!("Stored catalog failed validation; replacing it with the bundled catalog");
        return ReconcileOutcome {
            tree: fallback.to_vec(),
            needs_writeback: true,
            flagged_timestamps: 0,
        };
    };

    if tree.is_empty() && !fallback.is_empty() {
        tracing::info!("Stored catalog is empty; seeding it with the bundled catalog");
        return ReconcileOutcome {
            tree: fallback.to_vec(),
            needs_writeback: true,
            flagged_timestamps: 0,
        };
    }

    if version < CATALOG_VERSION {
        tracing::info!(
            stored_version = version,
            current_version = CATALOG_VERSION,
            "Stored catalog is outdated; merging bundled updates"
        );
    }

    let changed = merge_departments(&mut tree, fallback);
    let flagged_timestamps = flag_raw_timestamps(&tree);

    ReconcileOutcome {
        tree,
        needs_writeback: changed || version < CATALOG_VERSION,
        flagged_timestamps,
    }
}

/// Accept either the versioned envelope or a legacy bare departments array
/// (treated as version 0).
fn parse_document(document: RawDocument) -> Option<(u32, Vec<Department>)> {
    if document.is_array() {
        return serde_json::from_value(document).ok().map(|tree| (0, tree));
    }
    let envelope: CatalogDocument = serde_json::from_value(document).ok()?;
    Some((envelope.catalog_version, envelope.departments))
}

fn merge_departments(tree: &mut Vec<Department>, fallback: &[Department]) -> bool {
    let mut changed = false;
    for fb_dept in fallback {
        match tree.iter_mut().find(|d| d.id == fb_dept.id) {
            None => {
                tracing::info!(department = %fb_dept.id, "Adding department shipped with this build");
                tree.push(fb_dept.clone());
                changed = true;
            }
            Some(dept) => {
                if dept.name != fb_dept.name {
                    dept.name = fb_dept.name.clone();
                    changed = true;
                }
                changed |= merge_subjects(&mut dept.subjects, &fb_dept.subjects);
            }
        }
    }
    changed
}

fn merge_subjects(subjects: &mut Vec<Subject>, fallback: &[Subject]) -> bool {
    let mut changed = false;
    for fb_subject in fallback {
        match subjects.iter_mut().find(|s| s.id == fb_subject.id) {
            None => {
                tracing::info!(subject = %fb_subject.id, "Adding subject shipped with this build");
                subjects.push(fb_subject.clone());
                changed = true;
            }
            Some(subject) => {
                if subject.name != fb_subject.name {
                    subject.name = fb_subject.name.clone();
                    changed = true;
                }
                if subject.code != fb_subject.code {
                    subject.code = fb_subject.code.clone();
                    changed = true;
                }
                // Links follow the bundle only where the bundle specifies
                // one; a link added remotely survives a silent bundle.
                if fb_subject.drive_link.is_some() && subject.drive_link != fb_subject.drive_link {
                    subject.drive_link = fb_subject.drive_link.clone();
                    changed = true;
                }
                if fb_subject.github_link.is_some() && subject.github_link != fb_subject.github_link
                {
                    subject.github_link = fb_subject.github_link.clone();
                    changed = true;
                }
                changed |= merge_experiments(&mut subject.experiments, &fb_subject.experiments);
            }
        }
    }
    changed
}

fn merge_experiments(experiments: &mut Vec<Experiment>, fallback: &[Experiment]) -> bool {
    let mut changed = false;
    for fb_experiment in fallback {
        match experiments.iter_mut().find(|e| e.id == fb_experiment.id) {
            None => {
                tracing::info!(experiment = %fb_experiment.id, "Adding experiment shipped with this build");
                experiments.push(fb_experiment.clone());
                changed = true;
            }
            Some(experiment) => {
                if experiment.title != fb_experiment.title {
                    experiment.title = fb_experiment.title.clone();
                    changed = true;
                }
                if experiment.objective != fb_experiment.objective {
                    experiment.objective = fb_experiment.objective.clone();
                    changed = true;
                }
                // Contributions stay exactly as stored.
            }
        }
    }
    changed
}

/// Log every contribution whose stored timestamp did not parse. The raw
/// value is kept; a bad record never aborts a load.
fn flag_raw_timestamps(tree: &[Department]) -> usize {
    let mut flagged = 0;
    for dept in tree {
        for subject in &dept.subjects {
            for experiment in &subject.experiments {
                for contribution in &experiment.contributions {
                    if !contribution.created_at.is_valid() {
                        tracing::warn!(
                            contribution = %contribution.id,
                            value = %contribution.created_at.as_wire(),
                            "Stored timestamp did not parse; leaving it as-is"
                        );
                        flagged += 1;
                    }
                }
            }
        }
    }
    flagged
}
