//! Selection derived from the live tree.
//!
//! Views hold ids, never entity copies, and re-resolve them against the
//! current tree on every read. After a mutation any id that no longer
//! resolves is dropped so the view falls back to its parent.

use crate::models::{Department, Experiment, Subject};

/// Currently selected ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub department_id: Option<String>,
    pub subject_id: Option<String>,
    pub experiment_id: Option<String>,
}

impl Selection {
    /// Default view after load: the first department and its first subject.
    pub fn initial(tree: &[Department]) -> Self {
        let department = tree.first();
        let subject = department.and_then(|d| d.subjects.first());
        Self {
            department_id: department.map(|d| d.id.clone()),
            subject_id: subject.map(|s| s.id.clone()),
            experiment_id: None,
        }
    }

    /// Drop any id that no longer resolves.
    pub fn normalize(mut self, tree: &[Department]) -> Self {
        if let Some(id) = &self.department_id {
            if resolve_department(tree, id).is_none() {
                self.department_id = None;
            }
        }
        if let Some(id) = &self.subject_id {
            if resolve_subject(tree, id).is_none() {
                self.subject_id = None;
            }
        }
        if let Some(id) = &self.experiment_id {
            if resolve_experiment(tree, id).is_none() {
                self.experiment_id = None;
            }
        }
        self
    }
}

pub fn resolve_department<'a>(tree: &'a [Department], id: &str) -> Option<&'a Department> {
    tree.iter().find(|d| d.id == id)
}

pub fn resolve_subject<'a>(tree: &'a [Department], id: &str) -> Option<&'a Subject> {
    locate_subject(tree, id).map(|(_, subject)| subject)
}

pub fn resolve_experiment<'a>(tree: &'a [Department], id: &str) -> Option<&'a Experiment> {
    locate_experiment(tree, id).map(|(_, _, experiment)| experiment)
}

/// Find a subject together with its owning department.
pub fn locate_subject<'a>(
    tree: &'a [Department],
    id: &str,
) -> Option<(&'a Department, &'a Subject)> {
    tree.iter().find_map(|dept| {
        dept.subjects
            .iter()
            .find(|s| s.id == id)
            .map(|subject| (dept, subject))
    })
}

/// Find an experiment together with its ancestors.
pub fn locate_experiment<'a>(
    tree: &'a [Department],
    id: &str,
) -> Option<(&'a Department, &'a Subject, &'a Experiment)> {
    tree.iter().find_map(|dept| {
        dept.subjects.iter().find_map(|subject| {
            subject
                .experiments
                .iter()
                .find(|e| e.id == id)
                .map(|experiment| (dept, subject, experiment))
        })
    })
}
