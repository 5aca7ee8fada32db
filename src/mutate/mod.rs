//! Pure tree mutations.
//!
//! Each operation consumes the current tree and returns the next one, so the
//! edited path is rebuilt while untouched departments, subjects, and
//! experiments carry over as-is. A mutation whose target id no longer exists
//! is a benign no-op (the entity may have been deleted by another session).

use crate::models::{Contribution, Department, Experiment, Subject};

/// An edit intent against the catalog tree.
#[derive(Debug, Clone)]
pub enum Action {
    AddContribution {
        experiment_id: String,
        contribution: Contribution,
    },
    UpdateContribution {
        experiment_id: String,
        contribution: Contribution,
    },
    DeleteContribution {
        experiment_id: String,
        contribution_id: String,
    },
    UpvoteContribution {
        experiment_id: String,
        contribution_id: String,
    },
    CreateExperiment {
        subject_id: String,
        title: String,
        objective: String,
    },
    DeleteExperiment {
        subject_id: String,
        experiment_id: String,
    },
    CreateSubject {
        department_id: String,
        name: String,
        code: String,
        drive_link: Option<String>,
        github_link: Option<String>,
    },
    DeleteSubject {
        department_id: String,
        subject_id: String,
    },
    CreateDepartment {
        name: String,
    },
    DeleteDepartment {
        department_id: String,
    },
}

impl Action {
    /// Whether this action is admin-gated. Adding and upvoting contributions
    /// are open to every user; everything else changes the catalog structure
    /// or someone else's content.
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            Action::AddContribution { .. } | Action::UpvoteContribution { .. }
        )
    }
}

/// Result of applying a mutation.
#[derive(Debug)]
pub struct Mutated {
    /// The next tree; equal to the input when nothing changed.
    pub tree: Vec<Department>,
    pub changed: bool,
    /// Id minted by a create operation.
    pub created_id: Option<String>,
}

impl Mutated {
    fn unchanged(tree: Vec<Department>) -> Self {
        Self {
            tree,
            changed: false,
            created_id: None,
        }
    }

    fn edited(tree: Vec<Department>) -> Self {
        Self {
            tree,
            changed: true,
            created_id: None,
        }
    }

    fn created(tree: Vec<Department>, id: String) -> Self {
        Self {
            tree,
            changed: true,
            created_id: Some(id),
        }
    }
}

/// Apply an action to the tree.
pub fn apply(tree: Vec<Department>, action: Action) -> Mutated {
    match action {
        Action::AddContribution {
            experiment_id,
            contribution,
        } => add_contribution(tree, &experiment_id, contribution),
        Action::UpdateContribution {
            experiment_id,
            contribution,
        } => update_contribution(tree, &experiment_id, contribution),
        Action::DeleteContribution {
            experiment_id,
            contribution_id,
        } => delete_contribution(tree, &experiment_id, &contribution_id),
        Action::UpvoteContribution {
            experiment_id,
            contribution_id,
        } => upvote_contribution(tree, &experiment_id, &contribution_id),
        Action::CreateExperiment {
            subject_id,
            title,
            objective,
        } => create_experiment(tree, &subject_id, title, objective),
        Action::DeleteExperiment {
            subject_id,
            experiment_id,
        } => delete_experiment(tree, &subject_id, &experiment_id),
        Action::CreateSubject {
            department_id,
            name,
            code,
            drive_link,
            github_link,
        } => create_subject(tree, &department_id, name, code, drive_link, github_link),
        Action::DeleteSubject {
            department_id,
            subject_id,
        } => delete_subject(tree, &department_id, &subject_id),
        Action::CreateDepartment { name } => create_department(tree, name),
        Action::DeleteDepartment { department_id } => delete_department(tree, &department_id),
    }
}

pub fn add_contribution(
    mut tree: Vec<Department>,
    experiment_id: &str,
    contribution: Contribution,
) -> Mutated {
    match find_experiment_mut(&mut tree, experiment_id) {
        Some(experiment) => {
            experiment.contributions.push(contribution);
            Mutated::edited(tree)
        }
        None => Mutated::unchanged(tree),
    }
}

pub fn update_contribution(
    mut tree: Vec<Department>,
    experiment_id: &str,
    contribution: Contribution,
) -> Mutated {
    let mut changed = false;
    if let Some(experiment) = find_experiment_mut(&mut tree, experiment_id) {
        if let Some(slot) = experiment
            .contributions
            .iter_mut()
            .find(|c| c.id == contribution.id)
        {
            *slot = contribution;
            changed = true;
        }
    }
    if changed {
        Mutated::edited(tree)
    } else {
        Mutated::unchanged(tree)
    }
}

pub fn delete_contribution(
    mut tree: Vec<Department>,
    experiment_id: &str,
    contribution_id: &str,
) -> Mutated {
    let mut changed = false;
    if let Some(experiment) = find_experiment_mut(&mut tree, experiment_id) {
        let before = experiment.contributions.len();
        experiment.contributions.retain(|c| c.id != contribution_id);
        changed = experiment.contributions.len() != before;
    }
    if changed {
        Mutated::edited(tree)
    } else {
        Mutated::unchanged(tree)
    }
}

/// Increment `upvotes` by exactly one. Idempotence per identity is enforced
/// upstream by the upvote ledger, not here.
pub fn upvote_contribution(
    mut tree: Vec<Department>,
    experiment_id: &str,
    contribution_id: &str,
) -> Mutated {
    let mut changed = false;
    if let Some(experiment) = find_experiment_mut(&mut tree, experiment_id) {
        if let Some(contribution) = experiment
            .contributions
            .iter_mut()
            .find(|c| c.id == contribution_id)
        {
            contribution.upvotes = contribution.upvotes.saturating_add(1);
            changed = true;
        }
    }
    if changed {
        Mutated::edited(tree)
    } else {
        Mutated::unchanged(tree)
    }
}

pub fn create_experiment(
    mut tree: Vec<Department>,
    subject_id: &str,
    title: String,
    objective: String,
) -> Mutated {
    let id = fresh_id("exp", &tree);
    match find_subject_mut(&mut tree, subject_id) {
        Some(subject) => {
            subject.experiments.push(Experiment {
                id: id.clone(),
                title,
                objective,
                contributions: Vec::new(),
            });
            Mutated::created(tree, id)
        }
        None => Mutated::unchanged(tree),
    }
}

pub fn delete_experiment(
    mut tree: Vec<Department>,
    subject_id: &str,
    experiment_id: &str,
) -> Mutated {
    let mut changed = false;
    if let Some(subject) = find_subject_mut(&mut tree, subject_id) {
        let before = subject.experiments.len();
        subject.experiments.retain(|e| e.id != experiment_id);
        changed = subject.experiments.len() != before;
    }
    if changed {
        Mutated::edited(tree)
    } else {
        Mutated::unchanged(tree)
    }
}

pub fn create_subject(
    mut tree: Vec<Department>,
    department_id: &str,
    name: String,
    code: String,
    drive_link: Option<String>,
    github_link: Option<String>,
) -> Mutated {
    let id = fresh_id("subj", &tree);
    match tree.iter_mut().find(|d| d.id == department_id) {
        Some(department) => {
            department.subjects.push(Subject {
                id: id.clone(),
                name,
                code,
                drive_link,
                github_link,
                experiments: Vec::new(),
            });
            Mutated::created(tree, id)
        }
        None => Mutated::unchanged(tree),
    }
}

pub fn delete_subject(
    mut tree: Vec<Department>,
    department_id: &str,
    subject_id: &str,
) -> Mutated {
    let mut changed = false;
    if let Some(department) = tree.iter_mut().find(|d| d.id == department_id) {
        let before = department.subjects.len();
        department.subjects.retain(|s| s.id != subject_id);
        changed = department.subjects.len() != before;
    }
    if changed {
        Mutated::edited(tree)
    } else {
        Mutated::unchanged(tree)
    }
}

pub fn create_department(mut tree: Vec<Department>, name: String) -> Mutated {
    let id = fresh_id("dept", &tree);
    tree.push(Department {
        id: id.clone(),
        name,
        subjects: Vec::new(),
    });
    Mutated::created(tree, id)
}

pub fn delete_department(mut tree: Vec<Department>, department_id: &str) -> Mutated {
    let before = tree.len();
    tree.retain(|d| d.id != department_id);
    if tree.len() != before {
        Mutated::edited(tree)
    } else {
        Mutated::unchanged(tree)
    }
}

/// Mint an id unique against the whole tree, not just the target collection.
pub fn fresh_id(prefix: &str, tree: &[Department]) -> String {
    loop {
        let id = format!("{}-{}", prefix, uuid::Uuid::new_v4());
        if !id_exists(tree, &id) {
            return id;
        }
    }
}

/// Whether any entity at any level carries this id.
pub fn id_exists(tree: &[Department], id: &str) -> bool {
    tree.iter().any(|dept| {
        dept.id == id
            || dept.subjects.iter().any(|subject| {
                subject.id == id
                    || subject.experiments.iter().any(|experiment| {
                        experiment.id == id
                            || experiment.contributions.iter().any(|c| c.id == id)
                    })
            })
    })
}

fn find_experiment_mut<'a>(
    tree: &'a mut [Department],
    experiment_id: &str,
) -> Option<&'a mut Experiment> {
    tree.iter_mut()
        .flat_map(|dept| dept.subjects.iter_mut())
        .flat_map(|subject| subject.experiments.iter_mut())
        .find(|experiment| experiment.id == experiment_id)
}

fn find_subject_mut<'a>(tree: &'a mut [Department], subject_id: &str) -> Option<&'a mut Subject> {
    tree.iter_mut()
        .flat_map(|dept| dept.subjects.iter_mut())
        .find(|subject| subject.id == subject_id)
}
