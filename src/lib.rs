//! LabLINK Catalog Core
//!
//! The data synchronization and reconciliation layer behind the LabLINK
//! collaborative lab notebook: loads the shared catalog from a remote
//! document store (falling back to the local cache, then the bundled
//! catalog), merges structural updates without touching user contributions,
//! applies edits optimistically, and persists them back with debouncing.

pub mod auth;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod models;
pub mod mutate;
pub mod reconcile;
pub mod scheduler;
pub mod search;
pub mod select;
pub mod store;
pub mod viva;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::AdminGate;
use config::Config;
use errors::CoreError;
use models::{Department, Experiment, Subject};
use mutate::{Action, Mutated};
use scheduler::PersistScheduler;
use search::SearchHit;
use select::Selection;
use store::{DocumentStore, HttpDocumentStore, LocalCache};
use viva::VivaGenerator;

/// Initialize logging from config (honoring `RUST_LOG` when set).
pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Outcome of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The tree changed; persistence has been scheduled.
    Applied { created_id: Option<String> },
    /// Target id absent; treated as a benign race, nothing changed.
    NotFound,
    /// Admin-gated action attempted without an admin session.
    Unauthorized,
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied { .. })
    }
}

/// Application state: the live catalog tree plus everything derived from it.
///
/// All reads and mutations happen on the caller's sequence of calls; the
/// only background work is the debounced remote write.
pub struct CatalogApp {
    cache: LocalCache,
    scheduler: PersistScheduler,
    gate: AdminGate,
    viva: Option<VivaGenerator>,
    tree: Vec<Department>,
    selection: Selection,
    upvoted: HashSet<String>,
    is_admin: bool,
}

impl CatalogApp {
    /// Wire the full stack from config: local cache, remote store, and the
    /// optional viva generator, then load the catalog.
    pub async fn init(config: &Config) -> Result<Self, CoreError> {
        let pool = store::init_cache(&config.cache_path).await?;
        let cache = LocalCache::new(pool);
        let remote = Arc::new(HttpDocumentStore::from_config(config));
        let generator = VivaGenerator::from_config(config);
        Ok(Self::load(remote, cache, generator, config).await)
    }

    /// Load the catalog through the source cascade (remote store, local
    /// cache, bundled catalog) and reconcile it against the bundle.
    pub async fn load<S>(
        remote: Arc<S>,
        cache: LocalCache,
        generator: Option<VivaGenerator>,
        config: &Config,
    ) -> Self
    where
        S: DocumentStore + Send + Sync + 'static,
    {
        let bundle = fallback::catalog();

        let mut remote_failed = false;
        let stored = match remote.fetch().await {
            Ok(document) => Some(document),
            Err(e) => {
                remote_failed = true;
                tracing::warn!("Remote catalog unavailable ({}); trying the local cache", e);
                cache.load_catalog_raw().await
            }
        };

        let outcome = reconcile::reconcile(stored, &bundle);
        if outcome.flagged_timestamps > 0 {
            tracing::warn!(
                count = outcome.flagged_timestamps,
                "Some stored timestamps did not parse"
            );
        }
        let tree = outcome.tree;

        let scheduler =
            PersistScheduler::spawn(remote, Duration::from_millis(config.debounce_ms));
        if outcome.needs_writeback || remote_failed {
            scheduler.schedule(tree.clone());
        }

        if let Err(e) = cache.save_catalog(&tree).await {
            tracing::warn!("Could not cache the catalog locally: {}", e);
        }

        let upvoted = cache.load_upvoted().await;
        let selection = Selection::initial(&tree);
        let gate = AdminGate::new(config.admin_key.clone());

        tracing::info!(
            departments = tree.len(),
            "Catalog loaded"
        );

        Self {
            cache,
            scheduler,
            gate,
            viva: generator,
            tree,
            selection,
            upvoted,
            is_admin: false,
        }
    }

    /// The live tree.
    pub fn tree(&self) -> &[Department] {
        &self.tree
    }

    /// Apply an edit optimistically: gate check, pure mutation, local cache
    /// write, debounced remote persistence, selection re-resolution.
    pub async fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        if action.requires_admin() && !self.is_admin {
            tracing::warn!("Rejected admin-gated action without an admin session");
            return DispatchOutcome::Unauthorized;
        }

        let Mutated {
            tree,
            changed,
            created_id,
        } = mutate::apply(std::mem::take(&mut self.tree), action);
        self.tree = tree;

        if !changed {
            return DispatchOutcome::NotFound;
        }

        if let Err(e) = self.cache.save_catalog(&self.tree).await {
            tracing::warn!("Could not cache the catalog locally: {}", e);
        }
        self.scheduler.schedule(self.tree.clone());
        self.selection = self.selection.clone().normalize(&self.tree);

        DispatchOutcome::Applied { created_id }
    }

    /// Upvote a contribution, at most once per identity. Returns whether the
    /// upvote was accepted.
    pub async fn upvote(&mut self, experiment_id: &str, contribution_id: &str) -> bool {
        if self.upvoted.contains(contribution_id) {
            tracing::debug!(contribution = contribution_id, "Ignoring repeat upvote");
            return false;
        }

        let outcome = self
            .dispatch(Action::UpvoteContribution {
                experiment_id: experiment_id.to_string(),
                contribution_id: contribution_id.to_string(),
            })
            .await;
        if !outcome.is_applied() {
            return false;
        }

        self.upvoted.insert(contribution_id.to_string());
        if let Err(e) = self.cache.save_upvoted(&self.upvoted).await {
            tracing::warn!("Could not persist the upvote ledger: {}", e);
        }
        true
    }

    /// Generate viva questions for an experiment and attach them as
    /// contributions. Returns how many were added.
    pub async fn generate_viva(&mut self, experiment_id: &str) -> usize {
        let (title, objective) = match select::resolve_experiment(&self.tree, experiment_id) {
            Some(experiment) => (experiment.title.clone(), experiment.objective.clone()),
            None => return 0,
        };

        let generated = match &self.viva {
            Some(generator) => generator.generate(&title, &objective).await,
            None => return 0,
        };

        let mut added = 0;
        for contribution in generated {
            let outcome = self
                .dispatch(Action::AddContribution {
                    experiment_id: experiment_id.to_string(),
                    contribution,
                })
                .await;
            if outcome.is_applied() {
                added += 1;
            }
        }
        added
    }

    /// Try to open an admin session. A failed attempt leaves any existing
    /// session in place.
    pub fn authenticate(&mut self, key: &str) -> bool {
        if self.gate.verify(key) {
            self.is_admin = true;
        }
        self.is_admin
    }

    pub fn sign_out(&mut self) {
        self.is_admin = false;
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Search the live tree.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search::search(&self.tree, query)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select a subject (and its owning department); clears the experiment.
    pub fn select_subject(&mut self, subject_id: &str) {
        if let Some((dept, subject)) = select::locate_subject(&self.tree, subject_id) {
            self.selection = Selection {
                department_id: Some(dept.id.clone()),
                subject_id: Some(subject.id.clone()),
                experiment_id: None,
            };
        }
    }

    /// Select an experiment together with its ancestors.
    pub fn select_experiment(&mut self, experiment_id: &str) {
        if let Some((dept, subject, experiment)) =
            select::locate_experiment(&self.tree, experiment_id)
        {
            self.selection = Selection {
                department_id: Some(dept.id.clone()),
                subject_id: Some(subject.id.clone()),
                experiment_id: Some(experiment.id.clone()),
            };
        }
    }

    /// Back to the subject's experiment list.
    pub fn clear_experiment(&mut self) {
        self.selection.experiment_id = None;
    }

    pub fn selected_department(&self) -> Option<&Department> {
        self.selection
            .department_id
            .as_deref()
            .and_then(|id| select::resolve_department(&self.tree, id))
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.selection
            .subject_id
            .as_deref()
            .and_then(|id| select::resolve_subject(&self.tree, id))
    }

    pub fn selected_experiment(&self) -> Option<&Experiment> {
        self.selection
            .experiment_id
            .as_deref()
            .and_then(|id| select::resolve_experiment(&self.tree, id))
    }

    /// Stored theme preference, if any.
    pub async fn theme(&self) -> Option<String> {
        self.cache.theme().await
    }

    pub async fn set_theme(&self, theme: &str) {
        if let Err(e) = self.cache.set_theme(theme).await {
            tracing::warn!("Could not persist the theme preference: {}", e);
        }
    }

    /// Flush any pending remote write and stop the persistence task.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
    }
}
