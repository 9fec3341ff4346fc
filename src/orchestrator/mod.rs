//! CRUD orchestrator: drives list, pagination, form, option loading and deletion for one
//! [`EntityConfig`].
//!
//! Operations take `&self` and may overlap (e.g. a reload while the user edits).
//! State lives behind a mutex that is never held across a request, so every
//! suspension point is a gateway call. Submission and deletion carry in-flight
//! guards; list loads carry a token so only the latest response is applied.

pub mod confirm;
pub mod normalize;
pub mod state;

pub use confirm::Confirm;
pub use normalize::{normalize_list, ListPage};
pub use state::{Mode, PageState, ViewState};

use crate::config::{validate, EntityConfig, Record, RecordId};
use crate::error::ConfigError;
use crate::gateway::{Gateway, Query};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// User-facing text produced by the orchestrator itself.
#[derive(Clone, Debug)]
pub struct Messages {
    pub saved: String,
    pub updated: String,
    pub deleted: String,
    /// `{label}` is replaced by the field label.
    pub required: String,
    pub processing_error: String,
    pub confirm_delete: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            saved: "Saved".to_string(),
            updated: "Updated".to_string(),
            deleted: "Deleted".to_string(),
            required: "Field \"{label}\" is required.".to_string(),
            processing_error: "Error processing the server data.".to_string(),
            confirm_delete: "Delete this record?".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrchestratorOptions {
    pub page_size: u32,
    pub messages: Messages,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            messages: Messages::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { page: u32, total: u64 },
    /// Transport failure; the list was reset.
    Failed,
    /// Response could not be normalized; the list was reset.
    Malformed,
    /// A newer load was issued before this one settled.
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    OutOfRange,
    Load(LoadOutcome),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated,
    Invalid { field: String },
    Busy,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Deleted; `reloaded` is the page that was loaded afterwards.
    Removed { reloaded: u32 },
    Declined,
    Busy,
    NoIdentity,
    Failed,
}

struct Inner {
    config: Arc<EntityConfig>,
    /// Bumped on every (re)initialization; option results from older generations are dropped.
    generation: u64,
    load_token: u64,
    view: ViewState,
}

pub struct CrudOrchestrator {
    id: Uuid,
    gateway: Gateway,
    confirm: Arc<dyn Confirm>,
    options: OrchestratorOptions,
    inner: Mutex<Inner>,
}

impl CrudOrchestrator {
    pub fn new(
        config: EntityConfig,
        gateway: Gateway,
        confirm: Arc<dyn Confirm>,
        options: OrchestratorOptions,
    ) -> Result<Self, ConfigError> {
        validate(&config)?;
        let view = ViewState::new(&config, options.page_size);
        Ok(Self {
            id: Uuid::new_v4(),
            gateway,
            confirm,
            options,
            inner: Mutex::new(Inner {
                config: Arc::new(config),
                generation: 0,
                load_token: 0,
                view,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> Arc<EntityConfig> {
        self.with(|s| s.config.clone())
    }

    pub fn view(&self) -> ViewState {
        self.with(|s| s.view.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Reset form, mode and page, then load options and page 1 concurrently.
    pub async fn initialize(&self) -> LoadOutcome {
        self.with(|s| {
            s.generation += 1;
            let config = s.config.clone();
            s.view.reset_form(&config);
            s.view.page.page = 1;
            for f in config.fields.iter().filter(|f| f.options_loader().is_some()) {
                s.view.options.insert(f.key.clone(), Vec::new());
            }
        });
        tracing::debug!(instance = %self.id, "initialize");
        let ((), outcome) = futures::join!(self.reload_options(), self.load(1));
        outcome
    }

    /// Swap the entity configuration and fully re-initialize.
    pub async fn reconfigure(&self, config: EntityConfig) -> Result<LoadOutcome, ConfigError> {
        validate(&config)?;
        tracing::debug!(instance = %self.id, title = %config.title, "reconfigure");
        self.with(|s| {
            s.view = ViewState::new(&config, s.view.page.page_size);
            s.config = Arc::new(config);
        });
        Ok(self.initialize().await)
    }

    /// Fetch every select field's options independently; a failing source leaves its list empty.
    pub async fn reload_options(&self) {
        let (config, generation) = self.with(|s| (s.config.clone(), s.generation));
        let loads = config.fields.iter().filter_map(|field| {
            let loader = field.options_loader()?.clone();
            let key = field.key.clone();
            Some(async move {
                match loader.load().await {
                    Ok(opts) => self.with(|s| {
                        if s.generation == generation {
                            s.view.options.insert(key, opts);
                        }
                    }),
                    Err(e) => {
                        tracing::warn!(instance = %self.id, field = %key, error = %e, "options load failed")
                    }
                }
            })
        });
        futures::future::join_all(loads).await;
    }

    /// Clear alerts and load `page`.
    pub async fn load(&self, page: u32) -> LoadOutcome {
        self.load_page(page, true).await
    }

    async fn load_page(&self, page: u32, clear_alerts: bool) -> LoadOutcome {
        if clear_alerts {
            self.gateway.alerts().clear();
        }
        let (config, token, page_size) = self.with(|s| {
            s.load_token += 1;
            (s.config.clone(), s.load_token, s.view.page.page_size)
        });
        tracing::debug!(instance = %self.id, page, page_size, "load");

        let query = Query::new().param("page", page).param("pageSize", page_size);
        let response = self.gateway.get::<Value>(&config.endpoint, &query).await;

        let outcome = self.with(|s| {
            if s.load_token != token {
                return LoadOutcome::Stale;
            }
            let Ok(raw) = response else {
                s.view.reset_list();
                return LoadOutcome::Failed;
            };
            match normalize_list(&config, raw, page, s.view.page.page_size) {
                Ok(list) => {
                    s.view.items = list.items;
                    s.view.page.total = list.total;
                    s.view.page.page = list.page;
                    s.view.page.page_size = list.page_size;
                    LoadOutcome::Loaded {
                        page: list.page,
                        total: list.total,
                    }
                }
                Err(e) => {
                    tracing::error!(instance = %self.id, error = %e, "list normalization failed");
                    s.view.reset_list();
                    LoadOutcome::Malformed
                }
            }
        });
        match outcome {
            LoadOutcome::Malformed => self.gateway.alerts().error(self.options.messages.processing_error.clone()),
            LoadOutcome::Stale => tracing::warn!(instance = %self.id, page, "discarding stale list response"),
            _ => {}
        }
        outcome
    }

    /// Load `page` if it lies within `[1, total_pages]`; otherwise nothing happens.
    pub async fn go_to_page(&self, page: u32) -> PageOutcome {
        if !self.with(|s| s.view.page.contains(page)) {
            tracing::debug!(instance = %self.id, page, "page out of range");
            return PageOutcome::OutOfRange;
        }
        PageOutcome::Load(self.load(page).await)
    }

    pub fn start_create(&self) {
        self.with(|s| {
            let config = s.config.clone();
            s.view.reset_form(&config);
        });
    }

    /// Seed the form from `record` and switch to edit mode. Returns false when the
    /// record carries no identity, leaving state untouched.
    pub fn start_edit(&self, record: &Record) -> bool {
        self.with(|s| {
            let Some(id) = record.get(&s.config.id_key).and_then(RecordId::from_value) else {
                tracing::warn!(instance = %self.id, "record without identity cannot be edited");
                return false;
            };
            s.view.mode = Mode::Edit;
            s.view.editing_id = Some(id);
            for f in &s.config.fields {
                let value = record.get(&f.key).cloned().unwrap_or(Value::Null);
                s.view.form.insert(f.key.clone(), value);
            }
            true
        })
    }

    pub fn cancel_edit(&self) {
        self.start_create();
    }

    pub fn set_field(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.with(|s| {
            if s.config.find_field(key).is_none() {
                return Err(ConfigError::UnknownField(key.to_string()));
            }
            s.view.form.insert(key.to_string(), value);
            Ok(())
        })
    }

    pub async fn submit(&self) -> SubmitOutcome {
        self.gateway.alerts().clear();

        enum Gate {
            Missing { key: String, label: String },
            Busy,
            Go {
                config: Arc<EntityConfig>,
                edit_id: Option<RecordId>,
                payload: Value,
            },
        }

        let gate = self.with(|s| {
            if let Some(f) = s.config.first_missing_required(&s.view.form) {
                return Gate::Missing {
                    key: f.key.clone(),
                    label: f.label.clone(),
                };
            }
            if s.view.saving {
                return Gate::Busy;
            }
            s.view.saving = true;
            let edit_id = match s.view.mode {
                Mode::Edit => s.view.editing_id.clone(),
                Mode::Create => None,
            };
            let payload = match edit_id {
                Some(_) => s.config.shape_update(&s.view.form),
                None => s.config.shape_create(&s.view.form),
            };
            Gate::Go {
                config: s.config.clone(),
                edit_id,
                payload,
            }
        });

        let (config, edit_id, payload) = match gate {
            Gate::Missing { key, label } => {
                let text = self.options.messages.required.replace("{label}", &label);
                self.gateway.alerts().info(text);
                return SubmitOutcome::Invalid { field: key };
            }
            Gate::Busy => {
                tracing::debug!(instance = %self.id, "submit ignored; already saving");
                return SubmitOutcome::Busy;
            }
            Gate::Go {
                config,
                edit_id,
                payload,
            } => (config, edit_id, payload),
        };

        let result = match &edit_id {
            Some(id) => self.gateway.put(&config.endpoint, id, &payload).await,
            None => self.gateway.post(&config.endpoint, &payload).await,
        };
        self.with(|s| s.view.saving = false);

        if result.is_err() {
            return SubmitOutcome::Failed;
        }
        match edit_id {
            Some(_) => {
                self.gateway.alerts().success(self.options.messages.updated.clone());
                self.start_create();
                let page = self.with(|s| s.view.page.page);
                self.load_page(page, false).await;
                SubmitOutcome::Updated
            }
            None => {
                self.gateway.alerts().success(self.options.messages.saved.clone());
                self.with(|s| s.view.form = s.config.blank_form());
                self.load_page(1, false).await;
                SubmitOutcome::Created
            }
        }
    }

    pub async fn remove(&self, record: &Record) -> RemoveOutcome {
        let (config, id) = self.with(|s| {
            let id = record.get(&s.config.id_key).and_then(RecordId::from_value);
            (s.config.clone(), id)
        });
        let Some(id) = id else {
            return RemoveOutcome::NoIdentity;
        };
        if !self.confirm.confirm(&self.options.messages.confirm_delete).await {
            return RemoveOutcome::Declined;
        }

        self.gateway.alerts().clear();
        if !self.with(|s| s.view.deleting.insert(id.clone())) {
            tracing::debug!(instance = %self.id, %id, "delete ignored; already in flight");
            return RemoveOutcome::Busy;
        }

        let result = self.gateway.delete(&config.endpoint, &id).await;
        self.with(|s| s.view.deleting.remove(&id));
        if result.is_err() {
            return RemoveOutcome::Failed;
        }

        self.gateway.alerts().success(self.options.messages.deleted.clone());
        let next_page = self.with(|s| {
            if s.view.editing_id.as_ref() == Some(&id) {
                let config = s.config.clone();
                s.view.reset_form(&config);
            }
            if s.view.items.len() == 1 && s.view.page.page > 1 {
                s.view.page.page - 1
            } else {
                s.view.page.page
            }
        });
        self.load_page(next_page, false).await;
        RemoveOutcome::Removed {
            reloaded: next_page,
        }
    }
}
