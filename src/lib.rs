//! Bookmark CRUD: a configuration-driven list/form orchestration engine, its request
//! gateway and alert channel, and the categories/sites REST backend it talks to.

pub mod alert;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod settings;

pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use alert::{Alert, AlertChannel, AlertKind};
pub use config::{presets, Column, EntityConfig, Field, FieldKind, FormState, Record, RecordId, SelectOption};
pub use error::{AppError, ConfigError, FailureKind, GatewayError, NormalizeError, Operation};
pub use gateway::{Gateway, HttpTransport, Query, Transport};
pub use orchestrator::{
    Confirm, CrudOrchestrator, LoadOutcome, Mode, OrchestratorOptions, PageOutcome, RemoveOutcome,
    SubmitOutcome, ViewState,
};
pub use routes::app;
pub use settings::{ClientSettings, ServerSettings};
pub use state::AppState;
pub use store::{BookmarkStore, MemoryStore};
