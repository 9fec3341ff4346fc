//! Resource CRUD handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::response::created;
use crate::service::{page_params, CategoryService, SiteService};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// Collections exposed under `/api/{segment}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Categories,
    Sites,
}

impl Resource {
    pub fn from_segment(segment: &str) -> Result<Self, AppError> {
        match segment {
            "categories" => Ok(Resource::Categories),
            "sites" => Ok(Resource::Sites),
            other => Err(AppError::NotFound(format!("resource '{}'", other))),
        }
    }
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

fn body_to_map(body: Result<Json<Value>, JsonRejection>) -> Result<HashMap<String, Value>, AppError> {
    let Json(value) = body?;
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let resource = Resource::from_segment(&segment)?;
    let (page, page_size) = page_params(
        params.get("page").map(String::as_str),
        params.get("pageSize").map(String::as_str),
    );
    let store = state.store.as_ref();
    Ok(match resource {
        Resource::Categories => Json(CategoryService::list(store, page, page_size).await?).into_response(),
        Resource::Sites => Json(SiteService::list(store, page, page_size).await?).into_response(),
    })
}

pub async fn read(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let resource = Resource::from_segment(&segment)?;
    let id = parse_id(&id_str)?;
    let store = state.store.as_ref();
    Ok(match resource {
        Resource::Categories => Json(CategoryService::read(store, id).await?).into_response(),
        Resource::Sites => Json(SiteService::read(store, id).await?).into_response(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = Resource::from_segment(&segment)?;
    let body = body_to_map(body)?;
    let store = state.store.as_ref();
    let id = match resource {
        Resource::Categories => CategoryService::create(store, &body).await?,
        Resource::Sites => SiteService::create(store, &body).await?,
    };
    Ok(created(id))
}

pub async fn update(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let resource = Resource::from_segment(&segment)?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let store = state.store.as_ref();
    match resource {
        Resource::Categories => CategoryService::update(store, id, &body).await?,
        Resource::Sites => SiteService::update(store, id, &body).await?,
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let resource = Resource::from_segment(&segment)?;
    let id = parse_id(&id_str)?;
    let store = state.store.as_ref();
    match resource {
        Resource::Categories => CategoryService::delete(store, id).await?,
        Resource::Sites => SiteService::delete(store, id).await?,
    }
    Ok(StatusCode::NO_CONTENT)
}
