//! Category and site business rules on top of a [`BookmarkStore`].

use crate::error::AppError;
use crate::service::validation::{as_id, text, FieldRule, Format, RequestValidator};
use crate::store::{BookmarkStore, Category, Paged, Site, SiteInput};
use serde_json::Value;
use std::collections::HashMap;

pub const MAX_PAGE_SIZE: u32 = 100;
const NAME_MAX: usize = 100;
const URL_MAX: usize = 2048;

const CATEGORY_RULES: &[(&str, FieldRule)] = &[(
    "name",
    FieldRule {
        required: true,
        format: None,
        max_length: Some(NAME_MAX),
    },
)];

const SITE_RULES: &[(&str, FieldRule)] = &[
    (
        "name",
        FieldRule {
            required: true,
            format: None,
            max_length: Some(NAME_MAX),
        },
    ),
    (
        "url",
        FieldRule {
            required: true,
            format: Some(Format::Url),
            max_length: Some(URL_MAX),
        },
    ),
    (
        "categoryId",
        FieldRule {
            required: true,
            format: Some(Format::Id),
            max_length: None,
        },
    ),
];

/// Clamp raw `page`/`pageSize` query values: page ≥ 1, size in 1..=100, defaults 1 and 10.
pub fn page_params(page: Option<&str>, page_size: Option<&str>) -> (u32, u32) {
    let page = page.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1).max(1);
    let size = page_size
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(10)
        .clamp(1, i64::from(MAX_PAGE_SIZE));
    (u32::try_from(page).unwrap_or(u32::MAX), size as u32)
}

pub struct CategoryService;

impl CategoryService {
    pub async fn list(store: &dyn BookmarkStore, page: u32, page_size: u32) -> Result<Paged<Category>, AppError> {
        Ok(store.list_categories(page, page_size).await?)
    }

    pub async fn read(store: &dyn BookmarkStore, id: i64) -> Result<Category, AppError> {
        store
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {}", id)))
    }

    pub async fn create(store: &dyn BookmarkStore, body: &HashMap<String, Value>) -> Result<i64, AppError> {
        RequestValidator::validate(body, CATEGORY_RULES)?;
        let name = text(body, "name");
        if store.category_name_exists(&name, None).await? {
            return Err(AppError::Validation("a category with that name already exists".into()));
        }
        let id = store.create_category(&name).await?;
        tracing::info!(id, %name, "category created");
        Ok(id)
    }

    pub async fn update(store: &dyn BookmarkStore, id: i64, body: &HashMap<String, Value>) -> Result<(), AppError> {
        RequestValidator::validate(body, CATEGORY_RULES)?;
        let name = text(body, "name");
        if store.category_name_exists(&name, Some(id)).await? {
            return Err(AppError::Validation("another category with that name already exists".into()));
        }
        store.update_category(id, &name).await?;
        tracing::info!(id, %name, "category updated");
        Ok(())
    }

    pub async fn delete(store: &dyn BookmarkStore, id: i64) -> Result<(), AppError> {
        store.delete_category(id).await?;
        tracing::info!(id, "category deleted");
        Ok(())
    }
}

pub struct SiteService;

impl SiteService {
    pub async fn list(store: &dyn BookmarkStore, page: u32, page_size: u32) -> Result<Paged<Site>, AppError> {
        Ok(store.list_sites(page, page_size).await?)
    }

    pub async fn read(store: &dyn BookmarkStore, id: i64) -> Result<Site, AppError> {
        store
            .find_site(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("site {}", id)))
    }

    pub async fn create(store: &dyn BookmarkStore, body: &HashMap<String, Value>) -> Result<i64, AppError> {
        let site = Self::input(store, body, None).await?;
        let id = store.create_site(&site).await?;
        tracing::info!(id, name = %site.name, "site created");
        Ok(id)
    }

    pub async fn update(store: &dyn BookmarkStore, id: i64, body: &HashMap<String, Value>) -> Result<(), AppError> {
        let site = Self::input(store, body, Some(id)).await?;
        store.update_site(id, &site).await?;
        tracing::info!(id, name = %site.name, "site updated");
        Ok(())
    }

    pub async fn delete(store: &dyn BookmarkStore, id: i64) -> Result<(), AppError> {
        store.delete_site(id).await?;
        tracing::info!(id, "site deleted");
        Ok(())
    }

    /// Validated, trimmed input; `current` is the site being updated, if any.
    async fn input(
        store: &dyn BookmarkStore,
        body: &HashMap<String, Value>,
        current: Option<i64>,
    ) -> Result<SiteInput, AppError> {
        RequestValidator::validate(body, SITE_RULES)?;
        let name = text(body, "name");
        let url = text(body, "url");
        let category_id = body
            .get("categoryId")
            .and_then(as_id)
            .ok_or_else(|| AppError::Validation("categoryId is required".into()))?;

        let other = if current.is_some() { "another" } else { "a" };
        if store.site_name_exists(&name, current).await? {
            return Err(AppError::Validation(format!("{} site with that name already exists", other)));
        }
        if store.site_url_exists(&url, current).await? {
            return Err(AppError::Validation(format!("{} site with that URL already exists", other)));
        }
        if store.find_category(category_id).await?.is_none() {
            return Err(AppError::Validation(format!("category {} does not exist", category_id)));
        }
        Ok(SiteInput {
            name,
            url,
            category_id,
        })
    }
}
