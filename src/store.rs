//! Bookmark persistence. The trait is the seam to the stored-procedure database; `MemoryStore`
//! backs the server binary, the demo and the tests.

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub category_id: i64,
    pub category_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteInput {
    pub name: String,
    pub url: String,
    pub category_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn list_categories(&self, page: u32, page_size: u32) -> Result<Paged<Category>, StoreError>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, StoreError>;
    /// Case-insensitive; `exclude` skips the record being updated.
    async fn category_name_exists(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError>;
    async fn create_category(&self, name: &str) -> Result<i64, StoreError>;
    async fn update_category(&self, id: i64, name: &str) -> Result<(), StoreError>;
    /// Fails with `InUse` while any site references the category.
    async fn delete_category(&self, id: i64) -> Result<(), StoreError>;

    async fn list_sites(&self, page: u32, page_size: u32) -> Result<Paged<Site>, StoreError>;
    async fn find_site(&self, id: i64) -> Result<Option<Site>, StoreError>;
    async fn site_name_exists(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError>;
    async fn site_url_exists(&self, url: &str, exclude: Option<i64>) -> Result<bool, StoreError>;
    async fn create_site(&self, site: &SiteInput) -> Result<i64, StoreError>;
    async fn update_site(&self, id: i64, site: &SiteInput) -> Result<(), StoreError>;
    async fn delete_site(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Tables {
    categories: BTreeMap<i64, String>,
    sites: BTreeMap<i64, SiteInput>,
    next_category: i64,
    next_site: i64,
}

impl Tables {
    fn site(&self, id: i64, s: &SiteInput) -> Site {
        Site {
            id,
            name: s.name.clone(),
            url: s.url.clone(),
            category_id: s.category_id,
            category_name: self.categories.get(&s.category_id).cloned(),
        }
    }
}

/// Ordered by id, like the `ORDER BY id LIMIT/OFFSET` listing it stands in for.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(rows: impl Iterator<Item = T>, total: usize, page: u32, page_size: u32) -> Paged<T> {
    let offset = (page.max(1) as usize - 1) * page_size as usize;
    Paged {
        items: rows.skip(offset).take(page_size as usize).collect(),
        total: total as u64,
        page,
        page_size,
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn list_categories(&self, page: u32, page_size: u32) -> Result<Paged<Category>, StoreError> {
        let t = self.tables.read().await;
        let rows = t.categories.iter().map(|(id, name)| Category {
            id: *id,
            name: name.clone(),
        });
        Ok(paginate(rows, t.categories.len(), page, page_size))
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.categories.get(&id).map(|name| Category {
            id,
            name: name.clone(),
        }))
    }

    async fn category_name_exists(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError> {
        let t = self.tables.read().await;
        Ok(t.categories
            .iter()
            .any(|(id, n)| Some(*id) != exclude && same_text(n, name)))
    }

    async fn create_category(&self, name: &str) -> Result<i64, StoreError> {
        let mut t = self.tables.write().await;
        t.next_category += 1;
        let id = t.next_category;
        t.categories.insert(id, name.to_string());
        Ok(id)
    }

    async fn update_category(&self, id: i64, name: &str) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        let slot = t
            .categories
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "category", id })?;
        *slot = name.to_string();
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        if !t.categories.contains_key(&id) {
            return Err(StoreError::NotFound { entity: "category", id });
        }
        let count = t.sites.values().filter(|s| s.category_id == id).count();
        if count > 0 {
            return Err(StoreError::InUse {
                entity: "category",
                id,
                count,
            });
        }
        t.categories.remove(&id);
        Ok(())
    }

    async fn list_sites(&self, page: u32, page_size: u32) -> Result<Paged<Site>, StoreError> {
        let t = self.tables.read().await;
        let rows = t.sites.iter().map(|(id, s)| t.site(*id, s));
        Ok(paginate(rows, t.sites.len(), page, page_size))
    }

    async fn find_site(&self, id: i64) -> Result<Option<Site>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.sites.get(&id).map(|s| t.site(id, s)))
    }

    async fn site_name_exists(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError> {
        let t = self.tables.read().await;
        Ok(t.sites
            .iter()
            .any(|(id, s)| Some(*id) != exclude && same_text(&s.name, name)))
    }

    async fn site_url_exists(&self, url: &str, exclude: Option<i64>) -> Result<bool, StoreError> {
        let t = self.tables.read().await;
        Ok(t.sites
            .iter()
            .any(|(id, s)| Some(*id) != exclude && same_text(&s.url, url)))
    }

    async fn create_site(&self, site: &SiteInput) -> Result<i64, StoreError> {
        let mut t = self.tables.write().await;
        t.next_site += 1;
        let id = t.next_site;
        t.sites.insert(id, site.clone());
        Ok(id)
    }

    async fn update_site(&self, id: i64, site: &SiteInput) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        let slot = t
            .sites
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "site", id })?;
        *slot = site.clone();
        Ok(())
    }

    async fn delete_site(&self, id: i64) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        t.sites
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: "site", id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, url: &str, category_id: i64) -> SiteInput {
        SiteInput {
            name: name.into(),
            url: url.into(),
            category_id,
        }
    }

    #[tokio::test]
    async fn categories_paginate_in_id_order() {
        let store = MemoryStore::new();
        for i in 0..23 {
            store.create_category(&format!("c{}", i)).await.unwrap();
        }
        let p = store.list_categories(3, 10).await.unwrap();
        assert_eq!(p.total, 23);
        assert_eq!(p.items.len(), 3);
        assert_eq!(p.items[0].id, 21);
        assert!(store.list_categories(4, 10).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn sites_carry_category_name() {
        let store = MemoryStore::new();
        let c = store.create_category("Docs").await.unwrap();
        let s = store.create_site(&site("Rust", "https://rust-lang.org", c)).await.unwrap();
        let found = store.find_site(s).await.unwrap().unwrap();
        assert_eq!(found.category_name.as_deref(), Some("Docs"));
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let store = MemoryStore::new();
        let c = store.create_category("Docs").await.unwrap();
        let s = store.create_site(&site("Rust", "https://rust-lang.org", c)).await.unwrap();
        assert_eq!(
            store.delete_category(c).await,
            Err(StoreError::InUse {
                entity: "category",
                id: c,
                count: 1
            })
        );
        store.delete_site(s).await.unwrap();
        store.delete_category(c).await.unwrap();
        assert_eq!(store.find_category(c).await.unwrap(), None);
    }

    #[tokio::test]
    async fn uniqueness_is_case_insensitive_and_excludes_self() {
        let store = MemoryStore::new();
        let c = store.create_category("Docs").await.unwrap();
        assert!(store.category_name_exists("docs", None).await.unwrap());
        assert!(!store.category_name_exists("DOCS", Some(c)).await.unwrap());
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_category(9, "x").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(store.delete_site(9).await, Err(StoreError::NotFound { .. })));
    }
}
