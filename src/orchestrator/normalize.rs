//! List-response normalization.
//!
//! Accepts a plain array (the whole set, reset to page 1) or a paged object
//! `{items, total?, page?, pageSize?}`. Absent or non-numeric fields fall back to
//! the current values. Other non-null values carry no `items` and yield an empty
//! page; `null` is an error, never partial state.

use crate::config::{EntityConfig, Record};
use crate::error::NormalizeError;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct ListPage {
    pub items: Vec<Record>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

pub fn normalize_list(
    config: &EntityConfig,
    raw: Value,
    requested_page: u32,
    page_size: u32,
) -> Result<ListPage, NormalizeError> {
    let data = match &config.map_list {
        Some(map) => map(raw).map_err(NormalizeError::Mapper)?,
        None => raw,
    };

    match data {
        Value::Array(rows) => {
            let items = records(rows, &config.id_key)?;
            Ok(ListPage {
                total: items.len() as u64,
                items,
                page: 1,
                page_size,
            })
        }
        Value::Object(mut obj) => {
            let items = match obj.remove("items") {
                Some(Value::Array(rows)) => records(rows, &config.id_key)?,
                _ => Vec::new(),
            };
            let total = obj
                .get("total")
                .and_then(Value::as_u64)
                .unwrap_or(items.len() as u64);
            let page = positive(obj.get("page")).unwrap_or(requested_page);
            let page_size = positive(obj.get("pageSize")).unwrap_or(page_size);
            Ok(ListPage {
                items,
                total,
                page,
                page_size,
            })
        }
        Value::Null => Err(NormalizeError::UnexpectedShape("null")),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(ListPage {
            items: Vec::new(),
            total: 0,
            page: requested_page,
            page_size,
        }),
    }
}

fn positive(v: Option<&Value>) -> Option<u32> {
    v.and_then(Value::as_u64)
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
}

fn records(rows: Vec<Value>, id_key: &str) -> Result<Vec<Record>, NormalizeError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(rec) => match rec.get(id_key) {
                Some(id) if !id.is_null() => Ok(rec),
                _ => Err(NormalizeError::MissingIdentity {
                    index,
                    id_key: id_key.to_string(),
                }),
            },
            _ => Err(NormalizeError::NonObjectRecord { index }),
        })
        .collect()
}
