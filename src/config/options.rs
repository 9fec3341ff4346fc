//! Option sources for select fields.

use crate::config::{RecordId, SelectOption};
use crate::error::GatewayError;
use crate::gateway::{Gateway, Query};
use async_trait::async_trait;
use serde_json::Value;

/// Asynchronous, on-demand producer of `{value, label}` pairs.
#[async_trait]
pub trait OptionsLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<SelectOption>, GatewayError>;
}

/// Fixed option list.
#[derive(Clone, Debug, Default)]
pub struct StaticOptions(pub Vec<SelectOption>);

#[async_trait]
impl OptionsLoader for StaticOptions {
    async fn load(&self) -> Result<Vec<SelectOption>, GatewayError> {
        Ok(self.0.clone())
    }
}

/// Options read from another entity's list endpoint.
///
/// Accepts either a plain array or a paged `{items}` response; rows without a
/// usable value are skipped.
#[derive(Clone)]
pub struct RemoteOptions {
    gateway: Gateway,
    path: String,
    query: Query,
    value_key: String,
    label_key: String,
}

impl RemoteOptions {
    pub fn new(gateway: Gateway, path: impl Into<String>) -> Self {
        Self {
            gateway,
            path: path.into(),
            query: Query::new(),
            value_key: "id".to_string(),
            label_key: "name".to_string(),
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn keys(mut self, value_key: impl Into<String>, label_key: impl Into<String>) -> Self {
        self.value_key = value_key.into();
        self.label_key = label_key.into();
        self
    }
}

#[async_trait]
impl OptionsLoader for RemoteOptions {
    async fn load(&self) -> Result<Vec<SelectOption>, GatewayError> {
        let raw: Value = self.gateway.get(&self.path, &self.query).await?;
        let rows = match &raw {
            Value::Array(rows) => rows.as_slice(),
            Value::Object(obj) => obj
                .get("items")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            _ => &[],
        };
        Ok(rows
            .iter()
            .filter_map(|row| {
                let value = RecordId::from_value(row.get(&self.value_key)?)?;
                let label = match row.get(&self.label_key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => value.to_string(),
                    Some(other) => other.to_string(),
                };
                Some(SelectOption { value, label })
            })
            .collect())
    }
}
