//! The bookmark application's two entities.

use crate::config::{Column, EntityConfig, Field, FormState, RemoteOptions};
use crate::gateway::{Gateway, Query};
use serde_json::{json, Value};

/// Option lists ask for one large page.
const OPTIONS_PAGE_SIZE: u32 = 1000;

pub fn categories() -> EntityConfig {
    EntityConfig::new("Categories", "/categories")
        .column(Column::new("name", "Name"))
        .field(Field::text("name", "Name").required().placeholder("e.g. Reading"))
        .create_payload(category_payload)
        .update_payload(category_payload)
}

pub fn sites(gateway: Gateway) -> EntityConfig {
    let categories = RemoteOptions::new(gateway, "/categories")
        .query(Query::new().param("page", 1).param("pageSize", OPTIONS_PAGE_SIZE));
    EntityConfig::new("Favorite sites", "/sites")
        .column(Column::new("name", "Name"))
        .column(Column::new("url", "Address").link())
        .column(Column::new("categoryName", "Category"))
        .field(Field::text("name", "Name").required())
        .field(Field::url("url", "URL").required())
        .field(Field::select("categoryId", "Category", categories).required())
        .create_payload(site_payload)
        .update_payload(site_payload)
}

fn category_payload(form: &FormState) -> Value {
    json!({ "name": trimmed(form.get("name")) })
}

fn site_payload(form: &FormState) -> Value {
    json!({
        "name": trimmed(form.get("name")),
        "url": trimmed(form.get("url")),
        "categoryId": numeric(form.get("categoryId")),
    })
}

fn trimmed(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Select values may arrive as numbers or numeric strings; anything else becomes null.
fn numeric(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Number(n)) => Value::Number(n.clone()),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::from)
                .or_else(|_| s.parse::<f64>().map(Value::from))
                .unwrap_or(Value::Null)
        }
        Some(Value::Bool(b)) => Value::from(u8::from(*b)),
        _ => Value::Null,
    }
}
