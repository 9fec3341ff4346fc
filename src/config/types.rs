//! Entity configuration: the declarative description one orchestrator drives.

use crate::config::options::OptionsLoader;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A record as returned by the list endpoint.
pub type Record = serde_json::Map<String, Value>;

/// Current form values keyed by field key.
pub type FormState = HashMap<String, Value>;

/// Turns the raw list response into the shape the orchestrator normalizes.
pub type ListMapper = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Builds the outbound body from the form.
pub type PayloadShaper = Arc<dyn Fn(&FormState) -> Value + Send + Sync>;

/// Record identity: numeric or textual primary key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(n) => Value::from(*n),
            RecordId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: RecordId,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub width: Option<String>,
    /// Render the cell as a hyperlink to its own value.
    pub is_link: bool,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width: None,
            is_link: false,
        }
    }

    pub fn link(mut self) -> Self {
        self.is_link = true;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }
}

#[derive(Clone)]
pub enum FieldKind {
    Text,
    Url,
    Select { options: Arc<dyn OptionsLoader> },
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => f.write_str("Text"),
            FieldKind::Url => f.write_str("Url"),
            FieldKind::Select { .. } => f.write_str("Select"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub kind: FieldKind,
}

impl Field {
    fn with_kind(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            required: false,
            placeholder: None,
            kind,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(key, label, FieldKind::Text)
    }

    pub fn url(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(key, label, FieldKind::Url)
    }

    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: impl OptionsLoader + 'static,
    ) -> Self {
        Self::with_kind(
            key,
            label,
            FieldKind::Select {
                options: Arc::new(options),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn options_loader(&self) -> Option<&Arc<dyn OptionsLoader>> {
        match &self.kind {
            FieldKind::Select { options } => Some(options),
            FieldKind::Text | FieldKind::Url => None,
        }
    }
}

/// Null, missing and the empty string all count as "no value".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[derive(Clone)]
pub struct EntityConfig {
    pub title: String,
    /// Collection path, e.g. `/categories`.
    pub endpoint: String,
    pub id_key: String,
    pub columns: Vec<Column>,
    pub fields: Vec<Field>,
    pub map_list: Option<ListMapper>,
    pub to_create_payload: Option<PayloadShaper>,
    pub to_update_payload: Option<PayloadShaper>,
}

impl EntityConfig {
    pub fn new(title: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            endpoint: endpoint.into(),
            id_key: "id".to_string(),
            columns: Vec::new(),
            fields: Vec::new(),
            map_list: None,
            to_create_payload: None,
            to_update_payload: None,
        }
    }

    pub fn id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = id_key.into();
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn map_list<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.map_list = Some(Arc::new(f));
        self
    }

    pub fn create_payload<F>(mut self, f: F) -> Self
    where
        F: Fn(&FormState) -> Value + Send + Sync + 'static,
    {
        self.to_create_payload = Some(Arc::new(f));
        self
    }

    pub fn update_payload<F>(mut self, f: F) -> Self
    where
        F: Fn(&FormState) -> Value + Send + Sync + 'static,
    {
        self.to_update_payload = Some(Arc::new(f));
        self
    }

    pub fn find_field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// All-null form with one entry per field.
    pub fn blank_form(&self) -> FormState {
        self.fields.iter().map(|f| (f.key.clone(), Value::Null)).collect()
    }

    /// First required field whose form value is blank, in configured order.
    pub fn first_missing_required(&self, form: &FormState) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.required && is_blank(form.get(&f.key)))
    }

    pub fn shape_create(&self, form: &FormState) -> Value {
        shape(self.to_create_payload.as_ref(), form)
    }

    pub fn shape_update(&self, form: &FormState) -> Value {
        shape(self.to_update_payload.as_ref(), form)
    }
}

fn shape(shaper: Option<&PayloadShaper>, form: &FormState) -> Value {
    match shaper {
        Some(f) => f(form),
        None => Value::Object(form.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
    }
}

impl fmt::Debug for EntityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityConfig")
            .field("title", &self.title)
            .field("endpoint", &self.endpoint)
            .field("id_key", &self.id_key)
            .field("columns", &self.columns)
            .field("fields", &self.fields)
            .field("map_list", &self.map_list.is_some())
            .field("to_create_payload", &self.to_create_payload.is_some())
            .field("to_update_payload", &self.to_update_payload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::StaticOptions;
    use serde_json::json;

    fn config() -> EntityConfig {
        EntityConfig::new("Sites", "/sites")
            .field(Field::text("name", "Name").required())
            .field(Field::text("notes", "Notes"))
            .field(Field::select("categoryId", "Category", StaticOptions::default()).required())
    }

    #[test]
    fn blank_form_has_every_field_null() {
        let form = config().blank_form();
        assert_eq!(form.len(), 3);
        assert!(form.values().all(Value::is_null));
    }

    #[test]
    fn first_missing_required_follows_field_order() {
        let cfg = config();
        let mut form = cfg.blank_form();
        assert_eq!(cfg.first_missing_required(&form).unwrap().key, "name");
        form.insert("name".into(), json!("x"));
        assert_eq!(cfg.first_missing_required(&form).unwrap().key, "categoryId");
        form.insert("categoryId".into(), json!(""));
        assert_eq!(cfg.first_missing_required(&form).unwrap().key, "categoryId");
        form.insert("categoryId".into(), json!(0));
        assert!(cfg.first_missing_required(&form).is_none());
    }

    #[test]
    fn unshaped_payload_is_the_form() {
        let cfg = EntityConfig::new("Tags", "/tags").field(Field::text("name", "Name"));
        let mut form = cfg.blank_form();
        form.insert("name".into(), json!("rust"));
        assert_eq!(cfg.shape_create(&form), json!({"name": "rust"}));
        assert_eq!(cfg.shape_update(&form), json!({"name": "rust"}));
    }

    #[test]
    fn record_ids_from_values() {
        assert_eq!(RecordId::from_value(&json!(4)), Some(RecordId::Int(4)));
        assert_eq!(RecordId::from_value(&json!("a-1")), Some(RecordId::Text("a-1".into())));
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::Int(9).to_string(), "9");
    }
}
