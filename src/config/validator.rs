//! Entity config validation: endpoint, identity key, and unique field/column keys.

use crate::config::EntityConfig;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(config: &EntityConfig) -> Result<(), ConfigError> {
    if config.endpoint.trim().is_empty() {
        return Err(ConfigError::MissingEndpoint(config.title.clone()));
    }
    if config.id_key.trim().is_empty() {
        return Err(ConfigError::MissingIdKey(config.title.clone()));
    }

    let mut field_keys = HashSet::new();
    for f in &config.fields {
        if f.key.is_empty() {
            return Err(ConfigError::Validation(format!("field '{}' has an empty key", f.label)));
        }
        if !field_keys.insert(f.key.as_str()) {
            return Err(ConfigError::DuplicateFieldKey(f.key.clone()));
        }
    }

    let mut column_keys = HashSet::new();
    for c in &config.columns {
        if !column_keys.insert(c.key.as_str()) {
            return Err(ConfigError::DuplicateColumnKey(c.key.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Column, Field};

    #[test]
    fn accepts_well_formed_config() {
        let cfg = EntityConfig::new("Categories", "/categories")
            .column(Column::new("name", "Name"))
            .field(Field::text("name", "Name").required());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn rejects_duplicate_field_keys() {
        let cfg = EntityConfig::new("Sites", "/sites")
            .field(Field::text("name", "Name"))
            .field(Field::url("name", "URL"));
        assert_eq!(validate(&cfg), Err(ConfigError::DuplicateFieldKey("name".into())));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let cfg = EntityConfig::new("Sites", "/sites")
            .column(Column::new("url", "URL"))
            .column(Column::new("url", "Link").link());
        assert_eq!(validate(&cfg), Err(ConfigError::DuplicateColumnKey("url".into())));
    }

    #[test]
    fn rejects_missing_endpoint_and_id_key() {
        assert!(matches!(
            validate(&EntityConfig::new("X", " ")),
            Err(ConfigError::MissingEndpoint(_))
        ));
        assert!(matches!(
            validate(&EntityConfig::new("X", "/x").id_key("")),
            Err(ConfigError::MissingIdKey(_))
        ));
    }
}
