use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::ImportError;
use crate::models::{EntityKind, NewEntity, NewOrder, NewProduct, Price, User};
use crate::store::Store;

const DISCOUNT_MAX: u16 = 32767;

// One parsed value, before any field-level interpretation
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
    Null,
}

/// A record as read from the file: ordered field/value pairs plus a label
/// used in error messages (`row 3`, `record '7'`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub label: String,
    pub fields: Vec<(String, RawValue)>,
}

// An entity ready to persist, plus the product names to link afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub entity: NewEntity,
    pub related: Vec<String>,
}

/// Turns a raw record into a draft for `target`.
///
/// The relation column is split off into names, `user` is resolved to an
/// existing user (as is a product's `created_by`), and every other field
/// must belong to the entity.
pub async fn prepare(store: &Store, target: EntityKind, record: RawRecord) -> Result<Draft, ImportError> {
    let relation_key = target.relation_key();
    let mut fields = Fields::new(record.label);
    let mut related = Vec::new();
    let mut user = None;
    let mut created_by = None;

    for (name, value) in record.fields {
        if relation_key == Some(name.as_str()) {
            related = relation_names(value);
            continue;
        }

        let text = match value {
            RawValue::Text(text) => text,
            RawValue::Null => continue,
            RawValue::List(_) => {
                return Err(ImportError::InvalidField {
                    record: fields.record,
                    field: name,
                    reason: "lists are only allowed for related names".to_string(),
                });
            }
        };

        if name == "user" {
            user = resolve_user(store, &text).await?;
            continue;
        }
        if target == EntityKind::Product && name == "created_by" {
            created_by = resolve_user(store, &text).await?;
            continue;
        }

        fields.values.insert(name, text);
    }

    let entity = match target {
        EntityKind::Product => NewEntity::Product(build_product(&mut fields, user, created_by)?),
        EntityKind::Order => NewEntity::Order(build_order(&mut fields, user)?),
    };
    fields.finish()?;

    Ok(Draft { entity, related })
}

// Blank means "not given"; a non-blank name must exist
async fn resolve_user(store: &Store, username: &str) -> Result<Option<User>, ImportError> {
    let username = username.trim();
    if username.is_empty() {
        return Ok(None);
    }
    store
        .user_by_username(username)
        .await
        .map(Some)
        .ok_or_else(|| ImportError::UserNotFound(username.to_string()))
}

// CSV cells hold "A, B"; JSON holds ["A", "B"]
pub fn relation_names(value: RawValue) -> Vec<String> {
    let names: Vec<String> = match value {
        RawValue::Text(text) => text.split(',').map(str::to_string).collect(),
        RawValue::List(items) => items,
        RawValue::Null => Vec::new(),
    };

    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn build_product(
    fields: &mut Fields,
    user: Option<User>,
    created_by: Option<User>,
) -> Result<NewProduct, ImportError> {
    if user.is_some() {
        return Err(fields.unknown("user"));
    }

    let name = fields.required("name")?;
    let description = fields.optional("description").unwrap_or_default();
    let price = fields.parsed("price", Price::default())?;
    let discount = fields.parsed("discount", 0u16)?;
    if discount > DISCOUNT_MAX {
        return Err(fields.invalid("discount", format!("must be at most {DISCOUNT_MAX}")));
    }

    Ok(NewProduct {
        name,
        description,
        price,
        discount,
        archived: fields.flag("archived")?,
        created_by: created_by.map(|u| u.id),
    })
}

fn build_order(fields: &mut Fields, user: Option<User>) -> Result<NewOrder, ImportError> {
    let user = user.ok_or_else(|| ImportError::MissingField {
        record: fields.record.clone(),
        field: "user",
    })?;

    Ok(NewOrder {
        user_id: user.id,
        promocode: fields.optional("promocode").unwrap_or_default(),
        delivery_address: fields.required("delivery_address")?,
    })
}

// Remaining text fields of one record; consumed as the entity is built
struct Fields {
    record: String,
    values: BTreeMap<String, String>,
}

impl Fields {
    fn new(record: String) -> Self {
        Self {
            record,
            values: BTreeMap::new(),
        }
    }

    fn required(&mut self, name: &'static str) -> Result<String, ImportError> {
        match self.values.remove(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ImportError::MissingField {
                record: self.record.clone(),
                field: name,
            }),
        }
    }

    fn optional(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    // Absent or blank falls back to the column default
    fn parsed<T>(&mut self, name: &str, default: T) -> Result<T, ImportError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.values.remove(name) {
            Some(value) if !value.trim().is_empty() => {
                value.trim().parse().map_err(|e: T::Err| self.invalid(name, e))
            }
            _ => Ok(default),
        }
    }

    fn flag(&mut self, name: &str) -> Result<bool, ImportError> {
        let Some(value) = self.values.remove(name) else {
            return Ok(false);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "0" | "no" => Ok(false),
            "true" | "1" | "yes" => Ok(true),
            other => Err(self.invalid(name, format!("'{other}' is not a boolean"))),
        }
    }

    fn invalid(&self, name: &str, reason: impl Display) -> ImportError {
        ImportError::InvalidField {
            record: self.record.clone(),
            field: name.to_string(),
            reason: reason.to_string(),
        }
    }

    fn unknown(&self, name: &str) -> ImportError {
        ImportError::UnknownField {
            record: self.record.clone(),
            field: name.to_string(),
        }
    }

    fn finish(self) -> Result<(), ImportError> {
        match self.values.into_keys().next() {
            Some(field) => Err(ImportError::UnknownField {
                record: self.record,
                field,
            }),
            None => Ok(()),
        }
    }
}
