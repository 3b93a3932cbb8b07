use serde::{Deserialize, Serialize};

use super::{require, require_id, Entity};
use crate::core::{RecordId, Timestamp};
use crate::error::AppResult;
use crate::listing::{FieldValue, Listable};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Country {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Listable for Country {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "name" => FieldValue::Text(&self.name),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

impl Entity for Country {
    const RESOURCE: &'static str = "countries";
    const LABEL: &'static str = "Country";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn set_created_at(&mut self, at: Timestamp) {
        self.created_at = Some(at);
    }

    fn validate(&self) -> AppResult<()> {
        require(&self.name, "Name is required")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub name: String,
    pub country_id: RecordId,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Listable for School {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "name" => FieldValue::Text(&self.name),
            "city" => FieldValue::Text(&self.city),
            "address" => FieldValue::Text(&self.address),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.city, &self.address]
    }

    fn filter_key(&self, key: &str) -> Option<&str> {
        match key {
            "country" => Some(self.country_id.as_str()),
            _ => None,
        }
    }
}

impl Entity for School {
    const RESOURCE: &'static str = "schools";
    const LABEL: &'static str = "School";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn set_created_at(&mut self, at: Timestamp) {
        self.created_at = Some(at);
    }

    fn validate(&self) -> AppResult<()> {
        require(&self.name, "Name is required")?;
        require_id(&self.country_id, "Country is required")
    }

    fn filter_param(key: &str) -> Option<&'static str> {
        match key {
            "country" => Some("country_id"),
            _ => None,
        }
    }
}

pub(crate) fn created(at: Option<Timestamp>) -> FieldValue<'static> {
    at.map(|ts| FieldValue::Date(ts.millis()))
        .unwrap_or(FieldValue::Missing)
}
