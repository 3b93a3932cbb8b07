use serde::{Deserialize, Serialize};

use super::geography::created;
use super::{require, require_id, Entity};
use crate::core::{RecordId, Timestamp};
use crate::error::AppResult;
use crate::listing::{FieldValue, Listable};

/// Shared `Entity` plumbing for records with the usual id / createdAt pair.
macro_rules! entity_identity {
    () => {
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
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Listable for Subject {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "name" => FieldValue::Text(&self.name),
            "description" => FieldValue::Text(&self.description),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }
}

impl Entity for Subject {
    const RESOURCE: &'static str = "subjects";
    const LABEL: &'static str = "Subject";

    entity_identity!();

    fn validate(&self) -> AppResult<()> {
        require(&self.name, "Name is required")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub subject_id: RecordId,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Listable for Course {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "name" => FieldValue::Text(&self.name),
            "description" => FieldValue::Text(&self.description),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }

    fn filter_key(&self, key: &str) -> Option<&str> {
        match key {
            "subject" => Some(self.subject_id.as_str()),
            _ => None,
        }
    }
}

impl Entity for Course {
    const RESOURCE: &'static str = "courses";
    const LABEL: &'static str = "Course";

    entity_identity!();

    fn validate(&self) -> AppResult<()> {
        require(&self.name, "Name is required")?;
        require_id(&self.subject_id, "Subject is required")
    }

    fn filter_param(key: &str) -> Option<&'static str> {
        match key {
            "subject" => Some("subject_id"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub course_id: RecordId,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Listable for Topic {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "name" => FieldValue::Text(&self.name),
            "description" => FieldValue::Text(&self.description),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }

    fn filter_key(&self, key: &str) -> Option<&str> {
        match key {
            "course" => Some(self.course_id.as_str()),
            _ => None,
        }
    }
}

impl Entity for Topic {
    const RESOURCE: &'static str = "topics";
    const LABEL: &'static str = "Topic";

    entity_identity!();

    fn validate(&self) -> AppResult<()> {
        require(&self.name, "Name is required")?;
        require_id(&self.course_id, "Course is required")
    }

    fn filter_param(key: &str) -> Option<&'static str> {
        match key {
            "course" => Some("course_id"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub topic_id: RecordId,
    #[serde(default)]
    pub order: u32,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Listable for Subtopic {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "name" => FieldValue::Text(&self.name),
            "description" => FieldValue::Text(&self.description),
            "order" => FieldValue::Number(f64::from(self.order)),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }

    fn filter_key(&self, key: &str) -> Option<&str> {
        match key {
            "topic" => Some(self.topic_id.as_str()),
            _ => None,
        }
    }
}

impl Entity for Subtopic {
    const RESOURCE: &'static str = "sub-topics";
    const LABEL: &'static str = "Subtopic";

    entity_identity!();

    fn validate(&self) -> AppResult<()> {
        require(&self.name, "Name is required")?;
        require_id(&self.topic_id, "Topic is required")
    }

    fn filter_param(key: &str) -> Option<&'static str> {
        match key {
            "topic" => Some("topic_id"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtopic_wire_format() {
        let raw = r#"{"id":"3","name":"Fractions","description":"","topicId":"7","order":2}"#;
        let subtopic: Subtopic = serde_json::from_str(raw).unwrap();
        assert_eq!(subtopic.topic_id.as_str(), "7");
        assert_eq!(subtopic.field("order"), FieldValue::Number(2.0));
        assert!(subtopic.matches_filter("topic", &["7".to_string()]));
    }

    #[test]
    fn test_required_parents() {
        let course = Course {
            name: "Algebra I".to_string(),
            ..Course::default()
        };
        assert_eq!(course.validate().unwrap_err().message(), "Subject is required");

        let topic = Topic {
            name: "Linear equations".to_string(),
            ..Topic::default()
        };
        assert_eq!(topic.validate().unwrap_err().message(), "Course is required");
    }

    #[test]
    fn test_default_update_request_targets_record() {
        let subject = Subject {
            id: RecordId::new("4"),
            name: "Physics".to_string(),
            ..Subject::default()
        };
        let (path, body) = subject.update_request().unwrap();
        assert_eq!(path, "subjects/4");
        assert_eq!(body["name"], "Physics");
    }
}
