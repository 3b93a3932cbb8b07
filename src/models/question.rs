use std::fmt;

use serde::{Deserialize, Serialize};

use super::geography::created;
use super::{require, Entity};
use crate::core::{RecordId, Timestamp};
use crate::error::{AppError, AppResult};
use crate::listing::{FieldValue, Listable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestionType {
    #[default]
    #[serde(rename = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "true_or_false")]
    TrueFalse,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_or_false",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::TrueFalse => "True / False",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(id: &str, content: &str, is_correct: bool) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
            is_correct,
        }
    }
}

/// Subtopic as embedded in a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtopicRef {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_true: Option<bool>,
    #[serde(default)]
    pub total_potential_marks: f64,
    #[serde(default)]
    pub difficulty_level: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_topics: Vec<SubtopicRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multiple_choice_options: Vec<QuestionOption>,
    #[serde(default, deserialize_with = "Timestamp::lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Question {
    pub fn subtopic_ids(&self) -> Vec<RecordId> {
        self.sub_topics.iter().map(|s| s.id.clone()).collect()
    }
}

impl Listable for Question {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::Text(self.id.as_str()),
            "title" => FieldValue::Text(&self.title),
            "type" => FieldValue::Text(self.question_type.as_str()),
            "totalPotentialMarks" => FieldValue::Number(self.total_potential_marks),
            "difficultyLevel" => FieldValue::Number(self.difficulty_level),
            "createdAt" => created(self.created_at),
            _ => FieldValue::Missing,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.content.as_str(), self.description.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn filter_key(&self, key: &str) -> Option<&str> {
        match key {
            "type" => Some(self.question_type.as_str()),
            _ => None,
        }
    }

    fn matches_filter(&self, key: &str, values: &[String]) -> bool {
        match key {
            "subtopic" => self
                .sub_topics
                .iter()
                .any(|s| values.iter().any(|v| v == s.id.as_str())),
            _ => self
                .filter_key(key)
                .map(|own| values.iter().any(|v| v == own))
                .unwrap_or(false),
        }
    }
}

impl Entity for Question {
    const RESOURCE: &'static str = "questions";
    const LABEL: &'static str = "Question";
    const SEARCH_PARAM: &'static str = "title";

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
        require(&self.title, "Title is required")?;
        require(&self.content, "Content is required")?;
        if !(0.0..=1.0).contains(&self.difficulty_level) {
            return Err(AppError::Validation(
                "Difficulty level must be between 0 and 1".to_string(),
            ));
        }
        if self.question_type == QuestionType::MultipleChoice {
            if self.multiple_choice_options.len() < 2 {
                return Err(AppError::Validation(
                    "Multiple choice questions need at least two options".to_string(),
                ));
            }
            if !self.multiple_choice_options.iter().any(|o| o.is_correct) {
                return Err(AppError::Validation(
                    "Please mark at least one option as correct".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn filter_param(key: &str) -> Option<&'static str> {
        match key {
            "subtopic" => Some("sub_topic_id"),
            _ => None,
        }
    }
}
