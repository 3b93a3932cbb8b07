// Question authoring form state. Option editing rules follow the question
// type; `validate` reports the first problem in the order the form shows them.

use std::fmt;

use crate::console::notice::Notice;
use crate::core::RecordId;
use crate::models::{Question, QuestionOption, QuestionType, SubtopicRef};

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_OPTIONS: &str = "Invalid Options";

/// A blocking form problem: notice title plus the detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftIssue {
    pub title: &'static str,
    pub detail: &'static str,
}

impl DraftIssue {
    fn missing(detail: &'static str) -> Self {
        Self {
            title: MISSING_FIELDS,
            detail,
        }
    }

    pub fn notice(&self) -> Notice {
        Notice::error(self.title).with_description(self.detail)
    }
}

impl fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.detail)
    }
}

impl std::error::Error for DraftIssue {}

fn blank_options(count: usize) -> Vec<QuestionOption> {
    (1..=count)
        .map(|n| QuestionOption::new(&n.to_string(), "", false))
        .collect()
}

fn true_false_options() -> Vec<QuestionOption> {
    vec![
        QuestionOption::new("1", "True", false),
        QuestionOption::new("2", "False", false),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    pub total_potential_marks: f64,
    pub difficulty_level: f64,
    pub tags: Vec<String>,
    pub subtopics: Vec<RecordId>,
}

impl Default for QuestionDraft {
    fn default() -> Self {
        Self {
            id: RecordId::default(),
            title: String::new(),
            description: String::new(),
            content: String::new(),
            question_type: QuestionType::MultipleChoice,
            options: blank_options(4),
            total_potential_marks: 1.0,
            difficulty_level: 0.1,
            tags: Vec::new(),
            subtopics: Vec::new(),
        }
    }
}

impl QuestionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit form seeded from a stored question. True/false questions get
    /// their two options back from `isTrue`.
    pub fn from_question(question: &Question) -> Self {
        let options = match question.question_type {
            QuestionType::TrueFalse => {
                let is_true = question.is_true.unwrap_or(false);
                let mut options = true_false_options();
                if question.is_true.is_some() {
                    options[0].is_correct = is_true;
                    options[1].is_correct = !is_true;
                }
                options
            }
            QuestionType::MultipleChoice if question.multiple_choice_options.is_empty() => blank_options(4),
            QuestionType::MultipleChoice => question.multiple_choice_options.clone(),
        };
        Self {
            id: question.id.clone(),
            title: question.title.clone(),
            description: question.description.clone(),
            content: question.content.clone(),
            question_type: question.question_type,
            options,
            total_potential_marks: question.total_potential_marks,
            difficulty_level: question.difficulty_level,
            tags: question.tags.clone(),
            subtopics: question.subtopic_ids(),
        }
    }

    pub fn set_type(&mut self, question_type: QuestionType) {
        match question_type {
            QuestionType::TrueFalse => self.options = true_false_options(),
            QuestionType::MultipleChoice if self.options.len() < 3 => self.options = blank_options(4),
            QuestionType::MultipleChoice => {}
        }
        self.question_type = question_type;
    }

    pub fn set_option_content(&mut self, option_id: &str, content: &str) {
        if let Some(option) = self.options.iter_mut().find(|o| o.id == option_id) {
            option.content = content.to_string();
        }
    }

    /// Flips one option; the others are left alone.
    pub fn toggle_correct(&mut self, option_id: &str) {
        if let Some(option) = self.options.iter_mut().find(|o| o.id == option_id) {
            option.is_correct = !option.is_correct;
        }
    }

    /// Multiple choice only. Returns whether an option was added.
    pub fn add_option(&mut self) -> bool {
        if self.question_type != QuestionType::MultipleChoice {
            return false;
        }
        let id = (self.options.len() + 1).to_string();
        self.options.push(QuestionOption::new(&id, "", false));
        true
    }

    /// Multiple choice only, and never below two options. Removing the
    /// correct option makes the first remaining one correct.
    pub fn remove_option(&mut self, option_id: &str) -> bool {
        if self.question_type != QuestionType::MultipleChoice || self.options.len() <= 2 {
            return false;
        }
        let Some(position) = self.options.iter().position(|o| o.id == option_id) else {
            return false;
        };
        let removed = self.options.remove(position);
        if removed.is_correct {
            for (index, option) in self.options.iter_mut().enumerate() {
                option.is_correct = index == 0;
            }
        }
        true
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn add_subtopic(&mut self, id: RecordId) -> bool {
        if id.is_empty() || self.subtopics.contains(&id) {
            return false;
        }
        self.subtopics.push(id);
        true
    }

    pub fn remove_subtopic(&mut self, id: &RecordId) {
        self.subtopics.retain(|s| s != id);
    }

    pub fn validate(&self) -> Result<(), DraftIssue> {
        if self.title.trim().is_empty() {
            return Err(DraftIssue::missing("Please enter a title"));
        }
        if self.content.trim().is_empty() {
            return Err(DraftIssue::missing("Please enter question content"));
        }
        if self.subtopics.is_empty() {
            return Err(DraftIssue::missing("Please select and add a subtopic"));
        }
        let correct = self.options.iter().filter(|o| o.is_correct).count();
        if self.question_type == QuestionType::TrueFalse && correct == 2 {
            return Err(DraftIssue {
                title: INVALID_OPTIONS,
                detail: "For question type 'true or false', the answer must be either true or false.",
            });
        }
        if correct == 0 {
            return Err(DraftIssue::missing("Please mark at least one option as correct"));
        }
        if self.options.iter().any(|o| o.content.trim().is_empty()) {
            return Err(DraftIssue::missing("Please fill in all options"));
        }
        Ok(())
    }

    /// Edit mode additionally needs the stored id.
    pub fn validate_for_update(&self) -> Result<(), DraftIssue> {
        if self.id.is_empty() {
            return Err(DraftIssue {
                title: "Missing question id",
                detail: "No question id found",
            });
        }
        self.validate()
    }

    /// Correct state of the option reading "true", for true/false questions.
    pub fn is_true(&self) -> Option<bool> {
        match self.question_type {
            QuestionType::MultipleChoice => None,
            QuestionType::TrueFalse => self
                .options
                .iter()
                .find(|o| o.content.to_lowercase() == "true")
                .map(|o| o.is_correct),
        }
    }

    /// Record sent to the backend. Subtopics are linked separately.
    pub fn to_question(&self) -> Question {
        let multiple_choice_options = match self.question_type {
            QuestionType::MultipleChoice => self.options.clone(),
            QuestionType::TrueFalse => Vec::new(),
        };
        Question {
            id: self.id.clone(),
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            content: self.content.clone(),
            question_type: self.question_type,
            is_true: self.is_true(),
            total_potential_marks: self.total_potential_marks,
            difficulty_level: self.difficulty_level,
            tags: self.tags.clone(),
            sub_topics: Vec::new(),
            multiple_choice_options,
            created_at: None,
        }
    }

    pub fn subtopic_refs(&self) -> Vec<SubtopicRef> {
        self.subtopics
            .iter()
            .map(|id| SubtopicRef {
                id: id.clone(),
                ..SubtopicRef::default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> QuestionDraft {
        let mut draft = QuestionDraft::new();
        draft.title = "Capital".to_string();
        draft.content = "What is the capital of Canada?".to_string();
        draft.add_subtopic(RecordId::new("3"));
        for (id, text) in [("1", "Ottawa"), ("2", "Toronto"), ("3", "Calgary"), ("4", "Quebec")] {
            draft.set_option_content(id, text);
        }
        draft.toggle_correct("1");
        draft
    }

    #[test]
    fn test_defaults() {
        let draft = QuestionDraft::new();
        assert_eq!(draft.question_type, QuestionType::MultipleChoice);
        assert_eq!(draft.options.len(), 4);
        assert_eq!(draft.total_potential_marks, 1.0);
        assert_eq!(draft.difficulty_level, 0.1);
    }

    #[test]
    fn test_validation_order() {
        let mut draft = QuestionDraft::new();
        assert_eq!(draft.validate().unwrap_err().detail, "Please enter a title");
        draft.title = "t".to_string();
        assert_eq!(draft.validate().unwrap_err().detail, "Please enter question content");
        draft.content = "c".to_string();
        assert_eq!(draft.validate().unwrap_err().detail, "Please select and add a subtopic");
        draft.add_subtopic(RecordId::new("3"));
        assert_eq!(
            draft.validate().unwrap_err().detail,
            "Please mark at least one option as correct"
        );
        draft.toggle_correct("2");
        assert_eq!(draft.validate().unwrap_err().detail, "Please fill in all options");
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn test_true_false_both_correct_is_invalid() {
        let mut draft = filled();
        draft.set_type(QuestionType::TrueFalse);
        draft.toggle_correct("1");
        draft.toggle_correct("2");
        let issue = draft.validate().unwrap_err();
        assert_eq!(issue.title, INVALID_OPTIONS);
        assert_eq!(issue.notice().title, "Invalid Options");
    }

    #[test]
    fn test_true_false_payload() {
        let mut draft = filled();
        draft.set_type(QuestionType::TrueFalse);
        draft.toggle_correct("2");
        let question = draft.to_question();
        assert_eq!(question.is_true, Some(false));
        assert!(question.multiple_choice_options.is_empty());

        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["type"], "true_or_false");
        assert!(value.get("multipleChoiceOptions").is_none());
        assert_eq!(value["isTrue"], false);
    }

    #[test]
    fn test_switching_back_to_multiple_choice_resets_two_options() {
        let mut draft = filled();
        draft.set_type(QuestionType::TrueFalse);
        draft.set_type(QuestionType::MultipleChoice);
        assert_eq!(draft.options.len(), 4);
        assert!(draft.options.iter().all(|o| o.content.is_empty() && !o.is_correct));
    }

    #[test]
    fn test_option_add_and_remove() {
        let mut draft = filled();
        assert!(draft.add_option());
        assert_eq!(draft.options.last().map(|o| o.id.as_str()), Some("5"));

        assert!(draft.remove_option("1"));
        assert!(draft.options[0].is_correct);
        assert_eq!(draft.options.iter().filter(|o| o.is_correct).count(), 1);

        draft.set_type(QuestionType::TrueFalse);
        assert!(!draft.add_option());
        assert!(!draft.remove_option("1"));
    }

    #[test]
    fn test_tags_are_trimmed_and_unique() {
        let mut draft = QuestionDraft::new();
        assert!(draft.add_tag(" geo "));
        assert!(!draft.add_tag("geo"));
        assert!(!draft.add_tag("   "));
        draft.remove_tag("geo");
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_round_trip_through_stored_question() {
        let mut draft = filled();
        draft.id = RecordId::new("q1");
        let mut stored = draft.to_question();
        stored.sub_topics = draft.subtopic_refs();
        assert_eq!(QuestionDraft::from_question(&stored), draft);
        assert!(QuestionDraft::new().validate_for_update().is_err());
    }
}
