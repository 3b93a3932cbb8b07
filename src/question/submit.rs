// Create and update flows for questions: save the record, then bring its
// subtopic links in line with the draft.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::draft::QuestionDraft;
use crate::console::notice::Notice;
use crate::core::RecordId;
use crate::models::{Question, SubtopicRef};
use crate::repository::{EntityRepository, LinkRepository};

pub const CREATED: &str = "Question Created!";
pub const UPDATED: &str = "Question Updated Successfully!";
pub const LINK_FAILED: &str = "Failed to Link questions";
pub const SUBMIT_FAILED: &str = "Failed to submit!";
pub const UPDATE_FAILED: &str = "Failed to update question";

/// Result of one submit: the saved question (if the save went through) and
/// the notice to show.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub question: Option<Question>,
    pub notice: Notice,
}

impl SubmitOutcome {
    fn failed(notice: Notice) -> Self {
        Self {
            question: None,
            notice,
        }
    }

    /// The form may be reset and closed.
    pub fn is_complete(&self) -> bool {
        self.question.is_some() && !self.notice.is_error()
    }
}

pub struct QuestionAuthoring {
    questions: Arc<dyn EntityRepository<Question>>,
    links: Arc<dyn LinkRepository>,
}

impl QuestionAuthoring {
    pub fn new(questions: Arc<dyn EntityRepository<Question>>, links: Arc<dyn LinkRepository>) -> Self {
        Self { questions, links }
    }

    /// Validate, create, then link each subtopic in order. Linking stops at
    /// the first failure.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &QuestionDraft) -> SubmitOutcome {
        if let Err(issue) = draft.validate() {
            return SubmitOutcome::failed(issue.notice());
        }

        let mut question = match self.questions.create(draft.to_question()).await {
            Ok(question) => question,
            Err(e) => {
                warn!("Question create failed: {}", e);
                return SubmitOutcome::failed(Notice::error(SUBMIT_FAILED));
            }
        };

        let mut linked = Vec::new();
        for subtopic in &draft.subtopics {
            if let Err(e) = self.links.link(subtopic, &question.id).await {
                warn!("Linking question {} to subtopic {} failed: {}", question.id, subtopic, e);
                question.sub_topics = refs(draft, &linked);
                return SubmitOutcome {
                    question: Some(question),
                    notice: Notice::error(LINK_FAILED),
                };
            }
            linked.push(subtopic.clone());
        }

        question.sub_topics = draft.subtopic_refs();
        info!("Question {} created with {} subtopic links", question.id, linked.len());
        SubmitOutcome {
            question: Some(question),
            notice: Notice::success(CREATED),
        }
    }

    /// Validate, update, then unlink subtopics dropped from the draft and link
    /// the new ones. Link failures do not stop the sync; they downgrade the
    /// notice to a warning.
    #[instrument(skip(self, draft, existing_links))]
    pub async fn update(&self, draft: &QuestionDraft, existing_links: &[RecordId]) -> SubmitOutcome {
        let mut draft = draft.clone();
        if draft.subtopics.is_empty() {
            draft.subtopics = existing_links.to_vec();
        }
        if let Err(issue) = draft.validate_for_update() {
            return SubmitOutcome::failed(issue.notice());
        }

        let mut question = match self.questions.update(draft.to_question()).await {
            Ok(question) => question,
            Err(e) => {
                warn!("Question update failed: {}", e);
                return SubmitOutcome::failed(Notice::error(UPDATE_FAILED).with_description(e.message()));
            }
        };

        let mut failures = 0;
        for stale in existing_links.iter().filter(|id| !draft.subtopics.contains(id)) {
            if let Err(e) = self.links.unlink(stale, &question.id).await {
                warn!("Failed to unlink subtopic {}: {}", stale, e);
                failures += 1;
            }
        }
        for fresh in draft.subtopics.iter().filter(|id| !existing_links.contains(id)) {
            if let Err(e) = self.links.link(fresh, &question.id).await {
                warn!("Failed to link subtopic {}: {}", fresh, e);
                failures += 1;
            }
        }

        question.sub_topics = draft.subtopic_refs();
        let notice = if failures > 0 {
            Notice::warning("Warning", "Question updated but failed to update some subtopic links")
        } else {
            Notice::success(UPDATED)
        };
        SubmitOutcome {
            question: Some(question),
            notice,
        }
    }
}

fn refs(draft: &QuestionDraft, linked: &[RecordId]) -> Vec<SubtopicRef> {
    draft
        .subtopic_refs()
        .into_iter()
        .filter(|r| linked.contains(&r.id))
        .collect()
}
