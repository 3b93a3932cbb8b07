// Question authoring: the editable draft and the submit-and-link flows

pub mod draft;
pub mod submit;

pub use draft::{DraftIssue, QuestionDraft};
pub use submit::{QuestionAuthoring, SubmitOutcome};
