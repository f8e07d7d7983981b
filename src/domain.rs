// Domain layer modules
pub mod answer_map;
pub mod answer_value;
pub mod form_submission;

// Re-exports
pub use answer_map::AnswerMap;
pub use answer_value::AnswerValue;
pub use form_submission::{FormEventError, FormSubmissionEvent, ItemResponse};
