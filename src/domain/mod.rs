pub mod assessment;
pub mod payment;
pub mod profile;
pub mod response;
pub mod score_range;
pub mod scoring;

pub use assessment::{
  default_icp_assessment, Assessment, AssessmentDraft, DraftError, Question, QuestionDraft,
};
pub use payment::{GatewayInfo, PaymentGateway};
pub use profile::{Profile, Role, Tier};
pub use response::{response_options, Response, ResponseOption};
pub use score_range::{audit_ranges, interpret, RangeDraft, RangeError, RangeIssue, ScoreRange};
pub use scoring::{score_responses, ResponseBreakdown, ScoreCard, ScoredAnswer, ScoringError};
