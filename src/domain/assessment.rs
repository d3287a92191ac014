use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::score_range::RangeDraft;

/// Assessment as stored, without its questions
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub total_questions: i64,
  pub is_active: bool,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
  pub id: i64,
  pub assessment_id: i64,
  pub text: String,
  pub order: u32,
}

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
  #[error("Title is required")]
  MissingTitle,
  #[error("Question text is required")]
  MissingText,
  #[error("Question order must be at least 1")]
  InvalidOrder,
}

/// Admin input for creating or editing an assessment
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentDraft {
  pub title: String,
  #[serde(default)]
  pub description: String,
}

impl AssessmentDraft {
  pub fn validate(&self) -> Result<(), DraftError> {
    if self.title.trim().is_empty() {
      return Err(DraftError::MissingTitle);
    }
    Ok(())
  }
}

/// Admin input for a question; a missing order appends after the last one
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
  pub text: String,
  #[serde(default)]
  pub order: Option<u32>,
}

impl QuestionDraft {
  pub fn validate(&self) -> Result<(), DraftError> {
    if self.text.trim().is_empty() {
      return Err(DraftError::MissingText);
    }
    if self.order == Some(0) {
      return Err(DraftError::InvalidOrder);
    }
    Ok(())
  }
}

/// Seed content for the first start: the ICP readiness questionnaire
pub struct SeedAssessment {
  pub draft: AssessmentDraft,
  pub questions: Vec<&'static str>,
  pub ranges: Vec<RangeDraft>,
}

pub fn default_icp_assessment() -> SeedAssessment {
  let questions = vec![
    "Do you have a documented Ideal Customer Profile (ICP): industry, company size, geography, etc.?",
    "Have you identified decision-makers vs influencers in the purchase process?",
    "Are you clear about the problems customers are trying to solve by using your products or services?",
    "Do you have different personas or messages for different types of buyers (technical, financial, operational, management)?",
    "Have you eliminated segments that waste your time, e.g. price-sensitive or non-serious leads?",
    "Do you track which types of customers generate repeat orders, referrals, and long-term profit, not just one-time revenue?",
    "Have you clearly listed what typically triggers a customer to actively start exploring solutions (e.g. breakdowns, expansion, quality issues, audit non-compliance)?",
    "Are your marketing, sales, and service teams aligned in practice on who your ideal customer is and who is not worth pursuing?",
    "Do you regularly revisit and update your Ideal Customer Profile based on feedback from internal teams or changes in business context?",
    "When your Ideal Customer Profile is updated, is it formally documented and clearly communicated to all internal stakeholders, including leadership?",
  ];

  let range = |min_score: i64, max_score: i64, status: &str, interpretation: &str| RangeDraft {
    min_score,
    max_score,
    status: status.to_string(),
    interpretation: interpretation.to_string(),
  };

  SeedAssessment {
    draft: AssessmentDraft {
      title: "ICP Readiness Assessment".to_string(),
      description: "How clearly your organisation defines and uses its Ideal Customer Profile."
        .to_string(),
    },
    questions,
    ranges: vec![
      range(
        17,
        20,
        "Ready to Grow",
        "You have a clear, shared Ideal Customer Profile (ICP) that guides decisions.",
      ),
      range(
        12,
        16,
        "Needs Fine-Tuning",
        "The Ideal Customer Profile exists but needs better clarity, alignment, or usage across functions.",
      ),
      range(
        5,
        11,
        "Needs Structuring",
        "Some elements of the Ideal Customer Profile are known, but structure and consistent application are lacking.",
      ),
      range(
        -10,
        4,
        "Needs Clarity",
        "Target customer definition is unclear or missing; it is the first step to fix.",
      ),
    ],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_assessment_draft_requires_title() {
    let draft = AssessmentDraft {
      title: "   ".into(),
      description: String::new(),
    };
    assert_eq!(draft.validate(), Err(DraftError::MissingTitle));
  }

  #[test]
  fn test_question_draft_rejects_zero_order() {
    let draft = QuestionDraft {
      text: "Q".into(),
      order: Some(0),
    };
    assert_eq!(draft.validate(), Err(DraftError::InvalidOrder));

    let draft = QuestionDraft {
      text: "".into(),
      order: None,
    };
    assert_eq!(draft.validate(), Err(DraftError::MissingText));
  }

  #[test]
  fn test_default_seed_is_consistent() {
    let seed = default_icp_assessment();
    assert_eq!(seed.questions.len(), 10);
    assert_eq!(seed.ranges.len(), 4);
    assert!(seed.ranges.iter().all(|r| r.validate().is_ok()));
    // Seed ranges cover exactly the attainable interval for ten questions
    let min = seed.ranges.iter().map(|r| r.min_score).min().unwrap();
    let max = seed.ranges.iter().map(|r| r.max_score).max().unwrap();
    assert_eq!((min, max), (-10, 20));
  }
}
