//! Score ranges and their interpretation.
//!
//! Ranges are admin data. Nothing prevents gaps or overlaps, so lookup is
//! defined by order (ascending `min_score`, then id) and [`audit_ranges`]
//! reports coverage problems without rejecting them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRange {
  pub id: i64,
  pub assessment_id: i64,
  pub min_score: i64,
  pub max_score: i64,
  pub status: String,
  pub interpretation: String,
}

impl ScoreRange {
  pub fn contains(&self, score: i64) -> bool {
    self.min_score <= score && score <= self.max_score
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
  #[error("Status and interpretation are required")]
  MissingText,
  #[error("Minimum score cannot be greater than maximum score")]
  Inverted,
  #[error("Scores must be between {} and {}", -SCORE_BOUND_LIMIT, SCORE_BOUND_LIMIT)]
  OutOfBounds,
}

/// Largest magnitude accepted for a range bound
pub const SCORE_BOUND_LIMIT: i64 = 1_000_000;

/// Admin input for a range
#[derive(Debug, Clone, Deserialize)]
pub struct RangeDraft {
  pub min_score: i64,
  pub max_score: i64,
  pub status: String,
  pub interpretation: String,
}

impl RangeDraft {
  pub fn validate(&self) -> Result<(), RangeError> {
    if self.status.trim().is_empty() || self.interpretation.trim().is_empty() {
      return Err(RangeError::MissingText);
    }
    if self.min_score > self.max_score {
      return Err(RangeError::Inverted);
    }
    let allowed = -SCORE_BOUND_LIMIT..=SCORE_BOUND_LIMIT;
    if !allowed.contains(&self.min_score) || !allowed.contains(&self.max_score) {
      return Err(RangeError::OutOfBounds);
    }
    Ok(())
  }
}

/// Pick the range containing `score`.
pub fn interpret(score: i64, ranges: &[ScoreRange]) -> Option<&ScoreRange> {
  let mut ordered: Vec<&ScoreRange> = ranges.iter().collect();
  ordered.sort_by_key(|r| (r.min_score, r.id));
  ordered.into_iter().find(|r| r.contains(score))
}

/// Coverage problem found in an assessment's ranges
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeIssue {
  Overlap { first: i64, second: i64, from: i64, to: i64 },
  Gap { from: i64, to: i64 },
}

impl RangeIssue {
  pub fn message(&self) -> String {
    match self {
      Self::Overlap { first, second, from, to } => format!(
        "Ranges {} and {} both match scores {} to {}",
        first, second, from, to
      ),
      Self::Gap { from, to } => format!("No range matches scores {} to {}", from, to),
    }
  }
}

/// Report overlaps between ranges and gaps in `[min_attainable, max_attainable]`.
pub fn audit_ranges(ranges: &[ScoreRange], min_attainable: i64, max_attainable: i64) -> Vec<RangeIssue> {
  let mut ordered: Vec<&ScoreRange> = ranges.iter().collect();
  ordered.sort_by_key(|r| (r.min_score, r.id));

  let mut issues = Vec::new();

  for (i, a) in ordered.iter().enumerate() {
    for b in &ordered[i + 1..] {
      if b.min_score > a.max_score {
        break;
      }
      issues.push(RangeIssue::Overlap {
        first: a.id,
        second: b.id,
        from: b.min_score,
        to: a.max_score.min(b.max_score),
      });
    }
  }

  if min_attainable > max_attainable {
    return issues;
  }

  // Sweep the attainable interval; `next` is the lowest score not yet
  // covered, None once everything up to `max_attainable` is
  let mut next = Some(min_attainable);
  for r in &ordered {
    let Some(from) = next else { break };
    if r.max_score < from {
      continue;
    }
    if r.min_score > from {
      let gap_end = r.min_score.saturating_sub(1).min(max_attainable);
      issues.push(RangeIssue::Gap { from, to: gap_end });
    }
    next = if r.max_score >= max_attainable {
      None
    } else {
      Some(r.max_score + 1)
    };
  }
  if let Some(from) = next {
    issues.push(RangeIssue::Gap { from, to: max_attainable });
  }

  issues
}
