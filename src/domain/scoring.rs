//! Score aggregation for a single attempt.
//!
//! Responses are keyed by question order. Every question must be answered and
//! every response must belong to a question; the total is the plain sum of
//! encoded responses and is never clamped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::assessment::Question;
use super::response::Response;

pub const MAX_POINTS_PER_QUESTION: i64 = 2;
pub const MIN_POINTS_PER_QUESTION: i64 = -1;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
  #[error("Assessment has no questions")]
  NoQuestions,
  #[error("Please answer all questions before submitting (missing: {})", join_orders(.0))]
  Unanswered(Vec<u32>),
  #[error("Response for unknown question {0}")]
  UnknownQuestion(u32),
}

fn join_orders(orders: &[u32]) -> String {
  orders
    .iter()
    .map(|o| o.to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

/// One answer frozen together with the question it was given for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
  pub order: u32,
  pub question_id: i64,
  pub question_text: String,
  pub score: i64,
}

/// Frozen result of scoring one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
  pub total_score: i64,
  pub max_possible_score: i64,
  pub percentage_score: f64,
  /// Ascending by question order
  pub responses: Vec<ScoredAnswer>,
}

pub fn max_possible_score(question_count: usize) -> i64 {
  question_count as i64 * MAX_POINTS_PER_QUESTION
}

pub fn min_possible_score(question_count: usize) -> i64 {
  question_count as i64 * MIN_POINTS_PER_QUESTION
}

/// total / max * 100, rounded to two decimals. Zero when there is no maximum.
pub fn percentage(total_score: i64, max_possible_score: i64) -> f64 {
  if max_possible_score == 0 {
    return 0.0;
  }
  let raw = total_score as f64 / max_possible_score as f64 * 100.0;
  (raw * 100.0).round() / 100.0
}

pub fn score_responses(
  questions: &[Question],
  responses: &BTreeMap<u32, Response>,
) -> Result<ScoreCard, ScoringError> {
  if questions.is_empty() {
    return Err(ScoringError::NoQuestions);
  }

  if let Some(order) = responses
    .keys()
    .find(|order| !questions.iter().any(|q| q.order == **order))
  {
    return Err(ScoringError::UnknownQuestion(*order));
  }

  let mut missing: Vec<u32> = questions
    .iter()
    .map(|q| q.order)
    .filter(|order| !responses.contains_key(order))
    .collect();
  if !missing.is_empty() {
    missing.sort_unstable();
    return Err(ScoringError::Unanswered(missing));
  }

  let mut answers: Vec<ScoredAnswer> = questions
    .iter()
    .filter_map(|q| {
      responses.get(&q.order).map(|response| ScoredAnswer {
        order: q.order,
        question_id: q.id,
        question_text: q.text.clone(),
        score: response.score(),
      })
    })
    .collect();
  answers.sort_by_key(|a| a.order);
  let total_score: i64 = answers.iter().map(|a| a.score).sum();
  let max_possible_score = max_possible_score(questions.len());

  Ok(ScoreCard {
    total_score,
    max_possible_score,
    percentage_score: percentage(total_score, max_possible_score),
    responses: answers,
  })
}

/// Position of a total on the attainable scale [-n, 2n], as 0..=100.
/// Only for display; stored percentages stay unclamped.
pub fn scale_position(total_score: i64, question_count: usize) -> f64 {
  let min = min_possible_score(question_count);
  let max = max_possible_score(question_count);
  if max <= min {
    return 0.0;
  }
  let raw = (total_score - min) as f64 / (max - min) as f64 * 100.0;
  raw.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BreakdownEntry {
  pub count: u32,
  pub points: i64,
}

/// Count and points per answer kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseBreakdown {
  pub yes: BreakdownEntry,
  pub partially: BreakdownEntry,
  pub no: BreakdownEntry,
  pub dont_know: BreakdownEntry,
}

impl ResponseBreakdown {
  /// Scores that do not decode to an answer are skipped
  pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a i64>) -> Self {
    let mut breakdown = Self::default();
    for score in scores {
      let Some(response) = Response::from_score(*score) else {
        tracing::warn!("Skipping undecodable response score {}", score);
        continue;
      };
      let entry = match response {
        Response::Yes => &mut breakdown.yes,
        Response::Partially => &mut breakdown.partially,
        Response::No => &mut breakdown.no,
        Response::DontKnow => &mut breakdown.dont_know,
      };
      entry.count += 1;
      entry.points += response.score();
    }
    breakdown
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn questions(n: u32) -> Vec<Question> {
    (1..=n)
      .map(|order| Question {
        id: order as i64,
        assessment_id: 1,
        text: format!("Question {}", order),
        order,
      })
      .collect()
  }

  fn all(n: u32, response: Response) -> BTreeMap<u32, Response> {
    (1..=n).map(|order| (order, response)).collect()
  }

  #[test]
  fn test_all_yes_scores_full_marks() {
    let card = score_responses(&questions(10), &all(10, Response::Yes)).unwrap();
    assert_eq!(card.total_score, 20);
    assert_eq!(card.max_possible_score, 20);
    assert_eq!(card.percentage_score, 100.0);
  }

  #[test]
  fn test_all_no_scores_zero() {
    let card = score_responses(&questions(10), &all(10, Response::No)).unwrap();
    assert_eq!(card.total_score, 0);
    assert_eq!(card.percentage_score, 0.0);
  }

  #[test]
  fn test_all_dont_know_goes_negative() {
    let card = score_responses(&questions(10), &all(10, Response::DontKnow)).unwrap();
    assert_eq!(card.total_score, -10);
    assert_eq!(card.max_possible_score, 20);
    assert_eq!(card.percentage_score, -50.0);
  }

  #[test]
  fn test_total_is_sum_of_encoded_responses() {
    let mut responses = all(4, Response::Yes);
    responses.insert(2, Response::Partially);
    responses.insert(3, Response::DontKnow);
    let card = score_responses(&questions(4), &responses).unwrap();
    assert_eq!(card.total_score, 2 + 1 - 1 + 2);
    assert_eq!(card.total_score, card.responses.iter().map(|a| a.score).sum::<i64>());
    assert_eq!(card.responses[2].score, -1);
    assert_eq!(card.responses[2].question_text, "Question 3");
  }

  #[test]
  fn test_max_scales_with_question_count() {
    for n in [1usize, 3, 10, 37] {
      assert_eq!(max_possible_score(n), n as i64 * 2);
    }
  }

  #[test]
  fn test_percentage_rounds_to_two_decimals() {
    // 1/3 of 100
    assert_eq!(percentage(2, 6), 33.33);
    assert_eq!(percentage(4, 6), 66.67);
    assert_eq!(percentage(5, 0), 0.0);
  }

  #[test]
  fn test_unanswered_questions_are_rejected() {
    let mut responses = all(5, Response::Yes);
    responses.remove(&2);
    responses.remove(&5);
    let err = score_responses(&questions(5), &responses).unwrap_err();
    assert_eq!(err, ScoringError::Unanswered(vec![2, 5]));
    assert!(err.to_string().contains("missing: 2, 5"));
  }

  #[test]
  fn test_unknown_question_rejected() {
    let mut responses = all(3, Response::No);
    responses.insert(9, Response::Yes);
    assert_eq!(
      score_responses(&questions(3), &responses),
      Err(ScoringError::UnknownQuestion(9))
    );
  }

  #[test]
  fn test_no_questions_rejected() {
    assert_eq!(
      score_responses(&[], &BTreeMap::new()),
      Err(ScoringError::NoQuestions)
    );
  }

  #[test]
  fn test_same_answers_score_identically() {
    let responses = all(10, Response::Partially);
    let a = score_responses(&questions(10), &responses).unwrap();
    let b = score_responses(&questions(10), &responses).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn test_scale_position_clamps_to_attainable_range() {
    assert_eq!(scale_position(-10, 10), 0.0);
    assert_eq!(scale_position(20, 10), 100.0);
    assert_eq!(scale_position(5, 10), 50.0);
    assert_eq!(scale_position(99, 10), 100.0);
    assert_eq!(scale_position(0, 0), 0.0);
  }

  #[test]
  fn test_breakdown_counts_and_points() {
    let scores = [2, 2, 1, 0, -1, -1, -1];
    let breakdown = ResponseBreakdown::from_scores(scores.iter());
    assert_eq!(breakdown.yes, BreakdownEntry { count: 2, points: 4 });
    assert_eq!(breakdown.partially, BreakdownEntry { count: 1, points: 1 });
    assert_eq!(breakdown.no, BreakdownEntry { count: 1, points: 0 });
    assert_eq!(breakdown.dont_know, BreakdownEntry { count: 3, points: -3 });
  }
}
