use serde::{Deserialize, Serialize};

/// One answer on the fixed four-point scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Response {
  Yes,
  Partially,
  No,
  DontKnow,
}

impl Response {
  /// Option set in display order
  pub const ALL: [Response; 4] = [Self::Yes, Self::Partially, Self::No, Self::DontKnow];

  /// Points contributed to the attempt total
  pub fn score(&self) -> i64 {
    match self {
      Self::Yes => 2,
      Self::Partially => 1,
      Self::No => 0,
      Self::DontKnow => -1,
    }
  }

  /// Recover the answer from a stored per-question score
  pub fn from_score(score: i64) -> Option<Self> {
    match score {
      2 => Some(Self::Yes),
      1 => Some(Self::Partially),
      0 => Some(Self::No),
      -1 => Some(Self::DontKnow),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Yes => "Yes",
      Self::Partially => "Partially in place",
      Self::No => "No",
      Self::DontKnow => "Don't know",
    }
  }
}

/// Option as presented to someone taking an assessment
#[derive(Debug, Clone, Serialize)]
pub struct ResponseOption {
  pub value: Response,
  pub label: &'static str,
  pub score: i64,
}

pub fn response_options() -> Vec<ResponseOption> {
  Response::ALL
    .iter()
    .map(|r| ResponseOption {
      value: *r,
      label: r.label(),
      score: r.score(),
    })
    .collect()
}
