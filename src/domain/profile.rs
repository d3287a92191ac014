use serde::{Deserialize, Serialize};

/// Subscription tier; only Premium may take assessments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tier {
  #[default]
  Free,
  Premium,
}

impl Tier {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Free => "Free",
      Self::Premium => "Premium",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "Free" => Some(Self::Free),
      "Premium" => Some(Self::Premium),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Admin => "admin",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "user" => Some(Self::User),
      "admin" => Some(Self::Admin),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
  pub id: i64,
  pub email: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub user_tier: Tier,
  pub role: Role,
  pub created_at: String,
}

impl Profile {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  /// Admins bypass the tier gate
  pub fn can_take_assessments(&self) -> bool {
    self.is_admin() || self.user_tier == Tier::Premium
  }

  pub fn display_name(&self) -> String {
    let name = format!(
      "{} {}",
      self.first_name.as_deref().unwrap_or(""),
      self.last_name.as_deref().unwrap_or("")
    );
    let name = name.trim();
    if name.is_empty() {
      self.email.clone()
    } else {
      name.to_string()
    }
  }
}
