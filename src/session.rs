//! Session identifiers.

/// Length of generated session IDs
pub const SESSION_ID_LEN: usize = 32;

/// Generate a new session ID (lowercase alphanumeric)
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..SESSION_ID_LEN)
    .map(|_| {
      let idx = rng.random_range(0..36u8);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
