//! Identifiers for lab sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlates every step of one lab session (and every one-shot report)
/// across stdout payloads and logs.
///
/// Shape: `lab-YYYYMMDD-HHMMSS-xxxxxx`, six lowercase hex digits at the end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

const PREFIX: &str = "lab";
const SUFFIX_LEN: usize = 6;

impl SessionId {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let random = uuid::Uuid::new_v4().simple().to_string();
        SessionId(format!(
            "{}-{}-{}",
            PREFIX,
            now.format("%Y%m%d-%H%M%S"),
            &random[..SUFFIX_LEN]
        ))
    }

    /// Accept a previously issued ID, rejecting anything of the wrong shape.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('-');
        let ok = parts.next() == Some(PREFIX)
            && parts.next().is_some_and(|d| is_digits(d, 8))
            && parts.next().is_some_and(|t| is_digits(t, 6))
            && parts.next().is_some_and(|x| {
                x.len() == SUFFIX_LEN && x.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
            })
            && parts.next().is_none();
        ok.then(|| SessionId(s.to_string()))
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
