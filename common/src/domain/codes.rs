use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::CodePrefix;

/// Symbols of the random code suffix: base-36, upper-cased.
pub const CODE_SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const CODE_SUFFIX_LEN: usize = 6;

/// Opaque, time-derived identifier of an issued access code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeId(String);

impl CodeId {
    /// Millisecond timestamp of `now`, bumped past every numeric id in `existing`
    /// so two codes issued within the same millisecond still differ.
    pub fn next<'a>(now: DateTime<Utc>, existing: impl IntoIterator<Item = &'a CodeId>) -> Self {
        let latest = existing
            .into_iter()
            .filter_map(|id| id.0.parse::<i64>().ok())
            .max();
        let millis = now.timestamp_millis();
        let value = match latest {
            Some(latest) if latest >= millis => latest.saturating_add(1),
            _ => millis,
        };
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single-use access code.
///
/// `used_at` is set exactly when `used` is true; after issue a code only changes
/// through [`AccessCode::mark_used`] and [`AccessCode::release`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCode {
    pub id: CodeId,
    pub code: String,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl AccessCode {
    /// Issue a new unused code `PREFIX-XXXXXX`. Existing codes are only consulted
    /// for the id; collisions of the code value are not checked.
    pub fn issue<R: Rng + ?Sized>(
        prefix: &CodePrefix,
        existing: &[AccessCode],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let code = format!("{}-{}", prefix, random_suffix(rng));
        Self {
            id: CodeId::next(now, existing.iter().map(|c| &c.id)),
            code,
            used: false,
            created_at: now,
            used_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.used
    }

    /// Flip `used` to true and stamp the time. A used code keeps its first stamp.
    pub fn mark_used(&mut self, at: DateTime<Utc>) {
        if !self.used {
            self.used = true;
            self.used_at = Some(at);
        }
    }

    /// Undo the redemption stamped at `at`. Codes used at any other time stay used.
    pub fn release(&mut self, at: DateTime<Utc>) {
        if self.used_at == Some(at) {
            self.used = false;
            self.used_at = None;
        }
    }
}

pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_SUFFIX_ALPHABET[rng.random_range(0..CODE_SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Counters shown on the admin surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CodeStats {
    pub total: usize,
    pub active: usize,
    pub used: usize,
}

impl From<&[AccessCode]> for CodeStats {
    fn from(codes: &[AccessCode]) -> Self {
        let used = codes.iter().filter(|c| c.used).count();
        Self {
            total: codes.len(),
            active: codes.len() - used,
            used,
        }
    }
}
