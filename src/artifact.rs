//! One-shot download artifacts.
//!
//! A session keeps one [`ArtifactStore`]. Each operation that produces a
//! file stores it under its [`ArtifactKind`] and hands the caller an
//! [`ArtifactToken`]. The token redeems the file exactly once before it
//! expires. Storing a new artifact of the same kind supersedes the old one.
//!
//! The store is a plain owned value; nothing is shared between sessions.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::EngineConfig;

/// Kind of downloadable file. A store holds at most one per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Plan generated from an XML schedule.
    GeneratedPlan,
    /// Result of a plan merge.
    MergedPlan,
    /// Plan rewritten onto a new date.
    RewrittenPlan,
}

impl ArtifactKind {
    /// Download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::GeneratedPlan => "output.txt",
            ArtifactKind::MergedPlan => "merged_plan.txt",
            ArtifactKind::RewrittenPlan => "updated_plan.txt",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Handle returned by [`ArtifactStore::store`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactToken {
    /// Random 128-bit id, lowercase hex.
    pub id: String,
    /// Slot the artifact lives in.
    pub kind: ArtifactKind,
    /// Instant after which the artifact can no longer be taken.
    pub expires_at: DateTime<Utc>,
}

/// A redeemed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Download file name.
    pub file_name: String,
    /// File content.
    pub content: String,
}

/// Why an artifact could not be taken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// Nothing was stored for this kind.
    #[error("no {0} available for download")]
    Missing(ArtifactKind),
    /// A newer artifact replaced the one the token refers to.
    #[error("{0} was replaced by a newer file")]
    Superseded(ArtifactKind),
    /// The artifact was already downloaded.
    #[error("{0} has already been downloaded")]
    AlreadyConsumed(ArtifactKind),
    /// The artifact outlived its TTL.
    #[error("{0} has expired")]
    Expired(ArtifactKind),
}

#[derive(Debug, Clone)]
struct Slot {
    token_id: String,
    content: String,
    expires_at: DateTime<Utc>,
    consumed: bool,
}

/// Session-scoped artifact slots.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    ttl: Duration,
    slots: HashMap<ArtifactKind, Slot>,
}

impl ArtifactStore {
    /// Creates an empty store whose artifacts live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: HashMap::new(),
        }
    }

    /// Creates an empty store with the configured TTL.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(Duration::seconds(config.artifact_ttl_secs))
    }

    /// Stores `content`, discarding any pending artifact of the same kind.
    pub fn store(&mut self, kind: ArtifactKind, content: impl Into<String>, now: DateTime<Utc>) -> ArtifactToken {
        let id = format!("{:032x}", rand::random::<u128>());
        let expires_at = now + self.ttl;
        let content = content.into();
        info!(kind = %kind, bytes = content.len(), %expires_at, "stored artifact");

        self.slots.insert(
            kind,
            Slot {
                token_id: id.clone(),
                content,
                expires_at,
                consumed: false,
            },
        );
        ArtifactToken {
            id,
            kind,
            expires_at,
        }
    }

    /// Redeems the artifact referred to by `token`.
    ///
    /// # Errors
    /// See [`ArtifactError`]. An expired artifact is dropped from the store.
    pub fn take(&mut self, token: &ArtifactToken, now: DateTime<Utc>) -> Result<Artifact, ArtifactError> {
        let kind = token.kind;
        let slot = self
            .slots
            .get_mut(&kind)
            .ok_or(ArtifactError::Missing(kind))?;

        if slot.token_id != token.id {
            return Err(ArtifactError::Superseded(kind));
        }
        if slot.consumed {
            return Err(ArtifactError::AlreadyConsumed(kind));
        }
        if now >= slot.expires_at {
            self.slots.remove(&kind);
            return Err(ArtifactError::Expired(kind));
        }

        slot.consumed = true;
        debug!(kind = %kind, "artifact taken");
        Ok(Artifact {
            kind,
            file_name: kind.file_name().to_string(),
            content: mem::take(&mut slot.content),
        })
    }

    /// Whether an untaken, unexpired artifact of `kind` exists.
    pub fn is_pending(&self, kind: ArtifactKind, now: DateTime<Utc>) -> bool {
        self.slots
            .get(&kind)
            .is_some_and(|slot| !slot.consumed && now < slot.expires_at)
    }

    /// Drops expired and consumed slots. Returns how many were dropped.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| !slot.consumed && now < slot.expires_at);
        before - self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn store() -> ArtifactStore {
        ArtifactStore::from_config(&EngineConfig::default())
    }

    #[test]
    fn test_take_once() {
        let mut store = store();
        let token = store.store(ArtifactKind::MergedPlan, "plan", t0());
        assert_eq!(token.id.len(), 32);
        assert!(store.is_pending(ArtifactKind::MergedPlan, t0()));

        let artifact = store.take(&token, t0()).unwrap();
        assert_eq!(artifact.content, "plan");
        assert_eq!(artifact.file_name, "merged_plan.txt");
        assert!(!store.is_pending(ArtifactKind::MergedPlan, t0()));

        assert_eq!(
            store.take(&token, t0()),
            Err(ArtifactError::AlreadyConsumed(ArtifactKind::MergedPlan))
        );
    }

    #[test]
    fn test_overwrite_supersedes() {
        let mut store = store();
        let old = store.store(ArtifactKind::GeneratedPlan, "v1", t0());
        let new = store.store(ArtifactKind::GeneratedPlan, "v2", t0());
        assert_ne!(old.id, new.id);
        assert_eq!(
            store.take(&old, t0()),
            Err(ArtifactError::Superseded(ArtifactKind::GeneratedPlan))
        );
        assert_eq!(store.take(&new, t0()).unwrap().content, "v2");
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut store = store();
        let merged = store.store(ArtifactKind::MergedPlan, "m", t0());
        let rewritten = store.store(ArtifactKind::RewrittenPlan, "r", t0());
        assert_eq!(store.take(&rewritten, t0()).unwrap().file_name, "updated_plan.txt");
        assert_eq!(store.take(&merged, t0()).unwrap().content, "m");
    }

    #[test]
    fn test_missing() {
        let mut store = store();
        let token = ArtifactToken {
            id: "0".repeat(32),
            kind: ArtifactKind::GeneratedPlan,
            expires_at: t0(),
        };
        assert_eq!(
            store.take(&token, t0()),
            Err(ArtifactError::Missing(ArtifactKind::GeneratedPlan))
        );
    }

    #[test]
    fn test_expiry() {
        let mut store = store();
        let token = store.store(ArtifactKind::GeneratedPlan, "x", t0());
        assert_eq!(token.expires_at, t0() + Duration::seconds(600));

        let late = t0() + Duration::seconds(600);
        assert!(!store.is_pending(ArtifactKind::GeneratedPlan, late));
        assert_eq!(
            store.take(&token, late),
            Err(ArtifactError::Expired(ArtifactKind::GeneratedPlan))
        );
        assert_eq!(
            store.take(&token, late),
            Err(ArtifactError::Missing(ArtifactKind::GeneratedPlan))
        );
    }

    #[test]
    fn test_purge() {
        let mut store = ArtifactStore::new(Duration::seconds(10));
        store.store(ArtifactKind::GeneratedPlan, "a", t0());
        store.store(ArtifactKind::MergedPlan, "b", t0() + Duration::seconds(8));
        assert_eq!(store.purge_expired(t0() + Duration::seconds(12)), 1);
        assert!(store.is_pending(ArtifactKind::MergedPlan, t0() + Duration::seconds(12)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ArtifactError::AlreadyConsumed(ArtifactKind::GeneratedPlan).to_string(),
            "output.txt has already been downloaded"
        );
    }
}
