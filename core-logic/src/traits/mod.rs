use crate::config::IdentityProfile;
use crate::error::CoreError;
use async_trait::async_trait;

/// Result of submitting one word through one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted { score: i64, count: i64, victory: bool },
    /// The identity already found this word earlier.
    Duplicate,
    /// Wrong guess.
    Invalid,
    /// Forbidden or timed out. Another identity may still succeed.
    RateLimited,
    TransportError(String),
}

impl Outcome {
    /// Accepted and Duplicate both mean the word needs no further attempts.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Accepted { .. } | Outcome::Duplicate)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Outcome::RateLimited)
    }
}

/// One authenticated player session against the remote game.
#[async_trait]
pub trait Session: Send + Sync {
    fn profile(&self) -> &IdentityProfile;

    /// Establish cookies, the anti-forgery token and the account. Runs its
    /// network exchange at most once; later and concurrent callers share the result.
    async fn ensure_ready(&self) -> Result<(), CoreError>;

    /// Submit `word`. Implementations call [`Session::ensure_ready`] first and
    /// serialize attempts on the same identity.
    async fn attempt(&self, word: &str) -> Result<Outcome, CoreError>;
}

/// Builds sessions for the identity pool.
pub trait SessionFactory: Send + Sync {
    type Session: Session + 'static;

    fn create(&self, profile: IdentityProfile) -> Result<Self::Session, CoreError>;
}

/// Indexable, finite source of candidate words shared by all workers.
pub trait CandidateSource: Send + Sync {
    fn len(&self) -> usize;

    fn word(&self, index: usize) -> Option<String>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
