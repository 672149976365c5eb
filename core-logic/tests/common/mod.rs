#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::{
    CoreError, IdentityProfile, Outcome, Session, SessionError, SessionFactory,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Outcomes handed out in order to whichever identity asks next.
#[derive(Default)]
pub struct Script {
    queue: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<Option<Outcome>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl Script {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(outcomes.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn always(outcome: Outcome) -> Arc<Self> {
        let script = Self::new([]);
        *script.fallback.lock().unwrap() = Some(outcome);
        script
    }

    fn next(&self) -> Outcome {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.lock().unwrap().clone())
            .unwrap_or(Outcome::Invalid)
    }

    /// `(identity name, word)` for every attempt, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct ScriptedSession {
    profile: IdentityProfile,
    script: Arc<Script>,
    fail_init: bool,
}

#[async_trait]
impl Session for ScriptedSession {
    fn profile(&self) -> &IdentityProfile {
        &self.profile
    }

    async fn ensure_ready(&self) -> Result<(), CoreError> {
        if self.fail_init {
            return Err(SessionError::RegistrationFailed {
                name: self.profile.name.clone(),
                reason: "registration closed".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn attempt(&self, word: &str) -> Result<Outcome, CoreError> {
        self.ensure_ready().await?;
        self.script
            .calls
            .lock()
            .unwrap()
            .push((self.profile.name.clone(), word.to_string()));
        Ok(self.script.next())
    }
}

pub struct ScriptedFactory {
    pub script: Arc<Script>,
    pub created: Arc<AtomicUsize>,
    /// Identities created after this many succeed in construction but fail init.
    pub fail_init_after: Option<usize>,
}

impl ScriptedFactory {
    pub fn new(script: Arc<Script>) -> Self {
        Self {
            script,
            created: Arc::new(AtomicUsize::new(0)),
            fail_init_after: None,
        }
    }

    pub fn failing_mints_after(mut self, n: usize) -> Self {
        self.fail_init_after = Some(n);
        self
    }
}

impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    fn create(&self, profile: IdentityProfile) -> Result<ScriptedSession, CoreError> {
        let index = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSession {
            profile,
            script: Arc::clone(&self.script),
            fail_init: self.fail_init_after.is_some_and(|n| index >= n),
        })
    }
}

/// Remote game stand-in: a word is accepted once per identity, then reported as a duplicate.
pub struct GameSession {
    profile: IdentityProfile,
    valid: Arc<HashSet<String>>,
    found: Mutex<HashSet<String>>,
}

#[async_trait]
impl Session for GameSession {
    fn profile(&self) -> &IdentityProfile {
        &self.profile
    }

    async fn ensure_ready(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn attempt(&self, word: &str) -> Result<Outcome, CoreError> {
        if !self.valid.contains(word) {
            return Ok(Outcome::Invalid);
        }
        let mut found = self.found.lock().unwrap();
        if found.insert(word.to_string()) {
            Ok(Outcome::Accepted {
                score: found.len() as i64 * 10,
                count: found.len() as i64,
                victory: false,
            })
        } else {
            Ok(Outcome::Duplicate)
        }
    }
}

pub struct GameFactory {
    pub valid: Arc<HashSet<String>>,
}

impl GameFactory {
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn new<I: IntoIterator<Item = &'static str>>(valid: I) -> Self {
        Self {
            valid: Arc::new(valid.into_iter().map(str::to_string).collect()),
        }
    }
}

impl SessionFactory for GameFactory {
    type Session = GameSession;

    fn create(&self, profile: IdentityProfile) -> Result<GameSession, CoreError> {
        Ok(GameSession {
            profile,
            valid: Arc::clone(&self.valid),
            found: Mutex::new(HashSet::new()),
        })
    }
}

pub fn profiles(n: usize) -> Vec<IdentityProfile> {
    (1..=n)
        .map(|i| IdentityProfile::new(format!("Bot {}", i), format!("bot{}@example.com", i)))
        .collect()
}

pub fn accepted(score: i64, count: i64) -> Outcome {
    Outcome::Accepted {
        score,
        count,
        victory: false,
    }
}
