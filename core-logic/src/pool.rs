//! # Identity Pool
//!
//! Ordered, append-only set of sessions with a round-robin cursor. A single
//! mutex covers both the list and the cursor; it is never held across network
//! I/O; minting initializes the new session before taking the lock to append.

use crate::config::{IdentityProfile, MintNaming};
use crate::error::{CoreError, MintError};
use crate::traits::{Session, SessionFactory};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

struct PoolInner<S> {
    identities: Vec<Arc<S>>,
    cursor: usize,
    /// 1-based ordinal used to name the next minted identity.
    next_ordinal: usize,
}

pub struct IdentityPool<F: SessionFactory> {
    factory: F,
    naming: MintNaming,
    inner: Mutex<PoolInner<F::Session>>,
}

impl<F: SessionFactory> IdentityPool<F> {
    /// Builds the pool from roster profiles, seeding one identity if there are none.
    pub fn new(
        factory: F,
        profiles: Vec<IdentityProfile>,
        naming: MintNaming,
    ) -> Result<Self, CoreError> {
        let profiles = if profiles.is_empty() {
            warn!("There are no identities. Creating '{}'.", naming.seed_name);
            vec![naming.seed()]
        } else {
            profiles
        };

        let identities = profiles
            .into_iter()
            .map(|profile| factory.create(profile).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let next_ordinal = identities.len() + 1;

        Ok(Self {
            factory,
            naming,
            inner: Mutex::new(PoolInner {
                identities,
                cursor: 0,
                next_ordinal,
            }),
        })
    }

    /// Next identity in round-robin order.
    pub fn next(&self) -> Arc<F::Session> {
        let mut inner = self.lock();
        let idx = inner.cursor;
        inner.cursor = (idx + 1) % inner.identities.len();
        Arc::clone(&inner.identities[idx])
    }

    /// Creates, initializes and appends a brand-new identity.
    pub async fn mint(&self) -> Result<Arc<F::Session>, CoreError> {
        let profile = {
            let mut inner = self.lock();
            let ordinal = inner.next_ordinal;
            inner.next_ordinal += 1;
            self.naming.derive(ordinal)
        };

        let name = profile.name.clone();
        let mint_err = |e: CoreError| MintError::Registration {
            name: name.clone(),
            reason: e.to_string(),
        };

        let session = self.factory.create(profile).map_err(mint_err)?;
        session.ensure_ready().await.map_err(mint_err)?;
        let session = Arc::new(session);

        let total = {
            let mut inner = self.lock();
            inner.identities.push(Arc::clone(&session));
            inner.identities.len()
        };
        info!("Minted identity '{}' (pool size {})", name, total);

        Ok(session)
    }

    /// Identity at `index` in pool order, without moving the cursor.
    pub fn get(&self, index: usize) -> Option<Arc<F::Session>> {
        self.lock().identities.get(index).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.lock().identities.len()
    }

    /// Always false once constructed; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.lock().identities.is_empty()
    }

    /// Profiles of every identity in pool order, for writing back to the roster.
    pub fn profiles(&self) -> Vec<IdentityProfile> {
        self.lock()
            .identities
            .iter()
            .map(|s| s.profile().clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner<F::Session>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
