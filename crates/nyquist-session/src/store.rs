//! In-memory session store.
//!
//! `analyze` publishes a [`Session`] here and hands the caller only its
//! [`SessionId`]; `resample` looks the session up again. Sessions are
//! immutable once published and shared behind `Arc`, so readers never copy
//! the waveform.
//!
//! Retention is controlled by an [`EvictionPolicy`] chosen at construction.
//! The default keeps every session for the lifetime of the store.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nyquist_analysis::BandwidthAnalysis;
use nyquist_config::SessionsConfig;
use nyquist_io::Waveform;
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::ServiceError;

/// Opaque, unguessable session identifier (random UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random id.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One analysed upload.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    waveform: Waveform,
    analysis: BandwidthAnalysis,
    created_at: Instant,
}

impl Session {
    /// Identifier handed to the caller.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Decoded mono waveform at its native rate.
    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    /// Bandwidth measured when the session was created.
    pub fn analysis(&self) -> &BandwidthAnalysis {
        &self.analysis
    }

    /// Store clock reading at insertion.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// When sessions are forgotten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep every session.
    #[default]
    None,
    /// Sessions older than this behave as missing and are swept on insert.
    Ttl(Duration),
    /// Keep at most this many sessions, dropping the oldest on insert.
    Capacity(usize),
}

impl From<&SessionsConfig> for EvictionPolicy {
    fn from(config: &SessionsConfig) -> Self {
        match (config.ttl(), config.capacity) {
            (Some(ttl), _) => EvictionPolicy::Ttl(ttl),
            (None, Some(cap)) => EvictionPolicy::Capacity(cap),
            (None, None) => EvictionPolicy::None,
        }
    }
}

/// Time source for session ages.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Default)]
struct Entries {
    sessions: HashMap<SessionId, Arc<Session>>,
    // Insertion order; creation times are non-decreasing front to back.
    order: VecDeque<SessionId>,
}

impl Entries {
    fn evict_front(&mut self) -> Option<SessionId> {
        let id = self.order.pop_front()?;
        self.sessions.remove(&id);
        Some(id)
    }
}

/// Concurrent map from [`SessionId`] to [`Session`].
pub struct SessionStore {
    entries: RwLock<Entries>,
    policy: EvictionPolicy,
    clock: Arc<dyn Clock>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(EvictionPolicy::None)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("policy", &self.policy)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Store using the system clock.
    pub fn new(policy: EvictionPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Store reading session ages from `clock`.
    pub fn with_clock(policy: EvictionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            policy,
            clock,
        }
    }

    /// Active eviction policy.
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Publish a new session and return its id.
    pub fn put(&self, waveform: Waveform, analysis: BandwidthAnalysis) -> SessionId {
        let now = self.clock.now();
        let session = Arc::new(Session {
            id: SessionId::new_v4(),
            waveform,
            analysis,
            created_at: now,
        });
        let id = session.id;

        let mut entries = self.entries.write();
        match self.policy {
            EvictionPolicy::None => {}
            EvictionPolicy::Ttl(ttl) => {
                while let Some(front) = entries.order.front() {
                    let expired = entries
                        .sessions
                        .get(front)
                        .is_none_or(|s| is_expired(s, now, ttl));
                    if !expired {
                        break;
                    }
                    if let Some(evicted) = entries.evict_front() {
                        tracing::warn!(session_id = %evicted, "session expired");
                    }
                }
            }
            EvictionPolicy::Capacity(cap) => {
                while entries.sessions.len() >= cap.max(1) {
                    match entries.evict_front() {
                        Some(evicted) => {
                            tracing::warn!(session_id = %evicted, capacity = cap, "session evicted");
                        }
                        None => break,
                    }
                }
            }
        }

        entries.sessions.insert(id, session);
        entries.order.push_back(id);
        id
    }

    /// Look up a live session.
    pub fn get(&self, id: &SessionId) -> Result<Arc<Session>, ServiceError> {
        let entries = self.entries.read();
        let session = entries
            .sessions
            .get(id)
            .ok_or_else(|| ServiceError::SessionNotFound(id.to_string()))?;

        if let EvictionPolicy::Ttl(ttl) = self.policy
            && is_expired(session, self.clock.now(), ttl)
        {
            return Err(ServiceError::SessionNotFound(id.to_string()));
        }

        Ok(Arc::clone(session))
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().sessions.len()
    }

    /// True when no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_expired(session: &Session, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(session.created_at) >= ttl
}
