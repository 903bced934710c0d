//! Per-browser game sessions.
//!
//! Each browser carries a [`SessionId`] cookie. The [`SessionManager`]
//! maps that id to a stored game record and runs every
//! load → operate → store cycle under a lock owned by that one session,
//! so concurrent requests from the same browser never interleave while
//! different browsers never wait on each other.
//!
//! Neither map grows without bound: [`MemoryStore`] caps and expires its
//! records, and a lock is dropped as soon as no request holds it.

use crate::error::SessionError;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tictactoe_core::{GameState, load_or_default, reset};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier for a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mints a new random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a session id, rejecting anything that is not a UUID.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    /// Finds the session id in the request's `Cookie` headers.
    pub fn from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == cookie_name)
            .and_then(|(_, value)| Self::parse(value))
    }

    /// Builds the `Set-Cookie` value that hands this id to the browser.
    pub fn to_cookie(&self, cookie_name: &str) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, self.0)
    }
}

/// Key-value storage for opaque game records.
///
/// Implementations never look inside the records they hold.
pub trait SessionStore: Send + Sync {
    /// Loads the record for a session, if one was saved.
    fn load(&self, id: &SessionId) -> Result<Option<Value>, SessionError>;

    /// Saves (or replaces) the record for a session.
    fn save(&self, id: &SessionId, record: Value) -> Result<(), SessionError>;

    /// Number of sessions currently stored.
    fn session_count(&self) -> Result<usize, SessionError>;
}

/// Most sessions a [`MemoryStore`] keeps by default.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// How long a [`MemoryStore`] keeps an untouched session by default.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct Entry {
    record: Value,
    touched: Instant,
    tick: u64,
}

#[derive(Debug, Default)]
struct Records {
    entries: HashMap<SessionId, Entry>,
    clock: u64,
}

impl Records {
    fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Process-local [`SessionStore`] with a size cap and idle expiry.
///
/// Sessions untouched for longer than the idle timeout are dropped, and
/// once the cap is reached a new session evicts the least recently used
/// one.
#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<Records>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TIMEOUT)
    }
}

impl MemoryStore {
    /// Creates an empty store with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store holding at most `max_sessions` (at least one)
    /// sessions, each kept for `idle_timeout` after its last use.
    pub fn with_limits(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            records: Mutex::new(Records::default()),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, Records>, SessionError> {
        self.records
            .lock()
            .map_err(|_| SessionError::new("Session store lock poisoned"))
    }

    fn is_idle(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.touched) >= self.idle_timeout
    }

    /// Makes room for one more session.
    fn evict(&self, records: &mut Records, now: Instant) {
        let before = records.entries.len();
        records
            .entries
            .retain(|_, entry| !self.is_idle(entry, now));
        let expired = before - records.entries.len();
        if expired > 0 {
            debug!(expired, "Dropped idle sessions");
        }

        while records.entries.len() >= self.max_sessions {
            let oldest = records
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.tick)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    records.entries.remove(&id);
                    debug!(session = %id, "Evicted least recently used session");
                }
                None => break,
            }
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, id: &SessionId) -> Result<Option<Value>, SessionError> {
        let mut records = self.records()?;
        let now = Instant::now();
        let tick = records.next_tick();

        let idle = match records.entries.get(id) {
            Some(entry) => self.is_idle(entry, now),
            None => return Ok(None),
        };
        if idle {
            records.entries.remove(id);
            debug!(session = %id, "Session expired");
            return Ok(None);
        }

        Ok(records.entries.get_mut(id).map(|entry| {
            entry.touched = now;
            entry.tick = tick;
            entry.record.clone()
        }))
    }

    fn save(&self, id: &SessionId, record: Value) -> Result<(), SessionError> {
        let mut records = self.records()?;
        let now = Instant::now();
        if !records.entries.contains_key(id) {
            self.evict(&mut records, now);
        }
        let tick = records.next_tick();
        records.entries.insert(
            *id,
            Entry {
                record,
                touched: now,
                tick,
            },
        );
        Ok(())
    }

    fn session_count(&self) -> Result<usize, SessionError> {
        Ok(self.records()?.entries.len())
    }
}

/// Runs game operations against session storage, one at a time per session.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    locks: Arc<Mutex<HashMap<SessionId, Arc<Mutex<()>>>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager over the given store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        info!("Creating session manager");
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a manager backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Number of sessions with a request in flight.
    pub fn locked_sessions(&self) -> Result<usize, SessionError> {
        Ok(self.lock_table()?.len())
    }

    fn lock_table(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, Arc<Mutex<()>>>>, SessionError> {
        self.locks
            .lock()
            .map_err(|_| SessionError::new("Session lock table poisoned"))
    }

    /// Runs `f` while holding the session's lock.
    ///
    /// Lock entries only exist while some request holds or waits on them.
    fn exclusive<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce() -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let lock = Arc::clone(self.lock_table()?.entry(*id).or_default());

        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(SessionError::new("Session lock poisoned")),
        };

        // Only the table and `lock` own it: nobody else is waiting.
        let mut locks = self.lock_table()?;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
        result
    }

    /// Loads the session's game (fresh if none), runs `op`, and stores the result.
    ///
    /// The whole cycle holds the session's lock.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the stored record is malformed or the
    /// store fails.
    #[instrument(skip(self, op), fields(session = %id))]
    pub fn with_game<T>(
        &self,
        id: &SessionId,
        op: impl FnOnce(&mut GameState) -> T,
    ) -> Result<T, SessionError> {
        self.exclusive(id, || {
            let stored = self.store.load(id)?;
            if stored.is_none() {
                debug!("No game in session yet");
            }
            let mut game = load_or_default(stored).inspect_err(|e| {
                warn!(error = %e, "Stored game could not be loaded");
            })?;

            let result = op(&mut game);

            self.store.save(id, game.to_value()?)?;
            debug!(outcome = %game.outcome(), turn = %game.turn(), "Session game stored");
            Ok(result)
        })
    }

    /// Returns the session's current game, storing a fresh one if absent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] on a malformed record or store failure.
    pub fn current(&self, id: &SessionId) -> Result<GameState, SessionError> {
        self.with_game(id, |game| game.clone())
    }

    /// Replaces the session's game with a fresh one.
    ///
    /// Whatever was stored before is discarded unread, so a corrupt record
    /// can always be cleared this way.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store fails.
    #[instrument(skip(self), fields(session = %id))]
    pub fn reset(&self, id: &SessionId) -> Result<GameState, SessionError> {
        self.exclusive(id, || {
            let game = reset();
            self.store.save(id, game.to_value()?)?;
            info!("Session game reset");
            Ok(game)
        })
    }
}
