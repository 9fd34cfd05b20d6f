//! In-process session store.
//!
//! Each session id owns its own [`Memory`], anti-repetition window
//! included, so concurrent browser tabs never see each other's state.  The
//! store is bounded; when full, the least recently used session is dropped.

use std::collections::HashMap;

use eliza_memory::Memory;
use tracing::{debug, info};
use uuid::Uuid;

/// Default upper bound on live sessions.
pub const MAX_SESSIONS: usize = 1024;

struct Session {
    memory: Memory,
    /// Value of the store's clock at the last checkout.
    last_used: u64,
}

/// Bounded map of session id → conversation memory.
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    capacity: usize,
    clock: u64,
}

/// Result of [`SessionStore::checkout`].
pub struct Checkout<'a> {
    pub id: String,
    pub memory: &'a mut Memory,
    /// `true` when the session did not exist before this call.
    pub created: bool,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    /// Return the memory for `id`, creating a fresh session under a new
    /// UUID when `id` is absent or unknown.
    pub fn checkout(&mut self, id: Option<&str>) -> Checkout<'_> {
        self.clock += 1;
        let now = self.clock;

        let known = id.filter(|id| self.sessions.contains_key(*id)).map(str::to_string);
        let (id, created) = match known {
            Some(id) => (id, false),
            None => {
                if self.sessions.len() >= self.capacity {
                    self.evict_oldest();
                }
                let id = Uuid::new_v4().to_string();
                self.sessions.insert(
                    id.clone(),
                    Session {
                        memory: Memory::new(),
                        last_used: now,
                    },
                );
                debug!(session = %id, live = self.sessions.len(), "session created");
                (id, true)
            }
        };

        let session = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| Session {
                memory: Memory::new(),
                last_used: now,
            });
        session.last_used = now;
        Checkout {
            id,
            memory: &mut session.memory,
            created,
        }
    }

    /// Forget a session.
    pub fn close(&mut self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            debug!(session = %id, "session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, s)| s.last_used)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            info!(session = %id, "session store full; evicted least recently used session");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}
