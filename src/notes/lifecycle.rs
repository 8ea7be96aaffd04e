//! Ensure-note lifecycle with in-flight request de-duplication.
//!
//! Concurrent callers asking "make sure this user has a note" must share
//! one outcome instead of racing to create duplicates. The de-duplication
//! map is owned by the [`NoteLifecycle`] value and keyed by user id; a
//! caller that joins a superseded in-flight result re-checks the exclusion
//! constraint and falls through to a fresh attempt when it doesn't hold.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use super::model::{Note, NoteId};
use super::storage::NoteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureOutcome {
    pub note_id: NoteId,
    pub created: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EnsureOptions {
    /// Never resolve to this note (e.g. the one being deleted).
    pub exclude_note_id: Option<NoteId>,
    /// Resolve to this note when it is still accessible.
    pub preferred_note_id: Option<NoteId>,
}

/// Errors aren't Clone, so joiners receive the failure as its message.
type SharedOutcome = std::result::Result<EnsureOutcome, String>;

struct InFlight {
    result: Mutex<Option<SharedOutcome>>,
    done: Condvar,
}

impl InFlight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> SharedOutcome {
        let mut guard = self.result.lock();
        while guard.is_none() {
            self.done.wait(&mut guard);
        }
        guard.clone().expect("outcome published")
    }

    fn complete(&self, outcome: SharedOutcome) {
        *self.result.lock() = Some(outcome);
        self.done.notify_all();
    }
}

pub struct NoteLifecycle {
    store: Arc<NoteStore>,
    in_flight: Mutex<HashMap<String, Arc<InFlight>>>,
}

impl NoteLifecycle {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Guarantee `user_id` has an accessible note and return its id.
    ///
    /// Joins an in-flight attempt for the same user when one exists; if
    /// the joined result is the excluded note, retries with a fresh
    /// attempt rather than returning it.
    pub fn ensure_user_has_note(
        &self,
        user_id: &str,
        options: &EnsureOptions,
    ) -> Result<EnsureOutcome> {
        let mut refused: Option<Arc<InFlight>> = None;
        loop {
            let (flight, joined) = {
                let mut map = self.in_flight.lock();
                match map.get(user_id) {
                    // Never re-join a flight whose result this caller
                    // already rejected; its entry may still be in the map
                    // because the leader removes it after publishing.
                    Some(existing)
                        if !refused
                            .as_ref()
                            .is_some_and(|prev| Arc::ptr_eq(prev, existing)) =>
                    {
                        (existing.clone(), true)
                    }
                    _ => {
                        let flight = Arc::new(InFlight::new());
                        map.insert(user_id.to_string(), flight.clone());
                        (flight, false)
                    }
                }
            };

            if joined {
                debug!(user_id, "joining in-flight ensure-note request");
                let outcome = flight.wait().map_err(|msg| anyhow!(msg))?;
                let excluded = options
                    .exclude_note_id
                    .as_ref()
                    .is_some_and(|ex| *ex == outcome.note_id);
                if !excluded {
                    return Ok(outcome);
                }
                // Superseded result: retry as leader rather than joining
                // this flight again.
                refused = Some(flight);
                continue;
            }

            let outcome = self.resolve(user_id, options);
            flight.complete(
                outcome
                    .as_ref()
                    .map(Clone::clone)
                    .map_err(|e| e.to_string()),
            );

            let mut map = self.in_flight.lock();
            if map
                .get(user_id)
                .is_some_and(|current| Arc::ptr_eq(current, &flight))
            {
                map.remove(user_id);
            }
            return outcome;
        }
    }

    fn resolve(&self, user_id: &str, options: &EnsureOptions) -> Result<EnsureOutcome> {
        if let Some(preferred) = &options.preferred_note_id {
            let excluded = options.exclude_note_id.as_ref() == Some(preferred);
            if !excluded && self.is_accessible(user_id, preferred)? {
                return Ok(EnsureOutcome {
                    note_id: preferred.clone(),
                    created: false,
                });
            }
        }

        if let Some(latest) = self
            .store
            .latest_note_id(user_id, options.exclude_note_id.as_ref())?
        {
            return Ok(EnsureOutcome {
                note_id: latest,
                created: false,
            });
        }

        let note = Note::new(user_id);
        self.store.save(&note)?;
        info!(user_id, note_id = %note.id, "Created empty note for user");
        Ok(EnsureOutcome {
            note_id: note.id,
            created: true,
        })
    }

    /// Plant a completed flight in the map, as left behind by a leader
    /// that published its result but has not removed its entry yet.
    #[cfg(test)]
    fn seed_completed_flight(&self, user_id: &str, outcome: SharedOutcome) {
        let flight = Arc::new(InFlight::new());
        flight.complete(outcome);
        self.in_flight.lock().insert(user_id.to_string(), flight);
    }

    fn is_accessible(&self, user_id: &str, note_id: &NoteId) -> Result<bool> {
        Ok(self
            .store
            .get(note_id)?
            .map(|note| note.owner == user_id && !note.is_deleted())
            .unwrap_or(false))
    }
}
