//! In-process conversation history shared by every caller.

use crate::models::ConversationTurn;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("conversation store lock poisoned: {0}")]
    Poisoned(String),
}

/// Ordered list of conversation turns, oldest first.
///
/// One mutex guards every operation, so appends and clears are observed in a
/// single total order. The lock is never held across the model call.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Mutex<VecDeque<ConversationTurn>>,
    max_turns: Option<usize>,
}

impl ConversationStore {
    /// Unbounded store: turns accumulate until `clear` or restart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that evicts the oldest turns once `max_turns` is exceeded.
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            max_turns: Some(max_turns),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<ConversationTurn>>, StoreError> {
        self.turns
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    pub fn append(&self, turn: ConversationTurn) -> Result<(), StoreError> {
        let mut turns = self.lock()?;
        turns.push_back(turn);
        if let Some(max) = self.max_turns {
            while turns.len() > max {
                turns.pop_front();
            }
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.lock()?.clear();
        Ok(())
    }

    /// Snapshot of the full history.
    pub fn all(&self) -> Result<Vec<ConversationTurn>, StoreError> {
        Ok(self.lock()?.iter().cloned().collect())
    }

    /// The `n` most recent turns, oldest first.
    pub fn last(&self, n: usize) -> Result<Vec<ConversationTurn>, StoreError> {
        let turns = self.lock()?;
        let skip = turns.len().saturating_sub(n);
        Ok(turns.iter().skip(skip).cloned().collect())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }
}
