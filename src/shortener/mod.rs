//! Short path allocation: pick a free candidate, persist it, look it up again.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{ShortLink, validate_original_url};

mod store;
mod words;

#[cfg(test)]
pub(crate) mod testing;

pub use store::{LinkStore, MemoryStore, StoreError};
pub use words::{CodeGenerator, DEFAULT_WORD_COUNT, WordGenerator};

/// Candidates tried per allocation round.
pub const MAX_TRIES: u32 = 5;

/// Extra rounds granted when the insert loses a race on its candidate.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 1;

/// Caller-facing failure of an allocation or lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("original URL is required")]
    InvalidInput,

    #[error("could not find a free short path after {tries} tries")]
    ExhaustedRetries { tries: u32 },

    /// Pre-check said the path was free but the store refused the insert.
    #[error("short path {short_path} was taken by a concurrent request")]
    Conflict { short_path: String },

    #[error("short path not found: {short_path}")]
    NotFound { short_path: String },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AllocationError {
    /// Stable machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            AllocationError::InvalidInput => "invalid_input",
            AllocationError::ExhaustedRetries { .. } => "exhausted_retries",
            AllocationError::Conflict { .. } => "conflict",
            AllocationError::NotFound { .. } => "not_found",
            AllocationError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<StoreError> for AllocationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(short_path) => AllocationError::Conflict { short_path },
            StoreError::Unavailable(msg) => AllocationError::StoreUnavailable(msg),
        }
    }
}

/// Why [`find_free_code`] gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError<E> {
    /// Every candidate was already taken.
    Exhausted { tries: u32 },
    /// The existence check itself failed.
    Check(E),
}

/// Draw up to `max_tries` candidates from `generate` and return the first one
/// `is_taken` reports as free.
///
/// Candidates are drawn independently; a collision does not influence the next
/// draw. Exactly one `is_taken` call is made per candidate.
pub fn find_free_code<G, C, E>(
    mut generate: G,
    mut is_taken: C,
    max_tries: u32,
) -> Result<String, SearchError<E>>
where
    G: FnMut() -> String,
    C: FnMut(&str) -> Result<bool, E>,
{
    for attempt in 1..=max_tries {
        let candidate = generate();
        if !is_taken(&candidate).map_err(SearchError::Check)? {
            debug!(attempt, candidate = %candidate, "found free short path");
            return Ok(candidate);
        }
        debug!(attempt, candidate = %candidate, "short path collision");
    }
    Err(SearchError::Exhausted { tries: max_tries })
}

/// Maps URLs to unique short paths on top of a [`LinkStore`].
///
/// Holds no state of its own besides its collaborators; concurrent allocators
/// sharing one store rely on the store's uniqueness constraint alone.
#[derive(Clone)]
pub struct Allocator {
    store: Arc<dyn LinkStore>,
    generator: Arc<dyn CodeGenerator>,
    conflict_retries: u32,
}

impl Allocator {
    pub fn new(store: Arc<dyn LinkStore>, generator: Arc<dyn CodeGenerator>) -> Self {
        Allocator {
            store,
            generator,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }

    /// How many fresh rounds to run after an insert-time conflict before
    /// surfacing [`AllocationError::Conflict`]. Zero surfaces the first one.
    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    pub fn conflict_retries(&self) -> u32 {
        self.conflict_retries
    }

    /// Allocate a short path for `original_url` and persist the mapping.
    pub fn allocate(&self, original_url: &str) -> Result<ShortLink, AllocationError> {
        validate_original_url(original_url)?;

        let mut conflicts = 0;
        loop {
            let short_path = find_free_code(
                || self.generator.generate(),
                |candidate| self.store.exists(candidate),
                MAX_TRIES,
            )
            .map_err(|e| match e {
                SearchError::Exhausted { tries } => {
                    warn!(tries, "no free short path within retry bound");
                    AllocationError::ExhaustedRetries { tries }
                }
                SearchError::Check(err) => AllocationError::from(err),
            })?;

            match self.store.insert(&short_path, original_url) {
                Ok(link) => {
                    info!(id = link.id, short_path = %link.short_path, url = %original_url, "shortened url");
                    return Ok(link);
                }
                Err(StoreError::Duplicate(taken)) if conflicts < self.conflict_retries => {
                    conflicts += 1;
                    warn!(short_path = %taken, conflicts, "lost insert race, retrying with fresh candidates");
                }
                Err(StoreError::Duplicate(taken)) => {
                    warn!(short_path = %taken, "lost insert race");
                    return Err(AllocationError::Conflict { short_path: taken });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Original URL stored under `short_path`. Exact, case-sensitive match.
    pub fn resolve(&self, short_path: &str) -> Result<String, AllocationError> {
        self.find(short_path).map(|link| link.original_url)
    }

    pub fn find(&self, short_path: &str) -> Result<ShortLink, AllocationError> {
        self.store
            .get(short_path)?
            .ok_or_else(|| AllocationError::NotFound {
                short_path: short_path.to_string(),
            })
    }

    pub fn recent(&self, limit: u32) -> Result<Vec<ShortLink>, AllocationError> {
        Ok(self.store.list(limit)?)
    }
}
