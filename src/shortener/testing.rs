//! Seams for exercising the allocator against scripted collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex};

use super::{AllocationError, Allocator, CodeGenerator, LinkStore, StoreError};
use crate::models::ShortLink;

/// Hands out a fixed sequence of codes, then keeps repeating the last one.
pub struct ScriptedGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(codes: &[&str]) -> Self {
        ScriptedGenerator {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().map(|c| c.to_string()).unwrap_or_default()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn repeating(code: &str) -> Self {
        Self::new(&[code])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for ScriptedGenerator {
    fn generate(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.codes.lock().unwrap().pop_front() {
            Some(code) => {
                *self.last.lock().unwrap() = code.clone();
                code
            }
            None => self.last.lock().unwrap().clone(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CheckMode {
    Honest,
    Failing,
    /// Always answers "free", forcing every collision to surface at insert.
    Blind,
}

/// Wraps a store and counts calls into it.
pub struct CountingStore<S> {
    inner: S,
    mode: CheckMode,
    exists_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl<S: LinkStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_mode(inner, CheckMode::Honest)
    }

    pub fn failing(inner: S) -> Self {
        Self::with_mode(inner, CheckMode::Failing)
    }

    pub fn blind(inner: S) -> Self {
        Self::with_mode(inner, CheckMode::Blind)
    }

    fn with_mode(inner: S, mode: CheckMode) -> Self {
        CountingStore {
            inner,
            mode,
            exists_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
        }
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

impl<S: LinkStore> LinkStore for CountingStore<S> {
    fn exists(&self, short_path: &str) -> Result<bool, StoreError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            CheckMode::Honest => self.inner.exists(short_path),
            CheckMode::Failing => Err(StoreError::Unavailable("connection refused".to_string())),
            CheckMode::Blind => Ok(false),
        }
    }

    fn insert(&self, short_path: &str, original_url: &str) -> Result<ShortLink, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(short_path, original_url)
    }

    fn get(&self, short_path: &str) -> Result<Option<ShortLink>, StoreError> {
        self.inner.get(short_path)
    }

    fn list(&self, limit: u32) -> Result<Vec<ShortLink>, StoreError> {
        self.inner.list(limit)
    }

    fn count(&self) -> Result<i64, StoreError> {
        self.inner.count()
    }
}

/// Holds the first `parties` existence checks at a barrier until all of them
/// have been answered, so every racer passes its pre-check before any insert.
pub struct GatedStore<S> {
    inner: S,
    parties: usize,
    barrier: Barrier,
    checks: AtomicUsize,
}

impl<S: LinkStore> GatedStore<S> {
    pub fn new(inner: S, parties: usize) -> Self {
        GatedStore {
            inner,
            parties,
            barrier: Barrier::new(parties),
            checks: AtomicUsize::new(0),
        }
    }
}

impl<S: LinkStore> LinkStore for GatedStore<S> {
    fn exists(&self, short_path: &str) -> Result<bool, StoreError> {
        let answer = self.inner.exists(short_path);
        if self.checks.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait();
        }
        answer
    }

    fn insert(&self, short_path: &str, original_url: &str) -> Result<ShortLink, StoreError> {
        self.inner.insert(short_path, original_url)
    }

    fn get(&self, short_path: &str) -> Result<Option<ShortLink>, StoreError> {
        self.inner.get(short_path)
    }

    fn list(&self, limit: u32) -> Result<Vec<ShortLink>, StoreError> {
        self.inner.list(limit)
    }

    fn count(&self) -> Result<i64, StoreError> {
        self.inner.count()
    }
}

/// Run two allocations on separate threads and collect both outcomes.
pub fn race(
    a: &Allocator,
    b: &Allocator,
    url_a: &str,
    url_b: &str,
) -> Vec<Result<ShortLink, AllocationError>> {
    std::thread::scope(|s| {
        let left = s.spawn(|| a.allocate(url_a));
        let right = s.spawn(|| b.allocate(url_b));
        vec![left.join().unwrap(), right.join().unwrap()]
    })
}
