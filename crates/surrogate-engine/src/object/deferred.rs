//! Deferred results and lazy sequences.
//!
//! Both are shared handles: cloning a `Deferred` or a `Sequence` yields the
//! same underlying cell or stream, and forwarding never awaits or drains them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::value::Value;

/// Global counter for deferred IDs
static NEXT_DEFERRED_ID: AtomicU64 = AtomicU64::new(1);

struct DeferredInner {
    id: u64,
    /// Completion value (None while pending)
    result: Mutex<Option<Value>>,
    /// Notified once when the result is set
    completion: Condvar,
}

/// A single-assignment result that becomes available later
#[derive(Clone)]
pub struct Deferred {
    inner: Arc<DeferredInner>,
}

impl Deferred {
    /// Create a pending deferred
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DeferredInner {
                id: NEXT_DEFERRED_ID.fetch_add(1, Ordering::Relaxed),
                result: Mutex::new(None),
                completion: Condvar::new(),
            }),
        }
    }

    /// Create a deferred that is already completed
    pub fn completed(value: Value) -> Self {
        let deferred = Self::new();
        deferred.complete(value);
        deferred
    }

    /// Run `f` on a worker thread and complete with its result
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> Value + Send + 'static,
    {
        let deferred = Self::new();
        let completer = deferred.clone();
        std::thread::spawn(move || {
            completer.complete(f());
        });
        deferred
    }

    /// Unique ID of this deferred
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Set the result. Returns false if it was already set.
    pub fn complete(&self, value: Value) -> bool {
        let mut result = self.inner.result.lock();
        if result.is_some() {
            return false;
        }
        *result = Some(value);
        self.inner.completion.notify_all();
        true
    }

    /// Check if the result is available
    pub fn is_completed(&self) -> bool {
        self.inner.result.lock().is_some()
    }

    /// Result if available, without blocking
    pub fn try_result(&self) -> Option<Value> {
        self.inner.result.lock().clone()
    }

    /// Block until the result is available
    pub fn wait(&self) -> Value {
        let mut result = self.inner.result.lock();
        loop {
            if let Some(value) = result.as_ref() {
                return value.clone();
            }
            self.inner.completion.wait(&mut result);
        }
    }

    /// Block until the result is available or the timeout elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Value> {
        let deadline = Instant::now() + timeout;
        let mut result = self.inner.result.lock();
        loop {
            if let Some(value) = result.as_ref() {
                return Some(value.clone());
            }
            if self
                .inner
                .completion
                .wait_until(&mut result, deadline)
                .timed_out()
            {
                return result.clone();
            }
        }
    }

    /// Whether both handles refer to the same deferred
    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_completed() { "completed" } else { "pending" };
        write!(f, "Deferred#{} ({})", self.inner.id, state)
    }
}

type SequenceSource = Box<dyn Iterator<Item = Value> + Send>;

/// A lazily evaluated stream of values, consumed once
#[derive(Clone)]
pub struct Sequence {
    source: Arc<Mutex<SequenceSource>>,
}

impl Sequence {
    /// Wrap an iterator; elements are produced on demand
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            source: Arc::new(Mutex::new(Box::new(iter.into_iter()))),
        }
    }

    /// Build a sequence from a generator closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> Option<Value> + Send + 'static,
    {
        Self::new(std::iter::from_fn(f))
    }

    /// Pull the next element
    pub fn next_value(&self) -> Option<Value> {
        self.source.lock().next()
    }

    /// Pull every remaining element
    pub fn drain(&self) -> Vec<Value> {
        let mut source = self.source.lock();
        source.by_ref().collect()
    }

    /// Whether both handles refer to the same stream
    pub fn ptr_eq(&self, other: &Sequence) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl Iterator for Sequence {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.next_value()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence@{:p}", Arc::as_ptr(&self.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_completed_deferred() {
        let d = Deferred::completed(Value::Int(5));
        assert!(d.is_completed());
        assert_eq!(d.wait(), Value::Int(5));
    }

    #[test]
    fn test_complete_only_once() {
        let d = Deferred::new();
        assert!(d.complete(Value::Int(1)));
        assert!(!d.complete(Value::Int(2)));
        assert_eq!(d.try_result(), Some(Value::Int(1)));
    }

    #[test]
    fn test_spawned_deferred_resolves() {
        let d = Deferred::spawn(|| {
            std::thread::sleep(Duration::from_millis(10));
            Value::Int(6)
        });
        assert_eq!(d.wait(), Value::Int(6));
    }

    #[test]
    fn test_wait_timeout_on_pending() {
        let d = Deferred::new();
        assert_eq!(d.wait_timeout(Duration::from_millis(5)), None);
    }

    #[test]
    fn test_clone_shares_state() {
        let d = Deferred::new();
        let other = d.clone();
        other.complete(Value::Bool(true));
        assert!(d.ptr_eq(&other));
        assert_eq!(d.wait(), Value::Bool(true));
    }

    #[test]
    fn test_sequence_is_lazy() {
        let produced = Arc::new(AtomicUsize::new(0));
        let counter = produced.clone();
        let seq = Sequence::from_fn(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            (n < 3).then(|| Value::Int(n as i64))
        });
        assert_eq!(produced.load(Ordering::SeqCst), 0);
        assert_eq!(seq.next_value(), Some(Value::Int(0)));
        assert_eq!(produced.load(Ordering::SeqCst), 1);
        assert_eq!(seq.drain(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_sequence_clones_share_cursor() {
        let seq = Sequence::new(vec![Value::Int(7), Value::Int(8)]);
        let mut other = seq.clone();
        assert_eq!(other.next(), Some(Value::Int(7)));
        assert_eq!(seq.next_value(), Some(Value::Int(8)));
        assert!(seq.ptr_eq(&other));
    }
}
