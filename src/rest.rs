// Rest-completion handling. The host may fire more than one equivalent
// "long rest completed" signal for a single rest, so refills are debounced
// per actor inside a short time window. Best-effort guard, not a strict
// idempotency protocol.
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::host::DocumentRef;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestKind {
    Short,
    Long,
}

/// A rest-completion signal, already normalized by the host adapter: both
/// hook names the platform emits map to this one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestEvent {
    pub kind: RestKind,
}

impl RestEvent {
    pub fn is_long(&self) -> bool {
        self.kind == RestKind::Long
    }
}

/// Injectable time source so the debounce window is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-actor last-refill timestamps. Owned by the engine instead of a
/// process-wide static so separate engines never interfere.
pub struct RefillGuard {
    clock: Box<dyn Clock>,
    window: Duration,
    last: Mutex<HashMap<DocumentRef, Instant>>,
}

impl RefillGuard {
    pub fn new(clock: impl Clock + 'static, window: Duration) -> Self {
        RefillGuard {
            clock: Box::new(clock),
            window,
            last: Mutex::new(HashMap::new()),
        }
    }

    /// True when a refill for this actor already ran inside the window.
    /// Records the current instant otherwise. Different actors never
    /// suppress each other.
    pub async fn should_suppress(&self, actor: &DocumentRef) -> bool {
        let now = self.clock.now();
        let mut last = self.last.lock().await;
        if let Some(&previous) = last.get(actor) {
            if now.duration_since(previous) < self.window {
                return true;
            }
        }
        last.insert(actor.clone(), now);
        false
    }
}
