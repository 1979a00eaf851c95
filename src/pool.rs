//! Reuse pool for session instance state

use parking_lot::{Mutex, RwLock};

use crate::codec::SessionValues;
use crate::context::Context;

/// Mutable state of a session instance, recycled between requests
#[derive(Default)]
pub(crate) struct InstanceState {
    pub(crate) ctx: Context,
    pub(crate) sid: String,
    pub(crate) ttl_secs: i64,
    pub(crate) values: RwLock<SessionValues>,
}

impl InstanceState {
    /// Overwrite every field. `None` values leave an empty map.
    pub(crate) fn reset(
        &mut self,
        ctx: &Context,
        sid: &str,
        ttl_secs: i64,
        values: Option<SessionValues>,
    ) {
        self.ctx = ctx.clone();
        self.sid.clear();
        self.sid.push_str(sid);
        self.ttl_secs = ttl_secs;
        *self.values.get_mut() = values.unwrap_or_default();
    }
}

/// Bounded free-list of instance states
///
/// States come back dirty; [`acquire`](InstancePool::acquire) always resets
/// before handing one out.
pub(crate) struct InstancePool {
    idle: Mutex<Vec<InstanceState>>,
    max_idle: usize,
}

impl InstancePool {
    pub(crate) fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Take an idle state (or a new one) reset for the given session
    pub(crate) fn acquire(
        &self,
        ctx: &Context,
        sid: &str,
        ttl_secs: i64,
        values: Option<SessionValues>,
    ) -> InstanceState {
        let mut state = self.idle.lock().pop().unwrap_or_default();
        state.reset(ctx, sid, ttl_secs, values);
        state
    }

    /// Return a state; dropped when the pool is full. Idle states hold no
    /// request data.
    pub(crate) fn release(&self, mut state: InstanceState) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            state.ctx = Context::default();
            state.values.get_mut().clear();
            idle.push(state);
        }
    }

    pub(crate) fn idle_len(&self) -> usize {
        self.idle.lock().len()
    }
}
