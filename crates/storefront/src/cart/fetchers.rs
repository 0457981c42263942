//! Registry of in-flight cart mutation requests.
//!
//! Each submitted mutation is a fetcher: an action kind, the lines or
//! variants it touches, and whether it is still waiting on the request
//! (`Submitting`) or on its response being applied (`Loading`). Finished
//! fetchers are removed, so a line's state is derived entirely from what
//! is still outstanding.

use std::collections::BTreeMap;

use noh_core::{CartLineId, VariantId};
use serde::Serialize;

/// Kind of cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CartAction {
    LinesAdd,
    LinesUpdate,
    LinesRemove,
}

impl CartAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinesAdd => "LinesAdd",
            Self::LinesUpdate => "LinesUpdate",
            Self::LinesRemove => "LinesRemove",
        }
    }
}

/// Lifecycle state of a fetcher, ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FetcherState {
    Idle,
    Loading,
    Submitting,
}

/// Handle for one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetcherId(u64);

/// What a mutation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetcherInputs {
    /// Existing lines (update, remove).
    Lines(Vec<CartLineId>),
    /// Variants being added.
    Merchandise(Vec<VariantId>),
}

impl FetcherInputs {
    fn touches(&self, line: &CartLineId) -> bool {
        match self {
            Self::Lines(lines) => lines.contains(line),
            Self::Merchandise(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Fetcher {
    action: CartAction,
    state: FetcherState,
    inputs: FetcherInputs,
}

/// Outstanding fetchers, keyed by submission order.
#[derive(Debug, Default)]
pub struct FetcherRegistry {
    next_id: u64,
    fetchers: BTreeMap<FetcherId, Fetcher>,
}

impl FetcherRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request in the `Submitting` state.
    pub fn begin(&mut self, action: CartAction, inputs: FetcherInputs) -> FetcherId {
        let id = FetcherId(self.next_id);
        self.next_id += 1;
        self.fetchers.insert(
            id,
            Fetcher {
                action,
                state: FetcherState::Submitting,
                inputs,
            },
        );
        id
    }

    /// The response arrived and is being applied.
    pub fn mark_loading(&mut self, id: FetcherId) {
        if let Some(fetcher) = self.fetchers.get_mut(&id) {
            fetcher.state = FetcherState::Loading;
        }
    }

    /// Remove a fetcher; it is idle from now on.
    pub fn finish(&mut self, id: FetcherId) {
        self.fetchers.remove(&id);
    }

    /// State of one fetcher. Unknown or finished fetchers are idle.
    #[must_use]
    pub fn state(&self, id: FetcherId) -> FetcherState {
        self.fetchers
            .get(&id)
            .map_or(FetcherState::Idle, |f| f.state)
    }

    /// Outstanding fetchers for an action, oldest first.
    pub fn by_action(&self, action: CartAction) -> impl Iterator<Item = (FetcherId, FetcherState)> + '_ {
        self.fetchers
            .iter()
            .filter(move |(_, f)| f.action == action)
            .map(|(id, f)| (*id, f.state))
    }

    /// Combined state of every `action` fetcher touching `line`.
    #[must_use]
    pub fn line_state(&self, action: CartAction, line: &CartLineId) -> FetcherState {
        self.fetchers
            .values()
            .filter(|f| f.action == action && f.inputs.touches(line))
            .map(|f| f.state)
            .max()
            .unwrap_or(FetcherState::Idle)
    }

    /// Whether any `action` fetcher is outstanding.
    #[must_use]
    pub fn is_busy(&self, action: CartAction) -> bool {
        self.fetchers.values().any(|f| f.action == action)
    }

    /// Whether any outstanding fetcher touches `line`.
    #[must_use]
    pub fn touches_line(&self, line: &CartLineId) -> bool {
        self.fetchers.values().any(|f| f.inputs.touches(line))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    /// Whether `id` is the only fetcher still outstanding.
    #[must_use]
    pub fn is_last(&self, id: FetcherId) -> bool {
        self.fetchers.len() == 1 && self.fetchers.contains_key(&id)
    }
}
