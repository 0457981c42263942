//! Optimistic quantities for lines with unconfirmed updates.

use std::collections::HashMap;

use noh_core::CartLineId;

/// Per-line quantity of the most recently submitted update.
#[derive(Debug, Clone, Default)]
pub struct OptimisticOverlay(HashMap<CartLineId, u32>);

impl OptimisticOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted quantity. A later submission replaces an earlier one.
    pub fn set(&mut self, line: CartLineId, quantity: u32) {
        self.0.insert(line, quantity);
    }

    #[must_use]
    pub fn get(&self, line: &CartLineId) -> Option<u32> {
        self.0.get(line).copied()
    }

    /// Drop the entry so the confirmed quantity shows again.
    pub fn clear(&mut self, line: &CartLineId) {
        self.0.remove(line);
    }

    /// Drop every entry for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&CartLineId) -> bool) {
        self.0.retain(|line, _| keep(line));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
