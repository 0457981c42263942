//! Quantity stepping rules for cart lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest quantity the increment control allows.
pub const MAX_QUANTITY: u32 = 10;

/// Direction of a quantity button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Increment,
    Decrement,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
        })
    }
}

/// The quantity shown for a line: the pending overlay value if any,
/// otherwise the confirmed quantity.
#[must_use]
pub fn effective_quantity(confirmed: u32, overlay: Option<u32>) -> u32 {
    overlay.unwrap_or(confirmed)
}

/// Quantity after one step. Decrementing never goes below zero.
#[must_use]
pub const fn next_quantity(effective: u32, step: Step) -> u32 {
    match step {
        Step::Increment => effective.saturating_add(1),
        Step::Decrement => effective.saturating_sub(1),
    }
}

/// State of a line's quantity buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityControls {
    pub quantity: u32,
    /// Quantity the decrement button submits.
    pub previous: u32,
    /// Quantity the increment button submits.
    pub next: u32,
    pub can_decrement: bool,
    pub can_increment: bool,
}

impl QuantityControls {
    #[must_use]
    pub const fn new(quantity: u32) -> Self {
        Self {
            quantity,
            previous: next_quantity(quantity, Step::Decrement),
            next: next_quantity(quantity, Step::Increment),
            can_decrement: quantity > 1,
            can_increment: quantity < MAX_QUANTITY,
        }
    }

    /// Whether the button for `step` is enabled.
    #[must_use]
    pub const fn allows(&self, step: Step) -> bool {
        match step {
            Step::Increment => self.can_increment,
            Step::Decrement => self.can_decrement,
        }
    }
}
