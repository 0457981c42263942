//! Cart mutation coordination.
//!
//! Shopify owns the cart. The storefront keeps a read-only snapshot per
//! cart, an optimistic quantity overlay for lines with unconfirmed
//! updates, and the set of mutation requests still in flight. Together
//! these drive the quantity shown on each line and the busy indicators.

pub mod backend;
pub mod coordinator;
pub mod fetchers;
pub mod overlay;
pub mod quantity;

pub use backend::CartBackend;
pub use coordinator::{CartCoordinator, CartCoordinators, CartDisplay, LineDisplay};
pub use fetchers::{CartAction, FetcherId, FetcherInputs, FetcherRegistry, FetcherState};
pub use overlay::OptimisticOverlay;
pub use quantity::{MAX_QUANTITY, QuantityControls, Step, effective_quantity, next_quantity};

use noh_core::CartLineId;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart service rejected or failed the request.
    #[error(transparent)]
    Upstream(#[from] ShopifyError),

    /// The quantity control for this step is disabled.
    #[error("cannot {step} a line at quantity {quantity}")]
    StepDisabled { step: Step, quantity: u32 },

    /// The line is not in the current cart snapshot.
    #[error("line {0} is not in the cart")]
    UnknownLine(CartLineId),
}
