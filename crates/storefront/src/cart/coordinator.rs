//! Per-cart coordination of optimistic quantities and in-flight mutations.
//!
//! Each mutation goes through three steps:
//!
//! 1. Under the state lock, record the optimistic quantities and register a
//!    fetcher.
//! 2. Call the cart service with no lock held, so requests for the same
//!    line or cart run concurrently.
//! 3. Under the lock again, replace the snapshot with the response (in
//!    arrival order), retire the fetcher and drop overlay entries for lines
//!    no other request still touches.
//!
//! Responses to overlapping requests can arrive out of order, so the last
//! one to settle after an overlap re-reads the cart before it retires. Its
//! fetcher stays `Loading` meanwhile and the overlay keeps showing the
//! submitted quantities until the fresh cart is in.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use noh_core::{CartId, CartLineId, Money};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::catalog::variant_path;
use crate::shopify::{Cart, CartLine, CartLineInput, CartLineUpdateInput, ShopifyError};

use super::fetchers::{CartAction, FetcherId, FetcherInputs, FetcherRegistry, FetcherState};
use super::overlay::OptimisticOverlay;
use super::quantity::{QuantityControls, Step, effective_quantity, next_quantity};
use super::{CartBackend, CartError};

#[derive(Debug, Default)]
struct CartState {
    snapshot: Option<Cart>,
    overlay: OptimisticOverlay,
    fetchers: FetcherRegistry,
    /// A request was submitted while another was outstanding.
    overlapped: bool,
}

impl CartState {
    fn begin(&mut self, action: CartAction, inputs: FetcherInputs) -> FetcherId {
        if !self.fetchers.is_empty() {
            self.overlapped = true;
        }
        self.fetchers.begin(action, inputs)
    }

    fn settle(&mut self, id: FetcherId) {
        self.fetchers.finish(id);
        let Self {
            overlay, fetchers, ..
        } = self;
        overlay.retain(|line| fetchers.touches_line(line));
    }
}

/// Coordinates mutations for one cart.
#[derive(Debug)]
pub struct CartCoordinator<B> {
    cart_id: CartId,
    backend: B,
    state: Mutex<CartState>,
}

impl<B: CartBackend> CartCoordinator<B> {
    /// Coordinator for an existing cart; the snapshot loads on first use.
    pub fn new(cart_id: CartId, backend: B) -> Self {
        Self {
            cart_id,
            backend,
            state: Mutex::new(CartState::default()),
        }
    }

    /// Coordinator for a cart the service just returned.
    pub fn with_snapshot(cart: Cart, backend: B) -> Self {
        Self {
            cart_id: cart.id.clone(),
            backend,
            state: Mutex::new(CartState {
                snapshot: Some(cart),
                ..CartState::default()
            }),
        }
    }

    #[must_use]
    pub const fn cart_id(&self) -> &CartId {
        &self.cart_id
    }

    /// Re-read the cart from the service.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Upstream` if the read fails.
    #[instrument(skip(self), fields(cart_id = %self.cart_id))]
    pub async fn refresh(&self) -> Result<Cart, CartError> {
        let cart = self.backend.get_cart(&self.cart_id).await?;
        self.state.lock().await.snapshot = Some(cart.clone());
        Ok(cart)
    }

    /// The current snapshot, loading it if needed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Upstream` if the cart cannot be read.
    pub async fn snapshot(&self) -> Result<Cart, CartError> {
        if let Some(cart) = self.state.lock().await.snapshot.clone() {
            return Ok(cart);
        }
        self.refresh().await
    }

    /// Add merchandise to the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Upstream` if the service rejects the request; the
    /// snapshot is left as it was.
    #[instrument(skip(self, lines), fields(cart_id = %self.cart_id))]
    pub async fn add_lines(&self, lines: Vec<CartLineInput>) -> Result<Cart, CartError> {
        let id = {
            let mut state = self.state.lock().await;
            state.begin(
                CartAction::LinesAdd,
                FetcherInputs::Merchandise(lines.iter().map(|l| l.merchandise_id.clone()).collect()),
            )
        };
        self.run(id, self.backend.add_lines(&self.cart_id, lines)).await
    }

    /// Set line quantities. The new quantities display immediately.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Upstream` if the service rejects the request; the
    /// snapshot is left as it was.
    #[instrument(skip(self, lines), fields(cart_id = %self.cart_id))]
    pub async fn update_lines(&self, lines: Vec<CartLineUpdateInput>) -> Result<Cart, CartError> {
        let id = {
            let mut state = self.state.lock().await;
            for line in &lines {
                state.overlay.set(line.id.clone(), line.quantity);
            }
            state.begin(
                CartAction::LinesUpdate,
                FetcherInputs::Lines(lines.iter().map(|l| l.id.clone()).collect()),
            )
        };
        self.run(id, self.backend.update_lines(&self.cart_id, lines)).await
    }

    /// Remove lines from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Upstream` if the service rejects the request; the
    /// snapshot is left as it was.
    #[instrument(skip(self, line_ids), fields(cart_id = %self.cart_id))]
    pub async fn remove_lines(&self, line_ids: Vec<CartLineId>) -> Result<Cart, CartError> {
        let id = {
            let mut state = self.state.lock().await;
            state.begin(CartAction::LinesRemove, FetcherInputs::Lines(line_ids.clone()))
        };
        self.run(id, self.backend.remove_lines(&self.cart_id, line_ids)).await
    }

    /// Press a line's increment or decrement button.
    ///
    /// The step applies to the quantity currently displayed, so a second
    /// press before the first response builds on the first.
    ///
    /// # Errors
    ///
    /// - `CartError::UnknownLine` if the line is not in the cart
    /// - `CartError::StepDisabled` if the button is disabled at this quantity
    /// - `CartError::Upstream` if the service rejects the update
    #[instrument(skip(self), fields(cart_id = %self.cart_id, line_id = %line_id))]
    pub async fn step_line(&self, line_id: &CartLineId, step: Step) -> Result<Cart, CartError> {
        if self.state.lock().await.snapshot.is_none() {
            self.refresh().await?;
        }

        let (id, quantity) = {
            let mut state = self.state.lock().await;
            let confirmed = state
                .snapshot
                .as_ref()
                .and_then(|cart| cart.line(line_id))
                .map(|line| line.quantity)
                .ok_or_else(|| CartError::UnknownLine(line_id.clone()))?;
            let effective = effective_quantity(confirmed, state.overlay.get(line_id));
            if !QuantityControls::new(effective).allows(step) {
                return Err(CartError::StepDisabled {
                    step,
                    quantity: effective,
                });
            }
            let next = next_quantity(effective, step);
            state.overlay.set(line_id.clone(), next);
            let id = state.begin(
                CartAction::LinesUpdate,
                FetcherInputs::Lines(vec![line_id.clone()]),
            );
            (id, next)
        };

        debug!(%step, quantity, "Stepping line quantity");
        let lines = vec![CartLineUpdateInput {
            id: line_id.clone(),
            quantity,
        }];
        self.run(id, self.backend.update_lines(&self.cart_id, lines)).await
    }

    /// What the cart page should show right now, or `None` before the first
    /// snapshot has loaded.
    pub async fn view(&self) -> Option<CartDisplay> {
        let state = self.state.lock().await;
        state
            .snapshot
            .as_ref()
            .map(|cart| CartDisplay::new(cart, &state.overlay, &state.fetchers))
    }

    async fn run(
        &self,
        id: FetcherId,
        request: impl Future<Output = Result<Cart, ShopifyError>>,
    ) -> Result<Cart, CartError> {
        let result = request.await;

        let revalidate = {
            let mut state = self.state.lock().await;
            state.fetchers.mark_loading(id);
            if let Ok(cart) = &result {
                state.snapshot = Some(cart.clone());
            }
            let revalidate = state.fetchers.is_last(id) && std::mem::take(&mut state.overlapped);
            if !revalidate {
                state.settle(id);
            }
            revalidate
        };

        let mut outcome = result.map_err(|e| {
            warn!(cart_id = %self.cart_id, error = %e, "Cart mutation failed");
            CartError::Upstream(e)
        });

        if revalidate {
            debug!(cart_id = %self.cart_id, "Re-reading cart after overlapping mutations");
            let fresh = self.backend.get_cart(&self.cart_id).await;
            let mut state = self.state.lock().await;
            match fresh {
                Ok(cart) => {
                    state.snapshot = Some(cart.clone());
                    if outcome.is_ok() {
                        outcome = Ok(cart);
                    }
                }
                Err(e) => warn!(cart_id = %self.cart_id, error = %e, "Cart re-read failed"),
            }
            state.settle(id);
        }

        outcome
    }
}

// =============================================================================
// Display
// =============================================================================

/// One cart line as shown to the shopper.
#[derive(Debug, Clone, Serialize)]
pub struct LineDisplay {
    pub line: CartLine,
    /// Optimistic quantity if an update is pending, else the confirmed one.
    pub quantity: u32,
    pub controls: QuantityControls,
    /// Link back to the variant's product page.
    pub url: String,
    pub updating: bool,
    pub removing: bool,
}

/// The cart as shown to the shopper.
#[derive(Debug, Clone, Serialize)]
pub struct CartDisplay {
    pub cart_id: CartId,
    pub lines: Vec<LineDisplay>,
    pub subtotal: Money,
    /// Sum of displayed line quantities.
    pub total_quantity: u32,
    /// Shopify's checkout URL, passed through untouched.
    pub checkout_url: String,
    /// Any mutation is in flight.
    pub busy: bool,
    /// An add-to-cart is in flight.
    pub adding: bool,
}

impl CartDisplay {
    fn new(cart: &Cart, overlay: &OptimisticOverlay, fetchers: &FetcherRegistry) -> Self {
        let lines: Vec<LineDisplay> = cart
            .lines
            .iter()
            .map(|line| {
                let quantity = effective_quantity(line.quantity, overlay.get(&line.id));
                LineDisplay {
                    line: line.clone(),
                    quantity,
                    controls: QuantityControls::new(quantity),
                    url: variant_path(
                        &line.merchandise.product.handle,
                        &line.merchandise.selected_options,
                    ),
                    updating: fetchers.line_state(CartAction::LinesUpdate, &line.id)
                        != FetcherState::Idle,
                    removing: fetchers.line_state(CartAction::LinesRemove, &line.id)
                        != FetcherState::Idle,
                }
            })
            .collect();

        Self {
            cart_id: cart.id.clone(),
            total_quantity: lines.iter().map(|l| l.quantity).sum(),
            lines,
            subtotal: cart.cost.subtotal.clone(),
            checkout_url: cart.checkout_url.clone(),
            busy: !fetchers.is_empty(),
            adding: fetchers.is_busy(CartAction::LinesAdd),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&LineDisplay> {
        self.lines.iter().find(|l| &l.line.id == id)
    }
}

// =============================================================================
// CartCoordinators
// =============================================================================

/// One coordinator per live cart, evicted after a period of inactivity.
pub struct CartCoordinators<B> {
    backend: B,
    carts: Cache<CartId, Arc<CartCoordinator<B>>>,
}

impl<B: CartBackend + Clone> CartCoordinators<B> {
    #[must_use]
    pub fn new(backend: B, idle: Duration) -> Self {
        Self {
            backend,
            carts: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// The coordinator for an existing cart.
    pub async fn get_or_create(&self, cart_id: &CartId) -> Arc<CartCoordinator<B>> {
        self.carts
            .get_with(cart_id.clone(), async {
                Arc::new(CartCoordinator::new(cart_id.clone(), self.backend.clone()))
            })
            .await
    }

    /// Create a cart with initial lines and start coordinating it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Upstream` if the service cannot create the cart.
    pub async fn create_cart(
        &self,
        lines: Vec<CartLineInput>,
    ) -> Result<Arc<CartCoordinator<B>>, CartError> {
        let cart = self.backend.create_cart(lines).await?;
        let coordinator = Arc::new(CartCoordinator::with_snapshot(cart, self.backend.clone()));
        self.carts
            .insert(coordinator.cart_id().clone(), Arc::clone(&coordinator))
            .await;
        Ok(coordinator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use noh_core::{CurrencyCode, ProductId, VariantId};
    use rust_decimal::Decimal;
    use tokio::sync::oneshot;

    use super::*;
    use crate::shopify::{CartCost, CartLineCost, CartMerchandise, CartMerchandiseProduct, SelectedOption};

    fn usd(amount: u32) -> Money {
        Money::new(Decimal::from(amount), CurrencyCode::new("USD"))
    }

    fn line_id(n: u32) -> CartLineId {
        CartLineId::new(format!("gid://shopify/CartLine/{n}"))
    }

    fn cart_line(n: u32, quantity: u32) -> CartLine {
        CartLine {
            id: line_id(n),
            quantity,
            cost: CartLineCost {
                amount_per_quantity: usd(185),
                total_amount: usd(185 * quantity),
                compare_at_amount_per_quantity: None,
            },
            merchandise: CartMerchandise {
                id: VariantId::new(format!("gid://shopify/ProductVariant/{n}")),
                title: "Black / Small".to_string(),
                selected_options: vec![
                    SelectedOption::new("Color", "Black"),
                    SelectedOption::new("Size", "Small"),
                ],
                image: None,
                product: CartMerchandiseProduct {
                    id: ProductId::new("gid://shopify/Product/1"),
                    handle: "frame-a".to_string(),
                    title: "Frame A".to_string(),
                },
            },
        }
    }

    fn cart(lines: Vec<CartLine>) -> Cart {
        Cart {
            id: CartId::new("gid://shopify/Cart/c1"),
            checkout_url: "https://shop.example/checkouts/c1".to_string(),
            total_quantity: lines.iter().map(|l| l.quantity).sum(),
            cost: CartCost {
                subtotal: usd(0),
                total: usd(0),
            },
            lines,
        }
    }

    /// In-memory cart service whose update responses can be held back.
    #[derive(Clone, Default)]
    struct MockBackend {
        cart: Arc<StdMutex<Option<Cart>>>,
        reads: Arc<AtomicUsize>,
        updates: Arc<StdMutex<Vec<Vec<CartLineUpdateInput>>>>,
        gates: Arc<StdMutex<VecDeque<oneshot::Receiver<()>>>>,
        fail: Arc<AtomicBool>,
    }

    impl MockBackend {
        fn with_cart(cart: Cart) -> Self {
            let backend = Self::default();
            *backend.cart.lock().unwrap() = Some(cart);
            backend
        }

        /// Hold back the next update until the returned sender fires.
        fn gate(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }

        fn updates(&self) -> Vec<Vec<CartLineUpdateInput>> {
            self.updates.lock().unwrap().clone()
        }

        async fn wait_for_updates(&self, count: usize) {
            for _ in 0..1000 {
                if self.updates.lock().unwrap().len() >= count {
                    return;
                }
                tokio::task::yield_now().await;
            }
            panic!("expected {count} update requests");
        }

        fn current(&self) -> Result<Cart, ShopifyError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ShopifyError::UserError("Cart is locked".to_string()));
            }
            self.cart
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ShopifyError::NotFound("cart".to_string()))
        }
    }

    impl CartBackend for MockBackend {
        fn create_cart(
            &self,
            lines: Vec<CartLineInput>,
        ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
            let this = self.clone();
            async move {
                let created = cart(
                    lines
                        .iter()
                        .zip(1..)
                        .map(|(l, n)| cart_line(n, l.quantity))
                        .collect(),
                );
                *this.cart.lock().unwrap() = Some(created.clone());
                Ok(created)
            }
        }

        fn get_cart(&self, _cart_id: &CartId) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
            let this = self.clone();
            async move {
                this.reads.fetch_add(1, Ordering::SeqCst);
                this.current()
            }
        }

        fn add_lines(
            &self,
            _cart_id: &CartId,
            lines: Vec<CartLineInput>,
        ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
            let this = self.clone();
            async move {
                if let Some(cart) = this.cart.lock().unwrap().as_mut() {
                    for input in lines {
                        let n = u32::try_from(cart.lines.len()).unwrap() + 1;
                        cart.lines.push(cart_line(n, input.quantity));
                    }
                }
                this.current()
            }
        }

        fn update_lines(
            &self,
            _cart_id: &CartId,
            lines: Vec<CartLineUpdateInput>,
        ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
            let this = self.clone();
            async move {
                // Applied in submission order; only the response is held back.
                if !this.fail.load(Ordering::SeqCst)
                    && let Some(cart) = this.cart.lock().unwrap().as_mut()
                {
                    for update in &lines {
                        if let Some(line) = cart.lines.iter_mut().find(|l| l.id == update.id) {
                            line.quantity = update.quantity;
                        }
                    }
                    cart.lines.retain(|l| l.quantity > 0);
                }
                let response = this.current();
                this.updates.lock().unwrap().push(lines);
                let gate = this.gates.lock().unwrap().pop_front();
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                response
            }
        }

        fn remove_lines(
            &self,
            _cart_id: &CartId,
            line_ids: Vec<CartLineId>,
        ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
            let this = self.clone();
            async move {
                if let Some(cart) = this.cart.lock().unwrap().as_mut() {
                    cart.lines.retain(|l| !line_ids.contains(&l.id));
                }
                this.current()
            }
        }
    }

    async fn displayed(coordinator: &CartCoordinator<MockBackend>, line: u32) -> u32 {
        coordinator
            .view()
            .await
            .unwrap()
            .line(&line_id(line))
            .unwrap()
            .quantity
    }

    fn coordinator(quantity: u32) -> (Arc<CartCoordinator<MockBackend>>, MockBackend) {
        let backend = MockBackend::with_cart(cart(vec![cart_line(1, quantity)]));
        let coordinator = Arc::new(CartCoordinator::new(
            CartId::new("gid://shopify/Cart/c1"),
            backend.clone(),
        ));
        (coordinator, backend)
    }

    #[tokio::test]
    async fn test_two_increments_display_in_order_regardless_of_responses() {
        let (coordinator, backend) = coordinator(3);
        coordinator.refresh().await.unwrap();

        let first_gate = backend.gate();
        let second_gate = backend.gate();

        let first = tokio::spawn({
            let c = Arc::clone(&coordinator);
            async move { c.step_line(&line_id(1), Step::Increment).await }
        });
        backend.wait_for_updates(1).await;
        assert_eq!(displayed(&coordinator, 1).await, 4);

        let second = tokio::spawn({
            let c = Arc::clone(&coordinator);
            async move { c.step_line(&line_id(1), Step::Increment).await }
        });
        backend.wait_for_updates(2).await;
        assert_eq!(displayed(&coordinator, 1).await, 5);

        // The second response lands first; the first is still pending.
        second_gate.send(()).unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(displayed(&coordinator, 1).await, 5);
        let view = coordinator.view().await.unwrap();
        assert!(view.line(&line_id(1)).unwrap().updating);

        // The first response carries the older quantity 4.
        first_gate.send(()).unwrap();
        let settled = first.await.unwrap().unwrap();
        let view = coordinator.view().await.unwrap();
        assert!(!view.busy);

        let server = backend.current().unwrap().lines[0].quantity;
        assert_eq!(server, 5);
        assert_eq!(displayed(&coordinator, 1).await, server);
        assert_eq!(coordinator.snapshot().await.unwrap().lines[0].quantity, server);
        assert_eq!(settled.lines[0].quantity, server);

        let sent: Vec<u32> = backend.updates().iter().map(|u| u[0].quantity).collect();
        assert_eq!(sent, vec![4, 5]);
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_mutation_does_not_reread() {
        let (coordinator, backend) = coordinator(2);
        coordinator.refresh().await.unwrap();

        coordinator.step_line(&line_id(1), Step::Increment).await.unwrap();
        coordinator.step_line(&line_id(1), Step::Increment).await.unwrap();

        assert_eq!(displayed(&coordinator, 1).await, 4);
        assert_eq!(backend.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_reread_keeps_last_response() {
        let (coordinator, backend) = coordinator(3);
        coordinator.refresh().await.unwrap();
        let first_gate = backend.gate();
        let second_gate = backend.gate();

        let first = tokio::spawn({
            let c = Arc::clone(&coordinator);
            async move { c.step_line(&line_id(1), Step::Increment).await }
        });
        backend.wait_for_updates(1).await;
        let second = tokio::spawn({
            let c = Arc::clone(&coordinator);
            async move { c.step_line(&line_id(1), Step::Increment).await }
        });
        backend.wait_for_updates(2).await;

        first_gate.send(()).unwrap();
        first.await.unwrap().unwrap();
        backend.fail.store(true, Ordering::SeqCst);
        second_gate.send(()).unwrap();
        second.await.unwrap().unwrap();

        let view = coordinator.view().await.unwrap();
        assert!(!view.busy);
        assert_eq!(view.line(&line_id(1)).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_decrement_shows_new_quantity_before_response() {
        let (coordinator, backend) = coordinator(2);
        coordinator.refresh().await.unwrap();
        let gate = backend.gate();

        let task = tokio::spawn({
            let c = Arc::clone(&coordinator);
            async move { c.step_line(&line_id(1), Step::Decrement).await }
        });
        backend.wait_for_updates(1).await;

        assert_eq!(
            backend.updates(),
            vec![vec![CartLineUpdateInput {
                id: line_id(1),
                quantity: 1
            }]]
        );
        let view = coordinator.view().await.unwrap();
        let line = view.line(&line_id(1)).unwrap();
        assert_eq!(line.quantity, 1);
        assert!(line.updating);
        assert!(!line.controls.can_decrement);

        gate.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(displayed(&coordinator, 1).await, 1);
    }

    #[tokio::test]
    async fn test_disabled_steps_send_nothing() {
        let (coordinator, backend) = coordinator(1);
        let err = coordinator
            .step_line(&line_id(1), Step::Decrement)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::StepDisabled { step: Step::Decrement, quantity: 1 }));

        let (coordinator, _) = coordinator_at_max();
        let err = coordinator
            .step_line(&line_id(1), Step::Increment)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::StepDisabled { step: Step::Increment, quantity: 10 }));

        assert!(backend.updates().is_empty());
    }

    fn coordinator_at_max() -> (Arc<CartCoordinator<MockBackend>>, MockBackend) {
        coordinator(super::super::MAX_QUANTITY)
    }

    #[tokio::test]
    async fn test_unknown_line() {
        let (coordinator, _) = coordinator(2);
        let err = coordinator
            .step_line(&line_id(7), Step::Increment)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::UnknownLine(_)));
    }

    #[tokio::test]
    async fn test_failed_update_keeps_snapshot_and_clears_overlay() {
        let (coordinator, backend) = coordinator(3);
        coordinator.refresh().await.unwrap();
        backend.fail.store(true, Ordering::SeqCst);

        let err = coordinator
            .update_lines(vec![CartLineUpdateInput {
                id: line_id(1),
                quantity: 6,
            }])
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::Upstream(ShopifyError::UserError(_))));
        let view = coordinator.view().await.unwrap();
        assert_eq!(view.line(&line_id(1)).unwrap().quantity, 3);
        assert!(!view.busy);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_sent_as_update() {
        let (coordinator, backend) = coordinator(2);
        let cart = coordinator
            .update_lines(vec![CartLineUpdateInput {
                id: line_id(1),
                quantity: 0,
            }])
            .await
            .unwrap();

        assert_eq!(backend.updates()[0][0].quantity, 0);
        assert!(cart.lines.is_empty());
        assert!(coordinator.view().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_coordinators_share_one_per_cart() {
        let backend = MockBackend::default();
        let carts = CartCoordinators::new(backend, Duration::from_secs(60));

        let created = carts
            .create_cart(vec![CartLineInput {
                merchandise_id: VariantId::new("gid://shopify/ProductVariant/1"),
                quantity: 1,
            }])
            .await
            .unwrap();
        let again = carts.get_or_create(created.cart_id()).await;

        assert!(Arc::ptr_eq(&created, &again));
        let view = again.view().await.unwrap();
        assert_eq!(view.total_quantity, 1);
        assert_eq!(view.checkout_url, "https://shop.example/checkouts/c1");
        assert_eq!(view.lines[0].url, "/products/frame-a?Color=Black&Size=Small");
    }

    #[tokio::test]
    async fn test_add_and_remove_refresh_snapshot() {
        let (coordinator, _) = coordinator(1);
        let cart = coordinator
            .add_lines(vec![CartLineInput {
                merchandise_id: VariantId::new("gid://shopify/ProductVariant/2"),
                quantity: 1,
            }])
            .await
            .unwrap();
        assert_eq!(cart.lines.len(), 2);

        let cart = coordinator.remove_lines(vec![line_id(1)]).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(coordinator.view().await.unwrap().lines.len(), 1);
    }
}
