//! Per-cart owner of projections and in-flight mutations.
//!
//! Each cart id maps to one slot holding its [`CartProjection`]. Submitting
//! an intent issues a ticket, sends the mutation, and races it against the
//! arrival of a newer same-key ticket: if superseded, the request future is
//! dropped (cancelling it if it is still pending) and its outcome never
//! reaches the projection. Mutations with different keys run concurrently
//! and settle in whatever order they finish.
//!
//! The send-and-settle half runs on its own task, so a ticket reaches a
//! terminal state even when the caller stops waiting for it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use luneva_core::types::CartId;
use moka::future::Cache;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use super::intent::{CartIntent, CoalescingKey, IntentError};
use super::projection::{CartProjection, ProjectedCart, Settlement, Ticket};
use crate::shopify::{Cart, CartLineInput, ShopifyError, StorefrontClient};

/// Idle carts are forgotten after this long; the next request reloads them.
const SLOT_IDLE: Duration = Duration::from_secs(30 * 60);
const MAX_SLOTS: u64 = 10_000;

/// The remote cart API.
pub trait CartBackend: Send + Sync + 'static {
    fn fetch(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<Option<Cart>, ShopifyError>> + Send;

    fn create(
        &self,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn apply(
        &self,
        cart_id: &CartId,
        intent: &CartIntent,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;
}

impl CartBackend for StorefrontClient {
    async fn fetch(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        self.get_cart(cart_id).await
    }

    async fn create(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        self.create_cart(lines).await
    }

    async fn apply(&self, cart_id: &CartId, intent: &CartIntent) -> Result<Cart, ShopifyError> {
        match intent {
            CartIntent::LinesAdd { lines, .. } => self.add_lines(cart_id, lines.clone()).await,
            CartIntent::LinesUpdate { lines } => self.update_lines(cart_id, lines.clone()).await,
            CartIntent::LinesRemove { line_ids } => {
                self.remove_lines(cart_id, line_ids.clone()).await
            }
            CartIntent::DiscountCodesUpdate { codes } => {
                self.update_discount_codes(cart_id, codes.clone()).await
            }
            CartIntent::GiftCardCodesUpdate { codes } => {
                self.update_gift_card_codes(cart_id, codes.clone()).await
            }
            CartIntent::GiftCardCodesRemove { ids } => {
                self.remove_gift_cards(cart_id, ids.clone()).await
            }
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("invalid cart request: {0}")]
    Intent(#[from] IntentError),

    /// The cart id is unknown or the cart has expired.
    #[error("cart not found")]
    Missing,

    #[error("cart backend error: {0}")]
    Backend(Arc<ShopifyError>),

    /// The mutation task panicked or was cancelled by the runtime.
    #[error("cart mutation interrupted: {0}")]
    Interrupted(String),
}

impl CartError {
    /// Message shown next to the cart control that failed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Intent(e) => e.to_string(),
            Self::Missing => "This cart is no longer available.".to_string(),
            Self::Backend(e) => e.user_message(),
            Self::Interrupted(_) => {
                "Something went wrong updating your cart. Please try again.".to_string()
            }
        }
    }
}

impl From<ShopifyError> for CartError {
    fn from(error: ShopifyError) -> Self {
        Self::Backend(Arc::new(error))
    }
}

/// Result of one submitted intent.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub ticket: Ticket,
    pub settlement: Settlement,
    /// The projection after settling.
    pub view: ProjectedCart,
}

struct Slot {
    projection: CartProjection,
    /// Newest ticket sequence per key; in-flight submissions watch it.
    latest: HashMap<CoalescingKey, watch::Sender<u64>>,
}

type SharedSlot = Arc<Mutex<Slot>>;

pub struct CartCoordinator<B> {
    backend: Arc<B>,
    slots: Cache<CartId, SharedSlot>,
}

impl<B> Clone for CartCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            slots: self.slots.clone(),
        }
    }
}

impl<B: CartBackend> CartCoordinator<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            slots: Cache::builder()
                .max_capacity(MAX_SLOTS)
                .time_to_idle(SLOT_IDLE)
                .build(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn slot(&self, cart_id: &CartId) -> Result<SharedSlot, CartError> {
        let backend = Arc::clone(&self.backend);
        let id = cart_id.clone();
        self.slots
            .try_get_with(cart_id.clone(), async move {
                let cart = backend.fetch(&id).await?.ok_or(CartError::Missing)?;
                Ok::<_, CartError>(Arc::new(Mutex::new(Slot {
                    projection: CartProjection::new(cart),
                    latest: HashMap::new(),
                })))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Fetch the cart fresh and return its projection.
    ///
    /// Returns `Ok(None)` when the cart no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn load(&self, cart_id: &CartId) -> Result<Option<ProjectedCart>, CartError> {
        let Some(slot) = self.slots.get(cart_id).await else {
            return match self.slot(cart_id).await {
                Ok(slot) => Ok(Some(slot.lock().await.projection.view())),
                Err(CartError::Missing) => Ok(None),
                Err(e) => Err(e),
            };
        };

        match self.backend.fetch(cart_id).await? {
            Some(cart) => {
                let mut slot = slot.lock().await;
                slot.projection.replace(cart);
                Ok(Some(slot.projection.view()))
            }
            None => {
                self.slots.invalidate(cart_id).await;
                Ok(None)
            }
        }
    }

    /// Create a cart with initial lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines are invalid or creation fails.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create(&self, lines: Vec<CartLineInput>) -> Result<ProjectedCart, CartError> {
        CartIntent::LinesAdd {
            lines: lines.clone(),
            previews: Vec::new(),
        }
        .validate()?;

        let cart = self.backend.create(lines).await?;
        let projection = CartProjection::new(cart.clone());
        let view = projection.view();
        self.slots
            .insert(
                cart.id,
                Arc::new(Mutex::new(Slot {
                    projection,
                    latest: HashMap::new(),
                })),
            )
            .await;
        Ok(view)
    }

    /// Submit an intent and wait for it to settle.
    ///
    /// Backend failures do not surface as errors: they revert the intent
    /// and come back as [`Settlement::Reverted`].
    ///
    /// # Errors
    ///
    /// Returns an error if the intent is invalid or the cart cannot be
    /// loaded.
    #[instrument(skip(self, intent), fields(cart_id = %cart_id, action = intent.action()))]
    pub async fn submit(
        &self,
        cart_id: &CartId,
        intent: CartIntent,
    ) -> Result<SubmitOutcome, CartError> {
        intent.validate()?;
        let slot = self.slot(cart_id).await?;

        let (ticket, superseded) = {
            let mut state = slot.lock().await;
            let ticket = state.projection.issue(intent.clone());
            state.projection.mark_in_flight(&ticket);
            let sender = state
                .latest
                .entry(ticket.key.clone())
                .or_insert_with(|| watch::channel(0).0);
            sender.send_replace(ticket.seq);
            (ticket, sender.subscribe())
        };
        debug!(key = %ticket.key, seq = ticket.seq, "Cart intent in flight");

        let task = tokio::spawn(settle_in_background(
            Arc::clone(&self.backend),
            slot,
            cart_id.clone(),
            intent,
            ticket,
            superseded,
        ));
        task.await.map_err(|e| {
            warn!(error = %e, "Cart mutation task failed");
            CartError::Interrupted(e.to_string())
        })
    }

    /// Current projection without contacting the backend.
    pub async fn view(&self, cart_id: &CartId) -> Option<ProjectedCart> {
        let slot = self.slots.get(cart_id).await?;
        let view = slot.lock().await.projection.view();
        Some(view)
    }

    /// Dismiss the inline error recorded under `key`.
    pub async fn dismiss_error(&self, cart_id: &CartId, key: &CoalescingKey) -> Option<ProjectedCart> {
        let slot = self.slots.get(cart_id).await?;
        let mut state = slot.lock().await;
        state.projection.dismiss_error(key);
        Some(state.projection.view())
    }
}

/// Send `intent`, then settle `ticket` with whatever comes back.
async fn settle_in_background<B: CartBackend>(
    backend: Arc<B>,
    slot: SharedSlot,
    cart_id: CartId,
    intent: CartIntent,
    ticket: Ticket,
    superseded: watch::Receiver<u64>,
) -> SubmitOutcome {
    let outcome = tokio::select! {
        result = backend.apply(&cart_id, &intent) => Some(result),
        () = wait_superseded(superseded, ticket.seq) => None,
    };

    let mut state = slot.lock().await;
    let settlement = match outcome {
        None => state.projection.supersede(&ticket),
        Some(Ok(cart)) => state.projection.settle(&ticket, Ok(cart)),
        Some(Err(e)) => {
            warn!(key = %ticket.key, error = %e, "Cart mutation failed");
            state.projection.settle(&ticket, Err(e.user_message()))
        }
    };

    let idle = state
        .latest
        .get(&ticket.key)
        .is_some_and(|sender| *sender.borrow() == ticket.seq);
    if idle {
        state.latest.remove(&ticket.key);
    }

    SubmitOutcome {
        view: state.projection.view(),
        ticket,
        settlement,
    }
}

/// Completes once a ticket newer than `seq` owns the key.
async fn wait_superseded(mut latest: watch::Receiver<u64>, seq: u64) {
    if latest.wait_for(|current| *current != seq).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use luneva_core::types::CartLineId;

    use super::*;
    use crate::cart::projection::TicketState;
    use crate::cart::projection::tests::sample_cart;

    /// Applies intents to an in-memory cart after a delay.
    struct SlowBackend {
        cart: std::sync::Mutex<Cart>,
        delay: Duration,
        completed: AtomicUsize,
        fail_with: Option<String>,
    }

    impl SlowBackend {
        fn new(delay: Duration) -> Self {
            Self {
                cart: std::sync::Mutex::new(sample_cart()),
                delay,
                completed: AtomicUsize::new(0),
                fail_with: None,
            }
        }
    }

    impl CartBackend for SlowBackend {
        async fn fetch(&self, _cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
            Ok(Some(self.cart.lock().unwrap().clone()))
        }

        async fn create(&self, _lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
            Ok(self.cart.lock().unwrap().clone())
        }

        async fn apply(&self, _cart_id: &CartId, intent: &CartIntent) -> Result<Cart, ShopifyError> {
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(ShopifyError::UserError(message.clone()));
            }
            let mut cart = self.cart.lock().unwrap();
            if let CartIntent::LinesUpdate { lines } = intent {
                for update in lines {
                    if let Some(line) = cart.lines.iter_mut().find(|line| line.id == update.id) {
                        line.quantity = update.quantity;
                    }
                }
            }
            Ok(cart.clone())
        }
    }

    fn cart_id() -> CartId {
        CartId::new("gid://shopify/Cart/c1")
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_same_key_intent_cancels_older() {
        let coordinator = CartCoordinator::new(SlowBackend::new(Duration::from_millis(200)));
        let id = cart_id();
        coordinator.load(&id).await.unwrap();

        let line = CartLineId::new("l1");
        let first = coordinator.submit(&id, CartIntent::set_quantity(line.clone(), 2));
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            coordinator.submit(&id, CartIntent::set_quantity(line.clone(), 1)).await
        };
        let (first, second) = tokio::join!(first, second);
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.settlement, Settlement::Superseded);
        assert_eq!(second.settlement, Settlement::Applied);
        assert_eq!(second.view.cart.lines[0].quantity, 1);
        assert_eq!(coordinator.backend().completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reverts_without_error() {
        let mut backend = SlowBackend::new(Duration::from_millis(10));
        backend.fail_with = Some("Not enough stock".to_string());
        let coordinator = CartCoordinator::new(backend);
        let id = cart_id();

        let outcome = coordinator
            .submit(&id, CartIntent::set_quantity(CartLineId::new("l1"), 9))
            .await
            .unwrap();
        assert_eq!(
            outcome.settlement,
            Settlement::Reverted {
                message: "Not enough stock".to_string()
            }
        );
        assert_eq!(outcome.view.cart.lines[0].quantity, 3);
        assert_eq!(outcome.view.errors.len(), 1);

        let view = coordinator.dismiss_error(&id, &outcome.ticket.key).await.unwrap();
        assert!(view.errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_intent_is_rejected_before_sending() {
        let coordinator = CartCoordinator::new(SlowBackend::new(Duration::from_millis(10)));
        let result = coordinator
            .submit(&cart_id(), CartIntent::LinesUpdate { lines: vec![] })
            .await;
        assert!(matches!(result, Err(CartError::Intent(IntentError::NoLines))));
        assert_eq!(coordinator.backend().completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_still_settles() {
        let coordinator = CartCoordinator::new(SlowBackend::new(Duration::from_millis(200)));
        let id = cart_id();
        let line = CartLineId::new("l1");
        coordinator.load(&id).await.unwrap();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            coordinator.submit(&id, CartIntent::set_quantity(line.clone(), 2)),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let view = coordinator.view(&id).await.unwrap();
        assert!(view.pending.is_empty());
        assert!(!view.is_optimistic(&line));
        assert_eq!(view.cart.lines[0].quantity, 2);
        assert_eq!(coordinator.backend().completed.load(Ordering::SeqCst), 1);

        let slot = coordinator.slots.get(&id).await.unwrap();
        assert!(slot.lock().await.latest.is_empty());

        let reloaded = coordinator.load(&id).await.unwrap().unwrap();
        assert!(!reloaded.is_optimistic(&line));
    }

    #[tokio::test(start_paused = true)]
    async fn test_projection_reports_in_flight_until_settled() {
        let coordinator = CartCoordinator::new(SlowBackend::new(Duration::from_millis(100)));
        let id = cart_id();
        coordinator.load(&id).await.unwrap();

        let submit = coordinator.submit(&id, CartIntent::set_quantity(CartLineId::new("l1"), 2));
        let observe = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            coordinator.view(&id).await.unwrap()
        };
        let (outcome, during) = tokio::join!(submit, observe);
        let outcome = outcome.unwrap();

        assert_eq!(during.cart.lines[0].quantity, 2);
        assert!(during.is_optimistic(&CartLineId::new("l1")));
        assert!(!outcome.view.is_optimistic(&CartLineId::new("l1")));
        let slot = coordinator.slots.get(&id).await.unwrap();
        assert_eq!(
            slot.lock().await.projection.state(&outcome.ticket),
            TicketState::Resolved
        );
    }
}
