//! Optimistic cart mutations through the coordinator.
//!
//! The backend answers after a fixed latency and the clock is paused, so
//! request interleavings are deterministic.
//!
//! Run with: cargo test -p luneva-integration-tests --test cart

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use luneva_core::{CartId, CartLineId};
use luneva_integration_tests::{
    CURRENCY, FakeCartBackend, cart_line, merchandise, price, recalculate,
};
use luneva_storefront::cart::{CartCoordinator, CartError, CartIntent, CartView, Settlement};
use luneva_storefront::shopify::{Cart, CartLineInput};

const LATENCY: Duration = Duration::from_millis(200);

fn cart_id() -> CartId {
    CartId::new("gid://shopify/Cart/c1")
}

/// A cart holding three mugs.
fn mug_cart() -> Cart {
    let mut cart = Cart::empty(cart_id(), CURRENCY);
    cart.checkout_url = "https://checkout.luneva.test/cart/c1".to_string();
    cart.lines.push(cart_line("l1", merchandise("mug", 1800), 3));
    recalculate(&mut cart);
    cart
}

fn coordinator() -> CartCoordinator<FakeCartBackend> {
    let mut backend = FakeCartBackend::new(Some(mug_cart()), LATENCY);
    backend.valid_discounts.insert("WELCOME10".to_string());
    let bowl = merchandise("bowl", 2400);
    backend.catalog.insert(bowl.id.clone(), bowl);
    CartCoordinator::new(backend)
}

#[tokio::test(start_paused = true)]
async fn test_rapid_quantity_changes_settle_on_the_last_one() {
    let carts = coordinator();
    let id = cart_id();
    let line = CartLineId::new("l1");

    let first = carts.submit(&id, CartIntent::set_quantity(line.clone(), 4));
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        carts.submit(&id, CartIntent::set_quantity(line.clone(), 6)).await
    };
    let (first, second) = tokio::join!(first, second);
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.settlement, Settlement::Superseded);
    assert_eq!(second.settlement, Settlement::Applied);
    assert_eq!(second.view.cart.lines[0].quantity, 6);
    assert_eq!(second.view.cart.cost.subtotal_amount, price(10800));
    assert_eq!(carts.backend().applied(), 1);
    assert_eq!(carts.backend().snapshot().unwrap().lines[0].quantity, 6);
}

#[tokio::test(start_paused = true)]
async fn test_remove_supersedes_pending_update_of_the_same_line() {
    let carts = coordinator();
    let id = cart_id();
    let line = CartLineId::new("l1");

    let update = carts.submit(&id, CartIntent::set_quantity(line.clone(), 5));
    let remove = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        carts
            .submit(&id, CartIntent::LinesRemove { line_ids: vec![line.clone()] })
            .await
    };
    let (update, remove) = tokio::join!(update, remove);

    assert_eq!(update.unwrap().settlement, Settlement::Superseded);
    let remove = remove.unwrap();
    assert_eq!(remove.settlement, Settlement::Applied);
    assert!(remove.view.cart.lines.is_empty());
    assert_eq!(remove.view.cart.total_quantity, 0);
}

#[tokio::test(start_paused = true)]
async fn test_different_controls_run_concurrently() {
    let carts = coordinator();
    let id = cart_id();

    let started = tokio::time::Instant::now();
    let (quantity, discount) = tokio::join!(
        carts.submit(&id, CartIntent::set_quantity(CartLineId::new("l1"), 1)),
        carts.submit(&id, CartIntent::discount_codes(["WELCOME10"])),
    );

    assert_eq!(quantity.unwrap().settlement, Settlement::Applied);
    let discount = discount.unwrap();
    assert_eq!(discount.settlement, Settlement::Applied);
    assert_eq!(carts.backend().applied(), 2);
    assert!(started.elapsed() < LATENCY * 2);

    let view = carts.view(&id).await.unwrap();
    assert_eq!(view.cart.lines[0].quantity, 1);
    assert_eq!(view.cart.discount_codes[0].code, "WELCOME10");
    assert!(view.pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_discount_reverts_with_inline_error() {
    let carts = coordinator();
    let id = cart_id();

    let outcome = carts
        .submit(&id, CartIntent::discount_codes(["EXPIRED"]))
        .await
        .unwrap();

    assert!(matches!(outcome.settlement, Settlement::Reverted { .. }));
    assert!(outcome.view.cart.discount_codes.is_empty());
    let view = CartView::from_projection(&outcome.view);
    assert_eq!(view.errors.len(), 1);
    assert!(view.errors[0].message.contains("EXPIRED"));

    let dismissed = carts.dismiss_error(&id, &outcome.ticket.key).await.unwrap();
    assert!(dismissed.errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_added_line_is_shown_before_the_backend_answers() {
    let carts = coordinator();
    let id = cart_id();
    let bowl = merchandise("bowl", 2400);

    let submit = carts.submit(&id, CartIntent::add(bowl.clone(), 2));
    let peek = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        carts.view(&id).await.unwrap()
    };
    let (outcome, during) = tokio::join!(submit, peek);

    assert_eq!(during.cart.lines.len(), 2);
    let provisional = &during.cart.lines[1];
    assert!(during.is_optimistic(&provisional.id));
    assert_eq!(during.cart.total_quantity, 5);

    let outcome = outcome.unwrap();
    assert_eq!(outcome.settlement, Settlement::Applied);
    let added = &outcome.view.cart.lines[1];
    assert_eq!(added.merchandise.id, bowl.id);
    assert!(!outcome.view.is_optimistic(&added.id));
    assert_eq!(outcome.view.cart.cost.total_amount, price(10200));
}

#[tokio::test(start_paused = true)]
async fn test_expired_cart_is_reported_missing() {
    let carts = CartCoordinator::new(FakeCartBackend::new(None, LATENCY));

    assert!(carts.load(&cart_id()).await.unwrap().is_none());
    let result = carts
        .submit(&cart_id(), CartIntent::set_quantity(CartLineId::new("l1"), 2))
        .await;
    assert!(matches!(result, Err(CartError::Missing)));
}

#[tokio::test(start_paused = true)]
async fn test_create_then_mutate_new_cart() {
    let carts = CartCoordinator::new({
        let mut backend = FakeCartBackend::new(None, LATENCY);
        let bowl = merchandise("bowl", 2400);
        backend.catalog.insert(bowl.id.clone(), bowl);
        backend
    });
    let bowl = merchandise("bowl", 2400);

    let created = carts
        .create(vec![CartLineInput::new(bowl.id.clone(), 1)])
        .await
        .unwrap();
    assert_eq!(created.cart.total_quantity, 1);

    let line = created.cart.lines[0].id.clone();
    let outcome = carts
        .submit(&created.cart.id, CartIntent::set_quantity(line, 3))
        .await
        .unwrap();
    assert_eq!(outcome.settlement, Settlement::Applied);
    assert_eq!(outcome.view.cart.cost.subtotal_amount, price(7200));
}

#[tokio::test(start_paused = true)]
async fn test_double_decrease_from_two_settles_at_one() {
    let mut cart = mug_cart();
    cart.lines[0].quantity = 2;
    recalculate(&mut cart);
    let carts = CartCoordinator::new(FakeCartBackend::new(Some(cart), LATENCY));
    let id = cart_id();
    let line = CartLineId::new("l1");

    // Both clicks were made against the rendered quantity of 2.
    let target = CartIntent::decrease_target(2).unwrap();
    let first = carts.submit(&id, CartIntent::set_quantity(line.clone(), target));
    let second = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        carts.submit(&id, CartIntent::set_quantity(line.clone(), target)).await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap().settlement, Settlement::Superseded);
    let second = second.unwrap();
    assert_eq!(second.settlement, Settlement::Applied);
    assert_eq!(carts.backend().applied(), 1);
    assert_eq!(second.view.cart.lines[0].quantity, 1);

    let view = CartView::from_projection(&second.view);
    assert_eq!(view.lines[0].decrease_to, None);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_request_does_not_leave_the_line_optimistic() {
    let carts = coordinator();
    let id = cart_id();
    let line = CartLineId::new("l1");

    // The visitor navigates away while the update is in flight.
    let dropped = tokio::time::timeout(
        Duration::from_millis(10),
        carts.submit(&id, CartIntent::set_quantity(line.clone(), 2)),
    )
    .await;
    assert!(dropped.is_err());

    tokio::time::sleep(LATENCY * 2).await;
    let reloaded = carts.load(&id).await.unwrap().unwrap();
    assert!(reloaded.pending.is_empty());
    assert!(!reloaded.is_optimistic(&line));
    assert_eq!(reloaded.cart.lines[0].quantity, 2);

    let view = CartView::from_projection(&reloaded);
    assert_eq!(view.lines[0].decrease_to, Some(1));
    assert_eq!(view.lines[0].increase_to, Some(3));
    assert_eq!(carts.backend().applied(), 1);
}
