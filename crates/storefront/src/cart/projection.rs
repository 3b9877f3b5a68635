//! Optimistic cart projection.
//!
//! The projection is the last server-confirmed cart (the authoritative
//! snapshot) plus the pending intents, at most one per coalescing key.
//! Views are computed by replaying pending intents in issue order over the
//! snapshot. Every server response replaces the snapshot wholesale; the
//! projection never merges.

use std::collections::{BTreeMap, HashSet};

use luneva_core::types::{CartLineId, Price};

use super::intent::{CartIntent, CoalescingKey};
use crate::shopify::{Cart, CartDiscountCode, CartLine, CartLineCost};

/// Settled ticket states kept for inspection.
const FINISHED_HISTORY: usize = 64;

/// Handle on one issued intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub key: CoalescingKey,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Issued,
    InFlight,
    Resolved,
    Failed,
    /// Replaced by a newer intent with the same key; its outcome is
    /// discarded.
    Superseded,
}

/// How a ticket's outcome affected the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The server cart replaced the snapshot.
    Applied,
    /// The intent was dropped and an inline error recorded under its key.
    Reverted { message: String },
    /// A newer same-key intent owns the key; nothing changed.
    Superseded,
}

#[derive(Debug, Clone)]
struct PendingIntent {
    seq: u64,
    intent: CartIntent,
    state: TicketState,
}

/// What the visitor sees: the snapshot with pending intents applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedCart {
    pub cart: Cart,
    /// Lines whose display is provisional; their controls stay disabled.
    pub optimistic_lines: HashSet<CartLineId>,
    pub pending: Vec<CoalescingKey>,
    /// Inline errors by the key of the control that triggered them.
    pub errors: Vec<(CoalescingKey, String)>,
}

impl ProjectedCart {
    #[must_use]
    pub fn is_optimistic(&self, line: &CartLineId) -> bool {
        self.optimistic_lines.contains(line)
    }
}

#[derive(Debug, Clone)]
pub struct CartProjection {
    authoritative: Cart,
    pending: BTreeMap<CoalescingKey, PendingIntent>,
    errors: BTreeMap<CoalescingKey, String>,
    finished: BTreeMap<u64, TicketState>,
    next_seq: u64,
}

impl CartProjection {
    #[must_use]
    pub const fn new(authoritative: Cart) -> Self {
        Self {
            authoritative,
            pending: BTreeMap::new(),
            errors: BTreeMap::new(),
            finished: BTreeMap::new(),
            next_seq: 1,
        }
    }

    #[must_use]
    pub const fn authoritative(&self) -> &Cart {
        &self.authoritative
    }

    /// Record a new intent, superseding any pending intent with its key.
    /// Clears a previous inline error for the key.
    pub fn issue(&mut self, intent: CartIntent) -> Ticket {
        let key = intent.key();
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(previous) = self.pending.insert(
            key.clone(),
            PendingIntent {
                seq,
                intent,
                state: TicketState::Issued,
            },
        ) {
            self.finish(previous.seq, TicketState::Superseded);
        }
        self.errors.remove(&key);

        Ticket { key, seq }
    }

    /// Mark the ticket's request as sent. Returns `false` when the ticket
    /// no longer owns its key.
    pub fn mark_in_flight(&mut self, ticket: &Ticket) -> bool {
        match self.pending.get_mut(&ticket.key) {
            Some(pending) if pending.seq == ticket.seq => {
                pending.state = TicketState::InFlight;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn state(&self, ticket: &Ticket) -> TicketState {
        match self.pending.get(&ticket.key) {
            Some(pending) if pending.seq == ticket.seq => pending.state,
            Some(pending) if pending.seq > ticket.seq => TicketState::Superseded,
            _ => self
                .finished
                .get(&ticket.seq)
                .copied()
                .unwrap_or(TicketState::Superseded),
        }
    }

    /// Apply a ticket's outcome.
    ///
    /// A ticket that no longer owns its key is superseded and its outcome
    /// discarded. Success replaces the snapshot; failure drops the intent
    /// and records `message` as the key's inline error.
    pub fn settle(&mut self, ticket: &Ticket, outcome: Result<Cart, String>) -> Settlement {
        let owns_key = self
            .pending
            .get(&ticket.key)
            .is_some_and(|pending| pending.seq == ticket.seq);
        if !owns_key {
            self.finish(ticket.seq, TicketState::Superseded);
            return Settlement::Superseded;
        }

        self.pending.remove(&ticket.key);
        match outcome {
            Ok(cart) => {
                self.authoritative = cart;
                self.finish(ticket.seq, TicketState::Resolved);
                Settlement::Applied
            }
            Err(message) => {
                self.errors.insert(ticket.key.clone(), message.clone());
                self.finish(ticket.seq, TicketState::Failed);
                Settlement::Reverted { message }
            }
        }
    }

    /// Discard a ticket whose request was cancelled.
    pub fn supersede(&mut self, ticket: &Ticket) -> Settlement {
        self.finish(ticket.seq, TicketState::Superseded);
        Settlement::Superseded
    }

    /// Replace the snapshot with a freshly fetched cart.
    pub fn replace(&mut self, cart: Cart) {
        self.authoritative = cart;
    }

    pub fn dismiss_error(&mut self, key: &CoalescingKey) -> bool {
        self.errors.remove(key).is_some()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn finish(&mut self, seq: u64, state: TicketState) {
        self.finished.insert(seq, state);
        while self.finished.len() > FINISHED_HISTORY {
            self.finished.pop_first();
        }
    }

    /// The snapshot with every pending intent replayed in issue order.
    #[must_use]
    pub fn view(&self) -> ProjectedCart {
        let mut cart = self.authoritative.clone();
        let mut optimistic_lines = HashSet::new();

        let mut pending: Vec<&PendingIntent> = self.pending.values().collect();
        pending.sort_by_key(|pending| pending.seq);

        for pending in &pending {
            apply(&mut cart, &pending.intent, &mut optimistic_lines);
        }
        recompute_totals(&self.authoritative, &mut cart);

        ProjectedCart {
            cart,
            optimistic_lines,
            pending: pending.iter().map(|pending| pending.intent.key()).collect(),
            errors: self
                .errors
                .iter()
                .map(|(key, message)| (key.clone(), message.clone()))
                .collect(),
        }
    }
}

/// Line id given to a line that exists only in the projection.
fn provisional_line_id(merchandise: &str) -> CartLineId {
    CartLineId::new(format!("optimistic:{merchandise}"))
}

fn apply(cart: &mut Cart, intent: &CartIntent, optimistic: &mut HashSet<CartLineId>) {
    match intent {
        CartIntent::LinesAdd { lines, previews } => {
            for input in lines {
                if let Some(line) = cart
                    .lines
                    .iter_mut()
                    .find(|line| line.merchandise.id == input.merchandise_id)
                {
                    line.quantity = line.quantity.saturating_add(input.quantity);
                    optimistic.insert(line.id.clone());
                    continue;
                }

                let Some(preview) = previews
                    .iter()
                    .find(|preview| preview.id == input.merchandise_id)
                else {
                    continue;
                };
                let id = provisional_line_id(input.merchandise_id.as_str());
                let unit = preview.price.clone();
                cart.lines.push(CartLine {
                    id: id.clone(),
                    quantity: input.quantity,
                    cost: CartLineCost {
                        subtotal_amount: unit.times(input.quantity),
                        total_amount: unit.times(input.quantity),
                        amount_per_quantity: unit,
                        compare_at_amount_per_quantity: None,
                    },
                    merchandise: preview.clone(),
                });
                optimistic.insert(id);
            }
        }
        CartIntent::LinesUpdate { lines } => {
            for update in lines {
                if let Some(line) = cart.lines.iter_mut().find(|line| line.id == update.id) {
                    line.quantity = update.quantity;
                    optimistic.insert(line.id.clone());
                }
            }
        }
        CartIntent::LinesRemove { line_ids } => {
            cart.lines.retain(|line| !line_ids.contains(&line.id));
        }
        CartIntent::DiscountCodesUpdate { codes } => {
            cart.discount_codes = codes
                .iter()
                .map(|code| CartDiscountCode {
                    code: code.clone(),
                    applicable: true,
                })
                .collect();
        }
        // Gift card balances are only known to the server.
        CartIntent::GiftCardCodesUpdate { .. } => {}
        CartIntent::GiftCardCodesRemove { ids } => {
            cart.applied_gift_cards.retain(|card| !ids.contains(&card.id));
        }
    }
}

/// Recompute line and cart totals after replaying intents.
///
/// Lines whose quantity changed get `unit * quantity`. The cart total moves
/// by the same amount as the subtotal, keeping server-side discounts, tax
/// and shipping that the projection cannot compute.
fn recompute_totals(base: &Cart, cart: &mut Cart) {
    for line in &mut cart.lines {
        let unchanged = base
            .line(&line.id)
            .is_some_and(|original| original.quantity == line.quantity);
        if !unchanged {
            let subtotal = line.cost.amount_per_quantity.times(line.quantity);
            line.cost.subtotal_amount = subtotal.clone();
            line.cost.total_amount = subtotal;
        }
    }

    cart.total_quantity = cart.lines.iter().map(|line| line.quantity).sum();

    let currency = base.cost.subtotal_amount.currency_code.clone();
    let subtotal = cart
        .lines
        .iter()
        .try_fold(Price::zero(currency), |sum, line| {
            sum.checked_add(&line.cost.subtotal_amount)
        });
    let Ok(subtotal) = subtotal else {
        tracing::warn!(cart_id = %cart.id, "Mixed currencies in cart, keeping server totals");
        return;
    };

    let total = subtotal
        .checked_sub(&base.cost.subtotal_amount)
        .and_then(|delta| base.cost.total_amount.checked_add(&delta));
    if let Ok(total) = total {
        cart.cost.total_amount = total;
    }
    cart.cost.subtotal_amount = subtotal;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use luneva_core::types::{CartId, GiftCardId, MerchandiseId};

    use super::*;
    use crate::shopify::{AppliedGiftCard, CartMerchandise, CartMerchandiseProduct};

    pub(crate) fn price(amount: &str) -> Price {
        Price::parse(amount, "EUR").unwrap()
    }

    pub(crate) fn merchandise(id: &str, amount: &str) -> CartMerchandise {
        CartMerchandise {
            id: MerchandiseId::new(id),
            title: "Default Title".to_string(),
            price: price(amount),
            selected_options: Vec::new(),
            image: None,
            product: CartMerchandiseProduct {
                id: format!("product-{id}"),
                handle: format!("handle-{id}"),
                title: format!("Product {id}"),
                vendor: "Luneva".to_string(),
            },
        }
    }

    pub(crate) fn cart_line(id: &str, merchandise_id: &str, quantity: u32, unit: &str) -> CartLine {
        let unit = price(unit);
        CartLine {
            id: CartLineId::new(id),
            quantity,
            cost: CartLineCost {
                subtotal_amount: unit.times(quantity),
                total_amount: unit.times(quantity),
                amount_per_quantity: unit.clone(),
                compare_at_amount_per_quantity: None,
            },
            merchandise: merchandise(merchandise_id, &unit.amount.to_string()),
        }
    }

    /// A cart with line `l1` (3 x 10.00); totals include 5.00 shipping.
    pub(crate) fn sample_cart() -> Cart {
        let mut cart = Cart::empty(CartId::new("gid://shopify/Cart/c1"), "EUR");
        cart.lines.push(cart_line("l1", "v1", 3, "10.00"));
        cart.total_quantity = 3;
        cart.cost.subtotal_amount = price("30.00");
        cart.cost.total_amount = price("35.00");
        cart.checkout_url = "https://luneva.myshopify.com/cart/c/1".to_string();
        cart
    }

    #[test]
    fn test_update_projects_quantity_and_totals() {
        let mut projection = CartProjection::new(sample_cart());
        projection.issue(CartIntent::set_quantity(CartLineId::new("l1"), 1));

        let view = projection.view();
        let line = &view.cart.lines[0];
        assert_eq!(line.quantity, 1);
        assert_eq!(line.cost.subtotal_amount, price("10.00"));
        assert_eq!(view.cart.total_quantity, 1);
        assert_eq!(view.cart.cost.subtotal_amount, price("10.00"));
        assert_eq!(view.cart.cost.total_amount, price("15.00"));
        assert!(view.is_optimistic(&CartLineId::new("l1")));
    }

    #[test]
    fn test_add_new_line_uses_preview() {
        let mut projection = CartProjection::new(sample_cart());
        projection.issue(CartIntent::add(merchandise("v2", "4.50"), 2));

        let view = projection.view();
        assert_eq!(view.cart.lines.len(), 2);
        assert_eq!(view.cart.lines[1].id.as_str(), "optimistic:v2");
        assert_eq!(view.cart.total_quantity, 5);
        assert_eq!(view.cart.cost.subtotal_amount, price("39.00"));
    }

    #[test]
    fn test_add_existing_merchandise_increments() {
        let mut projection = CartProjection::new(sample_cart());
        projection.issue(CartIntent::add(merchandise("v1", "10.00"), 1));
        let view = projection.view();
        assert_eq!(view.cart.lines.len(), 1);
        assert_eq!(view.cart.lines[0].quantity, 4);
    }

    #[test]
    fn test_failure_reverts_and_records_error() {
        let mut projection = CartProjection::new(sample_cart());
        let ticket = projection.issue(CartIntent::set_quantity(CartLineId::new("l1"), 0));
        assert!(projection.mark_in_flight(&ticket));
        assert_eq!(projection.view().cart.lines.len(), 0);

        let settlement = projection.settle(&ticket, Err("Out of stock".to_string()));
        assert_eq!(
            settlement,
            Settlement::Reverted {
                message: "Out of stock".to_string()
            }
        );
        assert_eq!(projection.state(&ticket), TicketState::Failed);

        let view = projection.view();
        assert_eq!(view.cart, sample_cart());
        assert_eq!(view.errors, vec![(ticket.key.clone(), "Out of stock".to_string())]);

        assert!(projection.dismiss_error(&ticket.key));
        assert!(projection.view().errors.is_empty());
    }

    #[test]
    fn test_success_replaces_snapshot_wholesale() {
        let mut projection = CartProjection::new(sample_cart());
        let ticket = projection.issue(CartIntent::discount_codes(["SPRING"]));

        let mut server = sample_cart();
        server.discount_codes = vec![CartDiscountCode {
            code: "SPRING".to_string(),
            applicable: false,
        }];
        assert_eq!(projection.settle(&ticket, Ok(server.clone())), Settlement::Applied);
        assert_eq!(projection.state(&ticket), TicketState::Resolved);
        assert_eq!(projection.view().cart, server);
        assert!(!projection.has_pending());
    }

    #[test]
    fn test_same_key_supersedes_and_discards_outcome() {
        let mut projection = CartProjection::new(sample_cart());
        let first = projection.issue(CartIntent::set_quantity(CartLineId::new("l1"), 2));
        let second = projection.issue(CartIntent::set_quantity(CartLineId::new("l1"), 1));
        assert_eq!(projection.state(&first), TicketState::Superseded);
        assert!(!projection.mark_in_flight(&first));

        let mut stale = sample_cart();
        stale.lines[0].quantity = 2;
        assert_eq!(projection.settle(&first, Ok(stale)), Settlement::Superseded);
        assert_eq!(projection.view().cart.lines[0].quantity, 1);

        assert_eq!(projection.state(&second), TicketState::Issued);
    }

    #[test]
    fn test_disjoint_keys_resolve_out_of_order() {
        let mut base = sample_cart();
        base.applied_gift_cards.push(AppliedGiftCard {
            id: GiftCardId::new("g1"),
            last_characters: "abcd".to_string(),
            amount_used: price("5.00"),
        });
        let mut projection = CartProjection::new(base.clone());
        let lines = projection.issue(CartIntent::set_quantity(CartLineId::new("l1"), 2));
        let cards = projection.issue(CartIntent::GiftCardCodesRemove {
            ids: vec![GiftCardId::new("g1")],
        });

        let mut without_card = base;
        without_card.applied_gift_cards.clear();
        assert_eq!(projection.settle(&cards, Ok(without_card)), Settlement::Applied);

        // The line update is still pending and replays over the new snapshot.
        let view = projection.view();
        assert!(view.cart.applied_gift_cards.is_empty());
        assert_eq!(view.cart.lines[0].quantity, 2);
        assert_eq!(view.pending, vec![lines.key]);
    }

    #[test]
    fn test_replace_keeps_pending_intents() {
        let mut projection = CartProjection::new(sample_cart());
        projection.issue(CartIntent::set_quantity(CartLineId::new("l1"), 5));
        let mut fresh = sample_cart();
        fresh.note = Some("gift".to_string());
        projection.replace(fresh);

        let view = projection.view();
        assert_eq!(view.cart.note.as_deref(), Some("gift"));
        assert_eq!(view.cart.lines[0].quantity, 5);
    }
}
