//! Cart mutations with optimistic projection.
//!
//! A mutation flows: handler builds a [`CartIntent`] → the
//! [`CartCoordinator`] records it in the cart's [`CartProjection`] and sends
//! it → the server cart replaces the projection's snapshot, or the intent is
//! dropped with an inline error. Handlers render the resulting
//! [`CartView`].

mod coordinator;
mod intent;
mod projection;
mod view;

pub use coordinator::{CartBackend, CartCoordinator, CartError, SubmitOutcome};
pub use intent::{CartIntent, CoalescingKey, IntentError};
pub use projection::{CartProjection, ProjectedCart, Settlement, Ticket, TicketState};
pub use view::{CartErrorView, CartLineView, CartView, GiftCardView};
