//! Display model for the cart page and the cart aside.

use luneva_core::types::Price;

use super::intent::CartIntent;
use super::projection::ProjectedCart;
use crate::views::{ImageView, product_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub id: String,
    pub product_title: String,
    /// Selected options, `None` for single-variant products.
    pub variant_title: Option<String>,
    pub url: String,
    pub image: Option<ImageView>,
    pub quantity: u32,
    pub unit_price: String,
    pub compare_at_price: Option<String>,
    pub line_total: String,
    /// Provisional until the server confirms; controls are disabled.
    pub optimistic: bool,
    /// `None` disables the control.
    pub decrease_to: Option<u32>,
    pub increase_to: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftCardView {
    pub id: String,
    /// `***` followed by the last characters of the code.
    pub masked_code: String,
    pub amount_used: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartErrorView {
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_quantity: u32,
    pub subtotal: String,
    pub total: String,
    pub tax: Option<String>,
    pub discount_codes: Vec<String>,
    pub gift_cards: Vec<GiftCardView>,
    pub checkout_url: Option<String>,
    pub errors: Vec<CartErrorView>,
    /// Whether any mutation is still awaiting the server.
    pub pending: bool,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn from_projection(projected: &ProjectedCart) -> Self {
        let cart = &projected.cart;

        let lines = cart
            .lines
            .iter()
            .map(|line| {
                let optimistic = projected.is_optimistic(&line.id);
                let merchandise = &line.merchandise;
                let variant_title = (merchandise.title != "Default Title"
                    && !merchandise.title.is_empty())
                .then(|| merchandise.title.clone());
                CartLineView {
                    id: line.id.to_string(),
                    product_title: merchandise.product.title.clone(),
                    variant_title,
                    url: product_url(&merchandise.product.handle, &merchandise.selected_options),
                    image: merchandise
                        .image
                        .as_ref()
                        .map(|image| ImageView::from_shopify(image, &merchandise.product.title)),
                    quantity: line.quantity,
                    unit_price: line.cost.amount_per_quantity.display(),
                    compare_at_price: line
                        .cost
                        .compare_at_amount_per_quantity
                        .as_ref()
                        .filter(|compare| compare.amount > line.cost.amount_per_quantity.amount)
                        .map(Price::display),
                    line_total: line.cost.total_amount.display(),
                    optimistic,
                    decrease_to: if optimistic {
                        None
                    } else {
                        CartIntent::decrease_target(line.quantity)
                    },
                    increase_to: (!optimistic).then(|| CartIntent::increase_target(line.quantity)),
                }
            })
            .collect();

        Self {
            lines,
            total_quantity: cart.total_quantity,
            subtotal: cart.cost.subtotal_amount.display(),
            total: cart.cost.total_amount.display(),
            tax: cart
                .cost
                .total_tax_amount
                .as_ref()
                .map(Price::display),
            discount_codes: cart
                .applicable_discount_codes()
                .map(str::to_string)
                .collect(),
            gift_cards: cart
                .applied_gift_cards
                .iter()
                .map(|card| GiftCardView {
                    id: card.id.to_string(),
                    masked_code: format!("***{}", card.last_characters),
                    amount_used: card.amount_used.display(),
                })
                .collect(),
            checkout_url: Some(cart.checkout_url.clone()).filter(|url| !url.is_empty()),
            errors: projected
                .errors
                .iter()
                .map(|(key, message)| CartErrorView {
                    key: key.to_string(),
                    message: message.clone(),
                })
                .collect(),
            pending: !projected.pending.is_empty(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luneva_core::types::{CartLineId, GiftCardId};

    use super::*;
    use crate::cart::projection::CartProjection;
    use crate::cart::projection::tests::{cart_line, price, sample_cart};
    use crate::shopify::{AppliedGiftCard, CartDiscountCode};

    #[test]
    fn test_controls_follow_quantity_and_optimism() {
        let mut cart = sample_cart();
        cart.lines.push(cart_line("l2", "v2", 1, "8.00"));
        let mut projection = CartProjection::new(cart);
        projection.issue(crate::cart::CartIntent::set_quantity(CartLineId::new("l2"), 1));

        let view = CartView::from_projection(&projection.view());
        let first = &view.lines[0];
        assert_eq!(first.decrease_to, Some(2));
        assert_eq!(first.increase_to, Some(4));
        assert!(!first.optimistic);

        let second = &view.lines[1];
        assert!(second.optimistic);
        assert_eq!(second.decrease_to, None);
        assert_eq!(second.increase_to, None);
        assert!(view.pending);
    }

    #[test]
    fn test_single_unit_line_cannot_decrease() {
        let mut cart = sample_cart();
        cart.lines[0].quantity = 1;
        let view = CartView::from_projection(&CartProjection::new(cart).view());
        assert_eq!(view.lines[0].decrease_to, None);
        assert_eq!(view.lines[0].variant_title, None);
    }

    #[test]
    fn test_discounts_and_gift_cards() {
        let mut cart = sample_cart();
        cart.discount_codes = vec![
            CartDiscountCode {
                code: "SPRING".to_string(),
                applicable: true,
            },
            CartDiscountCode {
                code: "EXPIRED".to_string(),
                applicable: false,
            },
        ];
        cart.applied_gift_cards.push(AppliedGiftCard {
            id: GiftCardId::new("g1"),
            last_characters: "x9k2".to_string(),
            amount_used: price("12.50"),
        });

        let view = CartView::from_projection(&CartProjection::new(cart).view());
        assert_eq!(view.discount_codes, vec!["SPRING"]);
        assert_eq!(view.gift_cards[0].masked_code, "***x9k2");
        assert_eq!(view.gift_cards[0].amount_used, "\u{20ac}12.50");
        assert_eq!(view.subtotal, "\u{20ac}30.00");
        assert_eq!(view.total, "\u{20ac}35.00");
        assert!(view.checkout_url.is_some());
        assert!(!view.is_empty());
    }
}
