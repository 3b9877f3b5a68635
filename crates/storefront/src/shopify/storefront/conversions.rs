//! Conversions from GraphQL wire shapes to domain types.

use tracing::warn;

use crate::shopify::types::{
    Cart, CartLine, CartMerchandise, Collection, CollectionConnection, CollectionSummary,
    PriceRange, Product, ProductConnection, ProductOption, ProductSummary,
    ProductVariant,
};

use super::queries::wire;

// =============================================================================
// Products
// =============================================================================

impl From<wire::ProductCard> for ProductSummary {
    fn from(card: wire::ProductCard) -> Self {
        let selected_options = card
            .variants
            .nodes
            .into_iter()
            .next()
            .map(|variant| variant.selected_options)
            .unwrap_or_default();
        Self {
            id: card.id,
            handle: card.handle,
            title: card.title,
            price: card.price_range.min_variant_price,
            featured_image: card.featured_image,
            selected_options,
        }
    }
}

impl From<wire::ProductDetail> for Product {
    fn from(product: wire::ProductDetail) -> Self {
        Self {
            id: product.id,
            handle: product.handle,
            title: product.title,
            description: product.description,
            description_html: product.description_html,
            available_for_sale: product.available_for_sale,
            vendor: product.vendor,
            product_type: product.product_type,
            tags: product.tags,
            seo: product.seo,
            price_range: PriceRange {
                min_variant_price: product.price_range.min_variant_price,
                max_variant_price: product.price_range.max_variant_price,
            },
            featured_image: product.featured_image,
            images: product.images.nodes,
            options: product
                .options
                .into_iter()
                .map(|option| ProductOption {
                    id: option.id,
                    name: option.name,
                    values: option
                        .option_values
                        .into_iter()
                        .map(|value| value.name)
                        .collect(),
                })
                .collect(),
            variants: product
                .variants
                .nodes
                .into_iter()
                .map(|variant| ProductVariant {
                    id: variant.id,
                    title: variant.title,
                    available_for_sale: variant.available_for_sale,
                    price: variant.price,
                    compare_at_price: variant.compare_at_price,
                    selected_options: variant.selected_options,
                    image: variant.image,
                })
                .collect(),
        }
    }
}

pub fn convert_product_connection(connection: wire::Connection<wire::ProductCard>) -> ProductConnection {
    ProductConnection {
        products: connection.nodes.into_iter().map(ProductSummary::from).collect(),
        page_info: connection.page_info,
    }
}

// =============================================================================
// Collections
// =============================================================================

impl From<wire::CollectionSummary> for CollectionSummary {
    fn from(collection: wire::CollectionSummary) -> Self {
        Self {
            id: collection.id,
            handle: collection.handle,
            title: collection.title,
            description: collection.description,
            image: collection.image,
        }
    }
}

impl From<wire::CollectionDetail> for Collection {
    fn from(collection: wire::CollectionDetail) -> Self {
        Self {
            id: collection.id,
            handle: collection.handle,
            title: collection.title,
            description: collection.description,
            description_html: collection.description_html,
            image: collection.image,
            seo: collection.seo,
            products: convert_product_connection(collection.products),
        }
    }
}

pub fn convert_collection_connection(
    connection: wire::Connection<wire::CollectionSummary>,
) -> CollectionConnection {
    CollectionConnection {
        collections: connection
            .nodes
            .into_iter()
            .map(CollectionSummary::from)
            .collect(),
        page_info: connection.page_info,
    }
}

// =============================================================================
// Carts
// =============================================================================

impl From<wire::Cart> for Cart {
    fn from(cart: wire::Cart) -> Self {
        let lines = cart
            .lines
            .nodes
            .into_iter()
            .filter_map(|line| {
                let Some(merchandise) = line.merchandise else {
                    warn!(line_id = %line.id, "Skipping cart line without product variant");
                    return None;
                };
                Some(CartLine {
                    id: line.id,
                    quantity: line.quantity,
                    cost: line.cost,
                    merchandise: CartMerchandise {
                        id: merchandise.id,
                        title: merchandise.title,
                        price: merchandise.price,
                        selected_options: merchandise.selected_options,
                        image: merchandise.image,
                        product: merchandise.product,
                    },
                })
            })
            .collect();

        Self {
            id: cart.id,
            checkout_url: cart.checkout_url,
            total_quantity: cart.total_quantity,
            note: cart.note,
            cost: cart.cost,
            discount_codes: cart.discount_codes,
            applied_gift_cards: cart.applied_gift_cards,
            lines,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_card_takes_first_variant_options() {
        let json = r#"{
            "id": "gid://shopify/Product/1",
            "title": "Linen Shirt",
            "handle": "linen-shirt",
            "priceRange": {"minVariantPrice": {"amount": "48.0", "currencyCode": "USD"}},
            "featuredImage": null,
            "variants": {"nodes": [
                {"selectedOptions": [{"name": "Size", "value": "M"}]},
                {"selectedOptions": [{"name": "Size", "value": "L"}]}
            ]}
        }"#;
        let card: wire::ProductCard = serde_json::from_str(json).unwrap();
        let summary = ProductSummary::from(card);
        assert_eq!(summary.handle, "linen-shirt");
        assert_eq!(summary.price.display(), "$48.00");
        assert_eq!(summary.selected_options.len(), 1);
        assert_eq!(summary.selected_options[0].value, "M");
    }

    #[test]
    fn test_cart_conversion_keeps_gift_cards_and_lines() {
        let json = r#"{
            "id": "gid://shopify/Cart/1",
            "checkoutUrl": "https://luneva.com/cart/c/1",
            "totalQuantity": 1,
            "note": null,
            "cost": {
                "subtotalAmount": {"amount": "20.0", "currencyCode": "USD"},
                "totalAmount": {"amount": "15.0", "currencyCode": "USD"},
                "totalTaxAmount": null
            },
            "discountCodes": [],
            "appliedGiftCards": [{"id": "gid://shopify/AppliedGiftCard/9", "lastCharacters": "x7k2", "amountUsed": {"amount": "5.0", "currencyCode": "USD"}}],
            "lines": {"nodes": [{
                "id": "gid://shopify/CartLine/1",
                "quantity": 1,
                "cost": {
                    "amountPerQuantity": {"amount": "20.0", "currencyCode": "USD"},
                    "compareAtAmountPerQuantity": null,
                    "subtotalAmount": {"amount": "20.0", "currencyCode": "USD"},
                    "totalAmount": {"amount": "20.0", "currencyCode": "USD"}
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/3",
                    "title": "M",
                    "price": {"amount": "20.0", "currencyCode": "USD"},
                    "selectedOptions": [{"name": "Size", "value": "M"}],
                    "image": null,
                    "product": {"id": "gid://shopify/Product/1", "handle": "linen-shirt", "title": "Linen Shirt", "vendor": "Luneva"}
                }
            }]}
        }"#;
        let cart = Cart::from(serde_json::from_str::<wire::Cart>(json).unwrap());
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].merchandise.product.handle, "linen-shirt");
        assert_eq!(cart.applied_gift_cards[0].last_characters, "x7k2");
        assert_eq!(cart.cost.total_amount.display(), "$15.00");
    }
}
