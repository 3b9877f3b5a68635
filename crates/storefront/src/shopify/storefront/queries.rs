//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with a
//! sibling module holding its `Variables` and `ResponseData`, the same shape
//! `#[derive(GraphQLQuery)]` generates. Documents are assembled from shared
//! fragments at compile time with `concat!`.

use graphql_client::{GraphQLQuery, QueryBody};
use luneva_core::{CartId, CartLineId, GiftCardId, MerchandiseId, Price};
use serde::{Deserialize, Serialize};

use crate::shopify::types::{
    AppliedGiftCard, CartCost, CartDiscountCode, CartLineCost, CartMerchandiseProduct,
    CartUserError, Image, PageInfo, SelectedOption, Seo,
};

// =============================================================================
// Fragments
// =============================================================================

macro_rules! image_fields {
    () => {
        "id url altText width height"
    };
}

macro_rules! money {
    () => {
        "{ amount currencyCode }"
    };
}

macro_rules! product_card_fragment {
    () => {
        concat!(
            "fragment ProductCard on Product { id title handle ",
            "priceRange { minVariantPrice ",
            money!(),
            " } featuredImage { ",
            image_fields!(),
            " } variants(first: 1) { nodes { selectedOptions { name value } } } }\n"
        )
    };
}

macro_rules! product_detail_fragment {
    () => {
        concat!(
            "fragment ProductDetail on Product { id handle title description descriptionHtml ",
            "availableForSale vendor productType tags seo { title description } ",
            "priceRange { minVariantPrice ",
            money!(),
            " maxVariantPrice ",
            money!(),
            " } featuredImage { ",
            image_fields!(),
            " } images(first: 10) { nodes { ",
            image_fields!(),
            " } } options { id name optionValues { name } } ",
            "variants(first: 50) { nodes { id title availableForSale price ",
            money!(),
            " compareAtPrice ",
            money!(),
            " selectedOptions { name value } image { ",
            image_fields!(),
            " } } } }\n"
        )
    };
}

macro_rules! page_info {
    () => {
        "pageInfo { hasNextPage hasPreviousPage startCursor endCursor }"
    };
}

macro_rules! cart_fragment {
    () => {
        concat!(
            "fragment CartFields on Cart { id checkoutUrl totalQuantity note ",
            "cost { subtotalAmount ",
            money!(),
            " totalAmount ",
            money!(),
            " totalTaxAmount ",
            money!(),
            " } discountCodes { code applicable } ",
            "appliedGiftCards { id lastCharacters amountUsed ",
            money!(),
            " } lines(first: 100) { nodes { id quantity cost { amountPerQuantity ",
            money!(),
            " compareAtAmountPerQuantity ",
            money!(),
            " subtotalAmount ",
            money!(),
            " totalAmount ",
            money!(),
            " } merchandise { ... on ProductVariant { id title price ",
            money!(),
            " selectedOptions { name value } image { ",
            image_fields!(),
            " } product { id handle title vendor } } } } } }\n"
        )
    };
}

macro_rules! cart_payload {
    () => {
        "{ cart { ...CartFields } userErrors { code field message } }"
    };
}

/// Implement [`GraphQLQuery`] for an operation struct and its module.
macro_rules! operation {
    ($name:ident, $module:ident) => {
        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Wire Types
// =============================================================================

/// Wire shapes that differ from the domain types.
pub mod wire {
    use super::{
        AppliedGiftCard, CartCost, CartDiscountCode, CartId, CartLineCost, CartLineId,
        CartMerchandiseProduct, CartUserError, Deserialize, Image, MerchandiseId, PageInfo,
        Price, SelectedOption, Seo,
    };

    /// A `{ nodes: [...] }` connection without page info.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Nodes<T> {
        #[serde(default = "Vec::new")]
        pub nodes: Vec<T>,
    }

    /// A `{ nodes: [...], pageInfo }` connection.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Connection<T> {
        #[serde(default = "Vec::new")]
        pub nodes: Vec<T>,
        pub page_info: PageInfo,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MinPriceRange {
        pub min_variant_price: Price,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FullPriceRange {
        pub min_variant_price: Price,
        pub max_variant_price: Price,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantOptions {
        pub selected_options: Vec<SelectedOption>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductCard {
        pub id: String,
        pub title: String,
        pub handle: String,
        pub price_range: MinPriceRange,
        pub featured_image: Option<Image>,
        pub variants: Nodes<VariantOptions>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OptionValue {
        pub name: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductOption {
        pub id: String,
        pub name: String,
        pub option_values: Vec<OptionValue>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variant {
        pub id: MerchandiseId,
        pub title: String,
        pub available_for_sale: bool,
        pub price: Price,
        pub compare_at_price: Option<Price>,
        pub selected_options: Vec<SelectedOption>,
        pub image: Option<Image>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductDetail {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub description: String,
        pub description_html: String,
        pub available_for_sale: bool,
        pub vendor: String,
        pub product_type: String,
        pub tags: Vec<String>,
        pub seo: Seo,
        pub price_range: FullPriceRange,
        pub featured_image: Option<Image>,
        pub images: Nodes<Image>,
        pub options: Vec<ProductOption>,
        pub variants: Nodes<Variant>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionSummary {
        pub id: String,
        pub handle: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub image: Option<Image>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CollectionDetail {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub description: String,
        pub description_html: String,
        pub image: Option<Image>,
        pub seo: Seo,
        pub products: Connection<ProductCard>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Merchandise {
        pub id: MerchandiseId,
        pub title: String,
        pub price: Price,
        pub selected_options: Vec<SelectedOption>,
        pub image: Option<Image>,
        pub product: CartMerchandiseProduct,
    }

    /// A cart line. `merchandise` is `None` when the variant type is not a
    /// `ProductVariant` (the inline fragment yields an empty object).
    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLine {
        pub id: CartLineId,
        pub quantity: u32,
        pub cost: CartLineCost,
        #[serde(default, deserialize_with = "lenient_merchandise")]
        pub merchandise: Option<Merchandise>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: CartId,
        pub checkout_url: String,
        pub total_quantity: u32,
        pub note: Option<String>,
        pub cost: CartCost,
        pub discount_codes: Vec<CartDiscountCode>,
        pub applied_gift_cards: Vec<AppliedGiftCard>,
        pub lines: Nodes<CartLine>,
    }

    /// The `{ cart, userErrors }` payload shared by every cart mutation.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartPayload {
        pub cart: Option<Cart>,
        #[serde(default)]
        pub user_errors: Vec<CartUserError>,
    }

    fn lenient_merchandise<'de, D>(deserializer: D) -> Result<Option<Merchandise>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value.and_then(|value| serde_json::from_value(value).ok()))
    }
}

// =============================================================================
// Product Queries
// =============================================================================

pub struct GetProductByHandle;

pub mod get_product_by_handle {
    use super::{Deserialize, Serialize, wire};

    pub const OPERATION_NAME: &str = "GetProductByHandle";
    pub const QUERY: &str = concat!(
        product_detail_fragment!(),
        "query GetProductByHandle($handle: String!) { product(handle: $handle) { ...ProductDetail } }"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<wire::ProductDetail>,
    }
}

operation!(GetProductByHandle, get_product_by_handle);

pub struct GetProductCard;

pub mod get_product_card {
    use super::{Deserialize, Serialize, wire};

    pub const OPERATION_NAME: &str = "GetProductCard";
    pub const QUERY: &str = concat!(
        product_card_fragment!(),
        "query GetProductCard($handle: String!) { product(handle: $handle) { ...ProductCard } }"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<wire::ProductCard>,
    }
}

operation!(GetProductCard, get_product_card);

pub struct GetProducts;

pub mod get_products {
    use super::{Deserialize, Serialize, wire};
    use crate::shopify::types::ProductSortKey;

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = concat!(
        product_card_fragment!(),
        "query GetProducts($first: Int!, $after: String, $sortKey: ProductSortKeys, $reverse: Boolean) { ",
        "products(first: $first, after: $after, sortKey: $sortKey, reverse: $reverse) { ",
        "nodes { ...ProductCard } ",
        page_info!(),
        " } }"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub after: Option<String>,
        pub sort_key: ProductSortKey,
        pub reverse: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: wire::Connection<wire::ProductCard>,
    }
}

operation!(GetProducts, get_products);

// =============================================================================
// Collection Queries
// =============================================================================

pub struct GetCollectionByHandle;

pub mod get_collection_by_handle {
    use super::{Deserialize, Serialize, wire};

    pub const OPERATION_NAME: &str = "GetCollectionByHandle";
    pub const QUERY: &str = concat!(
        product_card_fragment!(),
        "query GetCollectionByHandle($handle: String!, $first: Int!, $after: String) { ",
        "collection(handle: $handle) { id handle title description descriptionHtml ",
        "image { ",
        image_fields!(),
        " } seo { title description } ",
        "products(first: $first, after: $after) { nodes { ...ProductCard } ",
        page_info!(),
        " } } }"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
        pub after: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<wire::CollectionDetail>,
    }
}

operation!(GetCollectionByHandle, get_collection_by_handle);

pub struct GetCollections;

pub mod get_collections {
    use super::{Deserialize, Serialize, wire};
    use crate::shopify::types::CollectionSortKey;

    pub const OPERATION_NAME: &str = "GetCollections";
    pub const QUERY: &str = concat!(
        "query GetCollections($first: Int!, $after: String, $sortKey: CollectionSortKeys, $reverse: Boolean) { ",
        "collections(first: $first, after: $after, sortKey: $sortKey, reverse: $reverse) { ",
        "nodes { id handle title description image { ",
        image_fields!(),
        " } } ",
        page_info!(),
        " } }"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub after: Option<String>,
        pub sort_key: CollectionSortKey,
        pub reverse: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: wire::Connection<wire::CollectionSummary>,
    }
}

operation!(GetCollections, get_collections);

// =============================================================================
// Cart Query
// =============================================================================

pub struct GetCart;

pub mod get_cart {
    use super::{CartId, Deserialize, Serialize, wire};

    pub const OPERATION_NAME: &str = "GetCart";
    pub const QUERY: &str = concat!(
        cart_fragment!(),
        "query GetCart($cartId: ID!) { cart(id: $cartId) { ...CartFields } }"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<wire::Cart>,
    }
}

operation!(GetCart, get_cart);

// =============================================================================
// Cart Mutations
// =============================================================================

/// A cart mutation whose response wraps a [`wire::CartPayload`].
pub trait CartMutation: GraphQLQuery {
    /// Human-readable action name for logs and fallback errors.
    const ACTION: &'static str;

    fn payload(data: Self::ResponseData) -> Option<wire::CartPayload>;
}

macro_rules! cart_mutation {
    (
        $name:ident, $module:ident, $field:literal, $action:literal,
        $signature:literal, $call:literal,
        { $($var:ident : $ty:ty),* $(,)? }
    ) => {
        pub struct $name;

        pub mod $module {
            #[allow(unused_imports)]
            use super::{CartId, CartLineId, GiftCardId, MerchandiseId};
            use super::{Deserialize, Serialize, wire};
            #[allow(unused_imports)]
            use crate::shopify::types::{CartLineInput, CartLineUpdateInput};

            pub const OPERATION_NAME: &str = stringify!($name);
            pub const QUERY: &str = concat!(
                cart_fragment!(),
                "mutation ",
                stringify!($name),
                $signature,
                " { ",
                $field,
                $call,
                " ",
                cart_payload!(),
                " }"
            );

            #[derive(Debug, Clone, Serialize)]
            #[serde(rename_all = "camelCase")]
            pub struct Variables {
                $(pub $var: $ty,)*
            }

            #[derive(Debug, Clone, Deserialize)]
            pub struct ResponseData {
                #[serde(rename = $field)]
                pub payload: Option<wire::CartPayload>,
            }
        }

        operation!($name, $module);

        impl CartMutation for $name {
            const ACTION: &'static str = $action;

            fn payload(data: Self::ResponseData) -> Option<wire::CartPayload> {
                data.payload
            }
        }
    };
}

cart_mutation!(
    CreateCart, create_cart, "cartCreate", "create cart",
    "($lines: [CartLineInput!])", "(input: { lines: $lines })",
    { lines: Vec<CartLineInput> }
);

cart_mutation!(
    CartLinesAdd, cart_lines_add, "cartLinesAdd", "add to cart",
    "($cartId: ID!, $lines: [CartLineInput!]!)", "(cartId: $cartId, lines: $lines)",
    { cart_id: CartId, lines: Vec<CartLineInput> }
);

cart_mutation!(
    CartLinesUpdate, cart_lines_update, "cartLinesUpdate", "update cart lines",
    "($cartId: ID!, $lines: [CartLineUpdateInput!]!)", "(cartId: $cartId, lines: $lines)",
    { cart_id: CartId, lines: Vec<CartLineUpdateInput> }
);

cart_mutation!(
    CartLinesRemove, cart_lines_remove, "cartLinesRemove", "remove cart lines",
    "($cartId: ID!, $lineIds: [ID!]!)", "(cartId: $cartId, lineIds: $lineIds)",
    { cart_id: CartId, line_ids: Vec<CartLineId> }
);

cart_mutation!(
    CartDiscountCodesUpdate, cart_discount_codes_update, "cartDiscountCodesUpdate",
    "update discount codes",
    "($cartId: ID!, $discountCodes: [String!])", "(cartId: $cartId, discountCodes: $discountCodes)",
    { cart_id: CartId, discount_codes: Vec<String> }
);

cart_mutation!(
    CartGiftCardCodesUpdate, cart_gift_card_codes_update, "cartGiftCardCodesUpdate",
    "update gift card codes",
    "($cartId: ID!, $giftCardCodes: [String!]!)", "(cartId: $cartId, giftCardCodes: $giftCardCodes)",
    { cart_id: CartId, gift_card_codes: Vec<String> }
);

cart_mutation!(
    CartGiftCardCodesRemove, cart_gift_card_codes_remove, "cartGiftCardCodesRemove",
    "remove gift cards",
    "($cartId: ID!, $appliedGiftCardIds: [ID!]!)",
    "(cartId: $cartId, appliedGiftCardIds: $appliedGiftCardIds)",
    { cart_id: CartId, applied_gift_card_ids: Vec<GiftCardId> }
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_sets_operation_name() {
        let body = GetProductCard::build_query(get_product_card::Variables {
            handle: "linen-shirt".to_string(),
        });
        assert_eq!(body.operation_name, "GetProductCard");
        assert!(body.query.starts_with("fragment ProductCard on Product"));
        assert!(body.query.contains("product(handle: $handle) { ...ProductCard }"));
    }

    #[test]
    fn test_mutation_variables_serialize_camel_case() {
        let body = CartLinesRemove::build_query(cart_lines_remove::Variables {
            cart_id: CartId::new("gid://shopify/Cart/1"),
            line_ids: vec![CartLineId::new("gid://shopify/CartLine/2")],
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "CartLinesRemove");
        assert_eq!(json["variables"]["cartId"], "gid://shopify/Cart/1");
        assert_eq!(json["variables"]["lineIds"][0], "gid://shopify/CartLine/2");
        assert!(
            body.query
                .contains("mutation CartLinesRemove($cartId: ID!, $lineIds: [ID!]!) { cartLinesRemove(cartId: $cartId, lineIds: $lineIds)")
        );
    }

    #[test]
    fn test_mutation_response_reads_named_payload() {
        let json = r#"{"cartDiscountCodesUpdate":{"cart":null,"userErrors":[{"code":"INVALID","field":["discountCodes"],"message":"Code is invalid"}]}}"#;
        let data: cart_discount_codes_update::ResponseData = serde_json::from_str(json).unwrap();
        let payload = CartDiscountCodesUpdate::payload(data).unwrap();
        assert!(payload.cart.is_none());
        assert_eq!(payload.user_errors[0].message, "Code is invalid");
    }

    #[test]
    fn test_cart_line_tolerates_non_variant_merchandise() {
        let json = r#"{
            "id": "gid://shopify/CartLine/1",
            "quantity": 2,
            "cost": {
                "amountPerQuantity": {"amount": "5.0", "currencyCode": "USD"},
                "compareAtAmountPerQuantity": null,
                "subtotalAmount": {"amount": "10.0", "currencyCode": "USD"},
                "totalAmount": {"amount": "10.0", "currencyCode": "USD"}
            },
            "merchandise": {}
        }"#;
        let line: wire::CartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.quantity, 2);
        assert!(line.merchandise.is_none());
    }
}
