//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation implements `graphql_client::GraphQLQuery` by hand: the
//! query text lives here next to the serde types for its variables and
//! response, so the request envelope and response parsing still go through
//! `graphql_client`. Response types mirror Shopify's camelCase JSON and are
//! converted to domain types in `conversions`.

use graphql_client::{GraphQLQuery, QueryBody};

// Fragments are macros so `concat!` can splice them into each query.
// GraphQL rejects unused fragments, so each query pulls in only what it
// spreads.

macro_rules! money_fields {
    () => {
        "fragment MoneyFields on MoneyV2 { amount currencyCode }\n"
    };
}

macro_rules! image_fields {
    () => {
        "fragment ImageFields on Image { id url altText width height }\n"
    };
}

macro_rules! variant_fields {
    () => {
        "fragment VariantFields on ProductVariant {
  id
  title
  availableForSale
  sku
  price { ...MoneyFields }
  compareAtPrice { ...MoneyFields }
  selectedOptions { name value }
  image { ...ImageFields }
}
"
    };
}

macro_rules! product_summary_fields {
    () => {
        "fragment ProductSummaryFields on Product {
  id
  handle
  title
  images(first: 2) { nodes { ...ImageFields } }
  priceRange {
    minVariantPrice { ...MoneyFields }
    maxVariantPrice { ...MoneyFields }
  }
  variants(first: 1) { nodes { selectedOptions { name value } } }
}
"
    };
}

macro_rules! cart_fields {
    () => {
        "fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount { ...MoneyFields }
    totalAmount { ...MoneyFields }
  }
  lines(first: 100) {
    nodes {
      id
      quantity
      cost {
        amountPerQuantity { ...MoneyFields }
        totalAmount { ...MoneyFields }
        compareAtAmountPerQuantity { ...MoneyFields }
      }
      merchandise {
        ... on ProductVariant {
          id
          title
          selectedOptions { name value }
          image { ...ImageFields }
          product { id handle title }
        }
      }
    }
  }
}
"
    };
}

macro_rules! page_info_fields {
    () => {
        "pageInfo { hasNextPage hasPreviousPage startCursor endCursor }"
    };
}

macro_rules! operation {
    ($(#[$meta:meta])* $name:ident, $module:ident, $query:expr) => {
        $(#[$meta])*
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $query,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

// =============================================================================
// Shared response shapes
// =============================================================================

/// Response shapes shared between operations (the fragment types).
pub mod raw {
    use rust_decimal::Decimal;
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyV2 {
        #[serde(with = "rust_decimal::serde::str")]
        pub amount: Decimal,
        pub currency_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Image {
        pub id: Option<String>,
        pub url: String,
        pub alt_text: Option<String>,
        pub width: Option<i64>,
        pub height: Option<i64>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SelectedOption {
        pub name: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Nodes<T> {
        pub nodes: Vec<T>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Connection<T> {
        pub nodes: Vec<T>,
        pub page_info: PageInfo,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageInfo {
        pub has_next_page: bool,
        pub has_previous_page: bool,
        pub start_cursor: Option<String>,
        pub end_cursor: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variant {
        pub id: String,
        pub title: String,
        pub available_for_sale: bool,
        pub sku: Option<String>,
        pub price: MoneyV2,
        pub compare_at_price: Option<MoneyV2>,
        pub selected_options: Vec<SelectedOption>,
        pub image: Option<Image>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OptionValue {
        pub name: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductOption {
        pub name: String,
        pub option_values: Vec<OptionValue>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Seo {
        pub title: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRange {
        pub min_variant_price: MoneyV2,
        pub max_variant_price: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantOptions {
        pub selected_options: Vec<SelectedOption>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductSummary {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub images: Nodes<Image>,
        pub price_range: PriceRange,
        pub variants: Nodes<VariantOptions>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCost {
        pub subtotal_amount: MoneyV2,
        pub total_amount: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineCost {
        pub amount_per_quantity: MoneyV2,
        pub total_amount: MoneyV2,
        pub compare_at_amount_per_quantity: Option<MoneyV2>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MerchandiseProduct {
        pub id: String,
        pub handle: String,
        pub title: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Merchandise {
        pub id: String,
        pub title: String,
        pub selected_options: Vec<SelectedOption>,
        pub image: Option<Image>,
        pub product: MerchandiseProduct,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLine {
        pub id: String,
        pub quantity: i64,
        pub cost: CartLineCost,
        pub merchandise: Merchandise,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: String,
        pub checkout_url: String,
        pub total_quantity: i64,
        pub cost: CartCost,
        pub lines: Nodes<CartLine>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct UserError {
        pub code: Option<String>,
        pub field: Option<Vec<String>>,
        pub message: String,
    }

    /// Payload shared by every cart mutation.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartPayload {
        pub cart: Option<Cart>,
        pub user_errors: Vec<UserError>,
    }

    /// Line input shared by `cartCreate` and `cartLinesAdd`.
    #[derive(Debug, Clone, serde::Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineInput {
        pub merchandise_id: String,
        pub quantity: i64,
    }
}

// =============================================================================
// Product queries
// =============================================================================

operation!(
    /// Fetch a product with its options, images and first page of variants.
    GetProduct,
    get_product,
    concat!(
        "query GetProduct($handle: String!, $variantCount: Int!) {
  product(handle: $handle) {
    id
    handle
    title
    vendor
    description
    descriptionHtml
    seo { title description }
    options { name optionValues { name } }
    images(first: 20) { nodes { ...ImageFields } }
    variants(first: $variantCount) {
      nodes { ...VariantFields }
      ",
        page_info_fields!(),
        "
    }
  }
}
",
        variant_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod get_product {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub variant_count: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Product {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub vendor: String,
        pub description: String,
        pub description_html: String,
        pub seo: Option<raw::Seo>,
        pub options: Vec<raw::ProductOption>,
        pub images: raw::Nodes<raw::Image>,
        pub variants: raw::Connection<raw::Variant>,
    }
}

operation!(
    /// Fetch the next page of a product's variants.
    GetProductVariants,
    get_product_variants,
    concat!(
        "query GetProductVariants($handle: String!, $first: Int!, $after: String) {
  product(handle: $handle) {
    variants(first: $first, after: $after) {
      nodes { ...VariantFields }
      ",
        page_info_fields!(),
        "
    }
  }
}
",
        variant_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod get_product_variants {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
        pub after: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductVariants>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductVariants {
        pub variants: raw::Connection<raw::Variant>,
    }
}

operation!(
    /// Fetch products Shopify recommends alongside a product.
    GetProductRecommendations,
    get_product_recommendations,
    concat!(
        "query GetProductRecommendations($productId: ID!, $intent: ProductRecommendationIntent) {
  productRecommendations(productId: $productId, intent: $intent) {
    ...ProductSummaryFields
  }
}
",
        product_summary_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod get_product_recommendations {
    use serde::{Deserialize, Serialize};

    use super::raw;
    use crate::shopify::types::ProductRecommendationIntent;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub product_id: String,
        pub intent: ProductRecommendationIntent,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_recommendations: Option<Vec<raw::ProductSummary>>,
    }
}

// =============================================================================
// Collection queries
// =============================================================================

operation!(
    /// Fetch a collection with one page of its products.
    GetCollection,
    get_collection,
    concat!(
        "query GetCollection($handle: String!, $first: Int, $last: Int, $startCursor: String, $endCursor: String) {
  collection(handle: $handle) {
    id
    handle
    title
    description
    products(first: $first, last: $last, before: $startCursor, after: $endCursor) {
      nodes { ...ProductSummaryFields }
      ",
        page_info_fields!(),
        "
    }
  }
}
",
        product_summary_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod get_collection {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub first: Option<i64>,
        pub last: Option<i64>,
        pub start_cursor: Option<String>,
        pub end_cursor: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<Collection>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Collection {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub description: String,
        pub products: raw::Connection<raw::ProductSummary>,
    }
}

// =============================================================================
// Cart operations
// =============================================================================

operation!(
    /// Create a cart, optionally with initial lines.
    CreateCart,
    create_cart,
    concat!(
        "mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<raw::CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<raw::CartPayload>,
    }
}

operation!(
    /// Read a cart.
    GetCart,
    get_cart,
    concat!(
        "query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
",
        cart_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod get_cart {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<raw::Cart>,
    }
}

operation!(
    /// Add lines to a cart.
    CartLinesAdd,
    cart_lines_add,
    concat!(
        "mutation CartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod cart_lines_add {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<raw::CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<raw::CartPayload>,
    }
}

operation!(
    /// Set the quantity of existing lines.
    CartLinesUpdate,
    cart_lines_update,
    concat!(
        "mutation CartLinesUpdate($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod cart_lines_update {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartLineUpdateInput {
        pub id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<raw::CartPayload>,
    }
}

operation!(
    /// Remove lines from a cart.
    CartLinesRemove,
    cart_lines_remove,
    concat!(
        "mutation CartLinesRemove($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields!(),
        money_fields!(),
        image_fields!()
    )
);

pub mod cart_lines_remove {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<raw::CartPayload>,
    }
}

// =============================================================================
// Customer mutations
// =============================================================================

operation!(
    /// Create a customer with marketing consent (newsletter signup).
    CustomerCreate,
    customer_create,
    "mutation CustomerCreate($input: CustomerCreateInput!) {
  customerCreate(input: $input) {
    customer { id email acceptsMarketing }
    customerUserErrors { code field message }
  }
}
"
);

pub mod customer_create {
    use serde::{Deserialize, Serialize};

    use super::raw;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CustomerCreateInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerCreateInput {
        pub email: String,
        pub password: String,
        pub accepts_marketing: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub customer_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub customer: Option<Customer>,
        pub customer_user_errors: Vec<raw::UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Customer {
        pub id: String,
        pub email: Option<String>,
        pub accepts_marketing: bool,
    }
}
