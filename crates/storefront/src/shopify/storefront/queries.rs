//! GraphQL operation definitions for Shopify Storefront API.
//!
//! Each operation is a marker type implementing [`GraphQLQuery`] with its
//! document inlined, plus a module holding its `Variables` and
//! `ResponseData`. Response shapes mirror the Storefront schema exactly
//! (`edges`/`node`, camelCase); conversion into domain types happens in
//! `conversions`.

use graphql_client::{GraphQLQuery, QueryBody};
use iradah_core::CurrencyCode;
use rust_decimal::Decimal;
use serde::Deserialize;

// Fragments are string-literal macros so they can be spliced with `concat!`.
macro_rules! money_fields {
    () => {
        "fragment MoneyFields on MoneyV2 { amount currencyCode }\n"
    };
}

macro_rules! product_fields {
    () => {
        "fragment ProductFields on Product {
  id
  title
  description
  handle
  priceRange {
    minVariantPrice { ...MoneyFields }
    maxVariantPrice { ...MoneyFields }
  }
  images(first: $imageCount) {
    edges { node { url altText } }
  }
  variants(first: $variantCount) {
    edges {
      node {
        id
        title
        availableForSale
        price { ...MoneyFields }
        compareAtPrice { ...MoneyFields }
        selectedOptions { name value }
      }
    }
  }
  options { name values }
}
"
    };
}

// =============================================================================
// Shared response shapes
// =============================================================================

/// Relay-style connection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Edges<T> {
    pub edges: Vec<Edge<T>>,
}

/// Single edge in a connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyFields {
    pub amount: Decimal,
    pub currency_code: CurrencyCode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeFields {
    pub min_variant_price: MoneyFields,
    pub max_variant_price: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionFields {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionFields {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantFields {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: MoneyFields,
    pub compare_at_price: Option<MoneyFields>,
    pub selected_options: Vec<SelectedOptionFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub id: String,
    pub title: String,
    pub description: String,
    pub handle: String,
    pub price_range: PriceRangeFields,
    pub images: Edges<ImageFields>,
    pub variants: Edges<ProductVariantFields>,
    pub options: Vec<OptionFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoFields {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnectionFields {
    pub edges: Vec<Edge<ProductFields>>,
    pub page_info: PageInfoFields,
}

// =============================================================================
// Product queries
// =============================================================================

pub struct GetProducts;

pub mod get_products {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = concat!(
        "query GetProducts($first: Int!, $query: String, $imageCount: Int!, $variantCount: Int!) {
  products(first: $first, query: $query) {
    edges { node { ...ProductFields } }
    pageInfo { hasNextPage endCursor }
  }
}
",
        product_fields!(),
        money_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub query: Option<String>,
        pub image_count: i64,
        pub variant_count: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: super::ProductConnectionFields,
    }
}

impl GraphQLQuery for GetProducts {
    type Variables = get_products::Variables;
    type ResponseData = get_products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_products::QUERY,
            operation_name: get_products::OPERATION_NAME,
        }
    }
}

pub struct GetProductByHandle;

pub mod get_product_by_handle {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetProductByHandle";
    pub const QUERY: &str = concat!(
        "query GetProductByHandle($handle: String!, $imageCount: Int!, $variantCount: Int!) {
  product(handle: $handle) { ...ProductFields }
}
",
        product_fields!(),
        money_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub image_count: i64,
        pub variant_count: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<super::ProductFields>,
    }
}

impl GraphQLQuery for GetProductByHandle {
    type Variables = get_product_by_handle::Variables;
    type ResponseData = get_product_by_handle::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_product_by_handle::QUERY,
            operation_name: get_product_by_handle::OPERATION_NAME,
        }
    }
}

// =============================================================================
// Cart mutations
// =============================================================================

pub struct CreateCart;

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = concat!(
        "mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      id
      checkoutUrl
      totalQuantity
      cost { totalAmount { ...MoneyFields } }
    }
    userErrors { code field message }
  }
}
",
        money_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineInput {
        pub merchandise_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartCreatePayload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCreatePayload {
        pub cart: Option<CartFields>,
        pub user_errors: Vec<CartUserErrorFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartFields {
        pub id: String,
        pub checkout_url: String,
        pub total_quantity: i64,
        pub cost: Option<CartCostFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCostFields {
        pub total_amount: super::MoneyFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartUserErrorFields {
        pub code: Option<String>,
        pub field: Option<Vec<String>>,
        pub message: String,
    }
}

impl GraphQLQuery for CreateCart {
    type Variables = create_cart::Variables;
    type ResponseData = create_cart::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: create_cart::QUERY,
            operation_name: create_cart::OPERATION_NAME,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_fragments() {
        assert!(get_products::QUERY.contains("fragment ProductFields on Product"));
        assert!(get_products::QUERY.contains("fragment MoneyFields on MoneyV2"));
        assert!(get_product_by_handle::QUERY.contains("product(handle: $handle)"));
        assert!(create_cart::QUERY.contains("cartCreate(input: $input)"));
        assert!(!create_cart::QUERY.contains("ProductFields"));
    }

    #[test]
    fn test_variables_serialize_camel_case() {
        let body = GetProducts::build_query(get_products::Variables {
            first: 50,
            query: None,
            image_count: 5,
            variant_count: 10,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "GetProducts");
        assert_eq!(json["variables"]["first"], 50);
        assert_eq!(json["variables"]["imageCount"], 5);
        assert_eq!(json["variables"]["variantCount"], 10);
        assert!(json["variables"]["query"].is_null());
    }

    #[test]
    fn test_cart_input_serializes_merchandise_id() {
        let body = CreateCart::build_query(create_cart::Variables {
            input: create_cart::CartInput {
                lines: vec![create_cart::CartLineInput {
                    merchandise_id: "gid://shopify/ProductVariant/1".to_string(),
                    quantity: 2,
                }],
            },
        });
        let json = serde_json::to_value(&body).unwrap();
        let line = &json["variables"]["input"]["lines"][0];
        assert_eq!(line["merchandiseId"], "gid://shopify/ProductVariant/1");
        assert_eq!(line["quantity"], 2);
    }

    #[test]
    fn test_product_response_deserializes() {
        let json = serde_json::json!({
            "product": {
                "id": "gid://shopify/Product/1",
                "title": "Classic Hoodie",
                "description": "Heavyweight fleece.",
                "handle": "classic-hoodie",
                "priceRange": {
                    "minVariantPrice": { "amount": "4500.0", "currencyCode": "PKR" },
                    "maxVariantPrice": { "amount": "5200.0", "currencyCode": "PKR" }
                },
                "images": { "edges": [ { "node": { "url": "https://cdn.example/h.jpg", "altText": null } } ] },
                "variants": { "edges": [ { "node": {
                    "id": "gid://shopify/ProductVariant/11",
                    "title": "M / Black",
                    "availableForSale": true,
                    "price": { "amount": "4500.0", "currencyCode": "PKR" },
                    "compareAtPrice": null,
                    "selectedOptions": [ { "name": "Size", "value": "M" } ]
                } } ] },
                "options": [ { "name": "Size", "values": ["S", "M", "L"] } ]
            }
        });

        let data: get_product_by_handle::ResponseData = serde_json::from_value(json).unwrap();
        let product = data.product.unwrap();
        assert_eq!(product.handle, "classic-hoodie");
        assert_eq!(product.price_range.min_variant_price.amount, Decimal::new(4500, 0));
        assert_eq!(product.variants.edges.len(), 1);
    }
}
