//! Product type conversion functions.

use iradah_core::{Handle, Price, ProductId, VariantId};

use crate::shopify::types::{
    Image, PageInfo, PriceRange, Product, ProductConnection, ProductOption, ProductVariant,
    SelectedOption,
};

use super::super::queries::{
    ImageFields, MoneyFields, ProductConnectionFields, ProductFields, ProductVariantFields,
};

pub fn convert_money(money: MoneyFields) -> Price {
    Price::new(money.amount, money.currency_code)
}

fn convert_image(image: ImageFields) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
    }
}

fn convert_variant(variant: ProductVariantFields) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        price: convert_money(variant.price),
        compare_at_price: variant.compare_at_price.map(convert_money),
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
    }
}

pub fn convert_product(product: ProductFields) -> Product {
    Product {
        id: ProductId::new(product.id),
        handle: Handle::new(product.handle),
        title: product.title,
        description: product.description,
        price_range: PriceRange {
            min_variant_price: convert_money(product.price_range.min_variant_price),
            max_variant_price: convert_money(product.price_range.max_variant_price),
        },
        images: product
            .images
            .edges
            .into_iter()
            .map(|e| convert_image(e.node))
            .collect(),
        options: product
            .options
            .into_iter()
            .map(|o| ProductOption {
                name: o.name,
                values: o.values,
            })
            .collect(),
        variants: product
            .variants
            .edges
            .into_iter()
            .map(|e| convert_variant(e.node))
            .collect(),
    }
}

pub fn convert_product_connection(connection: ProductConnectionFields) -> ProductConnection {
    ProductConnection {
        products: connection
            .edges
            .into_iter()
            .map(|e| convert_product(e.node))
            .collect(),
        page_info: PageInfo {
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        },
    }
}
