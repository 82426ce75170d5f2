//! Products, their storage, and the JSON endpoints for managing them.

mod core;
mod endpoints;
mod query;

pub use core::{
    NewProduct, Product, ProductId, ProductWithCategory, count_products,
    count_products_for_category, create_product, create_product_table, delete_products,
    get_all_products_with_category_names, get_featured_products, most_viewed_product,
    set_products_enabled,
};
#[cfg(test)]
pub use core::get_product;
pub use endpoints::{
    add_product, delete_product, disable_products, enable_products, get_products, list_products,
};
pub use query::{PriceOrder, ProductQuery, get_products_page};
