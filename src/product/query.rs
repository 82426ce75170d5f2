//! Database query helpers for the paged product list.

use std::str::FromStr;

use rusqlite::{Connection, named_params};
use serde::Serialize;

use crate::{
    Error,
    category::CategoryId,
    db::count_from_row,
    pagination::PaginationConfig,
    product::core::{PRODUCT_COLUMNS, Product, map_row},
};

/// The order to sort products by price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceOrder {
    /// Cheapest first.
    #[default]
    Ascending,
    /// Most expensive first.
    Descending,
}

impl FromStr for PriceOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(Error::InvalidRequestBody(format!(
                "unknown sort order \"{other}\", expected \"asc\" or \"desc\""
            ))),
        }
    }
}

/// Which page of products to get and how to filter them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// The page to get, starting at one.
    pub page: u64,
    /// The price order.
    pub order: PriceOrder,
    /// Only include products directly in this category.
    pub category_id: Option<CategoryId>,
    /// Only include products whose title contains this text.
    pub title_search: Option<String>,
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    /// The products on this page.
    pub products: Vec<Product>,
    /// The number of pages for the whole filtered list.
    pub total_pages: u64,
    /// The page number of this page.
    pub current_page: u64,
}

/// Get one page of products sorted by price.
///
/// Products with the same price are ordered by ID to keep pages stable.
/// Pages past the end are clamped to the last page.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Product row mapping fails
pub fn get_products_page(
    query: &ProductQuery,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<ProductPage, Error> {
    let search = query
        .title_search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(escape_like);
    let filter_clause = "WHERE (:category_id IS NULL OR category_id = :category_id) \
        AND (:search IS NULL OR title LIKE '%' || :search || '%' ESCAPE '\\')";

    let item_count = connection
        .prepare(&format!("SELECT COUNT(id) FROM product {filter_clause}"))?
        .query_row(
            named_params! {
                ":category_id": query.category_id,
                ":search": search,
            },
            count_from_row,
        )?;

    let total_pages = pagination_config.page_count(item_count);
    let page = query.page.clamp(1, total_pages);
    let limit = i64::try_from(pagination_config.page_size).unwrap_or(i64::MAX);
    let offset = i64::try_from(pagination_config.offset(page)).unwrap_or(i64::MAX);

    let order_clause = match query.order {
        PriceOrder::Ascending => "ORDER BY price ASC",
        PriceOrder::Descending => "ORDER BY price DESC",
    };

    let products = connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product {filter_clause} \
            {order_clause}, id ASC LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":category_id": query.category_id,
                ":search": search,
                ":limit": limit,
                ":offset": offset,
            },
            map_row,
        )?
        .map(|maybe_product| maybe_product.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProductPage {
        products,
        total_pages,
        current_page: page,
    })
}

/// Escape the `LIKE` wildcards in `text` so it only matches itself.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
