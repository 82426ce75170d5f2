//! The admin dashboard: the statistics endpoint and the dashboard page.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    category::{CategoryHierarchy, CategoryNode, SqliteCategoryRepository},
    endpoints::{self, format_endpoint},
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        admin_nav_bar, base, format_price,
    },
    product::{
        ProductWithCategory, count_products, get_all_products_with_category_names,
        most_viewed_product,
    },
    router::{RequestContext, RouteParams},
    statistics::get_home_view_count,
};

/// The numbers shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// The number of products.
    pub product_count: u64,
    /// The number of categories.
    pub category_count: u64,
    /// The number of home page views.
    pub home_page_view_count: u64,
    /// The title of the most viewed product, if there are any products.
    pub most_viewed_product: Option<String>,
    /// The view count of the most viewed product.
    pub most_viewed_product_count: u64,
}

/// Gather the dashboard statistics.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_stats(connection: &Connection) -> Result<DashboardStats, Error> {
    let most_viewed = most_viewed_product(connection)?;

    Ok(DashboardStats {
        product_count: count_products(connection)?,
        category_count: CategoryHierarchy::new(SqliteCategoryRepository::new(connection))
            .count()?,
        home_page_view_count: get_home_view_count(connection)?,
        most_viewed_product_count: most_viewed
            .as_ref()
            .map(|product| product.view_count)
            .unwrap_or_default(),
        most_viewed_product: most_viewed.map(|product| product.title),
    })
}

/// The dashboard statistics as JSON.
pub fn get_dashboard_stats(
    context: &mut RequestContext,
    _: &RouteParams,
) -> Result<Response, Error> {
    let connection = context.db_connection()?;

    Ok(Json(get_stats(&connection)?).into_response())
}

/// Display the dashboard with the statistics, the category tree and the products.
///
/// The same page serves every admin view, the navigation highlights the
/// requested one.
pub fn get_dashboard_page(
    context: &mut RequestContext,
    _: &RouteParams,
) -> Result<Response, Error> {
    let connection = context.db_connection()?;

    let stats = get_stats(&connection)?;
    let categories =
        CategoryHierarchy::new(SqliteCategoryRepository::new(&connection)).list_with_subtree()?;
    let products = get_all_products_with_category_names(&connection)?;

    let active_endpoint = if context.path == endpoints::ADMIN_VIEW {
        endpoints::DASHBOARD_VIEW
    } else {
        context.path.as_str()
    };

    Ok(dashboard_view(active_endpoint, &stats, &categories, &products).into_response())
}

fn dashboard_view(
    active_endpoint: &str,
    stats: &DashboardStats,
    categories: &[CategoryNode],
    products: &[ProductWithCategory],
) -> Markup {
    let content = html! {
        (admin_nav_bar(active_endpoint))

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-semibold mb-6" { "Dashboard" }

            (stats_view(stats))
            (category_tree_view(categories))
            (products_table(products))
        }
    };

    base("Dashboard", &content)
}

fn stats_view(stats: &DashboardStats) -> Markup {
    let cards = [
        ("Products", stats.product_count.to_string()),
        ("Categories", stats.category_count.to_string()),
        ("Home page views", stats.home_page_view_count.to_string()),
        (
            "Most viewed product",
            match &stats.most_viewed_product {
                Some(title) => format!("{title} ({} views)", stats.most_viewed_product_count),
                None => "No products yet".to_owned(),
            },
        ),
    ];

    html! {
        section id="stats" class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 w-full"
        {
            @for (label, value) in cards {
                div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 rounded-lg p-4 shadow-md"
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { (label) }
                    p class="text-xl font-semibold" { (value) }
                }
            }
        }
    }
}

fn category_tree_view(categories: &[CategoryNode]) -> Markup {
    html! {
        section id="categories" class="w-full mt-8"
        {
            h2 class="text-xl font-semibold mb-4" { "Categories" }

            @if categories.is_empty() {
                p { "No categories yet." }
            } @else {
                (category_list(categories))
            }
        }
    }
}

fn category_list(nodes: &[CategoryNode]) -> Markup {
    html! {
        ul class="pl-4 list-disc"
        {
            @for node in nodes {
                li data-category-id=(node.category.id)
                {
                    a
                        href=(format_endpoint(endpoints::CATEGORY, node.category.id))
                        class="font-medium hover:underline"
                    {
                        (node.category.title)
                    }
                    " "
                    span class="text-sm text-gray-500" { "(" (node.category.code.as_ref()) ")" }

                    @if !node.subcategories.is_empty() {
                        (category_list(&node.subcategories))
                    }
                }
            }
        }
    }
}

fn products_table(products: &[ProductWithCategory]) -> Markup {
    html! {
        section id="products" class="w-full mt-8"
        {
            h2 class="text-xl font-semibold mb-4" { "Products" }

            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "SKU" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Enabled" }
                    }
                }

                tbody
                {
                    @for row in products {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (row.product.sku) }
                            td class=(TABLE_CELL_STYLE) { (row.product.title) }
                            td class=(TABLE_CELL_STYLE) { (row.category_name) }
                            td class=(TABLE_CELL_STYLE) { (format_price(row.product.price)) }
                            td class=(TABLE_CELL_STYLE) { @if row.product.enabled { "Yes" } @else { "No" } }
                        }
                    }

                    @if products.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class=(TABLE_CELL_STYLE) { "No products yet." }
                        }
                    }
                }
            }
        }
    }
}
