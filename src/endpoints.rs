//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/:id', use [format_endpoint].

/// The storefront home page.
pub const ROOT: &str = "/";
/// The route for getting the log in page and for logging in.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for the client to log out the current admin.
pub const LOG_OUT: &str = "/logout";
/// The landing page of the admin dashboard.
pub const ADMIN_VIEW: &str = "/admin";
/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/admin/dashboard";
/// The dashboard page, scrolled to the category tree.
pub const CATEGORIES_VIEW: &str = "/admin/categories";
/// The dashboard page, scrolled to the product list.
pub const PRODUCTS_VIEW: &str = "/admin/products";

/// The dashboard statistics as JSON.
pub const DASHBOARD_STATS: &str = "/getDashboardStats";
/// The category tree as JSON.
pub const GET_CATEGORIES: &str = "/getCategories";
/// Every category without nesting as JSON.
pub const GET_ALL_CATEGORIES: &str = "/getAllCategories";
/// A single category and its subtree as JSON.
pub const CATEGORY: &str = "/categories/:id";
/// The route to create a category.
pub const ADD_CATEGORY: &str = "/addCategory";
/// The route to move a category.
pub const UPDATE_CATEGORY: &str = "/updateCategory";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/deleteCategory";
/// Every product with its category name as JSON.
pub const GET_PRODUCTS: &str = "/getProducts";
/// One page of products as JSON.
pub const LIST_PRODUCTS: &str = "/listProducts";
/// The route to create a product.
pub const ADD_PRODUCT: &str = "/addProduct";
/// The route to enable a set of products.
pub const ENABLE_PRODUCTS: &str = "/enableProducts";
/// The route to disable a set of products.
pub const DISABLE_PRODUCTS: &str = "/disableProducts";
/// The route to delete a set of products.
pub const DELETE_PRODUCT: &str = "/deleteProduct";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a path segment that starts with a colon, for example
/// ':id' in '/categories/:id'.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut replaced = false;

    endpoint_path
        .split('/')
        .map(|segment| {
            if !replaced && segment.len() > 1 && segment.starts_with(':') {
                replaced = true;
                id.to_string()
            } else {
                segment.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod endpoints_tests {
    use std::collections::HashSet;

    use crate::router::RoutePattern;

    use super::*;

    fn all_endpoints() -> Vec<&'static str> {
        vec![
            ROOT,
            LOG_IN_VIEW,
            LOG_OUT,
            ADMIN_VIEW,
            DASHBOARD_VIEW,
            CATEGORIES_VIEW,
            PRODUCTS_VIEW,
            DASHBOARD_STATS,
            GET_CATEGORIES,
            GET_ALL_CATEGORIES,
            CATEGORY,
            ADD_CATEGORY,
            UPDATE_CATEGORY,
            DELETE_CATEGORY,
            GET_PRODUCTS,
            LIST_PRODUCTS,
            ADD_PRODUCT,
            ENABLE_PRODUCTS,
            DISABLE_PRODUCTS,
            DELETE_PRODUCT,
        ]
    }

    #[test]
    fn endpoints_are_absolute_paths() {
        for endpoint in all_endpoints() {
            assert!(
                endpoint.starts_with('/'),
                "endpoint {endpoint} should start with a slash"
            );
            assert!(
                endpoint == ROOT || !endpoint.ends_with('/'),
                "endpoint {endpoint} should not end with a slash"
            );
        }
    }

    #[test]
    fn endpoints_are_unique() {
        let endpoints = all_endpoints();
        let unique: HashSet<_> = endpoints.iter().collect();

        assert_eq!(unique.len(), endpoints.len());
    }

    #[test]
    fn format_endpoint_replaces_parameter() {
        assert_eq!(format_endpoint(CATEGORY, 42), "/categories/42");
    }

    #[test]
    fn formatted_endpoint_matches_pattern() {
        let pattern = RoutePattern::compile(CATEGORY);
        let path = format_endpoint(CATEGORY, 7);

        let params = pattern.matches(&path).expect("formatted path should match");

        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn format_endpoint_without_parameter_is_unchanged() {
        assert_eq!(format_endpoint(GET_CATEGORIES, 1), GET_CATEGORIES);
    }
}
