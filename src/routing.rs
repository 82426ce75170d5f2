//! The route table and the axum router that serves it.

use std::sync::Arc;

use axum::{Router, http::Method, middleware, response::Response};

use crate::{
    AppState,
    auth::{admin_api_gate, admin_gate, get_log_in_page, get_log_out, post_log_in},
    category::{
        add_category, delete_category, get_all_categories, get_categories, get_category,
        update_category,
    },
    dashboard::{get_dashboard_page, get_dashboard_stats},
    endpoints,
    home::get_home_page,
    logging::logging_middleware,
    product::{
        add_product, delete_product, disable_products, enable_products, get_products,
        list_products,
    },
    router::{self, DispatchState, RequestContext, Route, dispatch_request},
};

/// The route table type used by the app.
pub type AppRouter = router::Router<RequestContext, Response>;

/// Register every route of the app, in matching order.
pub fn register_routes() -> AppRouter {
    let mut routes = AppRouter::new();

    routes
        .add_route(Route::new(Method::GET, endpoints::ROOT, "home", get_home_page))
        .add_route(Route::new(
            Method::GET,
            endpoints::LOG_IN_VIEW,
            "log_in_page",
            get_log_in_page,
        ))
        .add_route(Route::new(
            Method::POST,
            endpoints::LOG_IN_VIEW,
            "log_in",
            post_log_in,
        ))
        .add_route(Route::new(
            Method::GET,
            endpoints::LOG_OUT,
            "log_out",
            get_log_out,
        ));

    for (endpoint, name) in [
        (endpoints::ADMIN_VIEW, "admin"),
        (endpoints::DASHBOARD_VIEW, "dashboard"),
        (endpoints::CATEGORIES_VIEW, "categories_page"),
        (endpoints::PRODUCTS_VIEW, "products_page"),
    ] {
        routes.add_route(
            Route::new(Method::GET, endpoint, name, get_dashboard_page).with_middleware(admin_gate),
        );
    }

    let api_routes: [Route<RequestContext, Response>; 13] = [
        Route::new(
            Method::GET,
            endpoints::DASHBOARD_STATS,
            "dashboard_stats",
            get_dashboard_stats,
        ),
        Route::new(
            Method::GET,
            endpoints::GET_CATEGORIES,
            "get_categories",
            get_categories,
        ),
        Route::new(
            Method::GET,
            endpoints::GET_ALL_CATEGORIES,
            "get_all_categories",
            get_all_categories,
        ),
        Route::new(Method::GET, endpoints::CATEGORY, "get_category", get_category),
        Route::new(
            Method::POST,
            endpoints::ADD_CATEGORY,
            "add_category",
            add_category,
        ),
        Route::new(
            Method::PUT,
            endpoints::UPDATE_CATEGORY,
            "update_category",
            update_category,
        ),
        Route::new(
            Method::DELETE,
            endpoints::DELETE_CATEGORY,
            "delete_category",
            delete_category,
        ),
        Route::new(
            Method::GET,
            endpoints::GET_PRODUCTS,
            "get_products",
            get_products,
        ),
        Route::new(
            Method::GET,
            endpoints::LIST_PRODUCTS,
            "list_products",
            list_products,
        ),
        Route::new(
            Method::POST,
            endpoints::ADD_PRODUCT,
            "add_product",
            add_product,
        ),
        Route::new(
            Method::POST,
            endpoints::ENABLE_PRODUCTS,
            "enable_products",
            enable_products,
        ),
        Route::new(
            Method::POST,
            endpoints::DISABLE_PRODUCTS,
            "disable_products",
            disable_products,
        ),
        Route::new(
            Method::DELETE,
            endpoints::DELETE_PRODUCT,
            "delete_product",
            delete_product,
        ),
    ];

    for route in api_routes {
        routes.add_route(route.with_middleware(admin_api_gate));
    }

    routes
}

/// Return a router with all the app's routes.
///
/// Every request goes through [dispatch_request], which matches it against
/// the route table from [register_routes].
pub fn build_router(state: AppState) -> Router {
    let dispatch_state = DispatchState {
        app: state,
        routes: Arc::new(register_routes()),
    };

    Router::new()
        .fallback(dispatch_request)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(dispatch_state)
}
