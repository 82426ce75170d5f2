//! Matches requests to registered routes and runs them through their middleware.
//!
//! Routes are tried in the order they were added and the first route whose
//! method and pattern both match wins. More specific patterns get no
//! precedence, so register them first if they overlap.

mod context;
mod dispatch;
mod pattern;

use std::{fmt::Debug, sync::Arc};

use axum::http::Method;

use crate::Error;

pub use context::RequestContext;
pub use dispatch::{DispatchState, dispatch_request};
pub(crate) use dispatch::MAX_BODY_SIZE;
pub use pattern::{RouteParams, RoutePattern};

/// A function that handles a matched request.
pub type Handler<C, T> = Arc<dyn Fn(&mut C, &RouteParams) -> Result<T, Error> + Send + Sync>;

/// A gate that runs before the handler. Returning an error stops the request.
pub type Middleware<C> = Arc<dyn Fn(&mut C) -> Result<(), Error> + Send + Sync>;

/// A registered route: method, pattern, the handler and its middleware.
pub struct Route<C, T> {
    method: Method,
    pattern: RoutePattern,
    name: &'static str,
    handler: Handler<C, T>,
    middlewares: Vec<Middleware<C>>,
}

impl<C, T> Route<C, T> {
    /// Create a route without any middleware.
    ///
    /// `name` identifies the handler in logs.
    pub fn new(
        method: Method,
        pattern: &str,
        name: &'static str,
        handler: impl Fn(&mut C, &RouteParams) -> Result<T, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method,
            pattern: RoutePattern::compile(pattern),
            name,
            handler: Arc::new(handler),
            middlewares: Vec::new(),
        }
    }

    /// Append `middleware` to the route. Middleware runs in the order it is added.
    pub fn with_middleware(
        mut self,
        middleware: impl Fn(&mut C) -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// The HTTP method of the route.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL pattern of the route.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The name of the handler.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<C, T> Debug for Route<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("name", &self.name)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// An ordered table of routes.
///
/// `C` is the per-request context that handlers and middleware read and
/// mutate, `T` is what a handler produces.
pub struct Router<C, T> {
    routes: Vec<Route<C, T>>,
}

impl<C, T> Default for Router<C, T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<C, T> Router<C, T> {
    /// Create a router with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` after all existing routes.
    pub fn add_route(&mut self, route: Route<C, T>) -> &mut Self {
        tracing::debug!(
            "Registered route {} {} -> {}",
            route.method,
            route.pattern,
            route.name
        );
        self.routes.push(route);
        self
    }

    /// The registered routes in the order they are tried.
    pub fn routes(&self) -> &[Route<C, T>] {
        &self.routes
    }

    /// Find the first route that matches `method` and `path`.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<(&Route<C, T>, RouteParams)> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    /// Run the request through the matching route's middleware and then its handler.
    ///
    /// # Errors
    ///
    /// - [Error::RouteNotFound] if no route matches.
    /// - The first error returned by a middleware, in which case the handler is not called.
    /// - Any error returned by the handler.
    pub fn dispatch(&self, method: &Method, path: &str, context: &mut C) -> Result<T, Error> {
        let Some((route, params)) = self.match_route(method, path) else {
            tracing::debug!("No route matches {method} {path}");
            return Err(Error::RouteNotFound {
                method: method.to_string(),
                path: path.to_owned(),
            });
        };

        tracing::debug!("Matched {method} {path} to {} ({})", route.pattern, route.name);

        for middleware in &route.middlewares {
            if let Err(error) = middleware(context) {
                tracing::debug!("Middleware stopped {method} {path}: {error}");
                return Err(error);
            }
        }

        (route.handler)(context, &params)
    }
}

impl<C, T> Debug for Router<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).finish()
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use axum::http::Method;

    use crate::{
        Error,
        router::{Route, RouteParams, Router},
    };

    /// Records which middleware and handlers ran, in order.
    #[derive(Default)]
    struct TestContext {
        log: Vec<String>,
    }

    fn named_handler(
        name: &'static str,
    ) -> impl Fn(&mut TestContext, &RouteParams) -> Result<String, Error> + Send + Sync + 'static
    {
        move |context, _| {
            context.log.push(name.to_owned());
            Ok(name.to_owned())
        }
    }

    #[test]
    fn first_registered_route_wins() {
        let mut router = Router::new();
        router
            .add_route(Route::new(Method::GET, "/x/:id", "R1", named_handler("R1")))
            .add_route(Route::new(Method::GET, "/x/static", "R2", named_handler("R2")));

        let got = router.dispatch(&Method::GET, "/x/static", &mut TestContext::default());

        assert_eq!(got, Ok("R1".to_owned()));
    }

    #[test]
    fn static_route_wins_when_registered_first() {
        let mut router = Router::new();
        router
            .add_route(Route::new(Method::GET, "/x/static", "R2", named_handler("R2")))
            .add_route(Route::new(Method::GET, "/x/:id", "R1", named_handler("R1")));

        assert_eq!(
            router.dispatch(&Method::GET, "/x/static", &mut TestContext::default()),
            Ok("R2".to_owned())
        );
        assert_eq!(
            router.dispatch(&Method::GET, "/x/7", &mut TestContext::default()),
            Ok("R1".to_owned())
        );
    }

    #[test]
    fn method_must_match() {
        let mut router = Router::new();
        router
            .add_route(Route::new(Method::POST, "/login", "post", named_handler("post")))
            .add_route(Route::new(Method::GET, "/login", "get", named_handler("get")));

        assert_eq!(
            router.dispatch(&Method::GET, "/login", &mut TestContext::default()),
            Ok("get".to_owned())
        );
        assert_eq!(
            router.dispatch(&Method::DELETE, "/login", &mut TestContext::default()),
            Err(Error::RouteNotFound {
                method: "DELETE".to_owned(),
                path: "/login".to_owned()
            })
        );
    }

    #[test]
    fn unknown_path_is_not_found() {
        let router: Router<TestContext, String> = Router::new();

        let got = router.dispatch(&Method::GET, "/nope", &mut TestContext::default());

        assert!(matches!(got, Err(Error::RouteNotFound { .. })));
    }

    #[test]
    fn handler_receives_params() {
        let mut router = Router::new();
        router.add_route(Route::new(
            Method::GET,
            "/categories/:id",
            "get_category",
            |_: &mut TestContext, params: &RouteParams| params.parse::<i64>("id"),
        ));

        assert_eq!(
            router.dispatch(&Method::GET, "/categories/12", &mut TestContext::default()),
            Ok(12)
        );
    }

    #[test]
    fn middleware_runs_in_order_before_handler() {
        let mut router = Router::new();
        router.add_route(
            Route::new(Method::GET, "/admin", "admin", named_handler("handler"))
                .with_middleware(|context: &mut TestContext| {
                    context.log.push("first".to_owned());
                    Ok(())
                })
                .with_middleware(|context: &mut TestContext| {
                    context.log.push("second".to_owned());
                    Ok(())
                }),
        );
        let mut context = TestContext::default();

        router.dispatch(&Method::GET, "/admin", &mut context).unwrap();

        assert_eq!(context.log, vec!["first", "second", "handler"]);
    }

    #[test]
    fn failing_middleware_stops_dispatch() {
        let handler_called = Arc::new(AtomicBool::new(false));
        let second_called = Arc::new(Mutex::new(false));
        let mut router = Router::new();
        {
            let handler_called = handler_called.clone();
            let second_called = second_called.clone();
            router.add_route(
                Route::new(
                    Method::GET,
                    "/admin",
                    "admin",
                    move |_: &mut TestContext, _: &RouteParams| {
                        handler_called.store(true, Ordering::SeqCst);
                        Ok("handled".to_owned())
                    },
                )
                .with_middleware(|_: &mut TestContext| Err(Error::NotAuthenticated))
                .with_middleware(move |_: &mut TestContext| {
                    *second_called.lock().unwrap() = true;
                    Ok(())
                }),
            );
        }

        let got = router.dispatch(&Method::GET, "/admin", &mut TestContext::default());

        assert_eq!(got, Err(Error::NotAuthenticated));
        assert!(!handler_called.load(Ordering::SeqCst));
        assert!(!*second_called.lock().unwrap());
    }

    #[test]
    fn match_route_reports_route_name() {
        let mut router: Router<TestContext, String> = Router::new();
        router.add_route(Route::new(Method::GET, "/", "home", named_handler("home")));

        let (route, params) = router.match_route(&Method::GET, "/").unwrap();

        assert_eq!(route.name(), "home");
        assert_eq!(route.pattern().as_str(), "/");
        assert!(params.is_empty());
        assert_eq!(router.routes().len(), 1);
    }
}
