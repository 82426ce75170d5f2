//! The storefront home page.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    Error,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_price},
    product::{Product, get_featured_products},
    router::{RequestContext, RouteParams},
    statistics::increment_home_view_count,
};

/// Count the visit and display the featured products.
pub fn get_home_page(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let connection = context.db_connection()?;

    increment_home_view_count(&connection)?;
    let products = get_featured_products(&connection)?;

    Ok(home_view(&products).into_response())
}

fn home_view(products: &[Product]) -> Markup {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-6" { "Featured products" }

            @if products.is_empty() {
                p { "Check back soon for new arrivals." }
            } @else {
                div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-6 w-full"
                {
                    @for product in products {
                        (product_card(product))
                    }
                }
            }

            a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Admin log in" }
        }
    };

    base("Home", &content)
}

fn product_card(product: &Product) -> Markup {
    html! {
        article class="bg-white dark:bg-gray-800 rounded-lg p-4 shadow-md"
        {
            h2 class="text-xl font-semibold" { (product.title) }

            @if let Some(brand) = &product.brand {
                p class="text-sm text-gray-500" { (brand) }
            }

            @if let Some(short_description) = &product.short_description {
                p { (short_description) }
            }

            p class="mt-2 font-bold" { (format_price(product.price)) }
        }
    }
}

#[cfg(test)]
mod home_page_tests {
    use axum::http::{Method, StatusCode};
    use scraper::Selector;

    use crate::{
        category::{CategoryHierarchy, NewCategory, SqliteCategoryRepository},
        home::get_home_page,
        product::{NewProduct, create_product},
        router::RouteParams,
        statistics::get_home_view_count,
        test_utils::{assert_valid_html, get_test_app_state, parse_html_document, request_context},
    };

    #[tokio::test]
    async fn home_page_lists_featured_products() {
        let state = get_test_app_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let toys = CategoryHierarchy::new(SqliteCategoryRepository::new(&connection))
                .create_category(NewCategory::new("TOYS", "Toys", None, None).unwrap())
                .unwrap();
            create_product(
                NewProduct::new_unchecked("TOY001", "Blocks", toys, 19.99).featured(true),
                &connection,
            )
            .unwrap();
            create_product(
                NewProduct::new_unchecked("TOY002", "Puzzle", toys, 9.99),
                &connection,
            )
            .unwrap();
        }
        let mut context = request_context(&state, Method::GET, "/", "");

        let response = get_home_page(&mut context, &RouteParams::default()).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let titles: Vec<String> = html
            .select(&Selector::parse("article h2").unwrap())
            .map(|title| title.text().collect())
            .collect();
        assert_eq!(titles, ["Blocks"]);
        let price = html
            .select(&Selector::parse("article p").unwrap())
            .last()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(price, "$19.99");
    }

    #[test]
    fn each_visit_is_counted() {
        let state = get_test_app_state();

        for _ in 0..3 {
            let mut context = request_context(&state, Method::GET, "/", "");
            get_home_page(&mut context, &RouteParams::default()).unwrap();
        }

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_home_view_count(&connection), Ok(3));
    }
}
