//! JSON endpoints for managing products.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    Error,
    category::CategoryId,
    product::{
        NewProduct, PriceOrder, ProductId, ProductQuery, create_product, delete_products,
        get_all_products_with_category_names, get_products_page, set_products_enabled,
    },
    router::{RequestContext, RouteParams},
};

/// The query string for the paged product list.
///
/// Every field is optional. Filter values that are empty or zero mean "all
/// categories".
#[derive(Debug, Default, Deserialize)]
struct ListProductsParams {
    page: Option<String>,
    sort: Option<String>,
    filter: Option<String>,
    search: Option<String>,
}

impl ListProductsParams {
    fn into_query(self, default_page: u64) -> Result<ProductQuery, Error> {
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => default_page,
            Some(page) => page.parse().map_err(|_| {
                Error::InvalidRequestBody(format!("invalid page number \"{page}\""))
            })?,
        };

        let order = self.sort.as_deref().unwrap_or_default().parse::<PriceOrder>()?;

        let category_id = match self.filter.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(filter) => {
                let category_id: CategoryId = filter.parse().map_err(|_| {
                    Error::InvalidRequestBody(format!("invalid category filter \"{filter}\""))
                })?;

                (category_id != 0).then_some(category_id)
            }
        };

        Ok(ProductQuery {
            page,
            order,
            category_id,
            title_search: self.search,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProductIdsBody {
    #[serde(rename = "productIds", default)]
    product_ids: Vec<ProductId>,
}

#[derive(Debug, Deserialize)]
struct DeleteProductsBody {
    #[serde(default)]
    ids: Vec<ProductId>,
}

/// Every product with its category name.
pub fn get_products(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let connection = context.db_connection()?;
    let products = get_all_products_with_category_names(&connection)?;

    Ok(Json(products).into_response())
}

/// One page of products, filtered and sorted by the query string.
pub fn list_products(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let params: ListProductsParams = context.query_params()?;
    let query = params.into_query(context.state.pagination_config.default_page)?;

    let connection = context.db_connection()?;
    let page = get_products_page(&query, &context.state.pagination_config, &connection)?;

    Ok(Json(page).into_response())
}

/// Create a product from a JSON or form body.
pub fn add_product(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let new_product: NewProduct = context.body()?;

    let connection = context.db_connection()?;
    let product = create_product(new_product, &connection)?;
    tracing::info!("Created product {} ({})", product.id, product.sku);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Product added successfully",
            "id": product.id,
        })),
    )
        .into_response())
}

/// Show the listed products in the storefront.
pub fn enable_products(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    update_enabled(context, true)
}

/// Hide the listed products from the storefront.
pub fn disable_products(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    update_enabled(context, false)
}

fn update_enabled(context: &RequestContext, enabled: bool) -> Result<Response, Error> {
    let body: ProductIdsBody = context.json_body()?;

    let connection = context.db_connection()?;
    let updated = set_products_enabled(&body.product_ids, enabled, &connection)?;
    tracing::debug!("Set enabled={enabled} on {updated} products");

    Ok(Json(json!({ "status": "success" })).into_response())
}

/// Delete the listed products.
pub fn delete_product(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let body: DeleteProductsBody = context.json_body()?;

    let connection = context.db_connection()?;
    delete_products(&body.ids, &connection)?;
    tracing::info!("Deleted products {:?}", body.ids);

    Ok(Json(json!({
        "status": "success",
        "message": "Products deleted successfully",
    }))
    .into_response())
}
