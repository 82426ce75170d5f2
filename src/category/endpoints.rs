//! JSON endpoints for reading and changing the category tree.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    Error,
    category::{CategoryHierarchy, CategoryId, NewCategory, SqliteCategoryRepository},
    router::{RequestContext, RouteParams},
};

/// A parent reference as sent by the admin UI.
///
/// The UI sends either an ID, the ID as a string, or "root" for no parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ParentField {
    Id(CategoryId),
    Text(String),
}

/// Turn an optional parent reference into a parent ID, `None` meaning root.
fn parse_parent(parent: Option<ParentField>) -> Result<Option<CategoryId>, Error> {
    match parent {
        None => Ok(None),
        Some(ParentField::Id(id)) => Ok(Some(id)),
        Some(ParentField::Text(text)) => {
            let text = text.trim();

            if text.is_empty() || text.eq_ignore_ascii_case("root") {
                return Ok(None);
            }

            text.parse()
                .map(Some)
                .map_err(|_| Error::InvalidRequestBody(format!("invalid parent \"{text}\"")))
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddCategoryBody {
    code: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parent: Option<ParentField>,
}

#[derive(Debug, Deserialize)]
struct UpdateCategoryBody {
    id: CategoryId,
    #[serde(default)]
    parent: Option<ParentField>,
}

#[derive(Debug, Deserialize)]
struct DeleteCategoryBody {
    id: CategoryId,
}

/// Every root category with its subtree.
pub fn get_categories(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let connection = context.db_connection()?;
    let categories = CategoryHierarchy::new(SqliteCategoryRepository::new(&connection))
        .list_with_subtree()?;

    Ok(Json(categories).into_response())
}

/// Every category as a flat list, for parent pickers.
pub fn get_all_categories(
    context: &mut RequestContext,
    _: &RouteParams,
) -> Result<Response, Error> {
    let connection = context.db_connection()?;
    let categories =
        CategoryHierarchy::new(SqliteCategoryRepository::new(&connection)).list_flat()?;

    Ok(Json(categories).into_response())
}

/// A single category with its subtree, selected by the `id` path parameter.
pub fn get_category(context: &mut RequestContext, params: &RouteParams) -> Result<Response, Error> {
    let category_id: CategoryId = params.parse("id")?;

    let connection = context.db_connection()?;
    let category = CategoryHierarchy::new(SqliteCategoryRepository::new(&connection))
        .get_with_subtree(category_id)?;

    Ok(Json(category).into_response())
}

/// Create a category and respond with its ID.
pub fn add_category(context: &mut RequestContext, _: &RouteParams) -> Result<Response, Error> {
    let body: AddCategoryBody = context.body()?;
    let parent_id = parse_parent(body.parent)?;
    let new_category = NewCategory::new(
        &body.code,
        &body.title,
        body.description.as_deref(),
        parent_id,
    )?;

    let mut connection = context.db_connection()?;
    let transaction = connection.transaction()?;
    let category_id = CategoryHierarchy::new(SqliteCategoryRepository::new(&transaction))
        .create_category(new_category)?;
    transaction.commit()?;

    tracing::info!("Created category {category_id}");

    Ok((StatusCode::CREATED, Json(json!({ "id": category_id }))).into_response())
}

/// Move a category to a new parent, or to the root when no parent is given.
pub fn update_category(
    context: &mut RequestContext,
    _: &RouteParams,
) -> Result<Response, Error> {
    let body: UpdateCategoryBody = context.body()?;
    let parent_id = parse_parent(body.parent)?;

    let mut connection = context.db_connection()?;
    let transaction = connection.transaction()?;
    CategoryHierarchy::new(SqliteCategoryRepository::new(&transaction))
        .update_parent(body.id, parent_id)?;
    transaction.commit()?;

    tracing::info!("Moved category {} under {parent_id:?}", body.id);

    Ok(Json(json!({ "message": "Category updated successfully" })).into_response())
}

/// Delete a category, moving its children to its parent.
pub fn delete_category(
    context: &mut RequestContext,
    _: &RouteParams,
) -> Result<Response, Error> {
    let body: DeleteCategoryBody = context.body()?;

    let mut connection = context.db_connection()?;
    let transaction = connection.transaction()?;
    CategoryHierarchy::new(SqliteCategoryRepository::new(&transaction))
        .delete_category(body.id)?;
    transaction.commit()?;

    tracing::info!("Deleted category {}", body.id);

    Ok(Json(json!({ "message": "Category deleted successfully" })).into_response())
}

#[cfg(test)]
mod parse_parent_tests {
    use crate::Error;

    use super::{ParentField, parse_parent};

    fn parent(json: &str) -> Option<ParentField> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_number() {
        assert_eq!(parse_parent(parent("3")), Ok(Some(3)));
    }

    #[test]
    fn accepts_numeric_string() {
        assert_eq!(parse_parent(parent(r#""3""#)), Ok(Some(3)));
    }

    #[test]
    fn root_and_null_mean_no_parent() {
        assert_eq!(parse_parent(parent(r#""root""#)), Ok(None));
        assert_eq!(parse_parent(parent("null")), Ok(None));
        assert_eq!(parse_parent(None), Ok(None));
    }

    #[test]
    fn rejects_other_text() {
        assert!(matches!(
            parse_parent(parent(r#""banana""#)),
            Err(Error::InvalidRequestBody(_))
        ));
    }
}

#[cfg(test)]
mod category_endpoint_tests {
    use axum::{
        body::to_bytes,
        http::{Method, StatusCode},
        response::Response,
    };
    use serde_json::Value;

    use crate::{
        AppState, Error,
        category::{
            CategoryHierarchy, SqliteCategoryRepository,
            endpoints::{
                add_category, delete_category, get_all_categories, get_categories, get_category,
                update_category,
            },
        },
        router::{RequestContext, RoutePattern},
        test_utils::{get_test_app_state, request_context},
    };

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn call(
        handler: fn(&mut RequestContext, &crate::router::RouteParams) -> Result<Response, Error>,
        state: &AppState,
        method: Method,
        path: &str,
        body: &str,
    ) -> Result<Response, Error> {
        let mut context = request_context(state, method, path, body);
        handler(&mut context, &Default::default())
    }

    #[track_caller]
    fn add(state: &AppState, body: &str) -> Response {
        call(add_category, state, Method::POST, "/addCategory", body).unwrap()
    }

    #[tokio::test]
    async fn add_category_returns_created_id() {
        let state = get_test_app_state();

        let response = add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["id"], 1);
    }

    #[test]
    fn add_category_with_duplicate_code_fails() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);

        let result = call(
            add_category,
            &state,
            Method::POST,
            "/addCategory",
            r#"{"code": "FURN", "title": "Again"}"#,
        );

        assert_eq!(
            result.err(),
            Some(Error::DuplicateCategoryCode("FURN".to_owned()))
        );
    }

    #[test]
    fn add_category_with_missing_parent_fails() {
        let state = get_test_app_state();

        let result = call(
            add_category,
            &state,
            Method::POST,
            "/addCategory",
            r#"{"code": "SOF", "title": "Sofas", "parent": 42}"#,
        );

        assert_eq!(result.err(), Some(Error::CategoryNotFound(42)));
    }

    #[tokio::test]
    async fn get_categories_nests_subcategories() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture", "parent": "root"}"#);
        add(&state, r#"{"code": "SOF", "title": "Sofas", "parent": "1"}"#);

        let response = call(get_categories, &state, Method::GET, "/getCategories", "").unwrap();

        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["code"], "FURN");
        assert_eq!(body[0]["subcategories"][0]["code"], "SOF");
    }

    #[tokio::test]
    async fn get_all_categories_is_flat() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);
        add(&state, r#"{"code": "SOF", "title": "Sofas", "parent": 1}"#);

        let response =
            call(get_all_categories, &state, Method::GET, "/getAllCategories", "").unwrap();

        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["parent_id"], 1);
    }

    #[tokio::test]
    async fn get_category_reads_id_from_path() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);
        add(&state, r#"{"code": "SOF", "title": "Sofas", "parent": 1}"#);
        let params = RoutePattern::compile("/categories/:id")
            .matches("/categories/1")
            .unwrap();
        let mut context = request_context(&state, Method::GET, "/categories/1", "");

        let response = get_category(&mut context, &params).unwrap();

        let body = json_body(response).await;
        assert_eq!(body["title"], "Furniture");
        assert_eq!(body["subcategories"][0]["title"], "Sofas");
    }

    #[test]
    fn get_category_rejects_non_numeric_id() {
        let state = get_test_app_state();
        let params = RoutePattern::compile("/categories/:id")
            .matches("/categories/abc")
            .unwrap();
        let mut context = request_context(&state, Method::GET, "/categories/abc", "");

        let result = get_category(&mut context, &params);

        assert!(matches!(result, Err(Error::InvalidPathParameter(_))));
    }

    #[test]
    fn update_category_moves_to_root() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);
        add(&state, r#"{"code": "SOF", "title": "Sofas", "parent": 1}"#);

        call(
            update_category,
            &state,
            Method::PUT,
            "/updateCategory",
            r#"{"id": 2, "parent": "root"}"#,
        )
        .unwrap();

        let connection = state.db_connection.lock().unwrap();
        let roots = CategoryHierarchy::new(SqliteCategoryRepository::new(&connection))
            .list_with_subtree()
            .unwrap();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn update_category_to_itself_fails() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);

        let result = call(
            update_category,
            &state,
            Method::PUT,
            "/updateCategory",
            r#"{"id": 1, "parent": 1}"#,
        );

        assert_eq!(result.err(), Some(Error::SelfParent(1)));
    }

    #[tokio::test]
    async fn delete_category_moves_children_up() {
        let state = get_test_app_state();
        add(&state, r#"{"code": "FURN", "title": "Furniture"}"#);
        add(&state, r#"{"code": "SOF", "title": "Sofas", "parent": 1}"#);
        add(&state, r#"{"code": "CRN", "title": "Corner Sofas", "parent": 2}"#);

        let response = call(
            delete_category,
            &state,
            Method::DELETE,
            "/deleteCategory",
            r#"{"id": 2}"#,
        )
        .unwrap();

        assert_eq!(
            json_body(response).await["message"],
            "Category deleted successfully"
        );
        let connection = state.db_connection.lock().unwrap();
        let roots = CategoryHierarchy::new(SqliteCategoryRepository::new(&connection))
            .list_with_subtree()
            .unwrap();
        assert_eq!(roots[0].subcategories[0].category.id, 3);
    }
}
