//! The category tree: storage, the hierarchy rules, and the JSON endpoints.

mod db;
mod domain;
mod endpoints;
mod hierarchy;

pub use db::{CategoryRepository, SqliteCategoryRepository, create_category_table};
pub use domain::{Category, CategoryCode, CategoryId, CategoryNode, NewCategory};
pub use endpoints::{
    add_category, delete_category, get_all_categories, get_categories, get_category,
    update_category,
};
pub use hierarchy::CategoryHierarchy;
