//! Core category domain types.

use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The database ID of a category.
pub type CategoryId = i64;

/// A validated, non-empty category code, e.g. "FURN".
///
/// Codes are unique across all categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryCode(String);

impl CategoryCode {
    /// Create a category code.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryCode] if `code` is empty or only whitespace.
    pub fn new(code: &str) -> Result<Self, Error> {
        let code = code.trim();

        if code.is_empty() {
            Err(Error::EmptyCategoryCode)
        } else {
            Ok(Self(code.to_string()))
        }
    }

    /// Create a category code without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl AsRef<str> for CategoryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the category tree, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The parent category, or `None` for a root category.
    pub parent_id: Option<CategoryId>,
    /// The unique code of the category.
    pub code: CategoryCode,
    /// The human readable name of the category.
    pub title: String,
    /// An optional longer description.
    pub description: Option<String>,
}

/// The validated data needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub(crate) code: CategoryCode,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) parent_id: Option<CategoryId>,
}

impl NewCategory {
    /// Validate the fields for a new category.
    ///
    /// A blank description is stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryCode] or [Error::EmptyCategoryTitle] on blank input.
    pub fn new(
        code: &str,
        title: &str,
        description: Option<&str>,
        parent_id: Option<CategoryId>,
    ) -> Result<Self, Error> {
        let code = CategoryCode::new(code)?;
        let title = title.trim();

        if title.is_empty() {
            return Err(Error::EmptyCategoryTitle);
        }

        let description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_owned);

        Ok(Self {
            code,
            title: title.to_owned(),
            description,
            parent_id,
        })
    }
}

/// A category together with its full subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    /// The category at this node.
    #[serde(flatten)]
    pub category: Category,
    /// The direct children of the category, each with their own subtree.
    pub subcategories: Vec<CategoryNode>,
}

impl CategoryNode {
    /// The number of categories in this subtree, including this node.
    pub fn size(&self) -> usize {
        1 + self
            .subcategories
            .iter()
            .map(CategoryNode::size)
            .sum::<usize>()
    }
}

/// Arrange a flat list of categories into trees rooted at `root_ids`.
///
/// Children keep the order they have in `categories`. A category whose parent
/// is not reachable from any root is left out.
pub(crate) fn build_forest(categories: Vec<Category>, root_ids: &[CategoryId]) -> Vec<CategoryNode> {
    let mut by_id: HashMap<CategoryId, Category> = HashMap::new();
    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();

    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children.entry(parent_id).or_default().push(category.id);
        }

        by_id.insert(category.id, category);
    }

    root_ids
        .iter()
        .filter_map(|id| build_node(*id, &mut by_id, &mut children))
        .collect()
}

fn build_node(
    id: CategoryId,
    by_id: &mut HashMap<CategoryId, Category>,
    children: &mut HashMap<CategoryId, Vec<CategoryId>>,
) -> Option<CategoryNode> {
    // Removing each category as it is placed means a corrupt cycle in the
    // stored data cannot make this recurse forever.
    let category = by_id.remove(&id)?;
    let child_ids = children.remove(&id).unwrap_or_default();

    let subcategories = child_ids
        .into_iter()
        .filter_map(|child_id| build_node(child_id, by_id, children))
        .collect();

    Some(CategoryNode {
        category,
        subcategories,
    })
}


#[cfg(test)]
mod new_category_tests {
    use crate::{Error, category::NewCategory};

    #[test]
    fn new_fails_on_empty_title() {
        let result = NewCategory::new("FURN", "  ", None, None);

        assert_eq!(result, Err(Error::EmptyCategoryTitle));
    }

    #[test]
    fn blank_description_is_none() {
        let category = NewCategory::new("FURN", "Furniture", Some("   "), None).unwrap();

        assert_eq!(category.description, None);
    }
}
