//! The rules for creating, moving and deleting categories in the category tree.
//!
//! The tree is kept acyclic: moving a category under one of its own
//! descendants first promotes that descendant to a root category.
//! Deleting a category moves its children up to the deleted category's parent.

use std::collections::{HashSet, VecDeque};

use crate::{
    Error,
    category::{
        Category, CategoryId, CategoryNode, CategoryRepository, NewCategory, domain::build_forest,
    },
};

/// Maintains the category tree on top of a [CategoryRepository].
#[derive(Debug)]
pub struct CategoryHierarchy<R> {
    repository: R,
}

impl<R: CategoryRepository> CategoryHierarchy<R> {
    /// Create a hierarchy that reads and writes through `repository`.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Create a root category, or a subcategory when `parent_id` is set.
    ///
    /// # Errors
    ///
    /// - [Error::DuplicateCategoryCode] if the code is taken.
    /// - [Error::CategoryNotFound] if `parent_id` does not exist.
    pub fn create_category(&self, new_category: NewCategory) -> Result<CategoryId, Error> {
        if self.repository.code_exists(&new_category.code)? {
            return Err(Error::DuplicateCategoryCode(new_category.code.to_string()));
        }

        if let Some(parent_id) = new_category.parent_id {
            self.require(parent_id)?;
        }

        let category = self.repository.insert(new_category)?;
        tracing::debug!(
            "Created category {} ({}) under {:?}",
            category.id,
            category.code,
            category.parent_id
        );

        Ok(category.id)
    }

    /// Move `category_id` under `new_parent_id`, or make it a root when `None`.
    ///
    /// If `new_parent_id` is currently a descendant of `category_id`, that
    /// descendant becomes a root first, so no cycle can form.
    ///
    /// # Errors
    ///
    /// - [Error::CategoryNotFound] if either category does not exist.
    /// - [Error::SelfParent] if `new_parent_id` equals `category_id`.
    pub fn update_parent(
        &self,
        category_id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<(), Error> {
        self.require(category_id)?;

        let Some(new_parent_id) = new_parent_id else {
            return self.repository.set_parent(category_id, None);
        };

        if new_parent_id == category_id {
            return Err(Error::SelfParent(category_id));
        }

        self.require(new_parent_id)?;

        if self.is_descendant(new_parent_id, category_id)? {
            tracing::info!(
                "Category {new_parent_id} is a descendant of {category_id}, promoting it to a root category"
            );
            self.repository.set_parent(new_parent_id, None)?;
        }

        self.repository
            .set_parent(category_id, Some(new_parent_id))
    }

    /// Delete `category_id` after moving its children to its parent.
    ///
    /// # Errors
    ///
    /// - [Error::CategoryNotFound] if the category does not exist.
    /// - [Error::CategoryHasProducts] if any product belongs to the category.
    pub fn delete_category(&self, category_id: CategoryId) -> Result<(), Error> {
        let category = self.require(category_id)?;

        if self.repository.count_products(category_id)? > 0 {
            return Err(Error::CategoryHasProducts(category_id));
        }

        for child in self.repository.find_children(category_id)? {
            self.repository.set_parent(child.id, category.parent_id)?;
        }

        self.repository.delete(category_id)
    }

    /// Every root category with its full subtree.
    pub fn list_with_subtree(&self) -> Result<Vec<CategoryNode>, Error> {
        let root_ids: Vec<CategoryId> = self
            .repository
            .find_roots()?
            .iter()
            .map(|category| category.id)
            .collect();

        Ok(build_forest(self.repository.find_all()?, &root_ids))
    }

    /// One category with its full subtree.
    ///
    /// # Errors
    ///
    /// Returns [Error::CategoryNotFound] if the category does not exist.
    pub fn get_with_subtree(&self, category_id: CategoryId) -> Result<CategoryNode, Error> {
        self.require(category_id)?;

        build_forest(self.repository.find_all()?, &[category_id])
            .pop()
            .ok_or(Error::CategoryNotFound(category_id))
    }

    /// Every category without any nesting.
    pub fn list_flat(&self) -> Result<Vec<Category>, Error> {
        self.repository.find_all()
    }

    /// The number of categories.
    pub fn count(&self) -> Result<u64, Error> {
        self.repository.count()
    }

    fn require(&self, category_id: CategoryId) -> Result<Category, Error> {
        self.repository
            .find_by_id(category_id)?
            .ok_or(Error::CategoryNotFound(category_id))
    }

    /// Breadth-first search of the subtree under `ancestor_id` for `candidate_id`.
    fn is_descendant(
        &self,
        candidate_id: CategoryId,
        ancestor_id: CategoryId,
    ) -> Result<bool, Error> {
        let mut queue = VecDeque::from([ancestor_id]);
        let mut visited = HashSet::from([ancestor_id]);

        while let Some(id) = queue.pop_front() {
            for child in self.repository.find_children(id)? {
                if child.id == candidate_id {
                    return Ok(true);
                }

                if visited.insert(child.id) {
                    queue.push_back(child.id);
                }
            }
        }

        Ok(false)
    }
}
