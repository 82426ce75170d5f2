//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryCode, CategoryId, NewCategory},
    db::count_from_row,
    error::is_unique_violation,
    product::count_products_for_category,
};

/// The queries the category hierarchy needs from its storage.
///
/// Implementations perform single statements only, rules that span several
/// rows are enforced by [crate::category::CategoryHierarchy].
pub trait CategoryRepository {
    /// Insert a category and return it with its generated ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::DuplicateCategoryCode] if the code is already taken.
    fn insert(&self, category: NewCategory) -> Result<Category, Error>;

    /// Get a category by ID, or `None` if there is no such category.
    fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, Error>;

    /// Whether any category already uses `code`.
    fn code_exists(&self, code: &CategoryCode) -> Result<bool, Error>;

    /// The direct children of `id`, ordered by ID.
    fn find_children(&self, id: CategoryId) -> Result<Vec<Category>, Error>;

    /// Every category without a parent, ordered by ID.
    fn find_roots(&self) -> Result<Vec<Category>, Error>;

    /// Every category, ordered by ID.
    fn find_all(&self) -> Result<Vec<Category>, Error>;

    /// The number of products that belong directly to `id`.
    fn count_products(&self, id: CategoryId) -> Result<u64, Error>;

    /// The total number of categories.
    fn count(&self) -> Result<u64, Error>;

    /// Set the parent of `id`. `None` makes it a root category.
    fn set_parent(&self, id: CategoryId, parent_id: Option<CategoryId>) -> Result<(), Error>;

    /// Delete a single category row.
    fn delete(&self, id: CategoryId) -> Result<(), Error>;
}

/// A [CategoryRepository] backed by a SQLite connection or transaction.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCategoryRepository<'a> {
    connection: &'a Connection,
}

impl<'a> SqliteCategoryRepository<'a> {
    /// Create a repository that runs its queries on `connection`.
    ///
    /// Pass a [rusqlite::Transaction] (it derefs to a connection) to make a
    /// group of operations atomic.
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn insert(&self, category: NewCategory) -> Result<Category, Error> {
        self.connection
            .execute(
                "INSERT INTO category (parent_id, code, title, description) VALUES (?1, ?2, ?3, ?4);",
                (
                    category.parent_id,
                    category.code.as_ref(),
                    &category.title,
                    &category.description,
                ),
            )
            .map_err(|error| {
                if is_unique_violation(&error, "category.code") {
                    Error::DuplicateCategoryCode(category.code.to_string())
                } else {
                    error.into()
                }
            })?;

        let id = self.connection.last_insert_rowid();

        Ok(Category {
            id,
            parent_id: category.parent_id,
            code: category.code,
            title: category.title,
            description: category.description,
        })
    }

    fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, Error> {
        self.connection
            .prepare(
                "SELECT id, parent_id, code, title, description FROM category WHERE id = :id;",
            )?
            .query_row(&[(":id", &id)], map_row)
            .optional()
            .map_err(|error| error.into())
    }

    fn code_exists(&self, code: &CategoryCode) -> Result<bool, Error> {
        self.connection
            .prepare("SELECT EXISTS(SELECT 1 FROM category WHERE code = ?1);")?
            .query_row([code.as_ref()], |row| row.get(0))
            .map_err(|error| error.into())
    }

    fn find_children(&self, id: CategoryId) -> Result<Vec<Category>, Error> {
        self.connection
            .prepare(
                "SELECT id, parent_id, code, title, description FROM category \
                WHERE parent_id = ?1 ORDER BY id ASC;",
            )?
            .query_map([id], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    fn find_roots(&self) -> Result<Vec<Category>, Error> {
        self.connection
            .prepare(
                "SELECT id, parent_id, code, title, description FROM category \
                WHERE parent_id IS NULL ORDER BY id ASC;",
            )?
            .query_map([], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    fn find_all(&self) -> Result<Vec<Category>, Error> {
        self.connection
            .prepare("SELECT id, parent_id, code, title, description FROM category ORDER BY id ASC;")?
            .query_map([], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    fn count_products(&self, id: CategoryId) -> Result<u64, Error> {
        count_products_for_category(id, self.connection)
    }

    fn count(&self) -> Result<u64, Error> {
        self.connection
            .prepare("SELECT COUNT(id) FROM category;")?
            .query_row([], count_from_row)
            .map_err(|error| error.into())
    }

    fn set_parent(&self, id: CategoryId, parent_id: Option<CategoryId>) -> Result<(), Error> {
        let rows_affected = self.connection.execute(
            "UPDATE category SET parent_id = ?1 WHERE id = ?2",
            (parent_id, id),
        )?;

        if rows_affected == 0 {
            return Err(Error::CategoryNotFound(id));
        }

        Ok(())
    }

    fn delete(&self, id: CategoryId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .execute("DELETE FROM category WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::CategoryNotFound(id));
        }

        Ok(())
    }
}

/// Create the category table.
///
/// # Errors
/// Returns an error if the table could not be created.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            parent_id INTEGER,
            code TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT,
            FOREIGN KEY(parent_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_parent_id ON category(parent_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let parent_id = row.get(1)?;
    let raw_code: String = row.get(2)?;
    let title = row.get(3)?;
    let description = row.get(4)?;

    Ok(Category {
        id,
        parent_id,
        code: CategoryCode::new_unchecked(&raw_code),
        title,
        description,
    })
}
