//! Defines the core data models and database queries for products.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    Error,
    category::CategoryId,
    db::count_from_row,
    error::{is_foreign_key_violation, is_unique_violation},
};

/// The ID of a product in the database.
pub type ProductId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// An item for sale in the storefront.
///
/// To create a new `Product`, deserialize a [NewProduct] from a request or use
/// [NewProduct::new_unchecked] and pass it to [create_product].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// The ID of the product.
    pub id: ProductId,
    /// The category the product is listed under.
    pub category_id: CategoryId,
    /// The stock keeping unit, unique across all products.
    pub sku: String,
    /// The name of the product.
    pub title: String,
    /// The manufacturer or label.
    pub brand: Option<String>,
    /// The price in dollars.
    pub price: f64,
    /// A one line summary for product listings.
    pub short_description: Option<String>,
    /// The full product description.
    pub description: Option<String>,
    /// The file name of the product image.
    pub image: Option<String>,
    /// Whether the product is shown in the storefront.
    pub enabled: bool,
    /// Whether the product is shown on the home page.
    pub featured: bool,
    /// How many times the product page has been viewed.
    pub view_count: u64,
}

/// A product together with the title of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithCategory {
    /// The product.
    #[serde(flatten)]
    pub product: Product,
    /// The category title, or "Unknown" if the category no longer exists.
    pub category_name: String,
}

/// The data needed to create a [Product].
///
/// The field names follow the add product form, so the category is sent as
/// `category`. Check boxes may be sent as booleans, numbers or "on".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    /// The category the product is listed under.
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    /// The stock keeping unit.
    pub sku: String,
    /// The name of the product.
    pub title: String,
    /// The manufacturer or label.
    #[serde(default)]
    pub brand: Option<String>,
    /// The price in dollars.
    pub price: f64,
    /// A one line summary for product listings.
    #[serde(default)]
    pub short_description: Option<String>,
    /// The full product description.
    #[serde(default)]
    pub description: Option<String>,
    /// The file name of the product image.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the product is shown in the storefront.
    #[serde(default = "default_enabled", deserialize_with = "deserialize_flag")]
    pub enabled: bool,
    /// Whether the product is shown on the home page.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub featured: bool,
    /// The starting view count. Only set when seeding.
    #[serde(skip)]
    pub view_count: u64,
}

fn default_enabled() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value != 0,
        Flag::Text(value) => matches!(value.trim(), "1" | "on" | "true"),
    };

    Ok(flag)
}

impl NewProduct {
    /// Create a new product without validating the fields.
    ///
    /// The product is enabled, not featured, and has no optional details.
    pub fn new_unchecked(sku: &str, title: &str, category_id: CategoryId, price: f64) -> Self {
        Self {
            category_id,
            sku: sku.to_owned(),
            title: title.to_owned(),
            brand: None,
            price,
            short_description: None,
            description: None,
            image: None,
            enabled: true,
            featured: false,
            view_count: 0,
        }
    }

    /// Set the brand.
    pub fn brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_owned());
        self
    }

    /// Set the short and full descriptions.
    pub fn descriptions(mut self, short_description: &str, description: &str) -> Self {
        self.short_description = Some(short_description.to_owned());
        self.description = Some(description.to_owned());
        self
    }

    /// Set the file name of the product image.
    pub fn image(mut self, image: &str) -> Self {
        self.image = Some(image.to_owned());
        self
    }

    /// Set whether the product is featured on the home page.
    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    /// Set whether the product is shown in the storefront.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the starting view count.
    pub fn view_count(mut self, view_count: u64) -> Self {
        self.view_count = view_count;
        self
    }

    /// Check the fields and normalize whitespace.
    ///
    /// # Errors
    ///
    /// - [Error::EmptySku] if the SKU is empty or only whitespace.
    /// - [Error::EmptyProductTitle] if the title is empty or only whitespace.
    /// - [Error::InvalidPrice] if the price is negative or not finite.
    pub fn validate(mut self) -> Result<Self, Error> {
        self.sku = self.sku.trim().to_owned();
        self.title = self.title.trim().to_owned();

        if self.sku.is_empty() {
            return Err(Error::EmptySku);
        }

        if self.title.is_empty() {
            return Err(Error::EmptyProductTitle);
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidPrice);
        }

        let non_blank = |text: Option<String>| text.filter(|text| !text.trim().is_empty());
        self.brand = non_blank(self.brand);
        self.short_description = non_blank(self.short_description);
        self.description = non_blank(self.description);
        self.image = non_blank(self.image);

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(crate) const PRODUCT_COLUMNS: &str = "product.id, product.category_id, product.sku, \
    product.title, product.brand, product.price, product.short_description, \
    product.description, product.image, product.enabled, product.featured, product.view_count";

/// Create the product table.
///
/// # Errors
/// Returns an error if the table could not be created.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            sku TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            brand TEXT,
            price REAL NOT NULL,
            short_description TEXT,
            description TEXT,
            image TEXT,
            enabled INTEGER NOT NULL DEFAULT 1,
            featured INTEGER NOT NULL DEFAULT 0,
            view_count INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_category_id ON product(category_id)",
        (),
    )?;

    Ok(())
}

/// Validate and insert a new product.
///
/// # Errors
///
/// - [Error::EmptySku], [Error::EmptyProductTitle] or [Error::InvalidPrice]
///   if the product is invalid.
/// - [Error::DuplicateSku] if the SKU is already taken.
/// - [Error::CategoryNotFound] if the category does not exist.
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_product(new_product: NewProduct, connection: &Connection) -> Result<Product, Error> {
    let new_product = new_product.validate()?;

    connection
        .execute(
            "INSERT INTO product (category_id, sku, title, brand, price, short_description, \
            description, image, enabled, featured, view_count) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                new_product.category_id,
                &new_product.sku,
                &new_product.title,
                &new_product.brand,
                new_product.price,
                &new_product.short_description,
                &new_product.description,
                &new_product.image,
                new_product.enabled,
                new_product.featured,
                new_product.view_count as i64,
            ],
        )
        .map_err(|error| {
            if is_unique_violation(&error, "product.sku") {
                Error::DuplicateSku(new_product.sku.clone())
            } else if is_foreign_key_violation(&error) {
                Error::CategoryNotFound(new_product.category_id)
            } else {
                error.into()
            }
        })?;

    let id = connection.last_insert_rowid();

    Ok(Product {
        id,
        category_id: new_product.category_id,
        sku: new_product.sku,
        title: new_product.title,
        brand: new_product.brand,
        price: new_product.price,
        short_description: new_product.short_description,
        description: new_product.description,
        image: new_product.image,
        enabled: new_product.enabled,
        featured: new_product.featured,
        view_count: new_product.view_count,
    })
}

/// Retrieve a product by its ID.
///
/// # Errors
/// - [Error::ProductNotFound] if `id` does not refer to a valid product.
/// - [Error::SqlError] if there is some other SQL error.
#[cfg(test)]
pub fn get_product(id: ProductId, connection: &Connection) -> Result<Product, Error> {
    connection
        .prepare(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_row)
        .optional()?
        .ok_or(Error::ProductNotFound(id))
}

/// Retrieve every product with the title of its category, ordered by ID.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_all_products_with_category_names(
    connection: &Connection,
) -> Result<Vec<ProductWithCategory>, Error> {
    connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS}, category.title FROM product \
            LEFT JOIN category ON product.category_id = category.id \
            ORDER BY product.id ASC"
        ))?
        .query_map([], |row| {
            let category_name: Option<String> = row.get(12)?;

            Ok(ProductWithCategory {
                product: map_row(row)?,
                category_name: category_name.unwrap_or_else(|| "Unknown".to_owned()),
            })
        })?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Set the enabled flag on every product in `ids`.
///
/// IDs that do not refer to a product are skipped.
///
/// # Returns
/// The number of products that were updated.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn set_products_enabled(
    ids: &[ProductId],
    enabled: bool,
    connection: &Connection,
) -> Result<usize, Error> {
    let mut statement = connection.prepare("UPDATE product SET enabled = ?1 WHERE id = ?2")?;
    let mut updated = 0;

    for id in ids {
        updated += statement.execute((enabled, id))?;
    }

    Ok(updated)
}

/// Delete every product in `ids`.
///
/// Either all of the products are deleted, or none are.
///
/// # Errors
/// - [Error::ProductNotFound] if an ID does not refer to a product.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_products(ids: &[ProductId], connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    {
        let mut statement = transaction.prepare("DELETE FROM product WHERE id = ?1")?;

        for &id in ids {
            if statement.execute([id])? == 0 {
                return Err(Error::ProductNotFound(id));
            }
        }
    }

    transaction.commit()?;

    Ok(())
}

/// The total number of products.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn count_products(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM product", [], count_from_row)
        .map_err(|error| error.into())
}

/// The number of products listed directly under `category_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn count_products_for_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM product WHERE category_id = ?1",
            [category_id],
            count_from_row,
        )
        .map_err(|error| error.into())
}

/// The product with the most views, or `None` if there are no products.
///
/// Ties go to the product that was created first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn most_viewed_product(connection: &Connection) -> Result<Option<Product>, Error> {
    connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY view_count DESC, id ASC LIMIT 1"
        ))?
        .query_row([], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Every enabled product that is featured on the home page, ordered by ID.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_featured_products(connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product \
            WHERE enabled = 1 AND featured = 1 ORDER BY id ASC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Map a database row to a [Product], expects the columns in the order of [PRODUCT_COLUMNS].
pub(crate) fn map_row(row: &Row) -> Result<Product, rusqlite::Error> {
    let view_count: i64 = row.get(11)?;

    Ok(Product {
        id: row.get(0)?,
        category_id: row.get(1)?,
        sku: row.get(2)?,
        title: row.get(3)?,
        brand: row.get(4)?,
        price: row.get(5)?,
        short_description: row.get(6)?,
        description: row.get(7)?,
        image: row.get(8)?,
        enabled: row.get(9)?,
        featured: row.get(10)?,
        view_count: view_count.max(0) as u64,
    })
}

#[cfg(test)]
mod new_product_tests {
    use crate::{Error, product::NewProduct};

    #[test]
    fn validate_trims_sku_and_title() {
        let product = NewProduct::new_unchecked("  SOFA001 ", " Sofa ", 1, 899.0)
            .validate()
            .unwrap();

        assert_eq!(product.sku, "SOFA001");
        assert_eq!(product.title, "Sofa");
    }

    #[test]
    fn validate_rejects_empty_sku() {
        let result = NewProduct::new_unchecked("  ", "Sofa", 1, 899.0).validate();

        assert_eq!(result, Err(Error::EmptySku));
    }

    #[test]
    fn validate_rejects_empty_title() {
        let result = NewProduct::new_unchecked("SOFA001", "", 1, 899.0).validate();

        assert_eq!(result, Err(Error::EmptyProductTitle));
    }

    #[test]
    fn validate_rejects_negative_price() {
        let result = NewProduct::new_unchecked("SOFA001", "Sofa", 1, -0.01).validate();

        assert_eq!(result, Err(Error::InvalidPrice));
    }

    #[test]
    fn validate_drops_blank_optional_fields() {
        let product = NewProduct::new_unchecked("SOFA001", "Sofa", 1, 899.0)
            .brand("  ")
            .validate()
            .unwrap();

        assert_eq!(product.brand, None);
    }

    #[test]
    fn deserializes_form_field_names() {
        let product: NewProduct = serde_json::from_str(
            r#"{"sku": "TOY001", "title": "Blocks", "category": 4, "price": 19.99,
                "enabled": 0, "featured": "1"}"#,
        )
        .unwrap();

        assert_eq!(product.category_id, 4);
        assert!(!product.enabled);
        assert!(product.featured);
    }

    #[test]
    fn enabled_defaults_to_true() {
        let product: NewProduct = serde_json::from_str(
            r#"{"sku": "TOY001", "title": "Blocks", "category": 4, "price": 19.99}"#,
        )
        .unwrap();

        assert!(product.enabled);
        assert!(!product.featured);
    }
}
