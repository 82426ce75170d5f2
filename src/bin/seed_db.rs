use std::{collections::HashMap, error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use storefront_admin::{
    CategoryHierarchy, CategoryId, NewCategory, NewProduct, SqliteCategoryRepository,
    create_product, initialize_db, set_home_view_count,
};

/// A utility for creating a storefront_admin database filled with sample data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long)]
    db_path: String,
}

/// (code, title, description, subcategories)
type CategorySeed = (
    &'static str,
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str, &'static str)],
);

const CATEGORIES: [CategorySeed; 2] = [
    (
        "FURN",
        "Furniture",
        "Various types of furniture",
        &[
            ("SOF", "Sofas", "Comfortable sofas and couches"),
            ("BED", "Beds", "Beds and mattresses for a good night's sleep"),
        ],
    ),
    (
        "TOYS",
        "Toys",
        "Toys for kids of all ages",
        &[
            ("EDUT", "Educational Toys", "Toys that educate and entertain"),
            ("ACTT", "Action Toys", "Action figures and model kits"),
        ],
    ),
];

struct ProductSeed {
    sku: &'static str,
    title: &'static str,
    brand: &'static str,
    price: f64,
    category_code: &'static str,
    short_description: &'static str,
    description: &'static str,
    image: &'static str,
    featured: bool,
    view_count: u64,
}

const PRODUCTS: [ProductSeed; 10] = [
    ProductSeed {
        sku: "SOFA001",
        title: "Leather Sofa",
        brand: "HomeComfort",
        price: 499.99,
        category_code: "SOF",
        short_description: "Premium leather sofa",
        description: "A premium leather sofa with modern design.",
        image: "leather_sofa.jpg",
        featured: false,
        view_count: 10,
    },
    ProductSeed {
        sku: "SOFA002",
        title: "Fabric Sofa",
        brand: "CozyHome",
        price: 299.99,
        category_code: "SOF",
        short_description: "Cozy fabric sofa",
        description: "A cozy fabric sofa perfect for any living room.",
        image: "fabric_sofa.jpg",
        featured: true,
        view_count: 7,
    },
    ProductSeed {
        sku: "BED001",
        title: "King Size Bed",
        brand: "DreamSleep",
        price: 799.99,
        category_code: "BED",
        short_description: "Spacious king size bed",
        description: "A spacious king size bed with a comfortable mattress.",
        image: "king_bed.jpg",
        featured: false,
        view_count: 2,
    },
    ProductSeed {
        sku: "BED002",
        title: "Single Bed",
        brand: "DreamSleep",
        price: 399.99,
        category_code: "BED",
        short_description: "Comfortable single bed",
        description: "A comfortable single bed perfect for small rooms.",
        image: "single_bed.jpg",
        featured: true,
        view_count: 3,
    },
    ProductSeed {
        sku: "TOY001",
        title: "Lego Set",
        brand: "Lego",
        price: 49.99,
        category_code: "EDUT",
        short_description: "Educational Lego set",
        description: "A fun and educational Lego set for children.",
        image: "lego_set.jpg",
        featured: true,
        view_count: 80,
    },
    ProductSeed {
        sku: "TOY002",
        title: "Puzzle",
        brand: "PuzzleWorld",
        price: 19.99,
        category_code: "EDUT",
        short_description: "Challenging puzzle",
        description: "A challenging puzzle that is great for the brain.",
        image: "puzzle.jpg",
        featured: false,
        view_count: 100,
    },
    ProductSeed {
        sku: "TOY003",
        title: "Action Figure",
        brand: "ActionHeroes",
        price: 24.99,
        category_code: "ACTT",
        short_description: "Superhero action figure",
        description: "An action figure of your favorite superhero.",
        image: "action_figure.jpg",
        featured: true,
        view_count: 30,
    },
    ProductSeed {
        sku: "TOY004",
        title: "Remote Control Car",
        brand: "SpeedRacer",
        price: 69.99,
        category_code: "ACTT",
        short_description: "Fast RC car",
        description: "A fast remote control car for racing enthusiasts.",
        image: "rc_car.jpg",
        featured: false,
        view_count: 54,
    },
    ProductSeed {
        sku: "SOFA003",
        title: "Corner Sofa",
        brand: "ComfortSpace",
        price: 699.99,
        category_code: "SOF",
        short_description: "Spacious corner sofa",
        description: "A spacious corner sofa that fits perfectly in any room.",
        image: "corner_sofa.jpg",
        featured: true,
        view_count: 5,
    },
    ProductSeed {
        sku: "BED003",
        title: "Bunk Bed",
        brand: "FunSleep",
        price: 599.99,
        category_code: "BED",
        short_description: "Sturdy bunk bed",
        description: "A sturdy bunk bed that is great for kids.",
        image: "bunk_bed.jpg",
        featured: false,
        view_count: 5,
    },
];

const INITIAL_HOME_VIEW_COUNT: u64 = 20;

/// Create a database and populate it with sample categories, products and statistics.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);

    match db_path.extension() {
        None => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if db_path.is_file() {
        eprintln!("File already exists at {db_path:#?}!");
        exit(1);
    }

    println!("Creating database at {db_path:#?}");
    let mut conn = Connection::open(db_path)?;
    initialize_db(&conn)?;

    let transaction = conn.transaction()?;

    println!("Creating categories...");
    let category_ids = seed_categories(&transaction)?;

    println!("Creating products...");
    for seed in &PRODUCTS {
        let Some(&category_id) = category_ids.get(seed.category_code) else {
            eprintln!("No category with the code {}", seed.category_code);
            exit(1);
        };

        let new_product = NewProduct::new_unchecked(seed.sku, seed.title, category_id, seed.price)
            .brand(seed.brand)
            .descriptions(seed.short_description, seed.description)
            .image(seed.image)
            .featured(seed.featured)
            .view_count(seed.view_count);

        create_product(new_product, &transaction)?;
    }

    set_home_view_count(INITIAL_HOME_VIEW_COUNT, &transaction)?;

    transaction.commit()?;

    println!("Success!");

    Ok(())
}

fn seed_categories(
    connection: &Connection,
) -> Result<HashMap<&'static str, CategoryId>, storefront_admin::Error> {
    let hierarchy = CategoryHierarchy::new(SqliteCategoryRepository::new(connection));
    let mut category_ids = HashMap::new();

    for (code, title, description, subcategories) in CATEGORIES {
        let parent_id =
            hierarchy.create_category(NewCategory::new(code, title, Some(description), None)?)?;
        category_ids.insert(code, parent_id);

        for &(code, title, description) in subcategories {
            let id = hierarchy.create_category(NewCategory::new(
                code,
                title,
                Some(description),
                Some(parent_id),
            )?)?;
            category_ids.insert(code, id);
        }
    }

    Ok(category_ids)
}
