use tracing::{info, warn};

use crate::config::Config;
use crate::db::{CatalogStore, UserStore};
use crate::error::BookstoreError;
use crate::types::{CreateBook, CreateCategory};

const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "1234";
const DEMO_EMAIL: &str = "demo@example.com";

const CATEGORIES: &[(&str, &str)] = &[
    ("Fiction", "Fictional stories and novels"),
    ("Science Fiction", "Science fiction and fantasy books"),
    ("Non-Fiction", "Educational and informational books"),
    ("Programming", "Software development and programming books"),
    ("Biography", "Life stories and memoirs"),
];

#[derive(Clone, Copy)]
struct BookSeed {
    title: &'static str,
    author: &'static str,
    description: &'static str,
    price: f64,
    isbn: &'static str,
    stock: i64,
    cover_url: &'static str,
    like_count: i64,
    /// Index into `CATEGORIES`.
    category: usize,
}

const BOOKS: &[BookSeed] = &[
    BookSeed {
        title: "The Great Gatsby",
        author: "F. Scott Fitzgerald",
        description: "A classic American novel set in the Jazz Age",
        price: 12.99,
        isbn: "978-0743273565",
        stock: 50,
        cover_url: "/images/books/great-gatsby.jpg",
        like_count: 156,
        category: 0,
    },
    BookSeed {
        title: "1984",
        author: "George Orwell",
        description: "A dystopian social science fiction novel",
        price: 14.99,
        isbn: "978-0451524935",
        stock: 75,
        cover_url: "/images/books/1984.jpg",
        like_count: 203,
        category: 0,
    },
    BookSeed {
        title: "Dune",
        author: "Frank Herbert",
        description: "A science fiction masterpiece",
        price: 18.99,
        isbn: "978-0441172719",
        stock: 40,
        cover_url: "/images/books/dune.jpg",
        like_count: 342,
        category: 1,
    },
    BookSeed {
        title: "The Martian",
        author: "Andy Weir",
        description: "A stranded astronaut must survive on Mars",
        price: 15.99,
        isbn: "978-0553418026",
        stock: 60,
        cover_url: "/images/books/martian.jpg",
        like_count: 189,
        category: 1,
    },
    BookSeed {
        title: "Sapiens",
        author: "Yuval Noah Harari",
        description: "A brief history of humankind",
        price: 22.99,
        isbn: "978-0062316097",
        stock: 100,
        cover_url: "/images/books/sapiens.jpg",
        like_count: 427,
        category: 2,
    },
    BookSeed {
        title: "Clean Code",
        author: "Robert C. Martin",
        description: "A handbook of agile software craftsmanship",
        price: 45.99,
        isbn: "978-0132350884",
        stock: 30,
        cover_url: "/images/books/clean-code.jpg",
        like_count: 512,
        category: 3,
    },
    BookSeed {
        title: "The Pragmatic Programmer",
        author: "David Thomas, Andrew Hunt",
        description: "Your journey to mastery",
        price: 42.99,
        isbn: "978-0135957059",
        stock: 25,
        cover_url: "/images/books/pragmatic-programmer.jpg",
        like_count: 391,
        category: 3,
    },
    BookSeed {
        title: "Design Patterns",
        author: "Gang of Four",
        description: "Elements of reusable object-oriented software",
        price: 54.99,
        isbn: "978-0201633610",
        stock: 20,
        cover_url: "/images/books/design-patterns.jpg",
        like_count: 284,
        category: 3,
    },
    BookSeed {
        title: "Steve Jobs",
        author: "Walter Isaacson",
        description: "The exclusive biography",
        price: 19.99,
        isbn: "978-1451648539",
        stock: 45,
        cover_url: "/images/books/steve-jobs.jpg",
        like_count: 267,
        category: 4,
    },
    BookSeed {
        title: "Educated",
        author: "Tara Westover",
        description: "A memoir about education and self-invention",
        price: 16.99,
        isbn: "978-0399590504",
        stock: 55,
        cover_url: "/images/books/educated.jpg",
        like_count: 198,
        category: 4,
    },
];

/// Seeds development data at startup. Never runs in production; failures are
/// logged and never abort startup.
pub async fn run(config: &Config, users: &UserStore, catalog: &CatalogStore) {
    if config.is_production() {
        warn!("Fixtures are disabled in production mode");
        return;
    }

    info!("Running fixtures in development mode...");
    match load(users, catalog).await {
        Ok(()) => info!("Fixtures loaded successfully!"),
        Err(e) => warn!(error = %e, "Error loading fixtures"),
    }
}

pub async fn load(users: &UserStore, catalog: &CatalogStore) -> Result<(), BookstoreError> {
    create_demo_user(users).await?;

    if catalog.count_categories().await? > 0 {
        info!("Catalog already populated, skipping books and categories");
        return Ok(());
    }
    seed_catalog(catalog, CATEGORIES, BOOKS).await
}

async fn create_demo_user(users: &UserStore) -> Result<(), BookstoreError> {
    if users.find_by_username(DEMO_USERNAME).await?.is_some() {
        info!("Test user already exists, skipping creation");
        return Ok(());
    }
    match users.create_user(DEMO_USERNAME, DEMO_PASSWORD, DEMO_EMAIL).await {
        Ok(user) => info!(user_id = user.id, username = DEMO_USERNAME, "Test user created"),
        Err(e) => warn!(error = %e, "Could not create test user"),
    }
    Ok(())
}

/// Categories and books land together or not at all.
async fn seed_catalog(
    catalog: &CatalogStore,
    categories: &[(&str, &str)],
    books: &[BookSeed],
) -> Result<(), BookstoreError> {
    let categories: Vec<CreateCategory> = categories
        .iter()
        .map(|(name, description)| CreateCategory {
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .collect();
    let books = books
        .iter()
        .map(|seed| {
            let input = CreateBook {
                title: seed.title.to_string(),
                author: seed.author.to_string(),
                description: Some(seed.description.to_string()),
                price: seed.price,
                isbn: Some(seed.isbn.to_string()),
                stock: Some(seed.stock),
                cover_url: Some(seed.cover_url.to_string()),
                like_count: Some(seed.like_count),
                category_id: 0,
            };
            (seed.category, input)
        })
        .collect();

    let (categories, books) = catalog.insert_catalog(&categories, books).await?;
    info!(categories = categories.len(), books = books.len(), "Created catalog");
    Ok(())
}
