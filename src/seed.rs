use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};

use crate::models::book;

struct DemoBook {
    title: &'static str,
    author: &'static str,
    description: &'static str,
    cover_image: &'static str,
    publication_year: &'static str,
    genres: &'static str,
    price: i64,
}

const DEMO_CATALOG: &[DemoBook] = &[
    DemoBook {
        title: "Dune",
        author: "Frank Herbert",
        description: "A noble family is handed stewardship of the desert planet Arrakis, the only source of the spice melange.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780441013593-M.jpg",
        publication_year: "1965",
        genres: "Science Fiction,Adventure",
        price: 40,
    },
    DemoBook {
        title: "Emma",
        author: "Jane Austen",
        description: "A well-meaning matchmaker in Highbury learns the limits of her own judgement.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780141439587-M.jpg",
        publication_year: "1815",
        genres: "Romance,Classic",
        price: 20,
    },
    DemoBook {
        title: "The Left Hand of Darkness",
        author: "Ursula K. Le Guin",
        description: "An envoy to the ice world Gethen struggles to understand a people without fixed gender.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780441478125-M.jpg",
        publication_year: "1969",
        genres: "Science Fiction",
        price: 32,
    },
    DemoBook {
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        description: "Bilbo Baggins is swept into a quest to reclaim a dwarven kingdom from a dragon.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780547928227-M.jpg",
        publication_year: "1937",
        genres: "Fantasy,Adventure",
        price: 28,
    },
    DemoBook {
        title: "Foundation",
        author: "Isaac Asimov",
        description: "A mathematician foresees the fall of the Galactic Empire and plans to shorten the dark age.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780553293357-M.jpg",
        publication_year: "1951",
        genres: "Science Fiction",
        price: 32,
    },
    DemoBook {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        description: "Elizabeth Bennet and Mr. Darcy trade first impressions for something better.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780141439518-M.jpg",
        publication_year: "1813",
        genres: "Romance,Classic",
        price: 24,
    },
    DemoBook {
        title: "The Name of the Rose",
        author: "Umberto Eco",
        description: "A Franciscan friar investigates a string of deaths in a medieval abbey library.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780156001311-M.jpg",
        publication_year: "1980",
        genres: "Mystery,Historical Fiction",
        price: 45,
    },
    DemoBook {
        title: "Kindred",
        author: "Octavia E. Butler",
        description: "A writer in 1976 Los Angeles is pulled back in time to a Maryland plantation.",
        cover_image: "https://covers.openlibrary.org/b/isbn/9780807083697-M.jpg",
        publication_year: "1979",
        genres: "Science Fiction,Historical Fiction",
        price: 26,
    },
];

/// Insert the demo catalog when the books table is empty.
///
/// Returns the number of rows inserted (zero when the catalog already has
/// data).
pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let existing = book::Entity::find().count(db).await?;
    if existing > 0 {
        tracing::debug!("Catalog already holds {} books, skipping seed", existing);
        return Ok(0);
    }

    let rows = DEMO_CATALOG.iter().map(|demo| book::ActiveModel {
        title: Set(demo.title.to_owned()),
        author: Set(demo.author.to_owned()),
        description: Set(demo.description.to_owned()),
        cover_image: Set(demo.cover_image.to_owned()),
        publication_year: Set(demo.publication_year.to_owned()),
        genres: Set(demo.genres.to_owned()),
        price: Set(demo.price),
        ..Default::default()
    });

    book::Entity::insert_many(rows).exec(db).await?;

    tracing::info!("Seeded demo catalog with {} books", DEMO_CATALOG.len());
    Ok(DEMO_CATALOG.len() as u64)
}
