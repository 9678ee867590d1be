use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book4us::config::Config;
use book4us::models::Book;
use book4us::storefront::{
    BookSort, CartStore, CatalogLoader, CatalogSession, FileStore, KeyValueStore, LoadingState,
    SearchCriteria, price_bounds,
};

/// book4us terminal storefront: browse the catalog and manage the cart.
///
/// Endpoint, storage directory and timeout come from the environment
/// (BOOKS_ENDPOINT, STORAGE_DIR, HTTP_TIMEOUT_SECS); the flags override them.
#[derive(Parser)]
#[command(name = "book4us-shop")]
struct Args {
    /// Catalog endpoint returning the JSON book list
    #[arg(long)]
    endpoint: Option<String>,

    /// Directory holding the cached catalog and the cart
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn apply_to(&mut self, config: &mut Config) {
        if let Some(endpoint) = self.endpoint.take() {
            config.books_endpoint = endpoint;
        }
        if let Some(dir) = self.storage_dir.take() {
            config.storage_dir = dir;
        }
        if let Some(secs) = self.timeout_secs {
            config.http_timeout = Duration::from_secs(secs);
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the whole catalog, cheapest first
    Books,
    /// Filter and sort the catalog
    Search {
        /// Fragment of the title or description
        #[arg(long, default_value = "")]
        q: String,
        #[arg(long, default_value = "")]
        author: String,
        /// Comma-separated genre fragments
        #[arg(long, default_value = "")]
        genres: String,
        #[arg(long)]
        min_price: Option<i64>,
        #[arg(long)]
        max_price: Option<i64>,
        #[arg(long, value_enum, default_value_t = SortArg::Asc)]
        sort: SortArg,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Buy everything in the cart
    Checkout,
    /// Drop the cached catalog and fetch it again
    Refresh,
}

#[derive(Subcommand)]
enum CartAction {
    List,
    /// Add a catalog book by id
    Add { id: i32 },
    /// Remove a cart book by id
    Remove { id: i32 },
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for BookSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Asc => BookSort::LeastExpensiveFirst,
            SortArg::Desc => BookSort::MostExpensiveFirst,
        }
    }
}

fn configure_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book4us=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_book(book: &Book) {
    println!(
        "#{:<4} ${:<5} {} - {} ({}) [{}]",
        book.id,
        book.price,
        book.title,
        book.author,
        book.publication_year,
        book.genre.join(", ")
    );
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
    }
    for book in books {
        print_book(book);
    }
}

/// Load the catalog, run one search and print the outcome.
async fn browse(session: &CatalogSession, criteria: SearchCriteria) -> Result<()> {
    ensure_loaded(session).await?;

    let loaded = session.current();
    if let Some(catalog) = loaded.catalog()
        && let Some((min, max)) = price_bounds(catalog)
    {
        println!("{} books, prices ${} to ${}", catalog.len(), min, max);
    }

    session.search(criteria).await.context("Search task failed")?;

    match session.current() {
        LoadingState::Searched { results, .. } => {
            print_books(&results);
            Ok(())
        }
        other => Err(unavailable(&other)),
    }
}

async fn ensure_loaded(session: &CatalogSession) -> Result<()> {
    if session.load().await {
        Ok(())
    } else {
        Err(unavailable(&session.current()))
    }
}

fn unavailable(state: &LoadingState) -> anyhow::Error {
    match state {
        LoadingState::Failed(message) => anyhow!("{}", message),
        other => anyhow!("Catalog unavailable ({:?})", other),
    }
}

async fn run(mut args: Args) -> Result<()> {
    let mut config = Config::from_env();
    args.apply_to(&mut config);

    let storage: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&config.storage_dir).with_context(|| {
            format!("Cannot open storage at {}", config.storage_dir.display())
        })?,
    );
    let loader = CatalogLoader::new(config.books_endpoint, storage.clone(), config.http_timeout)
        .context("Cannot build catalog loader")?;
    tracing::debug!("Catalog endpoint: {}", loader.endpoint());
    let session = CatalogSession::new(loader);
    let cart = CartStore::open(storage);

    match args.command {
        Command::Books => browse(&session, SearchCriteria::default()).await,
        Command::Search {
            q,
            author,
            genres,
            min_price,
            max_price,
            sort,
        } => {
            let defaults = SearchCriteria::default();
            let criteria = SearchCriteria::default()
                .with_text(q)
                .with_author(author)
                .with_genres(genres)
                .with_price_range(
                    min_price.unwrap_or(defaults.min_price),
                    max_price.unwrap_or(defaults.max_price),
                )
                .with_sort(sort.into());
            browse(&session, criteria).await
        }
        Command::Refresh => {
            if !session.retry().await {
                return Err(unavailable(&session.current()));
            }
            let count = session.current().catalog().map_or(0, |c| c.len());
            println!("Catalog refreshed: {} books", count);
            Ok(())
        }
        Command::Cart { action } => match action {
            CartAction::List => {
                print_books(&cart.list());
                let total = cart.total_price().context("Cannot total the cart")?;
                println!("{} items, total ${}", cart.len(), total);
                Ok(())
            }
            CartAction::Add { id } => {
                ensure_loaded(&session).await?;
                let state = session.current();
                let book = state
                    .catalog()
                    .and_then(|c| c.iter().find(|b| b.id == id))
                    .cloned()
                    .with_context(|| format!("No book with id {} in the catalog", id))?;

                if cart.add(book.clone()).context("Cannot add to cart")? {
                    println!("Added \"{}\" to the cart", book.title);
                } else {
                    println!("\"{}\" is already in the cart", book.title);
                }
                Ok(())
            }
            CartAction::Remove { id } => {
                let removed: Vec<Book> = cart.list().into_iter().filter(|b| b.id == id).collect();
                if removed.is_empty() {
                    bail!("No book with id {} in the cart", id);
                }
                for book in &removed {
                    cart.remove(book).context("Cannot remove from cart")?;
                    println!("Removed \"{}\" from the cart", book.title);
                }
                Ok(())
            }
            CartAction::Clear => {
                cart.clear().context("Cannot clear cart")?;
                println!("Cart cleared");
                Ok(())
            }
        },
        Command::Checkout => {
            let receipt = cart.checkout().context("Checkout failed")?;
            print_books(&receipt.items);
            println!("Total: ${}", receipt.total);
            println!("Thanks for shopping with us! (receipt {})", receipt.id);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    configure_logging();
    dotenvy::dotenv().ok();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
