use book4us::models::Book;
use book4us::storefront::loader::CATALOG_KEY;
use book4us::storefront::{
    BookSort, CartStore, CatalogLoader, CatalogSession, FileStore, KeyValueStore, LoadError,
    LoadingState, MemoryStore, SearchCriteria,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn books_payload() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "title": "Dune",
            "author": "Frank Herbert",
            "description": "Spice and sandworms.",
            "cover_image": "https://covers.example/dune.jpg",
            "genre": ["Science Fiction"],
            "publication_year": 1965,
            "price": 40,
            "rating": 4.5
        },
        {
            "id": 2,
            "title": "Emma",
            "author": "Jane Austen",
            "description": "Matchmaking in Highbury.",
            "cover_image": "https://covers.example/emma.jpg",
            "genre": ["Romance"],
            "publication_year": "1815",
            "price": 20
        }
    ])
}

async fn mount_books(server: &MockServer, template: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn loader_for(server_uri: &str, storage: Arc<dyn KeyValueStore>) -> CatalogLoader {
    CatalogLoader::new(
        format!("{}/api/books", server_uri),
        storage,
        Duration::from_secs(5),
    )
    .expect("Failed to build loader")
}

#[tokio::test]
async fn test_fetch_decodes_and_writes_through() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let loader = loader_for(&server.uri(), storage.clone());

    let catalog = loader.load().await.expect("Load should succeed");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].publication_year, "1965");

    let cached: Vec<Book> =
        serde_json::from_str(&storage.get(CATALOG_KEY).unwrap().expect("Catalog should be cached"))
            .unwrap();
    assert_eq!(&cached[..], &catalog[..]);
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let loader = loader_for(&server.uri(), storage);

    let first = loader.load().await.unwrap();
    let second = loader.load().await.unwrap();
    assert_eq!(first, second);
    // MockServer verifies exactly one request on drop
}

#[tokio::test]
async fn test_corrupt_or_empty_cache_falls_back_to_network() {
    for cached in ["{broken", "[]", "  "] {
        let server = MockServer::start().await;
        mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        storage.set(CATALOG_KEY, cached).unwrap();

        let catalog = loader_for(&server.uri(), storage).load().await.unwrap();
        assert_eq!(catalog.len(), 2, "cached value {:?}", cached);
    }
}

#[tokio::test]
async fn test_refresh_bypasses_cache() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 2).await;

    let loader = loader_for(&server.uri(), Arc::new(MemoryStore::new()));
    loader.load().await.unwrap();
    let refreshed = loader.refresh().await.unwrap();
    assert_eq!(refreshed.len(), 2);
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(503), 1).await;

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let err = loader_for(&server.uri(), storage.clone())
        .load()
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Status(503)));
    assert_eq!(storage.get(CATALOG_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_decode_error() {
    let server = MockServer::start().await;
    mount_books(
        &server,
        ResponseTemplate::new(200).set_body_string("{\"books\": []}"),
        1,
    )
    .await;

    let err = loader_for(&server.uri(), Arc::new(MemoryStore::new()))
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Decode(_)));
}

#[tokio::test]
async fn test_network_error_message_embeds_cause() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    // Server is gone; the port refuses connections

    let err = loader_for(&uri, Arc::new(MemoryStore::new()))
        .load()
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Network(_)));
    let message = err.user_message();
    assert!(message.contains("Please check your connection and try again"));
    assert!(message.contains(&err.to_string()));
}

#[tokio::test]
async fn test_session_loads_then_searches() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

    let session = CatalogSession::new(loader_for(&server.uri(), Arc::new(MemoryStore::new())));
    let mut updates = session.subscribe();
    assert_eq!(*updates.borrow_and_update(), LoadingState::Loading);

    assert!(session.load().await);

    let state = session.current();
    let results = state.results().expect("Initial search should have completed");
    let titles: Vec<&str> = results.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Emma", "Dune"]);
    assert!(updates.has_changed().unwrap());

    let applied = session
        .search(SearchCriteria::default().with_sort(BookSort::MostExpensiveFirst))
        .await
        .unwrap();
    assert!(applied);
    assert_eq!(session.current().results().unwrap()[0].title, "Dune");
}

#[tokio::test]
async fn test_session_failure_state() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(500), 1).await;

    let session = CatalogSession::new(loader_for(&server.uri(), Arc::new(MemoryStore::new())));
    assert!(!session.load().await);

    match session.current() {
        LoadingState::Failed(message) => assert!(message.contains("HTTP 500")),
        other => panic!("Expected Failed, got {:?}", other),
    }

    // Searching without a catalog does nothing
    assert!(!session.search(SearchCriteria::default()).await.unwrap());
    assert!(matches!(session.current(), LoadingState::Failed(_)));
}

#[tokio::test]
async fn test_retry_recovers_from_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

    let session = CatalogSession::new(loader_for(&server.uri(), Arc::new(MemoryStore::new())));
    assert!(!session.load().await);
    assert!(session.retry().await);
    assert_eq!(session.current().results().map(|r| r.len()), Some(2));
}

#[tokio::test]
async fn test_latest_search_wins() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

    let session = CatalogSession::new(loader_for(&server.uri(), Arc::new(MemoryStore::new())));
    assert!(session.load().await);

    // Issued back to back: the first is superseded before it can publish
    let stale = session.search(SearchCriteria::default().with_author("herbert"));
    let fresh = session.search(SearchCriteria::default().with_author("austen"));

    assert!(!stale.await.unwrap());
    assert!(fresh.await.unwrap());

    let state = session.current();
    let results = state.results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Emma");
}

#[tokio::test]
async fn test_cart_persists_across_restart_on_disk() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let catalog = loader_for(&server.uri(), storage.clone()).load().await.unwrap();
    let dune = catalog[0].clone();

    {
        let cart = CartStore::open(storage.clone());
        cart.add(dune.clone()).unwrap();
    }

    // Fresh process: new store handles over the same directory
    let reopened: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let cart = CartStore::open(reopened.clone());
    assert!(cart.contains(&dune));

    // The catalog cache survived too, so no second fetch happens
    let again = loader_for(&server.uri(), reopened).load().await.unwrap();
    assert_eq!(again, catalog);
}

#[tokio::test]
async fn test_search_interrupted_by_reload_is_not_applied() {
    let server = MockServer::start().await;
    mount_books(&server, ResponseTemplate::new(200).set_body_json(books_payload()), 2).await;

    let session = CatalogSession::new(loader_for(&server.uri(), Arc::new(MemoryStore::new())));
    assert!(session.load().await);

    // The reload resets the state before the search task gets to publish
    let interrupted = session.search(SearchCriteria::default().with_author("herbert"));
    assert!(session.retry().await);

    assert!(!interrupted.await.unwrap());
    assert_eq!(session.current().results().map(|r| r.len()), Some(2));
}

#[test]
fn test_concurrent_cart_adds_are_all_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let cart = CartStore::open(storage);

    let books: Vec<Book> = (1..=16)
        .map(|id| Book {
            id,
            title: format!("Volume {}", id),
            author: "Anonymous".to_string(),
            description: String::new(),
            cover_image: String::new(),
            genre: vec!["Anthology".to_string()],
            publication_year: "2020".to_string(),
            price: i64::from(id),
        })
        .collect();

    std::thread::scope(|scope| {
        for book in &books {
            let cart = &cart;
            scope.spawn(move || assert!(cart.add(book.clone()).unwrap()));
        }
    });

    let reopened = CartStore::open(Arc::new(FileStore::open(dir.path()).unwrap()));
    assert_eq!(reopened.len(), books.len());
    for book in &books {
        assert!(reopened.contains(book), "missing {}", book.title);
    }
}
