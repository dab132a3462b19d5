use std::time::Duration;

use snip_core::{ShortCode, UrlMapping};
use snip_storage::{PostgresRepository, Repository, StorageError};
use snip_test_infra::postgres::{PostgresConfig, PostgresServer};

struct Fixture {
    _postgres: PostgresServer,
    repo: PostgresRepository,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let repo = connect_with_retry(&url).await;

        Self {
            _postgres: postgres,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> PostgresRepository {
    let mut last_error = None;

    for _ in 0..20 {
        match PostgresRepository::connect(url).await {
            Ok(repo) => return repo,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn mapping(code: &str, url: &str) -> UrlMapping {
    UrlMapping {
        code: ShortCode::new_unchecked(code),
        target_url: url.to_string(),
        created_at: 1_700_000_000,
        expires_at: 1_700_003_600,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_and_get() {
    let fixture = Fixture::start().await;
    let m = mapping("2-3", "https://example.com");

    fixture.repo.insert(&m).await.unwrap();

    let got = fixture.repo.get(&m.code).await.unwrap();
    assert_eq!(got, Some(m));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn get_missing_returns_none() {
    let fixture = Fixture::start().await;

    let got = fixture
        .repo
        .get(&ShortCode::new_unchecked("9-zz"))
        .await
        .unwrap();
    assert!(got.is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn duplicate_insert_conflicts() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(&mapping("2-3", "https://example.com"))
        .await
        .unwrap();
    let err = fixture
        .repo
        .insert(&mapping("2-3", "https://other.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(code) if code == "2-3"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn migrations_are_idempotent() {
    let fixture = Fixture::start().await;
    fixture.repo.migrate().await.unwrap();
    fixture.repo.migrate().await.unwrap();
}
