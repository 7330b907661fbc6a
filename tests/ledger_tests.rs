//! Ledger tests against a live Postgres
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test ledger_tests -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{json, Value};
use sqlx::{
    postgres::{PgDatabaseError, PgPoolOptions},
    PgPool,
};

use athenaeum_server::{
    config::AppConfig,
    error::AppError,
    models::{
        book::BookInput,
        borrow::ReturnOutcome,
        branch::{BranchInput, CreateFaculty},
        event_log::{EventKind, EventQuery},
        inventory::InventoryWrite,
        student::CreateStudent,
    },
    repository::{inventories::guard_error, Repository},
    services::Services,
};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Suffix that keeps names unique across tests and runs
fn unique(prefix: &str) -> String {
    format!(
        "{} {}-{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

async fn setup() -> (Services, PgPool) {
    dotenvy::dotenv().ok();
    let config = AppConfig::default();
    let url = std::env::var("DATABASE_URL").unwrap_or(config.database.url.clone());
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let services = Services::new(Repository::new(pool.clone()), config.auth, config.events);
    (services, pool)
}

struct Fixture {
    student_id: i32,
    book_id: i32,
    branch_id: i32,
}

async fn fixture(services: &Services) -> Fixture {
    let faculty = services
        .catalog
        .create_faculty(&CreateFaculty { name: unique("Faculty") })
        .await
        .unwrap();
    let student = services
        .catalog
        .create_student(&CreateStudent {
            full_name: unique("Student"),
            faculty_id: faculty.id,
        })
        .await
        .unwrap();
    let branch = services
        .catalog
        .create_branch(&BranchInput {
            name: unique("Branch"),
            address: None,
        })
        .await
        .unwrap();
    let book = services
        .catalog
        .create_book(&BookInput {
            title: unique("Book"),
            publisher: Some("Ledger Press".to_string()),
            year: Some(2020),
            pages: Some(100),
            illustrations: Some(0),
            price: None,
            authors: vec!["Test Author".to_string()],
        })
        .await
        .unwrap();

    Fixture {
        student_id: student.id,
        book_id: book.book.id,
        branch_id: branch.id,
    }
}

async fn set_copies(services: &Services, f: &Fixture, copies_total: i32) {
    services
        .inventory
        .set_copies(&InventoryWrite {
            book_id: f.book_id,
            branch_id: f.branch_id,
            copies_total,
        })
        .await
        .unwrap();
}

async fn count_events(pool: &PgPool, kind: EventKind, contains: Value) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM event_log WHERE event = $1 AND details @> $2")
        .bind(kind)
        .bind(contains)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn available(services: &Services, f: &Fixture) -> i64 {
    services
        .availability
        .available_copies(f.book_id, f.branch_id)
        .await
        .unwrap()
}

async fn open_borrows(pool: &PgPool, f: &Fixture) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM borrows WHERE book_id = $1 AND branch_id = $2 AND returned_at IS NULL",
    )
    .bind(f.book_id)
    .bind(f.branch_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_availability_follows_borrows_and_returns() {
    let (services, _pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 5).await;

    assert_eq!(available(&services, &f).await, 5);

    let first = services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap();
    services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap();
    assert_eq!(available(&services, &f).await, 3);

    let outcome = services.borrows.return_borrow(first.id).await.unwrap();
    assert!(matches!(outcome, ReturnOutcome::Returned(ref b) if b.returned_at.is_some()));
    assert_eq!(available(&services, &f).await, 4);

    let summary = services
        .availability
        .copies_summary(f.book_id, f.branch_id)
        .await
        .unwrap();
    assert_eq!(summary.copies_total, 5);
    assert_eq!(summary.available, 4);

    let line = services
        .inventory
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|l| l.book_id == f.book_id && l.branch_id == f.branch_id)
        .expect("inventory line");
    assert_eq!(line.available, summary.available);
}

#[tokio::test]
#[ignore]
async fn test_five_copies_lend_out_then_refuse() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 5).await;

    let mut borrows = Vec::new();
    for expected in (0..5).rev() {
        let borrow = services
            .borrows
            .borrow_book(f.student_id, f.book_id, f.branch_id)
            .await
            .unwrap();
        assert!(borrow.is_open());
        borrows.push(borrow);
        assert_eq!(available(&services, &f).await, expected);
    }

    let err = services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Borrow(_)));
    assert_eq!(open_borrows(&pool, &f).await, 5);

    services.borrows.return_borrow(borrows[2].id).await.unwrap();
    assert_eq!(available(&services, &f).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_pair_without_inventory_has_nothing_to_lend() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;

    let available = services
        .availability
        .available_copies(f.book_id, f.branch_id)
        .await
        .unwrap();
    assert_eq!(available, 0);

    let err = services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Borrow(_)));
    assert_eq!(open_borrows(&pool, &f).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_refused_borrow_is_audited_once() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 1).await;

    services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap();
    let err = services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Borrow(_)));

    assert_eq!(open_borrows(&pool, &f).await, 1);
    let ids = json!({
        "student_id": f.student_id,
        "book_id": f.book_id,
        "branch_id": f.branch_id,
    });
    assert_eq!(count_events(&pool, EventKind::NoCopiesAvailable, ids).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_return_is_audited_and_repeat_is_a_warning() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 2).await;

    let borrow = services
        .borrows
        .borrow_book(f.student_id, f.book_id, f.branch_id)
        .await
        .unwrap();

    let first = services.borrows.return_borrow(borrow.id).await.unwrap();
    assert!(!first.is_warning());

    let returned_at = services.borrows.get(borrow.id).await.unwrap().returned_at;
    assert!(returned_at.is_some());

    let second = services.borrows.return_borrow(borrow.id).await.unwrap();
    assert!(matches!(second, ReturnOutcome::AlreadyReturned(_)));
    assert_eq!(services.borrows.get(borrow.id).await.unwrap().returned_at, returned_at);

    let returned = json!({ "borrow_id": borrow.id });
    assert_eq!(count_events(&pool, EventKind::BorrowReturned, returned).await, 1);
    assert_eq!(
        services
            .availability
            .available_copies(f.book_id, f.branch_id)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
#[ignore]
async fn test_return_of_unknown_borrow_is_a_warning() {
    let (services, pool) = setup().await;
    let missing = json!({ "borrow_id": i32::MAX });

    let outcome = services.borrows.return_borrow(i32::MAX).await.unwrap();
    assert!(matches!(outcome, ReturnOutcome::NotFound(id) if id == i32::MAX));

    assert!(services.borrows.get(i32::MAX).await.is_err());
    assert_eq!(count_events(&pool, EventKind::BorrowReturned, missing).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_negative_set_is_rejected_and_audited() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 3).await;

    let err = services
        .inventory
        .set_copies(&InventoryWrite {
            book_id: f.book_id,
            branch_id: f.branch_id,
            copies_total: -1,
        })
        .await
        .unwrap_err();
    match err {
        AppError::InvariantViolation(row) => assert_eq!(row["copies_total"], -1),
        other => panic!("expected invariant violation, got {:?}", other),
    }

    let ledger = services.availability.ledger(f.book_id, f.branch_id).await.unwrap();
    assert_eq!(ledger.copies_total, 3);

    let attempted = json!({
        "book_id": f.book_id,
        "branch_id": f.branch_id,
        "copies_total": -1,
    });
    assert_eq!(
        count_events(&pool, EventKind::NegativeInventoryAttempt, attempted).await,
        1
    );
}

#[tokio::test]
#[ignore]
async fn test_negative_adjust_is_vetoed_by_database_and_audited() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 2).await;

    let err = services
        .inventory
        .adjust_copies(f.book_id, f.branch_id, -5)
        .await
        .unwrap_err();
    match err {
        AppError::InvariantViolation(row) => assert_eq!(row["copies_total"], -3),
        other => panic!("expected invariant violation, got {:?}", other),
    }

    let ledger = services.availability.ledger(f.book_id, f.branch_id).await.unwrap();
    assert_eq!(ledger.copies_total, 2);

    let attempted = json!({ "book_id": f.book_id, "branch_id": f.branch_id });
    assert_eq!(
        count_events(&pool, EventKind::NegativeInventoryAttempt, attempted).await,
        1
    );

    let adjusted = services
        .inventory
        .adjust_copies(f.book_id, f.branch_id, 1)
        .await
        .unwrap();
    assert_eq!(adjusted.copies_total, 3);
}

#[tokio::test]
#[ignore]
async fn test_direct_sql_cannot_store_negative_copies() {
    let (services, pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 1).await;

    let err = sqlx::query("UPDATE inventories SET copies_total = -7 WHERE book_id = $1 AND branch_id = $2")
        .bind(f.book_id)
        .bind(f.branch_id)
        .execute(&pool)
        .await
        .unwrap_err();
    let db = err.as_database_error().expect("database error");
    assert_eq!(db.code().as_deref(), Some("23514"));
    assert_eq!(db.constraint(), Some("ck_inventories_nonneg"));

    // The veto carries the attempted row for whoever issued the write
    let detail = db
        .try_downcast_ref::<PgDatabaseError>()
        .and_then(|pg| pg.detail())
        .expect("row detail");
    let row: Value = serde_json::from_str(detail).unwrap();
    assert_eq!(row["book_id"], f.book_id);
    assert_eq!(row["copies_total"], -7);

    let ledger = services.availability.ledger(f.book_id, f.branch_id).await.unwrap();
    assert_eq!(ledger.copies_total, 1);

    // The same veto raised through the storage layer is audited
    let mapped = guard_error(err, json!({}));
    assert!(matches!(mapped, AppError::InvariantViolation(ref r) if r["copies_total"] == -7));
}

#[tokio::test]
#[ignore]
async fn test_event_log_is_append_only() {
    let (services, pool) = setup().await;
    let entry = services
        .events
        .log_event(EventKind::Other("LEDGER_TEST".to_string()), Some(json!({ "n": 1 })))
        .await
        .unwrap();

    let err = sqlx::query("DELETE FROM event_log WHERE id = $1")
        .bind(entry.id)
        .execute(&pool)
        .await;
    assert!(err.is_err());

    let page = services
        .events
        .list(&EventQuery {
            event: Some("LEDGER_TEST".to_string()),
            page: Some(1),
            per_page: Some(500),
        })
        .await
        .unwrap();
    assert!(page.entries.iter().any(|e| e.id == entry.id));
    assert!(page.per_page <= 200);
}

#[tokio::test]
#[ignore]
async fn test_inventory_for_unknown_book_is_a_bad_request() {
    let (services, _pool) = setup().await;
    let f = fixture(&services).await;

    let err = services
        .inventory
        .set_copies(&InventoryWrite {
            book_id: i32::MAX,
            branch_id: f.branch_id,
            copies_total: 2,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {:?}", err);
}

#[tokio::test]
#[ignore]
async fn test_adjust_past_integer_range_is_a_bad_request() {
    let (services, _pool) = setup().await;
    let f = fixture(&services).await;
    set_copies(&services, &f, 2).await;

    let err = services
        .inventory
        .adjust_copies(f.book_id, f.branch_id, i32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {:?}", err);

    let ledger = services.availability.ledger(f.book_id, f.branch_id).await.unwrap();
    assert_eq!(ledger.copies_total, 2);
}

#[tokio::test]
#[ignore]
async fn test_event_pages_run_most_recent_first() {
    let (services, _pool) = setup().await;
    let name = unique("PAGING").replace(' ', "_");

    let mut ids = Vec::new();
    for n in 0..5 {
        let entry = services
            .events
            .log_event(EventKind::Other(name.clone()), Some(json!({ "n": n })))
            .await
            .unwrap();
        ids.push(entry.id);
    }
    ids.reverse();

    let page = |page: i64| EventQuery {
        event: Some(name.clone()),
        page: Some(page),
        per_page: Some(2),
    };

    let first = services.events.list(&page(1)).await.unwrap();
    assert_eq!(first.total, 5);
    let second = services.events.list(&page(2)).await.unwrap();
    let third = services.events.list(&page(3)).await.unwrap();

    let seen: Vec<i64> = first
        .entries
        .iter()
        .chain(&second.entries)
        .chain(&third.entries)
        .map(|e| e.id)
        .collect();
    assert_eq!(seen, ids);

    let beyond = services.events.list(&page(4)).await.unwrap();
    assert!(beyond.entries.is_empty());
    assert_eq!(beyond.total, 5);

    let far = services.events.list(&page(i64::MAX)).await.unwrap();
    assert!(far.entries.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_event_written_in_transaction_follows_its_outcome() {
    let (services, pool) = setup().await;
    let name = unique("TX_EVENT").replace(' ', "_");
    let kind = EventKind::Other(name.clone());

    let mut tx = pool.begin().await.unwrap();
    services
        .events
        .log_event_with(&mut *tx, kind.clone(), Some(json!({ "kept": false })))
        .await
        .unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(count_events(&pool, kind.clone(), json!({})).await, 0);

    let mut tx = pool.begin().await.unwrap();
    services
        .events
        .log_event_with(&mut *tx, kind.clone(), Some(json!({ "kept": true })))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(count_events(&pool, kind, json!({ "kept": true })).await, 1);
}
