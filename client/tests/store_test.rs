use client::store::{FetchStatus, ReportsStore, Severity};
use client::{Part, ReportFields, ReportsApi};
use futures::channel::oneshot;
use futures::channel::oneshot::Sender;
use rand::Rng;
use serial_test::serial;
use server::sqlite::Mode;
use server::sqlite::Sqlite;
use server::domain::Storage;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::{env, path::PathBuf};
use test_context::{test_context, AsyncTestContext};
use tokio::task::JoinHandle;
use uuid::Uuid;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789_";
const DB_LEN: usize = 20;
const TEST_ORIGIN: &str = "http://localhost:5173";

struct StoreAsyncContext {
    db: PathBuf,
    uri: String,
    shutdown: Sender<()>,
    join: JoinHandle<()>,
}

fn get_available_port() -> Option<u16> {
    loop {
        let port = rand::thread_rng().gen_range(8000..9000);
        if TcpListener::bind(("0.0.0.0", port)).is_ok() {
            return Some(port);
        }
    }
}

impl AsyncTestContext for StoreAsyncContext {
    async fn setup() -> StoreAsyncContext {
        let tmp_dir = env::temp_dir();

        let db_file: String = (10..DB_LEN)
            .map(|_| {
                let idx = rand::thread_rng().gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        let db = tmp_dir.join(db_file + ".db");

        Sqlite::open(db.clone(), Mode::ReadWrite)
            .expect("Database file cannot be created")
            .new_database()
            .unwrap();

        let port = get_available_port().unwrap();
        let uri = format!("http://localhost:{port}");

        let (send, recv) = oneshot::channel::<()>();

        let cloned_db = db.clone();
        let task = tokio::spawn(async move {
            let app = server::create_routes(cloned_db, TEST_ORIGIN);
            let socket: SocketAddr = format!("0.0.0.0:{port}").parse().unwrap();
            let listener = tokio::net::TcpListener::bind(socket).await.unwrap();
            axum::serve(listener, app)
                .with_graceful_shutdown(async { recv.await.unwrap_or_default() })
                .await
                .unwrap()
        });

        StoreAsyncContext {
            db,
            uri,
            shutdown: send,
            join: task,
        }
    }

    async fn teardown(self) {
        self.shutdown.send(()).unwrap_or_default();
        self.join.await.unwrap_or_default();
        tokio::fs::remove_file(self.db).await.unwrap_or_default();
    }
}

fn alice() -> ReportFields {
    ReportFields {
        sender_name: String::from("Alice"),
        age: 30,
        job: String::from("Engineer"),
    }
}

fn attachment(name: &str, content: &[u8]) -> Part {
    Part::bytes(content.to_vec()).file_name(name.to_owned())
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn fetch_reports_replaces_list(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    api.create(&alice(), None).await.unwrap();
    api.create(&alice(), None).await.unwrap();
    let mut store = ReportsStore::new();

    // Act
    store.fetch_reports(&api).await;

    // Assert
    assert_eq!(store.status, FetchStatus::Succeeded);
    assert_eq!(store.reports.len(), 2);
    assert!(store.notification().is_none());
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn fetch_reports_failure_notifies(ctx: &mut StoreAsyncContext) {
    // Arrange
    let _ = ctx;
    // A port nothing listens on.
    let api = ReportsApi::new("http://localhost:1").unwrap();
    let mut store = ReportsStore::new();

    // Act
    store.fetch_reports(&api).await;

    // Assert
    assert_eq!(store.status, FetchStatus::Failed);
    assert!(store.reports.is_empty());
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Error fetching reports.");
    assert_eq!(notification.severity, Severity::Error);
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn fetch_detail_populates_slot(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let created = api
        .create(&alice(), Some(attachment("cv.txt", b"cv body")))
        .await
        .unwrap()
        .pop()
        .unwrap();
    let mut store = ReportsStore::new();

    // Act
    store.fetch_report_detail(&api, &created.id).await;

    // Assert
    assert_eq!(store.detail_status, FetchStatus::Succeeded);
    let detail = store.detail.as_ref().unwrap();
    assert_eq!(detail.id, created.id);
    assert!(detail.file.is_some());
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn fetch_detail_missing_notifies(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let mut store = ReportsStore::new();

    // Act
    store
        .fetch_report_detail(&api, &Uuid::new_v4().to_string())
        .await;

    // Assert
    assert_eq!(store.detail_status, FetchStatus::Failed);
    assert!(store.detail.is_none());
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Error fetching report details.");
    assert_eq!(notification.severity, Severity::Error);
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn create_appends_to_list(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let mut store = ReportsStore::new();
    store.fetch_reports(&api).await;
    assert!(store.reports.is_empty());

    // Act
    store.create_report(&api, &alice(), None).await;

    // Assert
    assert_eq!(store.reports.len(), 1);
    assert_eq!(store.reports[0].file_url, None);
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Report created successfully!");
    assert_eq!(notification.severity, Severity::Success);
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn update_merges_list_entry_and_detail(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let mut store = ReportsStore::new();
    store
        .create_report(&api, &alice(), Some(attachment("cv.txt", b"cv body")))
        .await;
    let id = store.reports[0].id.clone();
    store.fetch_report_detail(&api, &id).await;
    store.clear_notification();

    let renamed = ReportFields {
        sender_name: String::from("Alice Smith"),
        age: 31,
        job: String::from("Architect"),
    };

    // Act
    store.update_report(&api, &id, &renamed, None, false).await;

    // Assert
    assert_eq!(store.reports[0].sender_name, "Alice Smith");
    assert_eq!(store.reports[0].age, 31);
    let detail = store.detail.as_ref().unwrap();
    assert_eq!(detail.sender_name, "Alice Smith");
    // The inlined payload loaded by the detail fetch survives the merge.
    assert!(detail.file.is_some());
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Report updated successfully!");
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn update_failure_keeps_cache(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let mut store = ReportsStore::new();
    store.create_report(&api, &alice(), None).await;
    store.clear_notification();
    let before = store.reports.clone();

    // Act
    store
        .update_report(&api, &Uuid::new_v4().to_string(), &alice(), None, false)
        .await;

    // Assert
    assert_eq!(store.reports, before);
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Error updating report.");
    assert_eq!(notification.severity, Severity::Error);
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn delete_removes_entry_and_clears_detail(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let mut store = ReportsStore::new();
    store.create_report(&api, &alice(), None).await;
    let id = store.reports[0].id.clone();
    store.fetch_report_detail(&api, &id).await;
    store.clear_notification();

    // Act
    store.delete_report(&api, &id).await;

    // Assert
    assert!(store.reports.is_empty());
    assert!(store.detail.is_none());
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Report deleted successfully!");
    assert_eq!(notification.severity, Severity::Success);
}

#[test_context(StoreAsyncContext)]
#[tokio::test]
#[serial]
async fn delete_missing_notifies_error(ctx: &mut StoreAsyncContext) {
    // Arrange
    let api = ReportsApi::new(&ctx.uri).unwrap();
    let mut store = ReportsStore::new();
    store.create_report(&api, &alice(), None).await;
    store.clear_notification();

    // Act
    store
        .delete_report(&api, &Uuid::new_v4().to_string())
        .await;

    // Assert
    assert_eq!(store.reports.len(), 1);
    let notification = store.take_notification().unwrap();
    assert_eq!(notification.message, "Error deleting report.");
    assert_eq!(notification.severity, Severity::Error);
}
