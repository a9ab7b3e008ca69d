use super::*;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use shared::domain::{Cell, RawRow};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct FakeRows {
    rows: Vec<RawRow>,
    modified: Option<DateTime<Utc>>,
    fail_rows: bool,
    fail_modified: bool,
    row_calls: AtomicUsize,
}

#[async_trait]
impl RowSource for FakeRows {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, SheetsError> {
        self.row_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rows {
            return Err(SheetsError::InvalidCredentials("revoked".into()));
        }
        Ok(self.rows.clone())
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, SheetsError> {
        if self.fail_modified {
            return Err(SheetsError::NotConfigured("drive disabled".into()));
        }
        Ok(self.modified)
    }
}

fn row(cells: &[&str]) -> RawRow {
    cells.iter().map(|c| Cell::from(*c)).collect()
}

fn sample_rows() -> Vec<RawRow> {
    vec![
        row(&["Иван", "Rest", "Soup", "3", "", "2", "6"]),
        row(&["Ана", "Rest", "Salad", "5", "4.5", "1", "4.5"]),
        row(&["Иван", "Hora", "Bread", "1", "", "1", "1"]),
        row(&["total", "", "", "", "", "", "11.5"]),
    ]
}

#[tokio::test]
async fn load_orders_normalizes_and_summarizes() {
    let modified = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).single().expect("ts");
    let source = Arc::new(FakeRows {
        rows: sample_rows(),
        modified: Some(modified),
        ..FakeRows::default()
    });
    let ctx = ApiContext::new(source, Duration::ZERO);

    let payload = load_orders(&ctx).await.expect("payload");
    assert_eq!(payload.orders.len(), 3);
    let summary: Vec<(&str, f64)> = payload
        .summary
        .iter()
        .map(|entry| (entry.client.as_str(), entry.total))
        .collect();
    assert_eq!(summary, vec![("Ана", 4.5), ("Иван", 7.0)]);
    assert_eq!(payload.last_modified, Some(LastModified::Timestamp(modified)));
}

#[tokio::test]
async fn modified_time_failure_does_not_fail_orders() {
    let source = Arc::new(FakeRows {
        rows: sample_rows(),
        fail_modified: true,
        ..FakeRows::default()
    });
    let ctx = ApiContext::new(source, Duration::ZERO);

    let payload = load_orders(&ctx).await.expect("payload");
    assert_eq!(payload.orders.len(), 3);
    assert!(payload.last_modified.is_none());
}

#[tokio::test]
async fn row_failure_maps_to_upstream_error() {
    let source = Arc::new(FakeRows {
        fail_rows: true,
        ..FakeRows::default()
    });
    let ctx = ApiContext::new(source, Duration::ZERO);

    let err = load_orders(&ctx).await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Upstream);
    assert!(err.message.contains("revoked"));
}

#[tokio::test]
async fn cache_serves_repeat_requests_within_ttl() {
    let source = Arc::new(FakeRows {
        rows: sample_rows(),
        ..FakeRows::default()
    });
    let ctx = ApiContext::new(source.clone(), Duration::from_secs(120));

    let first = load_orders(&ctx).await.expect("first");
    let second = load_orders(&ctx).await.expect("second");
    assert_eq!(first, second);
    assert_eq!(source.row_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_ttl_always_refetches() {
    let source = Arc::new(FakeRows {
        rows: sample_rows(),
        ..FakeRows::default()
    });
    let ctx = ApiContext::new(source.clone(), Duration::ZERO);

    load_orders(&ctx).await.expect("first");
    load_orders(&ctx).await.expect("second");
    assert_eq!(source.row_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn last_modified_reports_not_configured() {
    let ctx = ApiContext::new(Arc::new(sheets_integration::MissingRowSource), Duration::ZERO);
    let err = last_modified(&ctx).await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotConfigured);
}
