// ============================================================================
// Tests d'intégration : chargement de la fenêtre de détails
// ============================================================================
// Un service de test compte les appels et peut échouer ou ne jamais
// répondre. Un layer tracing compte les événements ERROR émis.
// ============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use lazyfolio::api::StockService;
use lazyfolio::modal::{fetch, DetailsModal};
use lazyfolio::models::{NewsArticle, Stock, StockDetails, TimeRange, OHLC};

// ============================================================================
// Doubles de test
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

struct MockService {
    behavior: Behavior,
    detail_calls: AtomicUsize,
    news_calls: AtomicUsize,
}

impl MockService {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            detail_calls: AtomicUsize::new(0),
            news_calls: AtomicUsize::new(0),
        }
    }

    async fn wait(&self) {
        if self.behavior == Behavior::Hang {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }
}

#[async_trait]
impl StockService for MockService {
    async fn get_stock_details(&self, symbol: &str, range: TimeRange) -> Result<StockDetails> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if self.behavior == Behavior::Fail {
            bail!("détails indisponibles pour {}", symbol);
        }

        let start = Utc.with_ymd_and_hms(2026, 9, 16, 0, 0, 0).unwrap();
        Ok(StockDetails {
            volume: 1_000_000,
            monthly_potential: 2.5,
            historical_data: vec![
                OHLC::new(start, 100.0, 102.0, 99.0, 101.0, 10),
                OHLC::new(start + chrono::Duration::days(30), 101.0, 106.0, 100.0, 105.0, 12),
            ],
            company_name: Some(format!("{} ({})", symbol, range)),
            exchange: None,
        })
    }

    async fn get_stock_news(&self, symbol: &str) -> Result<Vec<NewsArticle>> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if self.behavior == Behavior::Fail {
            bail!("actualités indisponibles pour {}", symbol);
        }

        Ok(vec![NewsArticle::new(
            format!("{} publie ses résultats", symbol),
            "Reuters".to_string(),
            "https://example.com/article".to_string(),
            Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap(),
        )])
    }
}

/// Layer qui compte les événements de niveau ERROR
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn apple() -> Stock {
    Stock::new(
        "AAPL".to_string(),
        "Apple Inc.".to_string(),
        "NASDAQ".to_string(),
        150.0,
        1.2,
    )
}

const TIMEOUT: Duration = Duration::from_secs(8);

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn open_loads_details_and_news() {
    let service = MockService::new(Behavior::Succeed);
    let mut modal = DetailsModal::new();

    let request = modal.open(apple());
    assert!(modal.is_loading());

    let outcome = fetch(&service, request, TIMEOUT).await;
    assert!(modal.apply(outcome));

    assert!(!modal.is_loading());
    assert_eq!(modal.details().unwrap().volume, 1_000_000);
    assert_eq!(modal.news().len(), 1);
    assert_eq!(service.detail_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.news_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn range_change_triggers_exactly_one_fetch() {
    let service = MockService::new(Behavior::Succeed);
    let mut modal = DetailsModal::new();

    let first = modal.open(apple());
    modal.apply(fetch(&service, first, TIMEOUT).await);

    // Même plage : aucune requête
    assert!(modal.select_range(TimeRange::OneMonth).is_none());

    let request = modal.select_range(TimeRange::OneYear).unwrap();
    assert_eq!(request.range, TimeRange::OneYear);
    assert!(modal.is_loading());

    let outcome = fetch(&service, request, TIMEOUT).await;
    assert!(modal.is_loading()); // jusqu'à ce que le résultat soit appliqué
    modal.apply(outcome);

    assert!(!modal.is_loading());
    assert_eq!(service.detail_calls.load(Ordering::SeqCst), 2);
    assert_eq!(service.news_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        modal.details().unwrap().company_name.as_deref(),
        Some("AAPL (1y)")
    );
}

#[tokio::test]
async fn both_fetches_failing_logs_one_error() {
    let errors = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let service = MockService::new(Behavior::Fail);
    let mut modal = DetailsModal::new();

    let request = modal.open(apple());
    let outcome = fetch(&service, request, TIMEOUT).await;
    assert!(outcome.result.is_err());
    assert!(modal.apply(outcome));

    assert!(modal.details().is_none());
    assert!(modal.news().is_empty());
    assert!(!modal.is_loading());
    assert!(modal.last_error().is_some());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failure_after_success_keeps_previous_data() {
    let ok = MockService::new(Behavior::Succeed);
    let failing = MockService::new(Behavior::Fail);
    let mut modal = DetailsModal::new();

    let first = modal.open(apple());
    modal.apply(fetch(&ok, first, TIMEOUT).await);

    let request = modal.select_range(TimeRange::FiveYears).unwrap();
    modal.apply(fetch(&failing, request, TIMEOUT).await);

    assert!(!modal.is_loading());
    assert_eq!(modal.details().unwrap().volume, 1_000_000);
    assert_eq!(modal.news().len(), 1);
    assert!(modal.last_error().is_some());
}

#[tokio::test]
async fn superseded_fetch_is_discarded() {
    let service = MockService::new(Behavior::Succeed);
    let mut modal = DetailsModal::new();

    let first = modal.open(apple());
    let second = modal.select_range(TimeRange::OneDay).unwrap();

    // Les deux requêtes sont en vol ; la plus récente est appliquée d'abord
    let (stale, fresh) = tokio::join!(
        fetch(&service, first, TIMEOUT),
        fetch(&service, second, TIMEOUT)
    );

    assert!(modal.apply(fresh));
    assert!(!modal.apply(stale));
    assert_eq!(
        modal.details().unwrap().company_name.as_deref(),
        Some("AAPL (1d)")
    );
}

#[tokio::test]
async fn closed_modal_ignores_late_result() {
    let service = MockService::new(Behavior::Succeed);
    let mut modal = DetailsModal::new();

    let request = modal.open(apple());
    modal.close();

    assert!(!modal.apply(fetch(&service, request, TIMEOUT).await));
    assert!(modal.details().is_none());
    assert!(!modal.is_open());
}

#[tokio::test]
async fn hanging_service_times_out() {
    let service = MockService::new(Behavior::Hang);
    let mut modal = DetailsModal::new();

    let request = modal.open(apple());
    let outcome = fetch(&service, request, Duration::from_millis(50)).await;

    let error = outcome.result.as_ref().unwrap_err();
    assert!(error.to_string().contains("Pas de réponse"));

    modal.apply(outcome);
    assert!(!modal.is_loading());
    assert!(modal.details().is_none());
    assert!(modal.last_error().is_some());
}
