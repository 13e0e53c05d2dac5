// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Implémente StockService au-dessus de deux endpoints publics :
// - /v8/finance/chart/{symbol} : historique OHLCV + métadonnées du titre
// - /v1/finance/search         : actualités associées au ticker
//
// CONCEPTS RUST :
// 1. async/await : appels réseau non-bloquants
// 2. Serde : désérialisation JSON vers des structures privées
// 3. anyhow::Context : chaque échec porte un message explicite
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::api::StockService;
use crate::models::{ohlc, NewsArticle, StockDetails, TimeRange, OHLC};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// Nombre d'articles demandés
const NEWS_COUNT: usize = 10;

/// User-Agent navigateur, sans quoi Yahoo bloque les requêtes
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Métadonnées du titre
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    regular_market_volume: Option<u64>,
    long_name: Option<String>,
    short_name: Option<String>,
    full_exchange_name: Option<String>,
    exchange_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

/// Colonnes OHLCV (valeurs null pour les intervalles sans échange)
#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    title: Option<String>,
    publisher: Option<String>,
    link: Option<String>,
    provider_publish_time: Option<i64>,
}

// ============================================================================
// Client
// ============================================================================

/// Client Yahoo Finance
///
/// CONCEPT : un seul reqwest::Client réutilisé
/// - Le client garde un pool de connexions
/// - Le créer une fois évite de renégocier TLS à chaque appel
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
}

impl YahooClient {
    /// Crée le client avec un délai max par requête
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self { client })
    }

    /// GET + vérification du statut HTTP + parsing JSON
    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(url = %url, "Sending HTTP request to Yahoo Finance");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Échec de la requête HTTP vers Yahoo Finance")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            warn!(status = %status, "Yahoo Finance returned error status");
            anyhow::bail!("Yahoo Finance a retourné une erreur : HTTP {}", status);
        }

        response
            .json::<T>()
            .await
            .context("Échec du parsing JSON de la réponse Yahoo")
    }
}

#[async_trait]
impl StockService for YahooClient {
    #[instrument(skip(self, range), fields(range = %range))]
    async fn get_stock_details(&self, symbol: &str, range: TimeRange) -> Result<StockDetails> {
        let url = build_chart_url(symbol, range);
        let response: ChartResponse = self.get_json(&url).await?;
        let details = parse_chart_response(response, symbol)?;

        info!(candles = details.historical_data.len(), "Successfully fetched stock details");
        Ok(details)
    }

    #[instrument(skip(self))]
    async fn get_stock_news(&self, symbol: &str) -> Result<Vec<NewsArticle>> {
        let url = build_news_url(symbol);
        let response: SearchResponse = self.get_json(&url).await?;
        let news = parse_news_response(response);

        info!(articles = news.len(), "Successfully fetched stock news");
        Ok(news)
    }
}

// ============================================================================
// Construction des URLs
// ============================================================================

fn build_chart_url(symbol: &str, range: TimeRange) -> String {
    format!(
        "{}/{}?range={}&interval={}",
        CHART_URL,
        symbol,
        range.yahoo_range(),
        range.yahoo_interval()
    )
}

fn build_news_url(symbol: &str) -> String {
    format!(
        "{}?q={}&quotesCount=0&newsCount={}",
        SEARCH_URL, symbol, NEWS_COUNT
    )
}

// ============================================================================
// Parsing
// ============================================================================

/// Convertit la réponse "chart" en StockDetails
///
/// - Les chandelles incomplètes (une valeur null) sont ignorées
/// - Volume : volume de séance des métadonnées, sinon celui de la dernière
///   chandelle
/// - Potentiel mensuel : variation de la série ramenée à 30 jours
fn parse_chart_response(response: ChartResponse, symbol: &str) -> Result<StockDetails> {
    if let Some(err) = response.chart.error {
        anyhow::bail!(
            "Yahoo Finance : {} ({})",
            err.description.unwrap_or_default(),
            err.code.unwrap_or_default()
        );
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .context("Aucune donnée retournée par Yahoo Finance")?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .context("Pas de données OHLC dans la réponse")?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    // CONCEPT RUST : Option chaining dans une closure
    // - get(i) : None si l'index dépasse
    // - and_then(|&v| v) : None si la valeur JSON est null
    let value_at = |column: &[Option<f64>], i: usize| column.get(i).and_then(|&v| v);

    let mut candles = Vec::with_capacity(timestamps.len());
    let mut skipped = 0;
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&opens, i),
            value_at(&highs, i),
            value_at(&lows, i),
            value_at(&closes, i),
        ) else {
            skipped += 1;
            continue;
        };

        let volume = volumes.get(i).and_then(|&v| v).unwrap_or(0);
        let datetime = DateTime::from_timestamp(timestamp, 0).context("Timestamp invalide")?;

        candles.push(OHLC::new(datetime, open, high, low, close, volume));
    }

    if skipped > 0 {
        warn!(skipped, total = timestamps.len(), "Skipped candles with missing data");
    }

    if candles.is_empty() {
        anyhow::bail!("Aucune donnée OHLC valide trouvée pour {}", symbol);
    }

    // Yahoo renvoie déjà l'ordre chronologique, on le garantit quand même
    candles.sort_by_key(|c| c.timestamp);

    let meta = result.meta;
    let volume = meta
        .regular_market_volume
        .or_else(|| candles.last().map(|c| c.volume))
        .unwrap_or(0);

    Ok(StockDetails {
        volume,
        monthly_potential: ohlc::monthly_potential(&candles),
        historical_data: candles,
        company_name: meta.long_name.or(meta.short_name),
        exchange: meta.full_exchange_name.or(meta.exchange_name),
    })
}

/// Convertit la réponse "search" en articles
///
/// Les articles sans titre, sans lien ou sans date sont ignorés.
fn parse_news_response(response: SearchResponse) -> Vec<NewsArticle> {
    response
        .news
        .into_iter()
        .filter_map(|item| {
            let published_at = DateTime::from_timestamp(item.provider_publish_time?, 0)?;
            Some(NewsArticle::new(
                item.title?,
                item.publisher.unwrap_or_default(),
                item.link?,
                published_at,
            ))
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_JSON: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "symbol": "AAPL",
                    "regularMarketVolume": 52000000,
                    "longName": "Apple Inc.",
                    "fullExchangeName": "NasdaqGS"
                },
                "timestamp": [1704067200, 1704153600, 1704240000],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 101.0, null],
                        "high":   [102.0, 106.0, 107.0],
                        "low":    [99.0, 100.0, 104.0],
                        "close":  [101.0, 105.0, 106.0],
                        "volume": [1000, 2000, 3000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_build_urls() {
        let url = build_chart_url("AAPL", TimeRange::OneYear);
        assert!(url.contains("/chart/AAPL"));
        assert!(url.contains("range=1y"));
        assert!(url.contains("interval=1d"));

        let url = build_news_url("TSLA");
        assert!(url.contains("q=TSLA"));
        assert!(url.contains("newsCount=10"));
    }

    #[test]
    fn test_parse_chart_response() {
        let response: ChartResponse = serde_json::from_str(CHART_JSON).unwrap();
        let details = parse_chart_response(response, "AAPL").unwrap();

        // La 3e chandelle (open null) est ignorée
        assert_eq!(details.historical_data.len(), 2);
        assert_eq!(details.volume, 52_000_000);
        assert_eq!(details.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(details.exchange.as_deref(), Some("NasdaqGS"));
        assert_eq!(details.last_close(), Some(105.0));
        assert!(details.monthly_potential > 0.0);
    }

    #[test]
    fn test_parse_chart_error() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        let err = parse_chart_response(response, "NOPE").unwrap_err();
        assert!(err.to_string().contains("No data found"));
    }

    #[test]
    fn test_parse_news_response() {
        let json = r#"{
            "news": [
                {"title": "Apple lance...", "publisher": "Reuters", "link": "https://r.com/1", "providerPublishTime": 1704067200},
                {"title": "Sans lien", "publisher": "X", "providerPublishTime": 1704067200}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let news = parse_news_response(response);
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].source, "Reuters");
        assert_eq!(news[0].published_label(), "1 janvier 2024");
    }

    #[test]
    fn test_parse_news_without_field() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_news_response(response).is_empty());
    }
}
