// ============================================================================
// Structure : OHLC (Open, High, Low, Close)
// ============================================================================
// Un point de l'historique d'un titre : une chandelle japonaise par
// intervalle de temps (5 minutes, 1 heure, 1 jour... selon la plage choisie)
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. f64 pour les prix, u64 pour le volume (toujours positif)
// 3. Fonctions libres sur des slices (&[OHLC]) plutôt qu'un wrapper
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Horizon utilisé pour ramener une variation à un "potentiel mensuel"
const MONTH_DAYS: f64 = 30.0;

/// Une chandelle japonaise (candlestick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OHLC {
    /// Début de l'intervalle couvert par la chandelle
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume échangé pendant l'intervalle
    pub volume: u64,
}

impl OHLC {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Chandelle haussière (ou neutre) : affichée en vert
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Variation en pourcentage depuis l'ouverture
    pub fn change_percent(&self) -> f64 {
        if self.open == 0.0 {
            0.0
        } else {
            ((self.close - self.open) / self.open) * 100.0
        }
    }
}

/// Bornes de prix (low min, high max) d'une série
///
/// CONCEPT RUST : fold
/// - Un seul passage sur les données pour le min et le max
/// - None si la série est vide
pub fn price_bounds(candles: &[OHLC]) -> Option<(f64, f64)> {
    if candles.is_empty() {
        return None;
    }

    let (min, max) = candles.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), c| (min.min(c.low), max.max(c.high)),
    );

    Some((min, max))
}

/// Variation totale de la série en pourcentage (premier close → dernier close)
pub fn series_change_percent(candles: &[OHLC]) -> Option<f64> {
    let first = candles.first()?;
    let last = candles.last()?;

    if first.close == 0.0 {
        return None;
    }

    Some(((last.close - first.close) / first.close) * 100.0)
}

/// Estimation du potentiel mensuel (en %)
///
/// La variation observée sur la série est ramenée à 30 jours au prorata
/// de la durée réellement couverte. Une série de moins d'un jour est
/// comptée comme un jour entier pour éviter d'extrapoler le bruit intraday.
pub fn monthly_potential(candles: &[OHLC]) -> f64 {
    let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
        return 0.0;
    };

    let Some(change) = series_change_percent(candles) else {
        return 0.0;
    };

    let span_days = (last.timestamp - first.timestamp).num_seconds() as f64 / 86_400.0;
    let span_days = span_days.max(1.0);

    change * MONTH_DAYS / span_days
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_ohlc_bullish() {
        let ohlc = OHLC::new(day(0), 100.0, 110.0, 95.0, 105.0, 1000);
        assert!(ohlc.is_bullish());

        let ohlc = OHLC::new(day(0), 100.0, 105.0, 90.0, 95.0, 1000);
        assert!(!ohlc.is_bullish());
    }

    #[test]
    fn test_change_percent_zero_open() {
        let ohlc = OHLC::new(day(0), 0.0, 1.0, 0.0, 1.0, 0);
        assert_eq!(ohlc.change_percent(), 0.0);
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(price_bounds(&[]), None);

        let candles = vec![
            OHLC::new(day(0), 100.0, 110.0, 95.0, 105.0, 1000),
            OHLC::new(day(1), 105.0, 120.0, 101.0, 118.0, 1000),
        ];
        assert_eq!(price_bounds(&candles), Some((95.0, 120.0)));
    }

    #[test]
    fn test_monthly_potential_scales_to_thirty_days() {
        // +10% sur 60 jours → +5% sur 30 jours
        let candles = vec![
            OHLC::new(day(0), 100.0, 100.0, 100.0, 100.0, 0),
            OHLC::new(day(60), 110.0, 110.0, 110.0, 110.0, 0),
        ];
        assert!((monthly_potential(&candles) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_potential_short_series() {
        let base = day(0);
        let candles = vec![
            OHLC::new(base, 100.0, 100.0, 100.0, 100.0, 0),
            OHLC::new(base + Duration::hours(2), 99.0, 99.0, 99.0, 99.0, 0),
        ];
        // Moins d'un jour : compté comme 1 jour → -1% × 30
        assert!((monthly_potential(&candles) + 30.0).abs() < 1e-9);
        assert_eq!(monthly_potential(&[]), 0.0);
    }
}
