// ============================================================================
// Favoris : FavoriteEntry, StockAnalysis, Recommendation
// ============================================================================
// Un favori = une position du portefeuille : un ticker, une quantité et le
// dernier instantané d'analyse (prix, nom, recommandation).
//
// CONCEPT : Désérialisation tolérante
// - Le fichier des favoris peut contenir des entrées incomplètes
// - Un champ numérique absent, null ou illisible vaut 0
// - Une recommandation inconnue vaut "CONSERVER"
// - Ainsi une entrée abîmée ne fait jamais échouer tout le portefeuille
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{ohlc, StockDetails};

/// Potentiel mensuel (en %) au-delà duquel on recommande d'acheter / vendre
const RECOMMENDATION_THRESHOLD: f64 = 2.0;

// ============================================================================
// Enum : Recommendation
// ============================================================================
// CONCEPT RUST : Enum fermé plutôt que comparaison de strings
// - Trois états de présentation, chacun avec son label et son style
// - Le compilateur force à traiter les trois cas (pas de faute de frappe)
// ============================================================================

/// Recommandation associée à une analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Recommendation {
    /// "ACHETER"
    Buy,
    /// "VENDRE"
    Sell,
    /// "CONSERVER" (et tout label inconnu)
    #[default]
    Hold,
}

impl Recommendation {
    /// Label tel qu'affiché et stocké
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "ACHETER",
            Recommendation::Sell => "VENDRE",
            Recommendation::Hold => "CONSERVER",
        }
    }

    /// Parse un label ; tout ce qui n'est ni ACHETER ni VENDRE est CONSERVER
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "ACHETER" => Recommendation::Buy,
            "VENDRE" => Recommendation::Sell,
            _ => Recommendation::Hold,
        }
    }

    /// Recommandation dérivée du potentiel mensuel estimé
    pub fn from_potential(monthly_potential: f64) -> Self {
        if monthly_potential >= RECOMMENDATION_THRESHOLD {
            Recommendation::Buy
        } else if monthly_potential <= -RECOMMENDATION_THRESHOLD {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }
}

impl From<Option<String>> for Recommendation {
    fn from(label: Option<String>) -> Self {
        label
            .map(|l| Recommendation::from_label(&l))
            .unwrap_or_default()
    }
}

impl From<Recommendation> for String {
    fn from(recommendation: Recommendation) -> Self {
        recommendation.label().to_string()
    }
}

// ============================================================================
// Structure : StockAnalysis
// ============================================================================

/// Instantané d'analyse d'un titre
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    #[serde(default)]
    pub symbol: String,

    #[serde(default)]
    pub company_name: String,

    /// Prix au moment de l'analyse (0 si absent)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: f64,

    #[serde(default)]
    pub recommendation: Recommendation,

    /// Performance du titre en % (sert à la performance moyenne)
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl StockAnalysis {
    /// Construit une analyse à partir des détails renvoyés par le service
    ///
    /// - prix : dernière clôture de l'historique
    /// - performance : variation sur la série
    /// - recommandation : selon le potentiel mensuel
    pub fn from_details(symbol: &str, details: &StockDetails) -> Self {
        Self {
            symbol: symbol.to_string(),
            company_name: details
                .company_name
                .clone()
                .unwrap_or_else(|| symbol.to_string()),
            current_price: details.last_close().unwrap_or(0.0),
            recommendation: Recommendation::from_potential(details.monthly_potential),
            change_percent: ohlc::series_change_percent(&details.historical_data),
            analyzed_at: Some(Utc::now()),
        }
    }
}

// ============================================================================
// Structure : FavoriteEntry
// ============================================================================

/// Une position du portefeuille
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    /// Clé naturelle, unique dans la collection
    pub symbol: String,

    /// Nombre de titres détenus (0 si absent)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,

    #[serde(default)]
    pub last_analysis: StockAnalysis,
}

impl FavoriteEntry {
    pub fn new(symbol: String, quantity: f64, last_analysis: StockAnalysis) -> Self {
        Self {
            symbol,
            quantity,
            last_analysis,
        }
    }

    /// Valorisation de la position : quantité × prix courant
    ///
    /// Toujours calculable : un résultat non fini (NaN, infini) vaut 0.
    pub fn position_value(&self) -> f64 {
        let value = self.quantity * self.last_analysis.current_price;
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

// ============================================================================
// Désérialiseurs tolérants
// ============================================================================

/// Convertit une valeur JSON quelconque en nombre fini, si possible
fn number_from_value(value: Option<Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Nombre, chaîne numérique ou null → f64 (0 par défaut)
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(number_from_value(value).unwrap_or(0.0))
}

/// Comme lenient_f64 mais garde l'absence de valeur
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(number_from_value(value))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OHLC;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(Recommendation::from_label("ACHETER"), Recommendation::Buy);
        assert_eq!(Recommendation::from_label("vendre"), Recommendation::Sell);
        assert_eq!(Recommendation::from_label("CONSERVER"), Recommendation::Hold);
        assert_eq!(Recommendation::from_label("ACHTER"), Recommendation::Hold);
        assert_eq!(Recommendation::Sell.label(), "VENDRE");
    }

    #[test]
    fn test_recommendation_from_potential() {
        assert_eq!(Recommendation::from_potential(5.0), Recommendation::Buy);
        assert_eq!(Recommendation::from_potential(-2.0), Recommendation::Sell);
        assert_eq!(Recommendation::from_potential(0.5), Recommendation::Hold);
    }

    #[test]
    fn test_deserialize_full_entry() {
        let json = r#"{
            "symbol": "AAPL",
            "quantity": 10,
            "lastAnalysis": {
                "currentPrice": 150.0,
                "companyName": "Apple",
                "recommendation": "ACHETER"
            }
        }"#;

        let entry: FavoriteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.quantity, 10.0);
        assert_eq!(entry.last_analysis.recommendation, Recommendation::Buy);
        assert_eq!(entry.position_value(), 1500.0);
    }

    #[test]
    fn test_deserialize_missing_numbers_default_to_zero() {
        let json = r#"{
            "symbol": "XYZ",
            "quantity": null,
            "lastAnalysis": { "currentPrice": "abc", "recommendation": null }
        }"#;

        let entry: FavoriteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.quantity, 0.0);
        assert_eq!(entry.last_analysis.current_price, 0.0);
        assert_eq!(entry.last_analysis.recommendation, Recommendation::Hold);
        assert_eq!(entry.position_value(), 0.0);

        // Sans lastAnalysis du tout
        let entry: FavoriteEntry = serde_json::from_str(r#"{"symbol":"ABC","quantity":"3"}"#).unwrap();
        assert_eq!(entry.quantity, 3.0);
        assert_eq!(entry.position_value(), 0.0);
    }

    #[test]
    fn test_serialize_recommendation_as_label() {
        let entry = FavoriteEntry::new(
            "TSLA".to_string(),
            2.0,
            StockAnalysis {
                recommendation: Recommendation::Sell,
                ..StockAnalysis::default()
            },
        );

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""recommendation":"VENDRE""#));
        assert!(json.contains(r#""lastAnalysis""#));
    }

    #[test]
    fn test_analysis_from_details() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let details = StockDetails {
            volume: 1000,
            monthly_potential: 4.0,
            historical_data: vec![
                OHLC::new(base, 100.0, 101.0, 99.0, 100.0, 10),
                OHLC::new(base + Duration::days(30), 100.0, 111.0, 99.0, 110.0, 10),
            ],
            company_name: Some("Apple Inc.".to_string()),
            exchange: None,
        };

        let analysis = StockAnalysis::from_details("AAPL", &details);
        assert_eq!(analysis.company_name, "Apple Inc.");
        assert_eq!(analysis.current_price, 110.0);
        assert_eq!(analysis.recommendation, Recommendation::Buy);
        assert!((analysis.change_percent.unwrap() - 10.0).abs() < 1e-9);
    }
}
