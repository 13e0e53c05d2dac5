// ============================================================================
// Structures : Stock et StockDetails
// ============================================================================
// Stock : identité minimale d'un titre (ce que la modale affiche en en-tête)
// StockDetails : ce que renvoie le service pour une plage de temps donnée
//
// Les deux sont transitoires : re-fetchés à chaque changement de titre ou
// de plage, jamais mis en cache.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::favorite::FavoriteEntry;
use crate::models::OHLC;

/// Un titre coté
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Ticker, unique (ex: "AAPL")
    pub symbol: String,

    /// Nom de la société
    pub name: String,

    /// Place de cotation (ex: "NasdaqGS")
    pub exchange: String,

    /// Dernier cours connu
    pub last_price: f64,

    /// Variation en pourcentage (signée)
    pub change: f64,
}

impl Stock {
    pub fn new(symbol: String, name: String, exchange: String, last_price: f64, change: f64) -> Self {
        Self {
            symbol,
            name,
            exchange,
            last_price,
            change,
        }
    }

    /// Construit le titre à afficher depuis un favori
    ///
    /// La place de cotation n'est pas stockée avec le favori : elle reste
    /// vide jusqu'à ce que les détails soient chargés.
    pub fn from_favorite(entry: &FavoriteEntry) -> Self {
        let analysis = &entry.last_analysis;
        let name = if analysis.company_name.is_empty() {
            entry.symbol.clone()
        } else {
            analysis.company_name.clone()
        };

        Self {
            symbol: entry.symbol.clone(),
            name,
            exchange: String::new(),
            last_price: analysis.current_price,
            change: analysis.change_percent.unwrap_or(0.0),
        }
    }

    /// True si la variation est positive ou nulle
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

/// Détails d'un titre pour une plage de temps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetails {
    /// Volume échangé sur la dernière séance
    pub volume: u64,

    /// Estimation du potentiel sur un mois, en % (signée)
    pub monthly_potential: f64,

    /// Historique trié par timestamp croissant
    pub historical_data: Vec<OHLC>,

    /// Nom de la société, si le service le fournit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// Place de cotation, si le service la fournit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
}

impl StockDetails {
    /// Dernier cours de clôture de l'historique
    pub fn last_close(&self) -> Option<f64> {
        self.historical_data.last().map(|c| c.close)
    }
}
