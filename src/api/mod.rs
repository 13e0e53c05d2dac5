// ============================================================================
// Module : api
// ============================================================================
// Frontière avec le service de données boursières. Le reste de
// l'application ne connaît que le trait StockService, ce qui permet de
// brancher Yahoo Finance en prod et un double de test ailleurs.
// ============================================================================

pub mod yahoo; // Client API Yahoo Finance

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{NewsArticle, StockDetails, TimeRange};

pub use yahoo::YahooClient;

/// Service de données boursières
///
/// CONCEPT RUST : async_trait
/// - Les méthodes async d'un trait utilisé en `dyn` doivent retourner
///   une Future boxée ; la macro s'en charge
/// - Send + Sync : le service est partagé (Arc) entre les tâches tokio
#[async_trait]
pub trait StockService: Send + Sync {
    /// Détails d'un titre (volume, potentiel, historique) pour une plage
    async fn get_stock_details(&self, symbol: &str, range: TimeRange) -> Result<StockDetails>;

    /// Dernières actualités d'un titre
    async fn get_stock_news(&self, symbol: &str) -> Result<Vec<NewsArticle>>;
}
