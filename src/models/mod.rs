// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : titres, historique, actualités,
// favoris et plages de temps
// ============================================================================

pub mod favorite;   // Positions du portefeuille et analyses
pub mod news;       // Actualités
pub mod ohlc;       // Chandelles et calculs sur l'historique
pub mod stock;      // Titre et détails
pub mod time_range; // Plages de temps de la modale

// Re-exports pour simplifier les imports
pub use favorite::{FavoriteEntry, Recommendation, StockAnalysis};
pub use news::NewsArticle;
pub use ohlc::OHLC;
pub use stock::{Stock, StockDetails};
pub use time_range::TimeRange;
