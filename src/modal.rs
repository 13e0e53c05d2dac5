// ============================================================================
// Fenêtre de détails d'un titre
// ============================================================================
// Orchestration des requêtes : à l'ouverture et à chaque changement de
// plage, on récupère en parallèle les détails ET les actualités.
//
// CONCEPT : Compteur de génération
// - Chaque requête émise porte un numéro de génération croissant
// - Une réponse dont la génération n'est plus la courante est ignorée
// - Changer vite de plage (ou fermer la fenêtre) ne peut donc jamais
//   afficher des données périmées
//
// ÉTAT D'ERREUR :
// - Un échec laisse les données précédentes en place
// - Il est journalisé une seule fois et exposé via last_error()
// - Dans tous les cas le chargement se termine
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::api::StockService;
use crate::logger::{LogData, Logger};
use crate::models::{NewsArticle, Stock, StockDetails, TimeRange};

/// Requête de chargement émise par la fenêtre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub range: TimeRange,
    pub generation: u64,
}

/// Résultat d'un chargement, à réappliquer via DetailsModal::apply()
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<(StockDetails, Vec<NewsArticle>)>,
}

/// Récupère détails et actualités en parallèle, bornés par un timeout
///
/// CONCEPT RUST : tokio::try_join!
/// - Les deux futures avancent en même temps
/// - La première erreur annule l'autre et remonte telle quelle
///
/// Le timeout couvre l'ensemble : un service qui ne répond jamais
/// produit une erreur au lieu d'un chargement infini.
#[instrument(skip(service, request), fields(symbol = %request.symbol, range = %request.range))]
pub async fn fetch(
    service: &dyn StockService,
    request: FetchRequest,
    timeout: Duration,
) -> FetchOutcome {
    let symbol = request.symbol.as_str();
    let both = async {
        tokio::try_join!(
            service.get_stock_details(symbol, request.range),
            service.get_stock_news(symbol),
        )
    };

    let result = match tokio::time::timeout(timeout, both).await {
        Ok(result) => result,
        Err(elapsed) => Err(anyhow::Error::new(elapsed)
            .context(format!("Pas de réponse pour {} après {:?}", symbol, timeout))),
    };

    debug!(ok = result.is_ok(), "Fetch finished");
    FetchOutcome { request, result }
}

// ============================================================================
// Structure : DetailsModal
// ============================================================================

/// État de la fenêtre de détails
#[derive(Debug, Default)]
pub struct DetailsModal {
    stock: Option<Stock>,
    range: TimeRange,
    details: Option<StockDetails>,
    news: Vec<NewsArticle>,
    loading: bool,
    last_error: Option<String>,
    generation: u64,
}

impl DetailsModal {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accesseurs
    // ========================================================================

    pub fn is_open(&self) -> bool {
        self.stock.is_some()
    }

    pub fn stock(&self) -> Option<&Stock> {
        self.stock.as_ref()
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn details(&self) -> Option<&StockDetails> {
        self.details.as_ref()
    }

    pub fn news(&self) -> &[NewsArticle] {
        &self.news
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Ouvre la fenêtre sur un titre et émet la première requête
    ///
    /// Si un autre titre était affiché (ou si la fenêtre était fermée), ses
    /// données sont effacées et la plage revient à 1 mois.
    pub fn open(&mut self, stock: Stock) -> FetchRequest {
        let same_stock = self
            .stock
            .as_ref()
            .is_some_and(|s| s.symbol == stock.symbol);

        if !same_stock {
            self.details = None;
            self.news.clear();
            self.range = TimeRange::default();
        }

        self.stock = Some(stock);
        self.begin_fetch()
    }

    /// Change de plage : une seule requête, et seulement si elle diffère
    pub fn select_range(&mut self, range: TimeRange) -> Option<FetchRequest> {
        if !self.is_open() || range == self.range {
            return None;
        }

        self.range = range;
        Some(self.begin_fetch())
    }

    /// Relance la requête courante (après une erreur)
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if !self.is_open() {
            return None;
        }
        Some(self.begin_fetch())
    }

    /// Ferme la fenêtre : les réponses encore en vol seront ignorées
    pub fn close(&mut self) {
        self.stock = None;
        self.details = None;
        self.news.clear();
        self.loading = false;
        self.last_error = None;
        self.generation += 1;
    }

    /// Nouvelle génération + passage en chargement
    fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.loading = true;
        self.last_error = None;

        FetchRequest {
            symbol: self
                .stock
                .as_ref()
                .map(|s| s.symbol.clone())
                .unwrap_or_default(),
            range: self.range,
            generation: self.generation,
        }
    }

    /// Applique un résultat ; retourne false s'il était périmé
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.request.generation != self.generation || !self.is_open() {
            debug!(
                generation = outcome.request.generation,
                current = self.generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        self.loading = false;

        match outcome.result {
            Ok((details, news)) => {
                self.details = Some(details);
                self.news = news;
                self.last_error = None;
            }
            Err(e) => {
                Logger::error(
                    &format!(
                        "Erreur lors du chargement des données de {}",
                        outcome.request.symbol
                    ),
                    Some(LogData::from(&e)),
                );
                self.last_error = Some(e.to_string());
            }
        }

        true
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn stock(symbol: &str) -> Stock {
        Stock::new(
            symbol.to_string(),
            format!("{} Inc.", symbol),
            "NASDAQ".to_string(),
            100.0,
            1.2,
        )
    }

    fn apple() -> Stock {
        stock("AAPL")
    }

    fn details(volume: u64) -> StockDetails {
        StockDetails {
            volume,
            ..StockDetails::default()
        }
    }

    fn success(request: FetchRequest, volume: u64) -> FetchOutcome {
        FetchOutcome {
            request,
            result: Ok((details(volume), Vec::new())),
        }
    }

    #[test]
    fn test_open_emits_request() {
        let mut modal = DetailsModal::new();
        let request = modal.open(apple());

        assert!(modal.is_open());
        assert!(modal.is_loading());
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.range, TimeRange::OneMonth);
        assert_eq!(request.generation, modal.generation());
    }

    #[test]
    fn test_select_same_range_is_noop() {
        let mut modal = DetailsModal::new();
        assert!(modal.select_range(TimeRange::OneYear).is_none()); // fermé

        modal.open(apple());
        assert!(modal.select_range(TimeRange::OneMonth).is_none());
        assert!(modal.select_range(TimeRange::OneYear).is_some());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut modal = DetailsModal::new();
        let first = modal.open(apple());
        let second = modal.select_range(TimeRange::OneWeek).unwrap();

        // La réponse de la 1re requête arrive après la 2e émission
        assert!(!modal.apply(success(first, 1)));
        assert!(modal.details().is_none());
        assert!(modal.is_loading());

        assert!(modal.apply(success(second, 2)));
        assert_eq!(modal.details().unwrap().volume, 2);
        assert!(!modal.is_loading());
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut modal = DetailsModal::new();
        let first = modal.open(apple());
        modal.apply(success(first, 42));

        let request = modal.select_range(TimeRange::FiveYears).unwrap();
        let applied = modal.apply(FetchOutcome {
            request,
            result: Err(anyhow!("boom")),
        });

        assert!(applied);
        assert!(!modal.is_loading());
        assert_eq!(modal.details().unwrap().volume, 42);
        assert_eq!(modal.last_error(), Some("boom"));

        // retry efface l'erreur et relance
        let retry = modal.retry().unwrap();
        assert!(modal.last_error().is_none());
        assert_eq!(retry.range, TimeRange::FiveYears);
    }

    #[test]
    fn test_close_discards_in_flight() {
        let mut modal = DetailsModal::new();
        let request = modal.open(apple());
        modal.close();

        assert!(!modal.apply(success(request, 1)));
        assert!(modal.details().is_none());
        assert!(!modal.is_loading());
    }

    #[test]
    fn test_open_other_stock_clears_data() {
        let mut modal = DetailsModal::new();
        let request = modal.open(apple());
        modal.apply(success(request, 7));

        modal.open(stock("TSLA"));
        assert!(modal.details().is_none());

        // Même titre : les données restent affichées pendant le chargement
        let request = modal.open(stock("TSLA"));
        modal.apply(success(request, 9));
        modal.open(stock("TSLA"));
        assert_eq!(modal.details().unwrap().volume, 9);
    }

    #[test]
    fn test_open_other_stock_resets_range() {
        let mut modal = DetailsModal::new();
        modal.open(apple());
        modal.select_range(TimeRange::FiveYears).unwrap();

        // Même titre : la plage choisie est conservée
        let request = modal.open(apple());
        assert_eq!(request.range, TimeRange::FiveYears);

        let request = modal.open(stock("TSLA"));
        assert_eq!(request.range, TimeRange::OneMonth);
        assert_eq!(modal.range(), TimeRange::OneMonth);

        // Après fermeture, retour au défaut
        modal.select_range(TimeRange::OneDay).unwrap();
        modal.close();
        let request = modal.open(stock("TSLA"));
        assert_eq!(request.range, TimeRange::OneMonth);
    }
}
