// ============================================================================
// Portefeuille : agrégation des favoris
// ============================================================================
// Charge les favoris depuis le repository injecté, calcule les indicateurs
// du portefeuille et porte le mode d'affichage (cartes ou tableau).
//
// POLITIQUE DE COHÉRENCE : reload-after-write
// - Aucune mise à jour optimiste : après chaque écriture (ajout,
//   suppression) on recharge l'instantané complet depuis le stockage
// - Chaque nouvelle analyse courante déclenche aussi un rechargement
// - L'affichage reflète donc toujours la vue du stockage
// ============================================================================

use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use crate::logger::{LogData, Logger};
use crate::models::{FavoriteEntry, StockAnalysis};
use crate::notification::Notifications;
use crate::store::FavoritesRepository;

/// Message affiché après une suppression réussie
pub const REMOVAL_SUCCESS_MESSAGE: &str = "Favori supprimé avec succès";

/// Message affiché quand la suppression échoue
pub const REMOVAL_FAILURE_MESSAGE: &str = "Échec de la suppression du favori";

// ============================================================================
// Fonctions pures
// ============================================================================

/// Classe de performance (pilote uniquement la couleur)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceClass {
    Positive,
    Negative,
    Neutral,
}

/// Classe une valeur : > 0 positive, < 0 négative, 0 neutre
pub fn performance_class(value: f64) -> PerformanceClass {
    if value > 0.0 {
        PerformanceClass::Positive
    } else if value < 0.0 {
        PerformanceClass::Negative
    } else {
        PerformanceClass::Neutral
    }
}

/// Investissement total : Σ quantité × prix courant (0 si vide)
///
/// Une entrée dont la valorisation n'est pas calculable compte pour 0,
/// elle n'interrompt jamais le calcul.
pub fn total_investment(favorites: &[FavoriteEntry]) -> f64 {
    favorites.iter().map(FavoriteEntry::position_value).sum()
}

/// Performance moyenne pondérée par les quantités
///
/// - Seules les entrées qui portent une performance comptent
/// - Si toutes les quantités sont nulles : moyenne simple
/// - None si aucune entrée n'a de performance (affiché "N/A")
pub fn average_performance(favorites: &[FavoriteEntry]) -> Option<f64> {
    let samples: Vec<(f64, f64)> = favorites
        .iter()
        .filter_map(|e| {
            let performance = e.last_analysis.change_percent?;
            let weight = if e.quantity.is_finite() { e.quantity.max(0.0) } else { 0.0 };
            Some((performance, weight))
        })
        .collect();

    if samples.is_empty() {
        return None;
    }

    let total_weight: f64 = samples.iter().map(|(_, w)| w).sum();
    if total_weight > 0.0 {
        Some(samples.iter().map(|(p, w)| p * w).sum::<f64>() / total_weight)
    } else {
        Some(samples.iter().map(|(p, _)| p).sum::<f64>() / samples.len() as f64)
    }
}

/// Résumé affiché au-dessus de la liste
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub position_count: usize,
    pub average_performance: Option<f64>,
}

// ============================================================================
// Mode d'affichage
// ============================================================================

/// Deux vues équivalentes sur les mêmes données
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Cards,
    Table,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Cards => "Vue Cards",
            ViewMode::Table => "Vue Tableau",
        }
    }

    pub fn toggled(&self) -> ViewMode {
        match self {
            ViewMode::Cards => ViewMode::Table,
            ViewMode::Table => ViewMode::Cards,
        }
    }
}

/// Résultat d'une demande de suppression
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    Removed,
    Failed(String),
}

// ============================================================================
// Structure : Portfolio
// ============================================================================

/// Portefeuille : miroir de l'instantané du stockage + état d'affichage
pub struct Portfolio {
    repository: Box<dyn FavoritesRepository>,
    favorites: Vec<FavoriteEntry>,
    view: ViewMode,
    selected_index: usize,
    current_analysis: Option<StockAnalysis>,
}

impl Portfolio {
    /// Crée le portefeuille ; rien n'est chargé avant load_favorites()
    pub fn new(repository: Box<dyn FavoritesRepository>) -> Self {
        Self {
            repository,
            favorites: Vec::new(),
            view: ViewMode::default(),
            selected_index: 0,
            current_analysis: None,
        }
    }

    /// Remplace entièrement l'instantané par celui du stockage
    pub fn load_favorites(&mut self) -> &[FavoriteEntry] {
        self.favorites = self.repository.load();

        // L'index de sélection doit rester valide après un rechargement
        let max_index = self.favorites.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);

        debug!(count = self.favorites.len(), "Favorites loaded");
        &self.favorites
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn total_investment(&self) -> f64 {
        total_investment(&self.favorites)
    }

    /// Résumé du portefeuille ; None si aucun favori (pas de panneau)
    pub fn summary(&self) -> Option<PortfolioSummary> {
        if self.favorites.is_empty() {
            return None;
        }

        Some(PortfolioSummary {
            total_investment: total_investment(&self.favorites),
            position_count: self.favorites.len(),
            average_performance: average_performance(&self.favorites),
        })
    }

    // ========================================================================
    // Analyse courante
    // ========================================================================

    /// Nouvelle analyse courante : les favoris ont pu changer, on recharge
    pub fn set_current_analysis(&mut self, analysis: Option<StockAnalysis>) {
        self.current_analysis = analysis;
        self.load_favorites();
    }

    pub fn current_analysis(&self) -> Option<&StockAnalysis> {
        self.current_analysis.as_ref()
    }

    // ========================================================================
    // Écritures (toujours suivies d'un rechargement)
    // ========================================================================

    /// Ajoute (ou met à jour) une position puis recharge
    pub fn add_favorite(&mut self, analysis: StockAnalysis, quantity: f64) -> Result<()> {
        let entry = FavoriteEntry::new(analysis.symbol.clone(), quantity, analysis);
        let result = self.repository.upsert(entry);
        self.load_favorites();
        result
    }

    /// Supprime un favori puis recharge, sans retry
    ///
    /// - Succès : une notification de succès
    /// - Échec : pas de notification de succès, une notification d'erreur
    ///   et une entrée de log
    pub fn remove_favorite(
        &mut self,
        symbol: &str,
        notifications: &mut Notifications,
        now: Instant,
    ) -> RemovalOutcome {
        let result = self.repository.remove(symbol);
        self.load_favorites();

        match result {
            Ok(()) => {
                info!(symbol, "Favorite removed by user");
                notifications.success(REMOVAL_SUCCESS_MESSAGE, now);
                RemovalOutcome::Removed
            }
            Err(e) => {
                Logger::error(
                    &format!("Suppression du favori {} impossible", symbol),
                    Some(LogData::from(&e)),
                );
                notifications.error(REMOVAL_FAILURE_MESSAGE, now);
                RemovalOutcome::Failed(e.to_string())
            }
        }
    }

    // ========================================================================
    // Affichage (aucun accès au stockage)
    // ========================================================================

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&FavoriteEntry> {
        self.favorites.get(self.selected_index)
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        let max_index = self.favorites.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
