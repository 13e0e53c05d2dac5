// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Composition : App possède le portefeuille, la fenêtre de détails et
//    les notifications, chacun avec sa propre logique
// 3. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - App n'effectue aucun appel réseau : elle émet des FetchRequest que la
//   boucle principale transmet au worker, puis réapplique les résultats
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::logger::{LogData, Logger};
use crate::modal::{DetailsModal, FetchOutcome, FetchRequest};
use crate::models::{Stock, StockAnalysis, TimeRange};
use crate::notification::Notifications;
use crate::portfolio::{Portfolio, RemovalOutcome};

/// Prompt affiché pour l'ajout d'un favori
pub const ADD_PROMPT: &str = "Ajouter (TICKER [QUANTITÉ]) : ";

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : portefeuille (cartes ou tableau)
    Dashboard,

    /// Fenêtre de détails du titre sélectionné (par-dessus le dashboard)
    Details,

    /// Mode saisie : ajout d'un favori
    /// - Enter valide, ESC annule
    InputMode,
}

/// Découpe une saisie "TICKER [QUANTITÉ]"
///
/// - Le ticker est mis en majuscules
/// - Quantité absente : 1 ; virgule décimale acceptée
/// - None si le ticker est vide ou la quantité invalide / négative
pub fn parse_add_input(input: &str) -> Option<(String, f64)> {
    let mut parts = input.split_whitespace();
    let symbol = parts.next()?.to_uppercase();

    let quantity = match parts.next() {
        Some(raw) => raw.replace(',', ".").parse::<f64>().ok()?,
        None => 1.0,
    };

    if parts.next().is_some() || !quantity.is_finite() || quantity < 0.0 {
        return None;
    }

    Some((symbol, quantity))
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Portefeuille (favoris, résumé, mode d'affichage)
    pub portfolio: Portfolio,

    /// Fenêtre de détails
    pub modal: DetailsModal,

    /// Notifications transitoires (bas de l'écran)
    pub notifications: Notifications,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    /// Two-step delete, même principe que confirm_quit avec 'd'
    pub confirm_delete: bool,

    /// Un ajout de favori est en cours côté worker
    pub is_loading: bool,

    /// Message affiché pendant l'ajout
    pub loading_message: Option<String>,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input
    pub input_prompt: String,
}

impl App {
    /// Crée l'application autour d'un portefeuille déjà construit
    ///
    /// Les favoris sont chargés immédiatement (premier instantané).
    pub fn new(mut portfolio: Portfolio, notification_ttl: Duration) -> Self {
        portfolio.load_favorites();

        Self {
            running: true,
            current_screen: Screen::Dashboard,
            portfolio,
            modal: DetailsModal::new(),
            notifications: Notifications::new(notification_ttl),
            confirm_quit: false,
            confirm_delete: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : retire les notifications expirées
    ///
    /// CONCEPT : Event Loop Pattern
    /// - tick() est appelé à chaque itération, même sans événement
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn navigate_up(&mut self) {
        self.portfolio.select_previous();
    }

    pub fn navigate_down(&mut self) {
        self.portfolio.select_next();
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_details(&self) -> bool {
        self.current_screen == Screen::Details
    }

    /// Bascule cartes / tableau (aucun accès au stockage)
    pub fn toggle_view(&mut self) {
        self.portfolio.toggle_view();
        debug!(view = self.portfolio.view().label(), "View toggled");
    }

    // ========================================================================
    // Fenêtre de détails
    // ========================================================================

    /// Ouvre les détails du favori sélectionné
    ///
    /// Retourne la requête à transmettre au worker, None si la liste est vide.
    pub fn open_details(&mut self) -> Option<FetchRequest> {
        let stock = self.portfolio.selected().map(Stock::from_favorite)?;
        info!(symbol = %stock.symbol, "Opening stock details");

        self.current_screen = Screen::Details;
        Some(self.modal.open(stock))
    }

    /// Ferme la fenêtre et revient au dashboard
    pub fn close_details(&mut self) {
        self.modal.close();
        self.current_screen = Screen::Dashboard;
    }

    pub fn select_range(&mut self, range: TimeRange) -> Option<FetchRequest> {
        self.modal.select_range(range)
    }

    pub fn next_range(&mut self) -> Option<FetchRequest> {
        self.modal.select_range(self.modal.range().next())
    }

    pub fn previous_range(&mut self) -> Option<FetchRequest> {
        self.modal.select_range(self.modal.range().previous())
    }

    /// Relance le chargement, seulement si le dernier a échoué
    pub fn retry_details(&mut self) -> Option<FetchRequest> {
        if self.modal.last_error().is_none() {
            return None;
        }
        self.modal.retry()
    }

    /// Réapplique un résultat du worker
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        self.modal.apply(outcome);
    }

    // ========================================================================
    // Ajout de favori
    // ========================================================================

    /// L'analyse d'un nouveau ticker est revenue du worker
    ///
    /// Elle devient l'analyse courante ; le portefeuille est rechargé.
    pub fn on_ticker_analyzed(&mut self, analysis: StockAnalysis, quantity: f64, now: Instant) {
        self.stop_loading();
        let symbol = analysis.symbol.clone();

        match self.portfolio.add_favorite(analysis.clone(), quantity) {
            Ok(()) => {
                info!(symbol = %symbol, quantity, "Favorite added");
                self.notifications
                    .success(format!("{} ajouté aux favoris", symbol), now);
            }
            Err(e) => {
                Logger::error(
                    &format!("Ajout du favori {} impossible", symbol),
                    Some(LogData::from(&e)),
                );
                self.notifications
                    .error(format!("Échec de l'ajout de {}", symbol), now);
            }
        }

        self.portfolio.set_current_analysis(Some(analysis));
    }

    /// L'analyse d'un nouveau ticker a échoué
    pub fn on_analyze_error(&mut self, symbol: &str, error: &str, now: Instant) {
        self.stop_loading();
        Logger::error(
            &format!("Analyse de {} impossible", symbol),
            Some(serde_json::json!({ "symbol": symbol, "error": error }).into()),
        );
        self.notifications
            .error(format!("Analyse de {} impossible", symbol), now);
    }

    // ========================================================================
    // Quit / Delete confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete
    }

    /// Supprime le favori sélectionné (après confirmation)
    pub fn delete_selected(&mut self, now: Instant) -> Option<RemovalOutcome> {
        self.confirm_delete = false;
        let symbol = self.portfolio.selected()?.symbol.clone();
        Some(
            self.portfolio
                .remove_favorite(&symbol, &mut self.notifications, now),
        )
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode input avec un prompt donné
    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    /// Annule le mode input et retourne au dashboard
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Récupère la valeur saisie et retourne au dashboard
    pub fn submit_input(&mut self) -> String {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Dashboard;
        self.input_prompt.clear();
        value
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FavoriteEntry, StockDetails};
    use crate::notification::NotificationKind;
    use crate::store::InMemoryFavoritesStore;

    fn app_with(symbols: &[&str]) -> App {
        let entries = symbols
            .iter()
            .map(|s| {
                FavoriteEntry::new(
                    s.to_string(),
                    1.0,
                    StockAnalysis {
                        symbol: s.to_string(),
                        current_price: 10.0,
                        ..StockAnalysis::default()
                    },
                )
            })
            .collect();
        let portfolio = Portfolio::new(Box::new(InMemoryFavoritesStore::new(entries)));
        App::new(portfolio, Duration::from_secs(3))
    }

    #[test]
    fn test_app_creation_loads_favorites() {
        let app = app_with(&["AAPL", "TSLA"]);
        assert!(app.is_running());
        assert_eq!(app.portfolio.len(), 2);
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_app_quit() {
        let mut app = app_with(&[]);
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_navigation() {
        let mut app = app_with(&["AAPL", "TSLA", "BTC-USD"]);

        app.navigate_down();
        app.navigate_down();
        app.navigate_down(); // reste au max
        assert_eq!(app.portfolio.selected().unwrap().symbol, "BTC-USD");

        app.navigate_up();
        assert_eq!(app.portfolio.selected().unwrap().symbol, "TSLA");
    }

    #[test]
    fn test_open_and_close_details() {
        let mut app = app_with(&["AAPL"]);
        let request = app.open_details().unwrap();
        assert!(app.is_on_details());
        assert_eq!(request.symbol, "AAPL");

        assert!(app.next_range().is_some());
        assert_eq!(app.modal.range(), TimeRange::OneYear);

        app.close_details();
        assert!(app.is_on_dashboard());
        assert!(!app.modal.is_open());
    }

    #[test]
    fn test_open_details_on_empty_portfolio() {
        let mut app = app_with(&[]);
        assert!(app.open_details().is_none());
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_retry_only_after_error() {
        let mut app = app_with(&["AAPL"]);
        let request = app.open_details().unwrap();
        assert!(app.retry_details().is_none());

        app.apply_fetch(FetchOutcome {
            request,
            result: Err(anyhow::anyhow!("réseau indisponible")),
        });
        assert!(app.retry_details().is_some());
        assert!(app.modal.is_loading());
    }

    #[test]
    fn test_delete_selected() {
        let mut app = app_with(&["AAPL", "TSLA"]);
        app.request_delete();

        let outcome = app.delete_selected(Instant::now());
        assert_eq!(outcome, Some(RemovalOutcome::Removed));
        assert!(!app.is_awaiting_delete_confirmation());
        assert_eq!(app.portfolio.len(), 1);
        assert_eq!(app.notifications.count(NotificationKind::Success), 1);
    }

    #[test]
    fn test_ticker_analyzed_becomes_current() {
        let mut app = app_with(&[]);
        app.start_loading(Some("Analyse de MSFT...".to_string()));

        let analysis = StockAnalysis::from_details("MSFT", &StockDetails::default());
        app.on_ticker_analyzed(analysis, 3.0, Instant::now());

        assert!(!app.is_loading_data());
        assert_eq!(app.portfolio.len(), 1);
        assert_eq!(app.portfolio.favorites()[0].quantity, 3.0);
        assert_eq!(app.portfolio.current_analysis().unwrap().symbol, "MSFT");
    }

    #[test]
    fn test_input_mode() {
        let mut app = app_with(&[]);
        app.start_input(ADD_PROMPT.to_string());
        assert!(app.is_in_input_mode());

        for c in "aapl 2".chars() {
            app.append_char(c);
        }
        app.backspace();
        app.append_char('5');

        assert_eq!(app.submit_input(), "aapl 5");
        assert!(app.is_on_dashboard());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_parse_add_input() {
        assert_eq!(parse_add_input("aapl"), Some(("AAPL".to_string(), 1.0)));
        assert_eq!(parse_add_input("  tsla 2,5 "), Some(("TSLA".to_string(), 2.5)));
        assert_eq!(parse_add_input(""), None);
        assert_eq!(parse_add_input("AAPL abc"), None);
        assert_eq!(parse_add_input("AAPL -1"), None);
        assert_eq!(parse_add_input("AAPL 1 2"), None);
    }
}
