// ============================================================================
// LazyFolio - Suivi de portefeuille en terminal
// ============================================================================
// Programme TUI : favoris (cartes / tableau), résumé du portefeuille et
// fenêtre de détails (graphique, volume, potentiel, actualités).
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère résultats, rendu, événements et tick
// 3. Worker thread : runtime tokio dédié aux appels réseau
// 4. Channels mpsc : l'UI et le worker ne partagent aucun état
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use lazyfolio::api::{StockService, YahooClient};
use lazyfolio::app::{parse_add_input, App, ADD_PROMPT};
use lazyfolio::config::Config;
use lazyfolio::modal::{self, FetchOutcome, FetchRequest};
use lazyfolio::models::{StockAnalysis, TimeRange};
use lazyfolio::portfolio::Portfolio;
use lazyfolio::store::JsonFavoritesStore;
use lazyfolio::ui::{events::EventHandler, render, Event};

// ============================================================================
// AppCommand / AppResult : protocole UI ↔ worker
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker exécute les tâches async et renvoie des résultats
// - L'état (App) reste entièrement sur le thread UI
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Charger détails + actualités pour la fenêtre de détails
    FetchDetails(FetchRequest),

    /// Analyser un ticker avant de l'ajouter aux favoris
    AnalyzeTicker { symbol: String, quantity: f64 },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Chargement de la fenêtre terminé (succès ou échec)
    DetailsFetched(FetchOutcome),

    /// Analyse prête, le favori peut être enregistré
    TickerAnalyzed { analysis: StockAnalysis, quantity: f64 },

    /// Analyse impossible
    AnalyzeError { symbol: String, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f logs/lazyfolio.log.*
/// RUST_LOG=lazyfolio=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyfolio.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyfolio=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let config = Config::from_env();
    info!(?config, "LazyFolio starting up");

    let service: Arc<dyn StockService> = Arc::new(YahooClient::new(config.request_timeout)?);
    let store = JsonFavoritesStore::new(config.favorites_path.clone());
    let mut app = App::new(Portfolio::new(Box::new(store)), config.notification_ttl);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, service, config.request_timeout);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - std::thread::spawn() : crée un thread OS
// - Le thread possède un runtime tokio multi-thread
// - Chaque commande devient une tâche : plusieurs chargements peuvent être
//   en vol, la fenêtre de détails ignore ceux qui sont périmés
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    service: Arc<dyn StockService>,
    timeout: Duration,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker not started");
                return;
            }
        };

        // recv() bloque ce thread (pas l'UI) jusqu'à la prochaine commande
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            let service = Arc::clone(&service);
            let result_tx = result_tx.clone();

            match command {
                AppCommand::FetchDetails(request) => {
                    runtime.spawn(async move {
                        let outcome = modal::fetch(service.as_ref(), request, timeout).await;
                        let _ = result_tx.send(AppResult::DetailsFetched(outcome));
                    });
                }

                AppCommand::AnalyzeTicker { symbol, quantity } => {
                    runtime.spawn(async move {
                        let details = tokio::time::timeout(
                            timeout,
                            service.get_stock_details(&symbol, TimeRange::default()),
                        )
                        .await;

                        let result = match details {
                            Ok(Ok(details)) => AppResult::TickerAnalyzed {
                                analysis: StockAnalysis::from_details(&symbol, &details),
                                quantity,
                            },
                            Ok(Err(e)) => AppResult::AnalyzeError {
                                symbol,
                                error: format!("{:#}", e),
                            },
                            Err(_) => AppResult::AnalyzeError {
                                symbol,
                                error: format!("Pas de réponse après {:?}", timeout),
                            },
                        };

                        let _ = result_tx.send(result);
                    });
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Event Loop Pattern
// - À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Mettre à jour l'état (update)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS : try_recv ne bloque pas, on vide la file
        loop {
            match result_rx.try_recv() {
                Ok(result) => apply_result(app, result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // 1. RENDER : la taille est relue à chaque frame
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }

        // 3. UPDATE
        app.tick(Instant::now());
    }

    Ok(())
}

/// Réapplique un résultat du worker sur l'état
fn apply_result(app: &mut App, result: AppResult) {
    let now = Instant::now();
    match result {
        AppResult::DetailsFetched(outcome) => app.apply_fetch(outcome),
        AppResult::TickerAnalyzed { analysis, quantity } => {
            app.on_ticker_analyzed(analysis, quantity, now)
        }
        AppResult::AnalyzeError { symbol, error } => app.on_analyze_error(&symbol, &error, now),
    }
}

/// Transmet une requête de chargement au worker
fn send_fetch(command_tx: &mpsc::Sender<AppCommand>, request: Option<FetchRequest>) {
    if let Some(request) = request {
        debug!(symbol = %request.symbol, range = %request.range, generation = request.generation, "Requesting details");
        if command_tx.send(AppCommand::FetchDetails(request)).is_err() {
            error!("Worker channel closed, fetch dropped");
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Chaque bras combine la touche et l'écran courant
/// - L'ordre des bras compte : l'input mode passe en premier
fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use lazyfolio::ui::events::{
        get_char_from_event, is_add_event, is_backspace_event, is_delete_event, is_down_event,
        is_enter_event, is_escape_event, is_input_char_event, is_next_range_event,
        is_previous_range_event, is_quit_event, is_retry_event, is_toggle_view_event, is_up_event,
        range_from_event,
    };

    match event {
        // ========================================
        // Input Mode : toutes les touches vont au buffer
        // ========================================
        Event::Key(_) if is_escape_event(&event) && app.is_in_input_mode() => {
            info!("User cancelled input");
            app.cancel_input();
        }

        Event::Key(_) if is_enter_event(&event) && app.is_in_input_mode() => {
            let input = app.submit_input();
            match parse_add_input(&input) {
                Some((symbol, quantity)) => {
                    info!(symbol = %symbol, quantity, "User submitted ticker for adding");
                    app.start_loading(Some(format!("Analyse de {}...", symbol)));
                    if command_tx
                        .send(AppCommand::AnalyzeTicker { symbol, quantity })
                        .is_err()
                    {
                        error!("Worker channel closed, analysis dropped");
                        app.stop_loading();
                    }
                }
                None => debug!(input = %input, "Invalid add input, ignoring"),
            }
        }

        Event::Key(_) if is_backspace_event(&event) && app.is_in_input_mode() => {
            app.backspace();
        }

        Event::Key(_) if is_input_char_event(&event) && app.is_in_input_mode() => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Key(_) if app.is_in_input_mode() => {}

        // ========================================
        // Quit (two-step, depuis n'importe quel écran)
        // ========================================
        Event::Key(_) if is_quit_event(&event) => {
            app.cancel_delete();
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // ========================================
        // Fenêtre de détails
        // ========================================
        Event::Key(_) if (is_escape_event(&event) || is_enter_event(&event)) && app.is_on_details() => {
            app.cancel_quit();
            debug!("User closed details");
            app.close_details();
        }

        Event::Key(_) if is_next_range_event(&event) && app.is_on_details() => {
            app.cancel_quit();
            let request = app.next_range();
            send_fetch(command_tx, request);
        }

        Event::Key(_) if is_previous_range_event(&event) && app.is_on_details() => {
            app.cancel_quit();
            let request = app.previous_range();
            send_fetch(command_tx, request);
        }

        Event::Key(_) if is_retry_event(&event) && app.is_on_details() => {
            app.cancel_quit();
            let request = app.retry_details();
            send_fetch(command_tx, request);
        }

        Event::Key(_) if app.is_on_details() => {
            app.cancel_quit();
            if let Some(range) = range_from_event(&event) {
                let request = app.select_range(range);
                send_fetch(command_tx, request);
            }
        }

        // ========================================
        // Dashboard
        // ========================================
        Event::Key(_) if is_delete_event(&event) => {
            app.cancel_quit();
            if app.portfolio.is_empty() {
                return;
            }
            if app.is_awaiting_delete_confirmation() {
                info!("User confirmed delete");
                app.delete_selected(Instant::now());
            } else {
                info!("User requested delete (awaiting confirmation)");
                app.request_delete();
            }
        }

        Event::Key(_) if is_add_event(&event) => {
            app.cancel_quit();
            app.cancel_delete();
            info!("User requested add favorite");
            app.start_input(ADD_PROMPT.to_string());
        }

        Event::Key(_) if is_toggle_view_event(&event) => {
            app.cancel_quit();
            app.cancel_delete();
            app.toggle_view();
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.cancel_delete();
            app.navigate_up();
        }

        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.cancel_delete();
            app.navigate_down();
        }

        Event::Key(_) if is_enter_event(&event) => {
            app.cancel_quit();
            app.cancel_delete();
            let request = app.open_details();
            send_fetch(command_tx, request);
        }

        Event::Key(_) => {
            // Toute autre touche : annule les confirmations si actives
            app.cancel_quit();
            app.cancel_delete();
        }

        Event::Resize(width, height) => {
            debug!(width, height, "Terminal resized");
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
