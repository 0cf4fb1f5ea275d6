// ============================================================================
// LazyTokens - Watchlist de cryptos dans le terminal
// ============================================================================
// Programme TUI : panneau "mes tokens", répartition du portefeuille et
// fenêtre de recherche sur tous les symboles Binance.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Worker thread + runtime tokio : les fetchs ne bloquent jamais l'UI
// 4. Channels mpsc : l'état reste possédé par la boucle (pas de Mutex)
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazytokens::api::TickerFeed;
use lazytokens::app::App;
use lazytokens::config::Config;
use lazytokens::models::Ticker;
use lazytokens::portfolio::Portfolio;
use lazytokens::store::JsonFileStore;
use lazytokens::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : protocole avec le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker lance chaque fetch comme une tâche tokio indépendante
// - Les résultats reviennent par un second channel
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer les statistiques 24h de tous les symboles
    FetchTickers { request_id: u64 },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Fetch réussi
    TickersLoaded {
        request_id: u64,
        tickers: Vec<Ticker>,
    },

    /// Fetch échoué (réseau, statut HTTP, JSON)
    FetchFailed { request_id: u64, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans le répertoire de données local :
/// - Linux : ~/.local/share/lazytokens/logs/lazytokens.log
/// - macOS : ~/Library/Application Support/lazytokens/logs/lazytokens.log
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/lazytokens/logs/lazytokens.log
/// RUST_LOG=lazytokens=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("lazytokens")
        .join("logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazytokens.log");

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
            // Par défaut : debug pour lazytokens, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazytokens=debug,info".into()),
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

    info!("LazyTokens starting up");

    // Une config invalide ne doit pas empêcher le démarrage
    let config = Config::load_default().unwrap_or_else(|e| {
        warn!(error = ?e, "Invalid configuration, using defaults");
        Config::default()
    });
    info!(?config, "Configuration loaded");

    let store = JsonFileStore::new(config.storage_path());
    let portfolio = Portfolio::new(store);
    info!(
        tracked = portfolio.watchlist().len(),
        "Watchlist loaded from storage"
    );

    let feed = TickerFeed::new(config.api_url.clone())?;
    info!(url = feed.url(), "Ticker feed ready");
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : commandes vers le worker
    // - result_tx/rx : résultats depuis le worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(runtime, feed, command_rx, result_tx);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(portfolio, &config);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
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
// - Le runtime est déplacé (move) dans le thread qui le possède
// - Chaque commande devient une tâche : plusieurs fetchs peuvent se
//   chevaucher, le dernier résultat appliqué gagne
// ============================================================================

fn spawn_background_worker(
    runtime: tokio::runtime::Runtime,
    feed: TickerFeed,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            debug!(?command, "Worker received command");

            match command {
                AppCommand::FetchTickers { request_id } => {
                    let feed = feed.clone();
                    let result_tx = result_tx.clone();

                    runtime.spawn(async move {
                        let result = match feed.fetch_all(request_id).await {
                            Ok(tickers) => AppResult::TickersLoaded {
                                request_id,
                                tickers,
                            },
                            Err(e) => AppResult::FetchFailed {
                                request_id,
                                error: format!("{:#}", e),
                            },
                        };

                        // L'UI peut déjà être fermée
                        if result_tx.send(result).is_err() {
                            debug!(request_id, "Result dropped, UI is gone");
                        }
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
// À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Lancer le fetch automatique s'il est dû
//   2. Dessiner l'interface
//   3. Traiter un événement (ou un tick de 250ms)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    let mut worker_alive = true;

    while app.is_running() {
        // 0. RÉSULTATS
        // CONCEPT : try_recv ne bloque pas
        loop {
            match result_rx.try_recv() {
                Ok(AppResult::TickersLoaded {
                    request_id,
                    tickers,
                }) => app.on_tickers(request_id, tickers),
                Ok(AppResult::FetchFailed { request_id, error }) => {
                    app.on_fetch_error(request_id, &error)
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if worker_alive {
                        error!("Worker thread disconnected!");
                        worker_alive = false;
                    }
                    break;
                }
            }
        }

        // 1. TIMER
        if app.fetch_due(Instant::now()) {
            debug!("Scheduled refresh");
            request_fetch(app, command_tx);
        }

        // 2. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 3. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Lance un fetch sans toucher au timer automatique
fn request_fetch(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    let request_id = app.begin_fetch();
    if command_tx
        .send(AppCommand::FetchTickers { request_id })
        .is_err()
    {
        app.on_fetch_error(request_id, "worker thread unavailable");
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Modal input (Vim-like)
// - Édition de quantité et saisie de recherche capturent les caractères
// - Sinon les touches sont des raccourcis propres à l'écran courant
// ============================================================================

fn handle_event(
    app: &mut App,
    event: lazytokens::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    use lazytokens::ui::events::{
        get_char_from_event, is_add_event, is_backspace_event, is_delete_event, is_down_event,
        is_edit_event, is_enter_event, is_escape_event, is_grow_page_event,
        is_next_page_event, is_previous_page_event, is_quit_event, is_refresh_event,
        is_search_focus_event, is_shrink_page_event, is_up_event, Event,
    };

    if let Event::Tick = event {
        return;
    }

    // Toute touche efface le message précédent
    app.clear_message();

    // ========================================
    // Édition de quantité
    // ========================================
    if app.is_editing_amount() {
        if is_escape_event(&event) {
            app.cancel_input();
        } else if is_enter_event(&event) {
            app.submit_amount();
        } else if is_backspace_event(&event) {
            app.pop_amount_char();
        } else if let Some(c) = get_char_from_event(&event) {
            app.push_amount_char(c);
        }
        return;
    }

    // ========================================
    // Saisie du terme de recherche
    // ========================================
    if app.is_typing_search() {
        if is_escape_event(&event) || is_enter_event(&event) {
            app.cancel_input();
        } else if is_backspace_event(&event) {
            app.pop_search_char();
        } else if let Some(c) = get_char_from_event(&event) {
            app.push_search_char(c);
        }
        return;
    }

    // ========================================
    // Quit two-step
    // ========================================
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la confirmation
    app.cancel_quit();

    // ========================================
    // Raccourcis communs aux deux écrans
    // ========================================
    if is_refresh_event(&event) {
        info!("User requested refresh");
        request_fetch(app, command_tx);
    } else if is_up_event(&event) {
        app.navigate_up();
    } else if is_down_event(&event) {
        app.navigate_down();
    } else if is_next_page_event(&event) {
        app.next_page();
    } else if is_previous_page_event(&event) {
        app.previous_page();
    } else if is_edit_event(&event) {
        app.start_amount_edit();
    } else if is_enter_event(&event) {
        app.confirm_selected();
    } else if is_delete_event(&event) {
        app.remove_selected();
    } else if app.is_on_dashboard() {
        if is_add_event(&event) {
            info!("User opened search");
            app.open_search();
        }
    } else if is_escape_event(&event) {
        debug!("User closed search");
        app.close_search();
    } else if is_search_focus_event(&event) {
        app.start_search_input();
    } else if is_grow_page_event(&event) {
        app.grow_page_size();
    } else if is_shrink_page_event(&event) {
        app.shrink_page_size();
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
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

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
