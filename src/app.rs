// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Générique avec valeur par défaut : App<S = JsonFileStore>
//    - L'application utilise le fichier JSON
//    - Les tests utilisent MemoryStore, sans toucher au disque
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Le Portfolio reste la seule source de vérité des quantités
// ============================================================================

use std::time::Instant;

use tracing::{debug, error, info};

use crate::api::{FetchStatus, RefreshSchedule};
use crate::config::Config;
use crate::models::{format_amount, parse_amount, Ticker, WatchlistEntry};
use crate::portfolio::Portfolio;
use crate::search::{self, Pager};
use crate::store::{JsonFileStore, WatchlistStore};

/// Taille de page du panneau "mes tokens"
pub const PANEL_PAGE_SIZE: usize = 5;

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : panneau "mes tokens" + graphique de répartition
    Dashboard,

    /// Fenêtre de recherche de tous les symboles ("Add Stock")
    Search,
}

/// Ce que les touches tapées alimentent
///
/// CONCEPT : Modal input (Vim-like)
/// - Normal : les touches sont des raccourcis
/// - Search : les caractères vont dans le terme de recherche
/// - Amount : les caractères vont dans la quantité du symbole édité
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Amount { symbol: String },
}

/// Gravité d'un message de statut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Message transitoire affiché dans le footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

/// État principal de l'application
pub struct App<S: WatchlistStore = JsonFileStore> {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' => true
    pub confirm_quit: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Destination des caractères tapés
    pub input_mode: InputMode,

    /// Texte de la quantité en cours d'édition
    pub input_buffer: String,

    /// Watchlist + données de marché fusionnées
    pub portfolio: Portfolio<S>,

    /// Signaux loading / error des fetchs
    pub fetch_status: FetchStatus,

    /// Cadence des fetchs automatiques
    pub schedule: RefreshSchedule,

    /// Index sélectionné dans le panneau (dans la vue complète, pas la page)
    pub selected_index: usize,

    /// Pagination du panneau
    pub panel_pager: Pager,

    /// Terme de la recherche (filtre le symbole)
    pub search_term: String,

    /// Index sélectionné dans les résultats filtrés
    pub search_index: usize,

    /// Pagination de la recherche (taille ajustable)
    pub search_pager: Pager,

    /// Message transitoire (validation, confirmation)
    pub message: Option<StatusMessage>,
}

impl<S: WatchlistStore> App<S> {
    /// Crée l'application autour d'un portefeuille déjà chargé
    pub fn new(portfolio: Portfolio<S>, config: &Config) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            current_screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            portfolio,
            fetch_status: FetchStatus::new(),
            schedule: RefreshSchedule::new(config.refresh_interval()),
            selected_index: 0,
            panel_pager: Pager::new(PANEL_PAGE_SIZE),
            search_term: String::new(),
            search_index: 0,
            search_pager: Pager::new(config.page_size),
            message: None,
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    /// Ouvre la fenêtre de recherche
    pub fn open_search(&mut self) {
        self.current_screen = Screen::Search;
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.refresh_search();
    }

    /// Ferme la fenêtre de recherche (le terme est conservé)
    pub fn close_search(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.clamp_panel();
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    // ========================================================================
    // Vues
    // ========================================================================

    /// Résultats de la recherche (projection de la vue fusionnée)
    pub fn search_results(&self) -> Vec<&WatchlistEntry> {
        search::filter(self.portfolio.merged(), &self.search_term)
    }

    /// Lignes du panneau "mes tokens"
    pub fn tracked(&self) -> Vec<&WatchlistEntry> {
        self.portfolio.tracked_view()
    }

    /// Symbole sous le curseur sur l'écran courant
    pub fn selected_symbol(&self) -> Option<String> {
        let entries = match self.current_screen {
            Screen::Dashboard => self.tracked(),
            Screen::Search => self.search_results(),
        };
        let index = match self.current_screen {
            Screen::Dashboard => self.selected_index,
            Screen::Search => self.search_index,
        };
        entries.get(index).map(|e| e.symbol().to_string())
    }

    /// Navigue vers le haut (la page suit la sélection)
    pub fn navigate_up(&mut self) {
        match self.current_screen {
            Screen::Dashboard => {
                self.selected_index = self.selected_index.saturating_sub(1);
                self.panel_pager.show(self.selected_index);
            }
            Screen::Search => {
                self.search_index = self.search_index.saturating_sub(1);
                self.search_pager.show(self.search_index);
            }
        }
    }

    /// Navigue vers le bas
    pub fn navigate_down(&mut self) {
        match self.current_screen {
            Screen::Dashboard => {
                let max_index = self.tracked().len().saturating_sub(1);
                self.selected_index = (self.selected_index + 1).min(max_index);
                self.panel_pager.show(self.selected_index);
            }
            Screen::Search => {
                let max_index = self.search_results().len().saturating_sub(1);
                self.search_index = (self.search_index + 1).min(max_index);
                self.search_pager.show(self.search_index);
            }
        }
    }

    /// Page suivante ; la sélection va en haut de la page
    pub fn next_page(&mut self) {
        match self.current_screen {
            Screen::Dashboard => {
                let len = self.tracked().len();
                self.panel_pager.next_page(len);
                self.selected_index = self.panel_pager.offset().min(len.saturating_sub(1));
            }
            Screen::Search => {
                let len = self.search_results().len();
                self.search_pager.next_page(len);
                self.search_index = self.search_pager.offset().min(len.saturating_sub(1));
            }
        }
    }

    pub fn previous_page(&mut self) {
        match self.current_screen {
            Screen::Dashboard => {
                self.panel_pager.previous_page();
                self.selected_index = self.panel_pager.offset();
            }
            Screen::Search => {
                self.search_pager.previous_page();
                self.search_index = self.search_pager.offset();
            }
        }
    }

    /// Augmente la taille de page de la recherche
    pub fn grow_page_size(&mut self) {
        let len = self.search_results().len();
        self.search_pager.next_size(len);
        self.search_pager.show(self.search_index);
    }

    /// Diminue la taille de page de la recherche
    pub fn shrink_page_size(&mut self) {
        let len = self.search_results().len();
        self.search_pager.previous_size(len);
        self.search_pager.show(self.search_index);
    }

    // ========================================================================
    // Saisie du terme de recherche
    // ========================================================================

    /// Donne le focus à la boîte de recherche
    pub fn start_search_input(&mut self) {
        self.input_mode = InputMode::Search;
    }

    /// Ajoute un caractère au terme (filtre recalculé à chaque frappe)
    pub fn push_search_char(&mut self, c: char) {
        self.search_term.push(c);
        self.refresh_search();
    }

    pub fn pop_search_char(&mut self) {
        self.search_term.pop();
        self.refresh_search();
    }

    /// Recadre pagination et sélection sur les résultats courants
    ///
    /// La taille de page n'est jamais modifiée par le filtre.
    fn refresh_search(&mut self) {
        let len = self.search_results().len();
        self.search_pager.clamp(len);
        self.search_index = self.search_pager.offset().min(len.saturating_sub(1));
    }

    fn clamp_panel(&mut self) {
        let len = self.tracked().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
        self.panel_pager.clamp(len);
        self.panel_pager.show(self.selected_index);
    }

    // ========================================================================
    // Édition de quantité
    // ========================================================================

    /// Commence l'édition de la quantité du symbole sélectionné
    ///
    /// Le buffer part de la saisie courante (la quantité confirmée après
    /// un rafraîchissement).
    pub fn start_amount_edit(&mut self) {
        let Some(symbol) = self.selected_symbol() else {
            return;
        };

        self.input_buffer = self
            .portfolio
            .merged()
            .get(&symbol)
            .and_then(|e| e.amount_input)
            .map(format_amount)
            .unwrap_or_default();

        debug!(%symbol, "Amount edit started");
        self.input_mode = InputMode::Amount { symbol };
    }

    /// Ajoute un caractère à la quantité (chiffres et '.')
    pub fn push_amount_char(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '.' && !self.input_buffer.contains('.')) {
            self.input_buffer.push(c);
            self.sync_amount_input();
        }
    }

    pub fn pop_amount_char(&mut self) {
        self.input_buffer.pop();
        self.sync_amount_input();
    }

    /// Reporte le buffer dans amount_input (mémoire uniquement)
    fn sync_amount_input(&mut self) {
        if let InputMode::Amount { symbol } = &self.input_mode {
            let amount = parse_amount(&self.input_buffer);
            self.portfolio.set_amount_input(symbol, amount);
        }
    }

    /// Valide la quantité éditée : Update si suivi, Add sinon
    pub fn submit_amount(&mut self) {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        self.input_buffer.clear();

        if let InputMode::Amount { symbol } = mode {
            self.confirm(&symbol);
        }
    }

    /// Quitte le mode saisie sans confirmer
    ///
    /// Une quantité tapée reste comme saisie non confirmée jusqu'au
    /// prochain rafraîchissement.
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn is_editing_amount(&self) -> bool {
        matches!(self.input_mode, InputMode::Amount { .. })
    }

    pub fn is_typing_search(&self) -> bool {
        self.input_mode == InputMode::Search
    }

    // ========================================================================
    // Actions Add / Update / Remove
    // ========================================================================

    /// Add ou Update du symbole sélectionné avec sa saisie courante
    pub fn confirm_selected(&mut self) {
        if let Some(symbol) = self.selected_symbol() {
            self.confirm(&symbol);
        }
    }

    /// Add (symbole non suivi) ou Update (symbole suivi)
    ///
    /// Retourne true si la watchlist a été modifiée.
    pub fn confirm(&mut self, symbol: &str) -> bool {
        let tracked = self.portfolio.is_tracked(symbol);
        let result = if tracked {
            self.portfolio.update(symbol)
        } else {
            self.portfolio.add(symbol)
        };

        match result {
            Ok(()) => {
                let verb = if tracked { "mis à jour" } else { "ajouté" };
                self.set_message(MessageKind::Info, format!("{} {}", symbol, verb));
                true
            }
            Err(e) => {
                if e.is_validation() {
                    debug!(symbol, "Amount rejected by validation");
                } else {
                    error!(symbol, error = %e, "Watchlist action failed");
                }
                self.set_message(MessageKind::Error, e.to_string());
                false
            }
        }
    }

    /// Retire le symbole sélectionné, sans confirmation
    ///
    /// Sur la recherche, ne fait rien si le symbole n'est pas suivi.
    pub fn remove_selected(&mut self) {
        let Some(symbol) = self.selected_symbol() else {
            return;
        };
        if !self.portfolio.is_tracked(&symbol) {
            return;
        }

        match self.portfolio.remove(&symbol) {
            Ok(_) => {
                self.set_message(MessageKind::Info, format!("{} retiré", symbol));
            }
            Err(e) => {
                error!(%symbol, error = %e, "Failed to remove token");
                self.set_message(MessageKind::Error, e.to_string());
            }
        }
        self.clamp_panel();
    }

    // ========================================================================
    // Fetchs
    // ========================================================================

    /// Vrai si le fetch automatique est dû (arme le suivant)
    pub fn fetch_due(&mut self, now: Instant) -> bool {
        self.schedule.poll(now)
    }

    /// Enregistre le départ d'un fetch et retourne son id
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_status.begin()
    }

    /// Applique un fetch réussi (le dernier arrivé gagne)
    ///
    /// Les sélections (panneau et recherche) suivent leur symbole : un
    /// rafraîchissement ne déplace pas le curseur.
    pub fn on_tickers(&mut self, request_id: u64, tickers: Vec<Ticker>) {
        self.fetch_status.succeed();

        let search_symbol = symbol_at(&self.search_results(), self.search_index);
        let panel_symbol = symbol_at(&self.tracked(), self.selected_index);

        let missing = self.portfolio.apply_fetch(tickers);
        info!(
            request_id,
            symbols = self.portfolio.merged().len(),
            missing = missing.len(),
            "Market data applied"
        );

        // La fusion a réinitialisé les saisies : on garde celle en cours
        self.sync_amount_input();

        self.refresh_search();
        let search_index = search_symbol.and_then(|s| position_of(&self.search_results(), &s));
        if let Some(index) = search_index {
            self.search_index = index;
            self.search_pager.show(index);
        }

        let panel_index = panel_symbol.and_then(|s| position_of(&self.tracked(), &s));
        if let Some(index) = panel_index {
            self.selected_index = index;
        }
        self.clamp_panel();
    }

    /// Enregistre un fetch échoué ; les données précédentes restent affichées
    pub fn on_fetch_error(&mut self, request_id: u64, error: &str) {
        self.fetch_status.fail();
        error!(request_id, error, "Market data fetch failed");
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_status.is_loading()
    }

    pub fn has_fetch_error(&self) -> bool {
        self.fetch_status.has_error()
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub fn set_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

fn symbol_at(entries: &[&WatchlistEntry], index: usize) -> Option<String> {
    entries.get(index).map(|e| e.symbol().to_string())
}

fn position_of(entries: &[&WatchlistEntry], symbol: &str) -> Option<usize> {
    entries.iter().position(|e| e.symbol() == symbol)
}

// ============================================================================
// Tests unitaires
// ============================================================================
