// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Header (état des fetchs), panneau "mes tokens" à gauche, répartition à
// droite, footer (raccourcis ou message transitoire). La fenêtre de
// recherche se dessine par-dessus quand elle est ouverte.
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Widgets : Block, Paragraph, List
// ============================================================================

use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, InputMode, MessageKind, Screen};
use crate::models::{format_amount, format_price, WatchlistEntry};
use crate::store::WatchlistStore;
use crate::ui::{chart, modal};

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le dashboard est toujours dessiné
/// - La recherche est une fenêtre modale par-dessus
pub fn render<S: WatchlistStore>(frame: &mut Frame, app: &App<S>) {
    render_dashboard(frame, app);

    match app.current_screen {
        Screen::Dashboard => {}
        Screen::Search => modal::render_search(frame, app),
    }
}

/// Dessine le dashboard
fn render_dashboard<S: WatchlistStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_watchlist(frame, app, body[0]);
    chart::render_allocation(frame, &app.portfolio.allocation(), body[1]);

    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : titre + état des données
// ============================================================================

fn render_header<S: WatchlistStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyTokens ")
        .title_alignment(Alignment::Center);

    let mut spans = Vec::new();

    match app.portfolio.last_update() {
        Some(at) => spans.push(Span::styled(
            format!("Mis à jour {} UTC", at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        )),
        None => spans.push(Span::styled(
            "En attente des données",
            Style::default().fg(Color::Gray),
        )),
    }

    spans.push(Span::raw("  •  "));
    spans.push(Span::styled(
        refresh_label(app.schedule.interval(), app.schedule.remaining(Instant::now())),
        Style::default().fg(Color::DarkGray),
    ));

    let total = app.portfolio.total_value();
    if total > 0.0 {
        spans.push(Span::raw("  •  "));
        spans.push(Span::styled(
            format!("Total {}", format_price(total)),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    if app.is_loading() {
        spans.push(Span::raw("  •  "));
        spans.push(Span::styled(
            "⟳ Chargement...",
            Style::default().fg(Color::Yellow),
        ));
    }

    if app.has_fetch_error() {
        spans.push(Span::raw("  •  "));
        spans.push(Span::styled(
            "⚠ Erreur de chargement",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// "refresh /5:00 dans 3:12"
fn refresh_label(interval: Duration, remaining: Duration) -> String {
    let clock = |d: Duration| format!("{}:{:02}", d.as_secs() / 60, d.as_secs() % 60);
    format!("refresh /{} dans {}", clock(interval), clock(remaining))
}

// ============================================================================
// Panneau "mes tokens"
// ============================================================================

fn render_watchlist<S: WatchlistStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let tracked = app.tracked();
    let pager = &app.panel_pager;

    let title = format!(
        " 📊 My Tokens ({}) · page {}/{} ",
        tracked.len(),
        pager.page() + 1,
        pager.page_count(tracked.len())
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if tracked.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Watchlist vide",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let offset = pager.offset();
    let items: Vec<ListItem> = pager
        .slice(&tracked)
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let index = offset + i;
            entry_item(
                entry,
                Marker {
                    tracked: true,
                    priced: app.portfolio.is_priced(entry.symbol()),
                    selected: index == app.selected_index,
                },
                editing_buffer(app, entry.symbol()),
            )
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Buffer d'édition si `symbol` est la quantité en cours d'édition
pub(super) fn editing_buffer<'a, S: WatchlistStore>(app: &'a App<S>, symbol: &str) -> Option<&'a str> {
    match &app.input_mode {
        InputMode::Amount { symbol: edited } if edited == symbol => Some(app.input_buffer.as_str()),
        _ => None,
    }
}

/// État d'affichage d'une ligne
#[derive(Debug, Clone, Copy)]
pub(super) struct Marker {
    /// Symbole présent dans la watchlist (étoile)
    pub tracked: bool,

    /// Symbole présent dans le dernier fetch
    pub priced: bool,

    pub selected: bool,
}

/// Construit la ligne d'une entrée (panneau et recherche)
///
/// Format : " BTCUSDT     64250.10  ▲ +1.98%  avg 63500.12  qty 0.5 → 0.7"
///
/// Une entrée sans prix (absente du dernier fetch) affiche N/A : son
/// instantané persisté n'est pas montré comme un prix courant.
pub(super) fn entry_item(
    entry: &WatchlistEntry,
    marker: Marker,
    editing: Option<&str>,
) -> ListItem<'static> {
    let trend_color = if !marker.priced {
        Color::DarkGray
    } else if entry.ticker.is_positive() {
        Color::Green
    } else {
        Color::Red
    };
    let last_price = entry.ticker.last_price_value().filter(|_| marker.priced);
    let avg_price = entry
        .ticker
        .weighted_avg_price_value()
        .filter(|_| marker.priced);

    let mut spans = vec![
        Span::styled(
            format!(
                " {} {:<12}",
                if marker.tracked { "★" } else { " " },
                entry.symbol()
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:>14}", price_or_na(last_price)),
            Style::default().fg(trend_color),
        ),
    ];

    match entry.ticker.change_percent().filter(|_| marker.priced) {
        Some(change) => {
            let arrow = if change >= 0.0 { "▲" } else { "▼" };
            spans.push(Span::styled(
                format!("  {} {:+.2}%", arrow, change),
                Style::default().fg(trend_color),
            ));
        }
        None if !marker.priced => spans.push(Span::styled(
            "  hors marché",
            Style::default().fg(Color::DarkGray),
        )),
        None => {}
    }

    spans.push(Span::styled(
        format!("  avg {}", price_or_na(avg_price)),
        Style::default().fg(Color::Gray),
    ));

    if let Some(amount) = entry.amount {
        spans.push(Span::styled(
            format!("  qty {}", format_amount(amount)),
            Style::default().fg(Color::Cyan),
        ));
    }

    match editing {
        Some(buffer) => {
            spans.push(Span::styled("  → ", Style::default().fg(Color::Yellow)));
            spans.push(Span::styled(
                buffer.to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        None if entry.has_pending_edit() => {
            let pending = entry
                .amount_input
                .map(format_amount)
                .unwrap_or_else(|| "∅".to_string());
            spans.push(Span::styled(
                format!("  → {}*", pending),
                Style::default().fg(Color::Yellow),
            ));
        }
        None => {}
    }

    let mut style = Style::default();
    if marker.selected {
        style = style.add_modifier(Modifier::REVERSED);
    }

    ListItem::new(Line::from(spans)).style(style)
}

fn price_or_na(price: Option<f64>) -> String {
    price.map(format_price).unwrap_or_else(|| "N/A".to_string())
}

// ============================================================================
// Footer : raccourcis ou message
// ============================================================================

fn render_footer<S: WatchlistStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = footer_line(app);
    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne du footer selon l'état (partagée avec la recherche)
pub(super) fn footer_line<S: WatchlistStore>(app: &App<S>) -> Line<'static> {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    if app.is_awaiting_quit_confirmation() {
        return Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
    }

    if let Some(message) = &app.message {
        let color = match message.kind {
            MessageKind::Info => Color::Green,
            MessageKind::Error => Color::Red,
        };
        return Line::from(Span::styled(
            message.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    match (&app.current_screen, &app.input_mode) {
        (_, InputMode::Amount { .. }) => Line::from(vec![
            key("[0-9 .]", Color::Yellow),
            Span::raw(" Amount  "),
            key("[Enter]", Color::Green),
            Span::raw(" Confirm  "),
            key("[ESC]", Color::Red),
            Span::raw(" Leave"),
        ]),
        (_, InputMode::Search) => Line::from(vec![
            key("[type]", Color::Yellow),
            Span::raw(" Filter  "),
            key("[Enter/ESC]", Color::Green),
            Span::raw(" Done"),
        ]),
        (Screen::Dashboard, InputMode::Normal) => Line::from(vec![
            key("[q]", Color::Yellow),
            Span::raw(" Quit  "),
            key("[↑↓]", Color::Yellow),
            Span::raw(" Navigate  "),
            key("[←→]", Color::Yellow),
            Span::raw(" Page  "),
            key("[a]", Color::Green),
            Span::raw(" Add Stock  "),
            key("[r]", Color::Green),
            Span::raw(" Refresh  "),
            key("[e]", Color::Yellow),
            Span::raw(" Edit  "),
            key("[Enter]", Color::Yellow),
            Span::raw(" Update  "),
            key("[d]", Color::Red),
            Span::raw(" Remove"),
        ]),
        (Screen::Search, InputMode::Normal) => Line::from(vec![
            key("[/]", Color::Yellow),
            Span::raw(" Search  "),
            key("[↑↓]", Color::Yellow),
            Span::raw(" Navigate  "),
            key("[←→]", Color::Yellow),
            Span::raw(" Page  "),
            key("[+-]", Color::Yellow),
            Span::raw(" Page size  "),
            key("[e]", Color::Yellow),
            Span::raw(" Edit  "),
            key("[Enter]", Color::Green),
            Span::raw(" Add/Update  "),
            key("[d]", Color::Red),
            Span::raw(" Remove  "),
            key("[ESC]", Color::Red),
            Span::raw(" Close"),
        ]),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Ticker;
    use crate::portfolio::{Portfolio, Watchlist};
    use crate::store::MemoryStore;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App<MemoryStore> {
        let store = MemoryStore::new();
        store
            .save(&Watchlist::from_entries(vec![WatchlistEntry::with_amount(
                Ticker::new("BTCUSDT", "64000"),
                0.5,
            )]))
            .unwrap();
        let mut app = App::new(Portfolio::new(store), &Config::default());
        let id = app.begin_fetch();
        app.on_tickers(
            id,
            vec![Ticker::new("BTCUSDT", "64000"), Ticker::new("ETHUSDT", "3000")],
        );
        app
    }

    fn screen(app: &App<MemoryStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_dashboard_shows_tracked_tokens() {
        let content = screen(&app());
        assert!(content.contains("BTCUSDT"));
        assert!(!content.contains("ETHUSDT"));
        assert!(content.contains("Add Stock"));
    }

    #[test]
    fn test_search_modal_lists_all_symbols() {
        let mut app = app();
        app.open_search();
        let content = screen(&app);
        assert!(content.contains("ETHUSDT"));
        assert!(content.contains("5 par page"));
    }

    #[test]
    fn test_footer_shows_message() {
        let mut app = app();
        app.set_message(MessageKind::Error, "Please enter a valid amount!");
        assert!(screen(&app).contains("Please enter a valid amount!"));
    }

    #[test]
    fn test_symbol_missing_from_fetch_is_listed_unpriced() {
        let store = MemoryStore::new();
        store
            .save(&Watchlist::from_entries(vec![WatchlistEntry::with_amount(
                Ticker::new("GONEUSDT", "42"),
                3.0,
            )]))
            .unwrap();
        let mut app = App::new(Portfolio::new(store), &Config::default());
        let id = app.begin_fetch();
        app.on_tickers(id, vec![Ticker::new("BTCUSDT", "64000")]);

        let content = screen(&app);
        assert!(content.contains("GONEUSDT"));
        assert!(content.contains("hors marché"));
        assert!(!content.contains("42.00"));
    }

    #[test]
    fn test_refresh_label() {
        assert_eq!(
            refresh_label(Duration::from_secs(300), Duration::from_secs(192)),
            "refresh /5:00 dans 3:12"
        );
    }

    #[test]
    fn test_editing_buffer_only_for_edited_symbol() {
        let mut app = app();
        app.start_amount_edit();
        assert_eq!(editing_buffer(&app, "BTCUSDT"), Some("0.5"));
        assert_eq!(editing_buffer(&app, "ETHUSDT"), None);
    }
}
