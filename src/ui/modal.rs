// ============================================================================
// Modal - Fenêtre de recherche ("Add Stock")
// ============================================================================
// Dessinée par-dessus le dashboard : boîte de recherche, puis la page
// courante des symboles filtrés. Les symboles suivis sont marqués d'une
// étoile.
//
// CONCEPTS RATATUI :
// 1. Clear : efface la zone avant de dessiner (effet popup)
// 2. Layout imbriqué : zone centrée calculée en pourcentages
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::store::WatchlistStore;
use crate::ui::dashboard::{editing_buffer, entry_item, Marker};

/// Dessine la fenêtre de recherche
pub fn render_search<S: WatchlistStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(80, 80, frame.size());
    frame.render_widget(Clear, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" 🔍 Add Stock ")
        .title_alignment(Alignment::Center);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Boîte de recherche
            Constraint::Min(0),    // Résultats
            Constraint::Length(1), // Pagination
        ])
        .split(inner);

    render_search_box(frame, app, chunks[0]);
    render_results(frame, app, chunks[1]);
    render_pagination(frame, app, chunks[2]);
}

fn render_search_box<S: WatchlistStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let focused = app.is_typing_search();
    let border = if focused { Color::Yellow } else { Color::DarkGray };

    let mut spans = vec![Span::styled(
        app.search_term.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if focused {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    } else if app.search_term.is_empty() {
        spans.push(Span::styled(
            "Search...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Symbole "),
    );

    frame.render_widget(paragraph, area);
}

fn render_results<S: WatchlistStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let results = app.search_results();

    if results.is_empty() {
        let message = if app.portfolio.merged().is_empty() {
            if app.is_loading() {
                "Chargement des symboles..."
            } else {
                "Aucune donnée de marché"
            }
        } else {
            "Aucun symbole ne correspond"
        };

        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let offset = app.search_pager.offset();
    let items: Vec<ListItem> = app
        .search_pager
        .slice(&results)
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry_item(
                entry,
                Marker {
                    tracked: app.portfolio.is_tracked(entry.symbol()),
                    priced: true,
                    selected: offset + i == app.search_index,
                },
                editing_buffer(app, entry.symbol()),
            )
        })
        .collect();

    frame.render_widget(List::new(items), area);
}

/// "page 2/14 · 10 par page · 137 résultats"
fn render_pagination<S: WatchlistStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let len = app.search_results().len();
    let pager = &app.search_pager;

    let text = format!(
        "page {}/{} · {} par page · {} résultats",
        pager.page() + 1,
        pager.page_count(len),
        pager.page_size(),
        len
    );

    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray)))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Rectangle centré occupant `percent_x` × `percent_y` de `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(80, 80, area);

        assert_eq!(popup.width, 80);
        assert_eq!(popup.height, 40);
        assert_eq!(popup.x, 10);
        assert_eq!(popup.y, 5);
    }
}
