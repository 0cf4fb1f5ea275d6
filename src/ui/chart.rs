// ============================================================================
// Chart - Graphique de répartition du portefeuille
// ============================================================================
// Une barre horizontale par symbole détenu, longueur = part de la quantité
// totale (équivalent texte d'un camembert).
//
// CONCEPTS RATATUI :
// 1. BarChart : barres avec label et valeur affichée
// 2. Bar / BarGroup : une barre stylée par symbole
// ============================================================================

use ratatui::{
    layout::{Alignment, Direction, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::portfolio::Slice;

/// Couleurs des barres, réutilisées en boucle
const PALETTE: [Color; 6] = [
    Color::Green,
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::LightRed,
];

/// Échelle des valeurs : une part de 1.0 vaut 1000 (précision 0.1%)
const SCALE: f64 = 1000.0;

/// Dessine la répartition par quantité
pub fn render_allocation(frame: &mut Frame, slices: &[Slice], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🥧 Allocation (by amount) ");

    if slices.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Aucune position",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "[a] pour ajouter un token",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let bars: Vec<Bar> = slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let color = PALETTE[i % PALETTE.len()];
            Bar::default()
                .label(Line::from(slice.symbol.clone()))
                .value(share_to_value(slice.share))
                .text_value(bar_text(slice))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(SCALE as u64)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

/// Convertit une part (0..=1) en valeur entière de barre
fn share_to_value(share: f64) -> u64 {
    (share.clamp(0.0, 1.0) * SCALE).round() as u64
}

/// Texte affiché dans la barre : "45.0% · 1234.56"
fn bar_text(slice: &Slice) -> String {
    match slice.value {
        Some(value) => format!("{:.1}% · {:.2}", slice.share * 100.0, value),
        None => format!("{:.1}%", slice.share * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_to_value() {
        assert_eq!(share_to_value(0.25), 250);
        assert_eq!(share_to_value(1.0), 1000);
        assert_eq!(share_to_value(1.5), 1000);
    }

    #[test]
    fn test_bar_text() {
        let slice = Slice {
            symbol: "BTCUSDT".into(),
            amount: 1.0,
            share: 0.5,
            value: Some(64000.0),
        };
        assert_eq!(bar_text(&slice), "50.0% · 64000.00");

        let unpriced = Slice { value: None, ..slice };
        assert_eq!(bar_text(&unpriced), "50.0%");
    }
}
