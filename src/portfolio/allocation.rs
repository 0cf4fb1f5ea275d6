// ============================================================================
// Allocation : répartition de la watchlist par quantité
// ============================================================================
// Données du graphique de synthèse (une part par symbole détenu)
// ============================================================================

use crate::portfolio::{MergedView, Watchlist};

/// Une part du graphique de répartition
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub symbol: String,

    /// Quantité confirmée
    pub amount: f64,

    /// Part de la quantité totale, entre 0 et 1
    pub share: f64,

    /// amount × dernier prix connu (None si le symbole n'a pas de prix)
    pub value: Option<f64>,
}

/// Calcule la répartition par quantité de la watchlist
///
/// Les entrées sans quantité positive sont ignorées. Les prix viennent de la
/// vue fusionnée (données fraîches), pas de l'instantané persisté.
pub fn compute(watchlist: &Watchlist, merged: &MergedView) -> Vec<Slice> {
    let held: Vec<(&str, f64)> = watchlist
        .iter()
        .filter_map(|entry| match entry.amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => Some((entry.symbol(), amount)),
            _ => None,
        })
        .collect();

    // Des quantités énormes peuvent déborder : pas de parts calculables
    let total: f64 = held.iter().map(|(_, amount)| amount).sum();
    if !total.is_finite() || total <= 0.0 {
        return Vec::new();
    }

    held.into_iter()
        .map(|(symbol, amount)| Slice {
            symbol: symbol.to_string(),
            amount,
            share: amount / total,
            value: merged
                .get(symbol)
                .and_then(|e| e.ticker.last_price_value())
                .map(|price| price * amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ticker, WatchlistEntry};

    #[test]
    fn test_shares_sum_to_one() {
        let watchlist = Watchlist::from_entries(vec![
            WatchlistEntry::with_amount(Ticker::new("AAAUSDT", "1"), 1.0),
            WatchlistEntry::with_amount(Ticker::new("BBBUSDT", "1"), 3.0),
            WatchlistEntry::from_ticker(Ticker::new("CCCUSDT", "1")),
        ]);
        let merged = MergedView::from_tickers(vec![
            Ticker::new("AAAUSDT", "10"),
            Ticker::new("BBBUSDT", "2"),
        ]);

        let slices = compute(&watchlist, &merged);

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].symbol, "AAAUSDT");
        assert!((slices[0].share - 0.25).abs() < 1e-9);
        assert!((slices[1].share - 0.75).abs() < 1e-9);
        assert_eq!(slices[0].value, Some(10.0));
        assert_eq!(slices[1].value, Some(6.0));
    }

    #[test]
    fn test_unpriced_symbol_has_no_value() {
        let watchlist = Watchlist::from_entries(vec![WatchlistEntry::with_amount(
            Ticker::new("GONEUSDT", "1"),
            2.0,
        )]);

        let slices = compute(&watchlist, &MergedView::default());
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].share, 1.0);
        assert_eq!(slices[0].value, None);
    }

    #[test]
    fn test_overflowing_total_gives_no_slices() {
        let watchlist = Watchlist::from_entries(vec![
            WatchlistEntry::with_amount(Ticker::new("AAAUSDT", "1"), f64::MAX),
            WatchlistEntry::with_amount(Ticker::new("BBBUSDT", "1"), f64::MAX),
        ]);

        let slices = compute(&watchlist, &MergedView::default());
        assert!(slices.is_empty());
    }

    #[test]
    fn test_empty_watchlist() {
        assert!(compute(&Watchlist::new(), &MergedView::default()).is_empty());
    }
}
