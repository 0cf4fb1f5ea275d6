// ============================================================================
// Recherche et pagination
// ============================================================================
// Projection pure de la vue fusionnée : filtre par sous-chaîne du symbole
// (insensible à la casse) et découpage en pages.
//
// CONCEPTS RUST :
// 1. Lifetimes : filter() retourne des références dans la vue, pas de copie
// 2. Slices : une page est un &[T] emprunté à la liste filtrée
// ============================================================================

use crate::models::WatchlistEntry;
use crate::portfolio::MergedView;

/// Tailles de page proposées (cyclées avec + et -)
pub const PAGE_SIZES: [usize; 5] = [5, 10, 20, 50, 100];

/// Taille de page par défaut
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Filtre la vue fusionnée par sous-chaîne du symbole
///
/// Terme vide => toute la vue. Le terme est pris tel quel (pas de trim) :
/// " btc " ne correspond à aucun symbole.
/// L'ordre d'origine est conservé ; la vue n'est jamais modifiée.
pub fn filter<'a>(view: &'a MergedView, term: &str) -> Vec<&'a WatchlistEntry> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return view.iter().collect();
    }

    view.iter()
        .filter(|entry| entry.symbol().to_lowercase().contains(&needle))
        .collect()
}

// ============================================================================
// Pager : état de pagination
// ============================================================================

/// Page courante et taille de page
///
/// Indépendant du filtre : changer le terme de recherche ne remet pas la
/// taille de page à zéro, on recadre seulement la page courante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,

    /// Index de page (commence à 0)
    page: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Nombre de pages pour `len` éléments (au moins 1)
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Ramène la page courante dans les bornes après un changement de longueur
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.min(self.page_count(len) - 1);
    }

    /// Éléments de la page courante
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    /// Index (dans `items`) du premier élément de la page courante
    pub fn offset(&self) -> usize {
        self.page * self.page_size
    }

    pub fn next_page(&mut self, len: usize) {
        if self.page + 1 < self.page_count(len) {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Se place sur la page qui contient l'élément `index`
    pub fn show(&mut self, index: usize) {
        self.page = index / self.page_size;
    }

    /// Taille de page suivante dans PAGE_SIZES
    ///
    /// La page courante est recalculée pour garder le premier élément visible.
    pub fn next_size(&mut self, len: usize) {
        let next = PAGE_SIZES
            .iter()
            .copied()
            .find(|&s| s > self.page_size)
            .unwrap_or(self.page_size);
        self.resize(next, len);
    }

    /// Taille de page précédente dans PAGE_SIZES
    pub fn previous_size(&mut self, len: usize) {
        let previous = PAGE_SIZES
            .iter()
            .rev()
            .copied()
            .find(|&s| s < self.page_size)
            .unwrap_or(self.page_size);
        self.resize(previous, len);
    }

    fn resize(&mut self, page_size: usize, len: usize) {
        let first = self.offset();
        self.page_size = page_size.max(1);
        self.page = first / self.page_size;
        self.clamp(len);
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ticker;

    fn view() -> MergedView {
        MergedView::from_tickers(
            ["BTCUSDT", "ETHBTC", "ETHUSDT", "WBTCBTC", "BNBUSDT"]
                .into_iter()
                .map(|s| Ticker::new(s, "1")),
        )
    }

    fn symbols<'a>(entries: &[&'a WatchlistEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.symbol()).collect()
    }

    #[test]
    fn test_filter_case_insensitive_keeps_order() {
        let view = view();
        let result = filter(&view, "btc");
        assert_eq!(symbols(&result), vec!["BTCUSDT", "ETHBTC", "WBTCBTC"]);

        let result = filter(&view, "BtC");
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_empty_term_returns_everything() {
        let view = view();
        assert_eq!(filter(&view, "").len(), 5);
    }

    #[test]
    fn test_term_is_matched_literally() {
        let view = view();
        assert!(filter(&view, " btc ").is_empty());
        assert!(filter(&view, "   ").is_empty());
        assert_eq!(symbols(&filter(&view, "btcusdt")), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_filter_does_not_mutate_view() {
        let view = view();
        let before = view.clone();
        let _ = filter(&view, "eth");
        assert_eq!(view, before);
    }

    #[test]
    fn test_no_match() {
        assert!(filter(&view(), "doge").is_empty());
    }

    #[test]
    fn test_pager_defaults_and_slices() {
        let items: Vec<u32> = (0..12).collect();
        let mut pager = Pager::default();

        assert_eq!(pager.page_size(), 5);
        assert_eq!(pager.page_count(items.len()), 3);
        assert_eq!(pager.slice(&items), &[0, 1, 2, 3, 4]);

        pager.next_page(items.len());
        pager.next_page(items.len());
        assert_eq!(pager.slice(&items), &[10, 11]);

        // Pas au-delà de la dernière page
        pager.next_page(items.len());
        assert_eq!(pager.page(), 2);

        pager.previous_page();
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_clamp_after_filter_keeps_page_size() {
        let mut pager = Pager::new(5);
        pager.next_size(100);
        assert_eq!(pager.page_size(), 10);

        pager.next_page(100);
        pager.next_page(100);
        assert_eq!(pager.page(), 2);

        // Le filtre réduit la liste à 3 éléments
        pager.clamp(3);
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.page_size(), 10);
    }

    #[test]
    fn test_page_size_cycle() {
        let mut pager = Pager::default();
        pager.previous_size(50);
        assert_eq!(pager.page_size(), 5);

        for _ in 0..10 {
            pager.next_size(50);
        }
        assert_eq!(pager.page_size(), 100);

        pager.previous_size(50);
        assert_eq!(pager.page_size(), 50);
    }

    #[test]
    fn test_show_follows_selection() {
        let mut pager = Pager::new(5);
        pager.show(12);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.offset(), 10);
        pager.show(0);
        assert_eq!(pager.page(), 0);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let pager = Pager::default();
        let empty: Vec<u32> = Vec::new();
        assert_eq!(pager.page_count(0), 1);
        assert!(pager.slice(&empty).is_empty());
    }
}
