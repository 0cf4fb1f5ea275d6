// ============================================================================
// Module : portfolio
// ============================================================================
// Moteur de réconciliation : fusionne les données de marché fraîchement
// fetchées avec la watchlist persistée, et applique les actions de
// l'utilisateur (Add / Update / Remove / édition de quantité).
//
// CONCEPTS RUST :
// 1. Générique sur le store : Portfolio<S: WatchlistStore>
//    - Le store est injecté à la construction (pas de singleton)
//    - Les tests utilisent MemoryStore, l'application JsonFileStore
// 2. Calculer puis persister : chaque mutation construit la nouvelle
//    watchlist complète, la sauvegarde, et seulement ensuite remplace
//    l'état en mémoire
// ============================================================================

pub mod allocation;  // Répartition pour le graphique de synthèse
mod collections;     // Watchlist et MergedView indexées par symbole

pub use allocation::Slice;
pub use collections::{MergedView, Watchlist};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::PortfolioError;
use crate::models::{is_valid_amount, Ticker, WatchlistEntry};
use crate::store::WatchlistStore;

/// État du portefeuille : watchlist persistée + vue fusionnée
pub struct Portfolio<S: WatchlistStore> {
    /// Stockage injecté (fichier JSON, mémoire...)
    store: S,

    /// Watchlist confirmée, miroir exact du stockage
    watchlist: Watchlist,

    /// Derniers tickers fetchés décorés avec les quantités
    merged: MergedView,

    /// Date du dernier fetch appliqué
    last_update: Option<DateTime<Utc>>,
}

impl<S: WatchlistStore> Portfolio<S> {
    /// Crée le portefeuille et charge la watchlist depuis le store
    ///
    /// Tant qu'aucun fetch n'a abouti, la vue fusionnée est vide.
    pub fn new(store: S) -> Self {
        let watchlist = store.load();
        info!(entries = watchlist.len(), "Portfolio initialised");
        Self {
            store,
            watchlist,
            merged: MergedView::default(),
            last_update: None,
        }
    }

    // ========================================================================
    // Réconciliation
    // ========================================================================

    /// Remplace la vue fusionnée par un nouveau jeu de tickers
    ///
    /// Pour chaque ticker suivi, la quantité confirmée est reportée telle
    /// quelle et sert aussi de valeur éditable (amount_input). Les saisies
    /// non confirmées sont donc perdues à chaque rafraîchissement.
    ///
    /// Retourne les symboles de la watchlist absents du fetch : ils restent
    /// dans la watchlist (et le stockage) mais disparaissent de la vue.
    pub fn apply_fetch(&mut self, tickers: Vec<Ticker>) -> Vec<String> {
        let fetched = tickers.len();

        let merged = MergedView::from_entries(tickers.into_iter().map(|ticker| {
            match self.watchlist.get(&ticker.symbol) {
                Some(tracked) => WatchlistEntry {
                    amount: tracked.amount,
                    amount_input: tracked.amount,
                    ticker,
                },
                None => WatchlistEntry::from_ticker(ticker),
            }
        }));

        let missing: Vec<String> = self
            .watchlist
            .iter()
            .filter(|entry| !merged.contains(entry.symbol()))
            .map(|entry| entry.symbol().to_string())
            .collect();

        if !missing.is_empty() {
            warn!(?missing, "Tracked symbols missing from market data");
        }

        self.merged = merged;
        self.last_update = Some(Utc::now());

        debug!(
            fetched,
            merged = self.merged.len(),
            tracked = self.watchlist.len(),
            "Market data reconciled"
        );
        missing
    }

    // ========================================================================
    // Actions utilisateur
    // ========================================================================

    /// Édite la saisie de quantité d'un symbole (mémoire uniquement)
    ///
    /// Retourne false si le symbole n'est pas dans la vue fusionnée.
    pub fn set_amount_input(&mut self, symbol: &str, amount: Option<f64>) -> bool {
        match self.merged.get_mut(symbol) {
            Some(entry) => {
                entry.amount_input = amount;
                true
            }
            None => false,
        }
    }

    /// Ajoute un symbole à la watchlist avec sa saisie courante
    ///
    /// # Erreurs
    /// * `AlreadyTracked` si le symbole est déjà suivi (utiliser `update`)
    /// * `UnknownSymbol` s'il n'est pas dans les données de marché
    /// * `InvalidAmount` si la saisie n'est pas un nombre positif
    /// * `Storage` si l'écriture échoue (rien n'est modifié)
    pub fn add(&mut self, symbol: &str) -> Result<(), PortfolioError> {
        if self.watchlist.contains(symbol) {
            return Err(PortfolioError::AlreadyTracked(symbol.to_string()));
        }

        let entry = self
            .merged
            .get(symbol)
            .ok_or_else(|| PortfolioError::UnknownSymbol(symbol.to_string()))?;

        let amount = valid_input(entry)?;

        let mut next = self.watchlist.clone();
        next.push(WatchlistEntry::with_amount(entry.ticker.clone(), amount));
        self.commit(next)?;

        if let Some(entry) = self.merged.get_mut(symbol) {
            entry.amount = Some(amount);
        }

        info!(symbol, amount, "Token added to watchlist");
        Ok(())
    }

    /// Confirme la saisie courante comme nouvelle quantité d'un symbole suivi
    ///
    /// Seule la quantité de l'entrée correspondante change ; les autres
    /// entrées (et l'instantané de prix persisté) restent identiques.
    pub fn update(&mut self, symbol: &str) -> Result<(), PortfolioError> {
        if !self.watchlist.contains(symbol) {
            return Err(PortfolioError::NotTracked(symbol.to_string()));
        }

        let amount = match self.merged.get(symbol) {
            Some(entry) => valid_input(entry)?,
            // Suivi mais absent du dernier fetch : aucune saisie possible
            None => return Err(PortfolioError::InvalidAmount),
        };

        let mut next = self.watchlist.clone();
        next.set_amount(symbol, amount);
        self.commit(next)?;

        if let Some(entry) = self.merged.get_mut(symbol) {
            entry.amount = Some(amount);
        }

        info!(symbol, amount, "Token amount updated");
        Ok(())
    }

    /// Retire un symbole de la watchlist, sans confirmation
    ///
    /// Persiste dans tous les cas ; retourne true si une entrée a été retirée.
    pub fn remove(&mut self, symbol: &str) -> Result<bool, PortfolioError> {
        let mut next = self.watchlist.clone();
        let removed = next.remove(symbol).is_some();
        self.commit(next)?;

        if let Some(entry) = self.merged.get_mut(symbol) {
            entry.amount = None;
        }

        info!(symbol, removed, "Token removed from watchlist");
        Ok(removed)
    }

    /// Persiste la nouvelle watchlist puis la rend courante
    fn commit(&mut self, next: Watchlist) -> Result<(), PortfolioError> {
        self.store.save(&next)?;
        self.watchlist = next;
        Ok(())
    }

    // ========================================================================
    // Lecture
    // ========================================================================

    /// Watchlist confirmée (telle que persistée)
    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Vue fusionnée complète (base de la recherche)
    pub fn merged(&self) -> &MergedView {
        &self.merged
    }

    /// Lignes du panneau "mes tokens", dans l'ordre de la watchlist
    ///
    /// Un symbole présent dans le dernier fetch donne son entrée fusionnée
    /// (prix frais, saisie en cours). Un symbole absent du fetch garde son
    /// entrée persistée : il reste visible et peut être retiré, mais n'a
    /// pas de prix (voir `is_priced`).
    pub fn tracked_view(&self) -> Vec<&WatchlistEntry> {
        self.watchlist
            .iter()
            .map(|entry| self.merged.get(entry.symbol()).unwrap_or(entry))
            .collect()
    }

    pub fn is_tracked(&self, symbol: &str) -> bool {
        self.watchlist.contains(symbol)
    }

    /// Vrai si le symbole a des données de marché fraîches
    pub fn is_priced(&self, symbol: &str) -> bool {
        self.merged.contains(symbol)
    }

    /// Répartition par quantité pour le graphique
    pub fn allocation(&self) -> Vec<Slice> {
        allocation::compute(&self.watchlist, &self.merged)
    }

    /// Valeur totale des positions ayant un prix
    pub fn total_value(&self) -> f64 {
        self.watchlist
            .iter()
            .filter_map(|entry| self.merged.get(entry.symbol()))
            .filter_map(|e| e.value())
            .sum()
    }

    /// Date du dernier fetch appliqué
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Valide la saisie d'une entrée et retourne la quantité
fn valid_input(entry: &WatchlistEntry) -> Result<f64, PortfolioError> {
    match entry.amount_input {
        Some(amount) if is_valid_amount(Some(amount)) => Ok(amount),
        _ => Err(PortfolioError::InvalidAmount),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    fn tickers() -> Vec<Ticker> {
        vec![
            Ticker::new("BTCUSDT", "64000"),
            Ticker::new("ETHUSDT", "3000"),
            Ticker::new("ABCUSDT", "2"),
        ]
    }

    /// Store pré-rempli avec une watchlist
    fn store_with(entries: Vec<WatchlistEntry>) -> MemoryStore {
        let store = MemoryStore::new();
        store.save(&Watchlist::from_entries(entries)).unwrap();
        store
    }

    fn saves_since_setup(portfolio: &Portfolio<MemoryStore>, baseline: usize) -> usize {
        portfolio.store().saves() - baseline
    }

    /// Store dont l'écriture échoue toujours
    struct ReadOnlyStore;

    impl WatchlistStore for ReadOnlyStore {
        fn load(&self) -> Watchlist {
            Watchlist::new()
        }

        fn save(&self, _watchlist: &Watchlist) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_empty_watchlist_merges_to_fetch() {
        let mut portfolio = Portfolio::new(MemoryStore::new());
        let missing = portfolio.apply_fetch(tickers());

        assert!(missing.is_empty());
        let expected = MergedView::from_tickers(tickers());
        assert_eq!(portfolio.merged(), &expected);
        assert!(portfolio.last_update().is_some());
    }

    #[test]
    fn test_reconciliation_seeds_amount_input() {
        let store = store_with(vec![WatchlistEntry::with_amount(
            Ticker::new("ETHUSDT", "2500"),
            2.0,
        )]);
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        let eth = portfolio.merged().get("ETHUSDT").unwrap();
        assert_eq!(eth.amount, Some(2.0));
        assert_eq!(eth.amount_input, Some(2.0));
        // Les statistiques viennent du fetch, pas de l'instantané persisté
        assert_eq!(eth.ticker.last_price, "3000");

        for symbol in ["BTCUSDT", "ABCUSDT"] {
            let entry = portfolio.merged().get(symbol).unwrap();
            assert_eq!(entry.amount, None);
            assert_eq!(entry.amount_input, None);
        }
    }

    #[test]
    fn test_refresh_discards_unconfirmed_edits() {
        let store = store_with(vec![WatchlistEntry::with_amount(
            Ticker::new("ETHUSDT", "2500"),
            2.0,
        )]);
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        assert!(portfolio.set_amount_input("ETHUSDT", Some(9.0)));
        assert!(portfolio.set_amount_input("BTCUSDT", Some(1.0)));
        portfolio.apply_fetch(tickers());

        assert_eq!(portfolio.merged().get("ETHUSDT").unwrap().amount_input, Some(2.0));
        assert_eq!(portfolio.merged().get("BTCUSDT").unwrap().amount_input, None);
    }

    #[test]
    fn test_missing_tracked_symbol_is_kept() {
        let store = store_with(vec![
            WatchlistEntry::with_amount(Ticker::new("GONEUSDT", "1"), 3.0),
            WatchlistEntry::with_amount(Ticker::new("BTCUSDT", "60000"), 1.0),
        ]);
        let mut portfolio = Portfolio::new(store);
        let missing = portfolio.apply_fetch(tickers());

        assert_eq!(missing, vec!["GONEUSDT".to_string()]);
        assert!(portfolio.is_tracked("GONEUSDT"));
        assert_eq!(portfolio.watchlist().len(), 2);

        // Toujours listé (dans l'ordre de la watchlist), mais sans prix
        let view: Vec<&str> = portfolio.tracked_view().iter().map(|e| e.symbol()).collect();
        assert_eq!(view, vec!["GONEUSDT", "BTCUSDT"]);
        assert!(!portfolio.is_priced("GONEUSDT"));
        assert!(portfolio.is_priced("BTCUSDT"));

        // Le prix persisté de GONEUSDT ne compte pas dans le total
        assert_eq!(portfolio.total_value(), 64000.0);
    }

    #[test]
    fn test_missing_tracked_symbol_can_be_removed() {
        let store = store_with(vec![
            WatchlistEntry::with_amount(Ticker::new("GONEUSDT", "1"), 9.0),
            WatchlistEntry::with_amount(Ticker::new("BTCUSDT", "60000"), 1.0),
        ]);
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        assert!(portfolio.remove("GONEUSDT").unwrap());
        assert!(!portfolio.is_tracked("GONEUSDT"));

        let allocation = portfolio.allocation();
        let symbols: Vec<&str> = allocation.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT"]);
        assert!(!portfolio.store().raw().unwrap().contains("GONEUSDT"));
    }

    #[test]
    fn test_add_requires_positive_amount() {
        let mut portfolio = Portfolio::new(MemoryStore::new());
        portfolio.apply_fetch(tickers());

        for input in [None, Some(0.0), Some(-5.0)] {
            portfolio.set_amount_input("ABCUSDT", input);
            let err = portfolio.add("ABCUSDT").unwrap_err();
            assert!(matches!(err, PortfolioError::InvalidAmount));
            assert_eq!(err.to_string(), "Please enter a valid amount!");
        }

        assert!(portfolio.watchlist().is_empty());
        assert_eq!(portfolio.store().saves(), 0);
    }

    #[test]
    fn test_add_appends_and_persists() {
        let mut portfolio = Portfolio::new(MemoryStore::new());
        portfolio.apply_fetch(tickers());

        portfolio.set_amount_input("ABCUSDT", Some(5.0));
        portfolio.add("ABCUSDT").unwrap();

        assert_eq!(portfolio.watchlist().len(), 1);
        let entry = portfolio.watchlist().get("ABCUSDT").unwrap();
        assert_eq!(entry.amount, Some(5.0));
        assert_eq!(entry.amount_input, None);

        // Persisté
        assert_eq!(portfolio.store().saves(), 1);
        let stored = portfolio.store().load();
        assert_eq!(stored.get("ABCUSDT").unwrap().amount, Some(5.0));

        // Le panneau montre la nouvelle entrée
        assert_eq!(portfolio.tracked_view().len(), 1);
        assert_eq!(portfolio.merged().get("ABCUSDT").unwrap().amount, Some(5.0));
    }

    #[test]
    fn test_add_rejects_tracked_and_unknown() {
        let mut portfolio = Portfolio::new(MemoryStore::new());
        portfolio.apply_fetch(tickers());
        portfolio.set_amount_input("ABCUSDT", Some(5.0));
        portfolio.add("ABCUSDT").unwrap();

        assert!(matches!(
            portfolio.add("ABCUSDT"),
            Err(PortfolioError::AlreadyTracked(_))
        ));
        assert!(matches!(
            portfolio.add("NOPEUSDT"),
            Err(PortfolioError::UnknownSymbol(_))
        ));
        assert_eq!(portfolio.watchlist().len(), 1);
    }

    #[test]
    fn test_update_replaces_only_matching_amount() {
        let store = store_with(vec![
            WatchlistEntry::with_amount(Ticker::new("BTCUSDT", "60000"), 1.0),
            WatchlistEntry::with_amount(Ticker::new("ETHUSDT", "2500"), 2.0),
        ]);
        let baseline = store.saves();
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        let btc_before = portfolio.watchlist().get("BTCUSDT").unwrap().clone();
        let eth_before = portfolio.watchlist().get("ETHUSDT").unwrap().clone();

        portfolio.set_amount_input("ETHUSDT", Some(4.5));
        portfolio.update("ETHUSDT").unwrap();

        assert_eq!(portfolio.watchlist().get("BTCUSDT").unwrap(), &btc_before);
        let eth_after = portfolio.watchlist().get("ETHUSDT").unwrap();
        assert_eq!(eth_after.amount, Some(4.5));
        assert_eq!(eth_after.ticker, eth_before.ticker);

        assert_eq!(saves_since_setup(&portfolio, baseline), 1);
        assert_eq!(
            portfolio.store().load().get("ETHUSDT").unwrap().amount,
            Some(4.5)
        );
    }

    #[test]
    fn test_update_validation() {
        let store = store_with(vec![WatchlistEntry::with_amount(
            Ticker::new("ETHUSDT", "2500"),
            2.0,
        )]);
        let baseline = store.saves();
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        portfolio.set_amount_input("ETHUSDT", Some(0.0));
        assert!(matches!(
            portfolio.update("ETHUSDT"),
            Err(PortfolioError::InvalidAmount)
        ));
        assert!(matches!(
            portfolio.update("BTCUSDT"),
            Err(PortfolioError::NotTracked(_))
        ));

        assert_eq!(portfolio.watchlist().get("ETHUSDT").unwrap().amount, Some(2.0));
        assert_eq!(saves_since_setup(&portfolio, baseline), 0);
    }

    #[test]
    fn test_remove_deletes_and_persists() {
        let store = store_with(vec![
            WatchlistEntry::with_amount(Ticker::new("BTCUSDT", "60000"), 1.0),
            WatchlistEntry::with_amount(Ticker::new("ABCUSDT", "2"), 5.0),
            WatchlistEntry::with_amount(Ticker::new("ETHUSDT", "2500"), 2.0),
        ]);
        let baseline = store.saves();
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        assert!(portfolio.remove("ABCUSDT").unwrap());

        assert_eq!(portfolio.watchlist().len(), 2);
        assert!(!portfolio.is_tracked("ABCUSDT"));
        assert_eq!(saves_since_setup(&portfolio, baseline), 1);
        assert!(!portfolio.store().load().contains("ABCUSDT"));
        assert_eq!(portfolio.merged().get("ABCUSDT").unwrap().amount, None);

        // Retirer un symbole absent ne change rien
        assert!(!portfolio.remove("ABCUSDT").unwrap());
        assert_eq!(portfolio.watchlist().len(), 2);
    }

    #[test]
    fn test_edit_never_persists() {
        let mut portfolio = Portfolio::new(MemoryStore::new());
        portfolio.apply_fetch(tickers());

        assert!(portfolio.set_amount_input("BTCUSDT", Some(3.0)));
        assert!(!portfolio.set_amount_input("NOPEUSDT", Some(3.0)));

        assert_eq!(portfolio.merged().get("BTCUSDT").unwrap().amount_input, Some(3.0));
        assert_eq!(portfolio.store().saves(), 0);
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let mut portfolio = Portfolio::new(ReadOnlyStore);
        portfolio.apply_fetch(tickers());
        portfolio.set_amount_input("ABCUSDT", Some(5.0));

        let err = portfolio.add("ABCUSDT").unwrap_err();
        assert!(matches!(err, PortfolioError::Storage(_)));
        assert!(portfolio.watchlist().is_empty());
        assert_eq!(portfolio.merged().get("ABCUSDT").unwrap().amount, None);
    }

    #[test]
    fn test_total_value() {
        let store = store_with(vec![
            WatchlistEntry::with_amount(Ticker::new("ABCUSDT", "1"), 5.0),
            WatchlistEntry::with_amount(Ticker::new("ETHUSDT", "1"), 2.0),
        ]);
        let mut portfolio = Portfolio::new(store);
        portfolio.apply_fetch(tickers());

        // 5 × 2 + 2 × 3000
        assert_eq!(portfolio.total_value(), 6010.0);
    }
}
