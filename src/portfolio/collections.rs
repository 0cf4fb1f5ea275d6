// ============================================================================
// Collections indexées par symbole : Watchlist et MergedView
// ============================================================================
// Les deux listes gardent l'ordre d'insertion (Vec) et un index
// symbole -> position (HashMap) pour des recherches en O(1).
//
// CONCEPT RUST : Newtype pattern
// - Watchlist et MergedView partagent la même table interne
// - Deux types distincts => impossible de passer l'une à la place de l'autre
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Ticker, WatchlistEntry};

/// Table ordonnée d'entrées, unique par symbole
#[derive(Debug, Clone, Default, PartialEq)]
struct SymbolTable {
    entries: Vec<WatchlistEntry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Construit la table ; en cas de doublon, la première occurrence gagne
    fn from_entries(entries: impl IntoIterator<Item = WatchlistEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.push(entry);
        }
        table
    }

    fn push(&mut self, entry: WatchlistEntry) -> bool {
        if self.index.contains_key(entry.symbol()) {
            return false;
        }
        self.index
            .insert(entry.symbol().to_string(), self.entries.len());
        self.entries.push(entry);
        true
    }

    fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.index.get(symbol).map(|&i| &self.entries[i])
    }

    fn get_mut(&mut self, symbol: &str) -> Option<&mut WatchlistEntry> {
        let i = *self.index.get(symbol)?;
        self.entries.get_mut(i)
    }

    fn remove(&mut self, symbol: &str) -> Option<WatchlistEntry> {
        let i = self.index.remove(symbol)?;
        let removed = self.entries.remove(i);
        // Les positions après i ont glissé d'un cran
        for position in self.index.values_mut() {
            if *position > i {
                *position -= 1;
            }
        }
        Some(removed)
    }
}

// ============================================================================
// Watchlist : la seule entité persistée
// ============================================================================

/// Watchlist de l'utilisateur : ordonnée, sans doublon de symbole
///
/// CONCEPT SERDE : from / into
/// - Persistée comme un simple tableau JSON d'entrées
/// - Relue via Vec<WatchlistEntry> puis indexée
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WatchlistEntry>", into = "Vec<WatchlistEntry>")]
pub struct Watchlist {
    table: SymbolTable,
}

impl Watchlist {
    /// Watchlist vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit une watchlist (les doublons de symbole sont ignorés)
    pub fn from_entries(entries: impl IntoIterator<Item = WatchlistEntry>) -> Self {
        Self {
            table: SymbolTable::from_entries(entries),
        }
    }

    /// Ajoute une entrée à la fin ; false si le symbole est déjà présent
    pub fn push(&mut self, entry: WatchlistEntry) -> bool {
        self.table.push(entry)
    }

    pub fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.table.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.table.index.contains_key(symbol)
    }

    /// Remplace uniquement la quantité de l'entrée correspondante
    pub fn set_amount(&mut self, symbol: &str, amount: f64) -> bool {
        match self.table.get_mut(symbol) {
            Some(entry) => {
                entry.amount = Some(amount);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, symbol: &str) -> Option<WatchlistEntry> {
        self.table.remove(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchlistEntry> {
        self.table.entries.iter()
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.table.entries
    }

    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }
}

impl From<Vec<WatchlistEntry>> for Watchlist {
    fn from(entries: Vec<WatchlistEntry>) -> Self {
        // amount_input n'est jamais relu (serde(skip)), mais une watchlist
        // construite en mémoire peut en porter un : on le retire ici aussi
        Self::from_entries(entries.into_iter().map(|mut e| {
            e.amount_input = None;
            e
        }))
    }
}

impl From<Watchlist> for Vec<WatchlistEntry> {
    fn from(watchlist: Watchlist) -> Self {
        watchlist.table.entries
    }
}

// ============================================================================
// MergedView : données de marché décorées, jamais persistées
// ============================================================================

/// Tous les tickers du dernier fetch, décorés avec les quantités de la watchlist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedView {
    table: SymbolTable,
}

impl MergedView {
    /// Vue brute : les tickers sans champ utilisateur
    pub fn from_tickers(tickers: impl IntoIterator<Item = Ticker>) -> Self {
        Self {
            table: SymbolTable::from_entries(tickers.into_iter().map(WatchlistEntry::from_ticker)),
        }
    }

    pub(crate) fn from_entries(entries: impl IntoIterator<Item = WatchlistEntry>) -> Self {
        Self {
            table: SymbolTable::from_entries(entries),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.table.get(symbol)
    }

    pub(crate) fn get_mut(&mut self, symbol: &str) -> Option<&mut WatchlistEntry> {
        self.table.get_mut(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.table.index.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchlistEntry> {
        self.table.entries.iter()
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.table.entries
    }

    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
