// ============================================================================
// Stockage local de la watchlist
// ============================================================================
// Une seule "clé" logique : la watchlist complète sérialisée en JSON.
//
// CONCEPTS RUST :
// 1. Trait : interface commune au fichier JSON et au stockage mémoire
// 2. Injection de dépendance : le Portfolio reçoit son store à la
//    construction, il n'y a aucun état global
// 3. Écriture atomique : fichier temporaire + rename
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::portfolio::Watchlist;

/// Nom du fichier de la watchlist dans le répertoire de données
pub const WATCHLIST_FILE: &str = "my_tokens.json";

/// Stockage persistant de la watchlist
///
/// Pas d'API de mise à jour partielle : chaque mutation calcule la nouvelle
/// watchlist complète puis appelle `save`.
pub trait WatchlistStore {
    /// Lit la watchlist persistée
    ///
    /// Ne remonte jamais d'erreur : absente ou illisible => watchlist vide.
    fn load(&self) -> Watchlist;

    /// Remplace la valeur persistée par `watchlist` (une seule écriture)
    fn save(&self, watchlist: &Watchlist) -> Result<(), StoreError>;
}

/// Décode la valeur stockée, ou une watchlist vide si elle est illisible
fn decode(raw: &str) -> Watchlist {
    match serde_json::from_str::<Watchlist>(raw) {
        Ok(watchlist) => watchlist,
        Err(e) => {
            warn!(error = %e, "Stored watchlist is malformed, starting empty");
            Watchlist::new()
        }
    }
}

// ============================================================================
// JsonFileStore : un fichier JSON sur disque
// ============================================================================

/// Watchlist stockée dans un fichier JSON
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Emplacement par défaut : ~/.local/share/lazytokens/my_tokens.json sur Linux
    ///
    /// CONCEPT : dirs::data_local_dir()
    /// - Linux : ~/.local/share
    /// - macOS : ~/Library/Application Support
    /// - Windows : %LOCALAPPDATA%
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lazytokens")
            .join(WATCHLIST_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| WATCHLIST_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl WatchlistStore for JsonFileStore {
    fn load(&self) -> Watchlist {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let watchlist = decode(&raw);
                info!(path = ?self.path, entries = watchlist.len(), "Watchlist loaded");
                watchlist
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No stored watchlist yet");
                Watchlist::new()
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read stored watchlist, starting empty");
                Watchlist::new()
            }
        }
    }

    fn save(&self, watchlist: &Watchlist) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = serde_json::to_string_pretty(watchlist)?;

        // Écrit à côté puis renomme : un lecteur voit l'ancienne ou la
        // nouvelle valeur, jamais un fichier à moitié écrit
        let tmp = self.temp_path();
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, entries = watchlist.len(), "Watchlist saved");
        Ok(())
    }
}

// ============================================================================
// MemoryStore : une case mémoire (tests, sessions éphémères)
// ============================================================================

/// Watchlist stockée en mémoire sous sa forme JSON
///
/// CONCEPT RUST : Interior mutability
/// - save(&self) doit modifier la case : RefCell / Cell
/// - Mono-thread, comme tout le reste de l'état de l'UI
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RefCell<Option<String>>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pré-rempli avec une valeur brute (éventuellement invalide)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(raw.into())),
            saves: Cell::new(0),
        }
    }

    /// Nombre d'appels à save() réussis
    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    /// Valeur brute actuellement stockée
    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl WatchlistStore for MemoryStore {
    fn load(&self) -> Watchlist {
        match self.slot.borrow().as_deref() {
            Some(raw) => decode(raw),
            None => Watchlist::new(),
        }
    }

    fn save(&self, watchlist: &Watchlist) -> Result<(), StoreError> {
        let raw = serde_json::to_string(watchlist)?;
        *self.slot.borrow_mut() = Some(raw);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
