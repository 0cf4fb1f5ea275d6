// ============================================================================
// Configuration
// ============================================================================
// Fichier TOML optionnel : ~/.config/lazytokens/config.toml sur Linux
//
// Exemple :
//   api_url = "https://api2.binance.com/api/v3/ticker/24hr"
//   refresh_interval_secs = 300
//   page_size = 5
//   storage_path = "/home/me/.local/share/lazytokens/my_tokens.json"
//
// CONCEPT SERDE : #[serde(default)]
// - Chaque champ absent prend la valeur de Config::default()
// - Un fichier vide est donc une config valide
// ============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{DEFAULT_API_URL, DEFAULT_REFRESH_INTERVAL};
use crate::search::DEFAULT_PAGE_SIZE;
use crate::store::JsonFileStore;

/// Réglages de l'application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint des statistiques 24h
    pub api_url: String,

    /// Intervalle entre deux fetchs automatiques, en secondes
    pub refresh_interval_secs: u64,

    /// Taille de page initiale de la recherche
    pub page_size: usize,

    /// Fichier de la watchlist (None : emplacement par défaut)
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            page_size: DEFAULT_PAGE_SIZE,
            storage_path: None,
        }
    }
}

impl Config {
    /// Emplacement par défaut du fichier de config
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lazytokens").join("config.toml"))
    }

    /// Charge la config depuis `path`
    ///
    /// Fichier absent => valeurs par défaut. Fichier invalide => erreur.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(?path, "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Échec de lecture de {}", path.display()))
            }
        };

        let config = Self::parse(&raw)
            .with_context(|| format!("Configuration invalide : {}", path.display()))?;
        info!(?path, "Configuration loaded");
        Ok(config)
    }

    /// Charge la config depuis l'emplacement par défaut
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse et valide un contenu TOML
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).context("Échec du parsing TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs doit être > 0");
        }
        if self.page_size == 0 {
            anyhow::bail!("page_size doit être > 0");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Fichier de la watchlist effectivement utilisé
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(JsonFileStore::default_path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::parse("refresh_interval_secs = 60\npage_size = 10\n").unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.page_size, 10);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_storage_path_override() {
        let config = Config::parse("storage_path = \"/tmp/tokens.json\"").unwrap();
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/tokens.json"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::parse("refresh_interval_secs = 0").is_err());
        assert!(Config::parse("page_size = 0").is_err());
        assert!(Config::parse("page_size = \"five\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join(format!(
            "lazytokens-missing-config-{}.toml",
            std::process::id()
        ));
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.page_size, 5);
    }
}
