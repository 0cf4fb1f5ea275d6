// ============================================================================
// Erreurs du domaine
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] définit le message Display
// - #[from] génère la conversion automatique pour l'opérateur ?
//
// anyhow reste utilisé pour la plomberie (main, API, config) ; ces enums
// servent là où l'appelant doit distinguer les cas (ex: afficher le message
// de validation à l'utilisateur).
// ============================================================================

use std::io;

use thiserror::Error;

/// Erreurs d'écriture de la watchlist persistée
///
/// La lecture ne peut pas échouer : un état illisible devient une watchlist vide.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Échec d'écriture du stockage : {0}")]
    Io(#[from] io::Error),

    #[error("Échec de sérialisation de la watchlist : {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Erreurs des actions Add / Update / Remove
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Quantité absente, nulle, négative ou non finie
    #[error("Please enter a valid amount!")]
    InvalidAmount,

    /// Le symbole n'existe pas dans les dernières données de marché
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Add sur un symbole déjà dans la watchlist
    #[error("{0} is already in the watchlist")]
    AlreadyTracked(String),

    /// Update sur un symbole absent de la watchlist
    #[error("{0} is not in the watchlist")]
    NotTracked(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl PortfolioError {
    /// Vrai pour les erreurs de validation (message transitoire, pas de log error)
    pub fn is_validation(&self) -> bool {
        matches!(self, PortfolioError::InvalidAmount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_amount_message() {
        assert_eq!(
            PortfolioError::InvalidAmount.to_string(),
            "Please enter a valid amount!"
        );
        assert!(PortfolioError::InvalidAmount.is_validation());
        assert!(!PortfolioError::NotTracked("ABCUSDT".into()).is_validation());
    }

    #[test]
    fn test_storage_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err: PortfolioError = StoreError::from(io_err).into();
        assert!(matches!(err, PortfolioError::Storage(StoreError::Io(_))));
        assert!(err.to_string().contains("read-only"));
    }
}
