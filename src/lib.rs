// ============================================================================
// LazyTokens - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // API Binance + cadence des fetchs
pub mod app;       // État de l'application
pub mod config;    // Configuration TOML
pub mod error;     // Erreurs typées (thiserror)
pub mod models;    // Structures de données
pub mod portfolio; // Watchlist, fusion, Add/Update/Remove
pub mod search;    // Filtre et pagination
pub mod store;     // Persistance de la watchlist
pub mod ui;        // Interface utilisateur
