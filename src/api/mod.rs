// ============================================================================
// Module : api
// ============================================================================
// Récupération des données de marché et planification des fetchs
// ============================================================================

pub mod binance;  // Client de l'endpoint 24h
pub mod schedule; // Cadence de rafraîchissement, signaux loading/error

// Re-export des éléments principaux
pub use binance::{parse_tickers, TickerFeed, DEFAULT_API_URL};
pub use schedule::{FetchStatus, RefreshSchedule, DEFAULT_REFRESH_INTERVAL};
