// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod ticker; // Statistiques 24h d'un symbole (format de l'API)
pub mod token;  // Ticker + quantité détenue (entrée de watchlist)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazytokens::models::ticker::Ticker;
// On peut faire : use lazytokens::models::Ticker;
pub use ticker::{format_price, Ticker};
pub use token::{format_amount, is_valid_amount, parse_amount, WatchlistEntry};
