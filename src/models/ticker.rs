// ============================================================================
// Structure : Ticker
// ============================================================================
// Statistiques 24h d'un symbole crypto, telles que renvoyées par l'endpoint
// `/api/v3/ticker/24hr`
//
// CONCEPTS RUST :
// 1. #[serde(rename_all = "camelCase")] : le JSON utilise "lastPrice",
//    le Rust utilise "last_price"
// 2. Prix en String : l'API renvoie des décimaux sous forme de texte,
//    on les garde tels quels et on parse seulement pour l'affichage
// ============================================================================

use serde::{Deserialize, Serialize};

/// Statistiques 24h d'un symbole (ex: "BTCUSDT")
///
/// Immuable une fois fetché : un nouveau fetch produit un nouveau jeu de
/// Ticker, indexés par symbole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    /// Identifiant unique du symbole (ex: "BTCUSDT")
    pub symbol: String,

    pub price_change: String,
    pub price_change_percent: String,
    pub weighted_avg_price: String,
    pub prev_close_price: String,
    pub last_price: String,
    pub last_qty: String,
    pub bid_price: String,
    pub bid_qty: String,
    pub ask_price: String,
    pub ask_qty: String,
    pub open_price: String,
    pub high_price: String,
    pub low_price: String,

    /// Volume échangé (actif de base)
    pub volume: String,

    /// Volume échangé (actif de cotation)
    pub quote_volume: String,

    /// Début de la fenêtre 24h (epoch millis)
    pub open_time: i64,

    /// Fin de la fenêtre 24h (epoch millis)
    pub close_time: i64,

    /// Premier trade id de la fenêtre (-1 s'il n'y a eu aucun trade)
    pub first_id: i64,

    /// Dernier trade id de la fenêtre (-1 s'il n'y a eu aucun trade)
    pub last_id: i64,

    /// Nombre de trades
    pub count: u64,
}

impl Ticker {
    /// Crée un Ticker minimal : symbole + dernier prix, le reste à zéro
    ///
    /// Pratique pour les tests et pour les symboles sans activité.
    pub fn new(symbol: impl Into<String>, last_price: impl Into<String>) -> Self {
        let last_price = last_price.into();
        Self {
            symbol: symbol.into(),
            price_change: "0".to_string(),
            price_change_percent: "0".to_string(),
            weighted_avg_price: last_price.clone(),
            prev_close_price: last_price.clone(),
            last_price: last_price.clone(),
            last_qty: "0".to_string(),
            bid_price: last_price.clone(),
            bid_qty: "0".to_string(),
            ask_price: last_price.clone(),
            ask_qty: "0".to_string(),
            open_price: last_price.clone(),
            high_price: last_price.clone(),
            low_price: last_price,
            volume: "0".to_string(),
            quote_volume: "0".to_string(),
            open_time: 0,
            close_time: 0,
            first_id: -1,
            last_id: -1,
            count: 0,
        }
    }

    /// Dernier prix en f64 (None si la chaîne n'est pas un nombre)
    pub fn last_price_value(&self) -> Option<f64> {
        parse_decimal(&self.last_price)
    }

    /// Prix moyen pondéré en f64
    pub fn weighted_avg_price_value(&self) -> Option<f64> {
        parse_decimal(&self.weighted_avg_price)
    }

    /// Variation 24h en pourcentage
    pub fn change_percent(&self) -> Option<f64> {
        parse_decimal(&self.price_change_percent)
    }

    /// Retourne true si le symbole est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.change_percent().map(|c| c >= 0.0).unwrap_or(false)
    }
}

/// Parse un décimal renvoyé sous forme de texte par l'API
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formatte un prix avec une précision adaptée à sa magnitude
///
/// Les altcoins à 0.00001234 ont besoin de plus de décimales que BTC.
pub fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.8}", price)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
