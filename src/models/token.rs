// ============================================================================
// Structure : WatchlistEntry
// ============================================================================
// Un Ticker augmenté des deux champs appartenant à l'utilisateur :
// - amount       : quantité confirmée (persistée)
// - amount_input : saisie en cours, non confirmée (jamais persistée)
//
// CONCEPTS RUST :
// 1. #[serde(flatten)] : les champs du Ticker sont "aplatis" dans le même
//    objet JSON que amount (même forme que l'API)
// 2. #[serde(skip)] : amount_input n'est ni écrit ni lu
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Ticker;

/// Un symbole suivi (ou suivable) avec la quantité détenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    /// Statistiques 24h du symbole
    #[serde(flatten)]
    pub ticker: Ticker,

    /// Quantité confirmée par l'utilisateur
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    /// Saisie transitoire de la quantité
    ///
    /// Copiée dans amount uniquement via Add/Update.
    #[serde(skip)]
    pub amount_input: Option<f64>,
}

impl WatchlistEntry {
    /// Entrée brute : le Ticker sans aucun champ utilisateur
    pub fn from_ticker(ticker: Ticker) -> Self {
        Self {
            ticker,
            amount: None,
            amount_input: None,
        }
    }

    /// Entrée confirmée avec une quantité
    pub fn with_amount(ticker: Ticker, amount: f64) -> Self {
        Self {
            ticker,
            amount: Some(amount),
            amount_input: None,
        }
    }

    /// Symbole du ticker sous-jacent
    pub fn symbol(&self) -> &str {
        &self.ticker.symbol
    }

    /// Valeur de la position : amount × dernier prix
    pub fn value(&self) -> Option<f64> {
        Some(self.amount? * self.ticker.last_price_value()?)
    }

    /// Vrai si la saisie en cours diffère de la quantité confirmée
    pub fn has_pending_edit(&self) -> bool {
        self.amount_input != self.amount
    }
}

/// Vérifie qu'une quantité saisie est utilisable (nombre fini > 0)
pub fn is_valid_amount(amount: Option<f64>) -> bool {
    matches!(amount, Some(a) if a.is_finite() && a > 0.0)
}

/// Parse le texte saisi par l'utilisateur en quantité
///
/// Vide ou non numérique => None (sera refusé à la validation).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Formatte une quantité pour l'affichage et l'édition ("5", "0.25")
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{:.0}", amount)
    } else {
        amount.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_input_is_never_serialized() {
        let mut entry = WatchlistEntry::with_amount(Ticker::new("ABCUSDT", "2.5"), 5.0);
        entry.amount_input = Some(42.0);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"amount\":5.0"));
        assert!(json.contains("\"lastPrice\":\"2.5\""));
        assert!(!json.contains("amountInput"));
    }

    #[test]
    fn test_amount_input_ignored_on_read() {
        let mut value = serde_json::to_value(WatchlistEntry::with_amount(
            Ticker::new("ABCUSDT", "2.5"),
            5.0,
        ))
        .unwrap();
        value["amountInput"] = serde_json::json!(99);

        let entry: WatchlistEntry = serde_json::from_value(value).unwrap();
        assert_eq!(entry.amount, Some(5.0));
        assert_eq!(entry.amount_input, None);
    }

    #[test]
    fn test_value() {
        let entry = WatchlistEntry::with_amount(Ticker::new("ABCUSDT", "2.5"), 4.0);
        assert_eq!(entry.value(), Some(10.0));

        let raw = WatchlistEntry::from_ticker(Ticker::new("ABCUSDT", "2.5"));
        assert_eq!(raw.value(), None);
    }

    #[test]
    fn test_is_valid_amount() {
        assert!(is_valid_amount(Some(5.0)));
        assert!(is_valid_amount(Some(0.001)));
        assert!(!is_valid_amount(Some(0.0)));
        assert!(!is_valid_amount(Some(-1.0)));
        assert!(!is_valid_amount(Some(f64::NAN)));
        assert!(!is_valid_amount(None));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(5.0), "5");
        assert_eq!(format_amount(0.25), "0.25");
        assert_eq!(parse_amount(&format_amount(1.5)), Some(1.5));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("5"), Some(5.0));
        assert_eq!(parse_amount(" 1.5 "), Some(1.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
