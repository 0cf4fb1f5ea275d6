// ============================================================================
// Cadence de rafraîchissement et état des fetchs
// ============================================================================
// - Un fetch au démarrage, puis un toutes les `interval` (5 min par défaut)
// - Un rafraîchissement manuel ajoute un fetch sans décaler le timer
// - Plusieurs fetchs peuvent être en cours : le dernier arrivé gagne
//
// CONCEPT RUST : Instant
// - Horloge monotone (insensible aux changements d'heure système)
// - Les méthodes prennent `now` en paramètre : testables sans attendre
// ============================================================================

use std::time::{Duration, Instant};

/// Intervalle de rafraîchissement par défaut (5 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Planification des fetchs automatiques
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: Duration,

    /// Prochaine échéance (None : dû immédiatement, c'est le montage)
    next_due: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Retourne true si un fetch automatique est dû, et arme le suivant
    ///
    /// L'échéance suivante part de l'échéance précédente (cadence fixe),
    /// sauf si on a pris plus d'un intervalle de retard.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.interval);
                true
            }
            Some(due) if now >= due => {
                let next = due + self.interval;
                self.next_due = Some(if next <= now { now + self.interval } else { next });
                true
            }
            Some(_) => false,
        }
    }

    /// Temps restant avant le prochain fetch automatique
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.next_due {
            Some(due) => due.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

/// Signaux "loading" et "error" exposés à la présentation
///
/// Compte les fetchs en cours : deux fetchs peuvent se chevaucher
/// (automatique + manuel), le chargement dure jusqu'au dernier.
#[derive(Debug, Clone, Default)]
pub struct FetchStatus {
    in_flight: usize,
    error: bool,
    next_request_id: u64,
}

impl FetchStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre le départ d'un fetch et retourne son id
    pub fn begin(&mut self) -> u64 {
        self.in_flight += 1;
        self.next_request_id += 1;
        self.next_request_id
    }

    /// Fetch réussi : efface le drapeau d'erreur
    pub fn succeed(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.error = false;
    }

    /// Fetch échoué : lève le drapeau d'erreur (les données restent)
    pub fn fail(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.error = true;
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}

// ============================================================================
// Tests
// ============================================================================
