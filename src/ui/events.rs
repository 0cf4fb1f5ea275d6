// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : identifier la touche avec matches!
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (résultats des fetchs, échéance du timer)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick toutes les 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    // Sur certains OS, on reçoit Press ET Release
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        Ok(Event::Tick)
                    }
                }

                // Resize, souris... : un redraw suffit
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Vérifie si l'événement correspond à l'un des codes donnés
fn is_key(event: &Event, codes: &[KeyCode]) -> bool {
    if let Event::Key(key) = event {
        codes.contains(&key.code)
    } else {
        false
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('q'), KeyCode::Char('Q')])
}

pub fn is_escape_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Esc])
}

pub fn is_enter_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Enter])
}

pub fn is_backspace_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Backspace])
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Up, KeyCode::Char('k'), KeyCode::Char('K')])
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Down, KeyCode::Char('j'), KeyCode::Char('J')])
}

/// Flèche droite ou 'l' : page suivante
pub fn is_next_page_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Right, KeyCode::Char('l'), KeyCode::PageDown])
}

/// Flèche gauche ou 'h' : page précédente
pub fn is_previous_page_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Left, KeyCode::Char('h'), KeyCode::PageUp])
}

/// '+' : taille de page suivante
pub fn is_grow_page_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('+'), KeyCode::Char('=')])
}

/// '-' : taille de page précédente
pub fn is_shrink_page_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('-')])
}

/// 'a' : ouvrir la recherche ("Add Stock")
pub fn is_add_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('a'), KeyCode::Char('A')])
}

/// 'r' : rafraîchir immédiatement
pub fn is_refresh_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('r'), KeyCode::Char('R')])
}

/// 'd' : retirer le symbole (sans confirmation)
pub fn is_delete_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('d'), KeyCode::Char('D')])
}

/// 'e' : éditer la quantité
pub fn is_edit_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('e'), KeyCode::Char('E')])
}

/// '/' : focus sur la boîte de recherche
pub fn is_search_focus_event(event: &Event) -> bool {
    is_key(event, &[KeyCode::Char('/')])
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_vim_navigation() {
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Down)));
        assert!(is_next_page_event(&key(KeyCode::Char('l'))));
        assert!(is_previous_page_event(&key(KeyCode::Left)));
    }

    #[test]
    fn test_get_char() {
        assert_eq!(get_char_from_event(&key(KeyCode::Char('5'))), Some('5'));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
        assert_eq!(get_char_from_event(&Event::Tick), None);
    }
}
