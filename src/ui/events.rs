// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier, les redimensionnements et les ticks
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : un helper `is_*_event` par touche
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::TimeRange;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Terminal redimensionné (colonnes, lignes)
    ///
    /// Le rendu est recalculé à chaque frame depuis la taille courante :
    /// il suffit de redessiner.
    Resize(u16, u16),

    /// Tick régulier (expiration des notifications, résultats du worker)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus `tick_rate`)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    /// - Sur certains OS on reçoit Press ET Release : on ne garde que Press
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            CrosstermEvent::Resize(width, height) => Ok(Event::Resize(width, height)),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

// ============================================================================
// Helpers : identifier la touche
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        _ => None,
    }
}

/// 'q' : quitter
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    )
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    )
}

/// 'l' ou flèche droite : plage suivante
pub fn is_next_range_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('l') | KeyCode::Right))
}

/// 'h' ou flèche gauche : plage précédente
pub fn is_previous_range_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h') | KeyCode::Left))
}

/// '1'..'5' : plage directe
pub fn range_from_event(event: &Event) -> Option<TimeRange> {
    match key_code(event)? {
        KeyCode::Char(c) => TimeRange::from_digit(c),
        _ => None,
    }
}

/// 'a' : ajouter un favori
pub fn is_add_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('a') | KeyCode::Char('A')))
}

/// 'd' : supprimer (avec confirmation)
pub fn is_delete_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('d') | KeyCode::Char('D')))
}

/// 'v' : basculer cartes / tableau
pub fn is_toggle_view_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('v') | KeyCode::Char('V')))
}

/// 'r' : réessayer le chargement
pub fn is_retry_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Caractère accepté dans la saisie "TICKER [QUANTITÉ]"
pub fn is_input_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_alphanumeric() || matches!(c, '-' | '.' | ',' | ' ' | '^' | '=')
    )
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
