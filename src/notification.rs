// ============================================================================
// Notifications transitoires
// ============================================================================
// Messages courts affichés en bas de l'écran puis effacés automatiquement
// (équivalent d'un "toast").
//
// CONCEPT : Horloge injectée
// - Chaque méthode sensible au temps prend un `now: Instant`
// - Les tests avancent le temps sans dormir
// ============================================================================

use std::time::{Duration, Instant};

use crate::config::DEFAULT_NOTIFICATION_TTL;

/// Type de notification (détermine la couleur)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Une notification affichée
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// File des notifications visibles
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    active: Vec<Notification>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            active: Vec::new(),
        }
    }

    /// Affiche une notification de succès
    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NotificationKind::Success, message.into(), now);
    }

    /// Affiche une notification d'erreur
    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NotificationKind::Error, message.into(), now);
    }

    fn push(&mut self, kind: NotificationKind, message: String, now: Instant) {
        self.active.push(Notification {
            kind,
            message,
            expires_at: now + self.ttl,
        });
    }

    /// Retire les notifications expirées (appelé à chaque tick)
    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|n| !n.is_expired(now));
    }

    /// Notifications encore visibles, de la plus ancienne à la plus récente
    pub fn visible(&self) -> &[Notification] {
        &self.active
    }

    /// Dernière notification (celle qu'on affiche)
    pub fn latest(&self) -> Option<&Notification> {
        self.active.last()
    }

    /// Nombre de notifications d'un type donné encore visibles
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.active.iter().filter(|n| n.kind == kind).count()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}
