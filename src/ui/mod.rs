// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;     // Graphique en chandeliers (Unicode text)
pub mod dashboard; // Rendu de l'écran principal
pub mod events;    // Gestion des événements clavier
pub mod format;    // Montants, pourcentages, volumes
pub mod modal;     // Fenêtre de détails d'un titre
pub mod portfolio; // Cartes, tableau et résumé

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
