// ============================================================================
// LazyFolio - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;          // Service de données boursières (Yahoo Finance)
pub mod app;          // État de l'application
pub mod config;       // Configuration (valeurs par défaut + variables d'env)
pub mod logger;       // Façade de logging structuré
pub mod modal;        // Orchestration de la fenêtre de détails
pub mod models;       // Structures de données
pub mod notification; // Notifications transitoires
pub mod portfolio;    // Agrégation des favoris
pub mod store;        // Stockage des favoris
pub mod ui;           // Interface utilisateur
