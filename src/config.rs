// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut raisonnables, surchargeables par variables
// d'environnement :
//
// - LAZYFOLIO_FAVORITES     : chemin du fichier JSON des favoris
// - LAZYFOLIO_TIMEOUT_SECS  : délai max d'un chargement (détails + news)
// - LAZYFOLIO_NOTIFY_SECS   : durée d'affichage des notifications
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Délai par défaut pour un chargement complet
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Durée d'affichage par défaut d'une notification
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Fichier JSON des favoris
    pub favorites_path: PathBuf,

    /// Délai max des appels au service de données
    pub request_timeout: Duration,

    /// Durée de vie des notifications
    pub notification_ttl: Duration,
}

impl Config {
    /// Charge la configuration depuis l'environnement du processus
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration via une fonction de lookup
    ///
    /// CONCEPT RUST : Injection d'une closure
    /// - En prod : std::env::var
    /// - En test : une HashMap, sans toucher à l'environnement global
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let favorites_path = lookup("LAZYFOLIO_FAVORITES")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.favorites_path);

        Self {
            favorites_path,
            request_timeout: parse_secs(
                "LAZYFOLIO_TIMEOUT_SECS",
                lookup("LAZYFOLIO_TIMEOUT_SECS"),
                defaults.request_timeout,
            ),
            notification_ttl: parse_secs(
                "LAZYFOLIO_NOTIFY_SECS",
                lookup("LAZYFOLIO_NOTIFY_SECS"),
                defaults.notification_ttl,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            favorites_path: default_favorites_path(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

/// Emplacement par défaut du fichier des favoris
///
/// - Linux : ~/.local/share/lazyfolio/favorites.json
/// - macOS : ~/Library/Application Support/lazyfolio/favorites.json
/// - Windows : %APPDATA%\lazyfolio\favorites.json
/// - Repli : ./favorites.json
pub fn default_favorites_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("lazyfolio").join("favorites.json"))
        .unwrap_or_else(|| PathBuf::from("favorites.json"))
}

/// Parse une durée en secondes ; valeur invalide ou nulle → défaut
fn parse_secs(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!(key, value = %raw, "Invalid duration in environment, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.request_timeout, Duration::from_secs(8));
        assert_eq!(config.notification_ttl, Duration::from_secs(3));
        assert!(config.favorites_path.ends_with("favorites.json"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LAZYFOLIO_FAVORITES", "/tmp/favs.json"),
            ("LAZYFOLIO_TIMEOUT_SECS", "5"),
            ("LAZYFOLIO_NOTIFY_SECS", "0"),
        ]);

        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.favorites_path, PathBuf::from("/tmp/favs.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        // 0 est refusé : on garde le défaut
        assert_eq!(config.notification_ttl, DEFAULT_NOTIFICATION_TTL);
    }
}
