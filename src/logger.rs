// ============================================================================
// Logger : enregistrements de diagnostic
// ============================================================================
// Façade sans état au-dessus de tracing. Chaque appel construit un
// enregistrement { timestamp, level, message, data? } puis l'émet au niveau
// correspondant ; les erreurs attachées sont normalisées en
// { name, message, stack }.
//
// CONCEPT : Write-only
// - Pas de buffer, pas de relecture, pas de valeur de retour
// - La destination (fichier, rotation) est configurée dans main.rs
// ============================================================================

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

/// Niveaux de sévérité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Erreur normalisée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    /// Catégorie de l'erreur (ex: "TimeoutError", "HttpError")
    pub name: String,
    /// Message de plus haut niveau
    pub message: String,
    /// Causes successives, de la plus proche à la plus profonde
    pub stack: Vec<String>,
}

impl ErrorInfo {
    /// Normalise une erreur anyhow et sa chaîne de causes
    ///
    /// CONCEPT RUST : Downcasting sur dyn Error
    /// - err.chain() parcourt l'erreur et toutes ses causes
    /// - is::<T>() teste le type concret de chaque maillon
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let name = err
            .chain()
            .find_map(|cause| {
                if cause.is::<tokio::time::error::Elapsed>() {
                    Some("TimeoutError")
                } else if cause.is::<reqwest::Error>() {
                    Some("HttpError")
                } else if cause.is::<serde_json::Error>() {
                    Some("ParseError")
                } else if cause.is::<std::io::Error>() {
                    Some("IoError")
                } else {
                    None
                }
            })
            .unwrap_or("Error");

        Self {
            name: name.to_string(),
            message: err.to_string(),
            stack: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}

/// Données optionnelles attachées à un enregistrement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogData {
    Error(ErrorInfo),
    Value(Value),
}

impl From<&anyhow::Error> for LogData {
    fn from(err: &anyhow::Error) -> Self {
        LogData::Error(ErrorInfo::from_anyhow(err))
    }
}

impl From<Value> for LogData {
    fn from(value: Value) -> Self {
        LogData::Value(value)
    }
}

/// Un enregistrement de log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Horodatage ISO-8601 (UTC, millisecondes)
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LogData>,
}

impl LogEntry {
    /// Ligne formatée : "[2026-10-16T08:00:00.000Z] ERROR: message {data}"
    pub fn format(&self) -> String {
        let line = format!("[{}] {}: {}", self.timestamp, self.level, self.message);
        match &self.data {
            Some(data) => {
                let data = serde_json::to_string(data).unwrap_or_default();
                format!("{} {}", line, data)
            }
            None => line,
        }
    }
}

/// Façade de logging (méthodes associées uniquement)
pub struct Logger;

impl Logger {
    /// Construit un enregistrement horodaté maintenant
    pub fn entry(level: LogLevel, message: &str, data: Option<LogData>) -> LogEntry {
        LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.to_string(),
            data,
        }
    }

    pub fn info(message: &str, data: Option<LogData>) {
        let entry = Self::entry(LogLevel::Info, message, data);
        info!("{}", entry.format());
    }

    pub fn warn(message: &str, data: Option<LogData>) {
        let entry = Self::entry(LogLevel::Warn, message, data);
        warn!("{}", entry.format());
    }

    pub fn error(message: &str, data: Option<LogData>) {
        let entry = Self::entry(LogLevel::Error, message, data);
        error!("{}", entry.format());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_entry_without_data() {
        let entry = Logger::entry(LogLevel::Info, "Démarrage", None);
        assert!(entry.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());

        let line = entry.format();
        assert!(line.ends_with("INFO: Démarrage"));
    }

    #[test]
    fn test_error_is_normalized() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "fichier absent");
        let err = anyhow::Error::new(io).context("Lecture des favoris");

        let info = ErrorInfo::from_anyhow(&err);
        assert_eq!(info.name, "IoError");
        assert_eq!(info.message, "Lecture des favoris");
        assert_eq!(info.stack, vec!["fichier absent".to_string()]);
    }

    #[test]
    fn test_plain_error_name() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("boom")).context("contexte");
        let info = ErrorInfo::from_anyhow(&err.unwrap_err());
        assert_eq!(info.name, "Error");
    }

    #[test]
    fn test_format_with_data() {
        let entry = Logger::entry(
            LogLevel::Warn,
            "Entrée ignorée",
            Some(serde_json::json!({ "symbol": "AAPL" }).into()),
        );
        assert!(entry.format().contains(r#"WARN: Entrée ignorée {"symbol":"AAPL"}"#));
    }
}
