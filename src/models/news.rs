// ============================================================================
// Structure : NewsArticle
// ============================================================================
// Une actualité liée à un titre, affichée dans la modale de détails
// ============================================================================

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Noms des mois en français (affichage "16 octobre 2026")
const FRENCH_MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin",
    "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

/// Un article d'actualité
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,

    /// Éditeur de l'article (ex: "Reuters")
    pub source: String,

    pub url: String,

    /// Date de publication (RFC 3339 dans le JSON)
    pub published_at: DateTime<Utc>,
}

impl NewsArticle {
    pub fn new(title: String, source: String, url: String, published_at: DateTime<Utc>) -> Self {
        Self {
            title,
            source,
            url,
            published_at,
        }
    }

    /// Date de publication au format long français
    pub fn published_label(&self) -> String {
        let date = self.published_at.date_naive();
        let month = FRENCH_MONTHS[date.month0() as usize];
        format!("{} {} {}", date.day(), month, date.year())
    }

    /// Ligne de sous-titre : "Reuters • 16 octobre 2026"
    pub fn byline(&self) -> String {
        format!("{} • {}", self.source, self.published_label())
    }
}
