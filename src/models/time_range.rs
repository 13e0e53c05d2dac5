// ============================================================================
// Enum : TimeRange
// ============================================================================
// Plage de temps affichée dans la modale de détails d'un titre
//
// CONCEPT : Plage vs granularité
// - La plage (1 jour, 1 semaine...) est ce que choisit l'utilisateur
// - La granularité des chandelles en découle (5m pour 1 jour, 1wk pour 5 ans)
// - Objectif : une centaine de chandelles quelle que soit la plage
// ============================================================================

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Plages disponibles, dans l'ordre d'affichage des onglets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
}

impl TimeRange {
    /// Toutes les plages, dans l'ordre des onglets
    pub const ALL: [TimeRange; 5] = [
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::OneYear,
        TimeRange::FiveYears,
    ];

    /// Label court affiché sur l'onglet (J = jour, S = semaine, A = année)
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1J",
            TimeRange::OneWeek => "1S",
            TimeRange::OneMonth => "1M",
            TimeRange::OneYear => "1A",
            TimeRange::FiveYears => "5A",
        }
    }

    /// Valeur transmise au service de données
    pub fn value(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1d",
            TimeRange::OneWeek => "1w",
            TimeRange::OneMonth => "1m",
            TimeRange::OneYear => "1y",
            TimeRange::FiveYears => "5y",
        }
    }

    /// Paramètre `range` de l'API Yahoo Finance
    pub fn yahoo_range(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1d",
            TimeRange::OneWeek => "5d",
            TimeRange::OneMonth => "1mo",
            TimeRange::OneYear => "1y",
            TimeRange::FiveYears => "5y",
        }
    }

    /// Granularité des chandelles (paramètre `interval` de Yahoo)
    ///
    /// - 1d : 5m  → ~78 chandelles (séance actions)
    /// - 1w : 30m → ~65
    /// - 1m : 1h  → ~150
    /// - 1y : 1d  → ~250
    /// - 5y : 1wk → ~260
    pub fn yahoo_interval(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "5m",
            TimeRange::OneWeek => "30m",
            TimeRange::OneMonth => "1h",
            TimeRange::OneYear => "1d",
            TimeRange::FiveYears => "1wk",
        }
    }

    /// True si plusieurs chandelles par jour (l'axe X affiche des heures)
    pub fn is_intraday(&self) -> bool {
        matches!(self, TimeRange::OneDay | TimeRange::OneWeek)
    }

    /// Format chrono des labels de l'axe X
    pub fn axis_format(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "%H:%M",
            TimeRange::OneWeek | TimeRange::OneMonth => "%d/%m",
            TimeRange::OneYear => "%b %y",
            TimeRange::FiveYears => "%Y",
        }
    }

    /// Plage suivante (cycle), touche 'l'
    pub fn next(&self) -> TimeRange {
        let index = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Plage précédente (cycle), touche 'h'
    pub fn previous(&self) -> TimeRange {
        let index = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Plage associée à une touche numérique ('1' → 1J ... '5' → 5A)
    pub fn from_digit(c: char) -> Option<TimeRange> {
        let index = c.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl Default for TimeRange {
    /// Un mois par défaut
    fn default() -> Self {
        TimeRange::OneMonth
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(TimeRange::OneDay),
            "1w" => Ok(TimeRange::OneWeek),
            "1m" => Ok(TimeRange::OneMonth),
            "1y" => Ok(TimeRange::OneYear),
            "5y" => Ok(TimeRange::FiveYears),
            other => bail!("Plage de temps inconnue : {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_month() {
        assert_eq!(TimeRange::default(), TimeRange::OneMonth);
    }

    #[test]
    fn test_cycle() {
        assert_eq!(TimeRange::OneDay.next(), TimeRange::OneWeek);
        assert_eq!(TimeRange::FiveYears.next(), TimeRange::OneDay); // Boucle
        assert_eq!(TimeRange::OneDay.previous(), TimeRange::FiveYears);
    }

    #[test]
    fn test_from_digit() {
        assert_eq!(TimeRange::from_digit('1'), Some(TimeRange::OneDay));
        assert_eq!(TimeRange::from_digit('5'), Some(TimeRange::FiveYears));
        assert_eq!(TimeRange::from_digit('0'), None);
        assert_eq!(TimeRange::from_digit('6'), None);
        assert_eq!(TimeRange::from_digit('x'), None);
    }

    #[test]
    fn test_parse_and_display() {
        for range in TimeRange::ALL {
            let parsed: TimeRange = range.value().parse().unwrap();
            assert_eq!(parsed, range);
        }
        assert!("2y".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::OneYear.to_string(), "1y");
    }
}
