// ============================================================================
// Stockage des favoris
// ============================================================================
// Le portefeuille ne touche jamais directement au fichier : il reçoit un
// FavoritesRepository injecté. En prod c'est un fichier JSON, en test un
// Vec en mémoire.
//
// CONTRAT :
// - load() ne signale jamais d'échec : au pire une collection vide
// - remove() est idempotent : supprimer un ticker absent n'est pas une erreur
// - upsert() remplace l'entrée de même ticker (le ticker est la clé)
// ============================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::logger::{LogData, Logger};
use crate::models::FavoriteEntry;

/// Accès au stockage des favoris
pub trait FavoritesRepository {
    /// Instantané courant des favoris (vide si aucun)
    fn load(&self) -> Vec<FavoriteEntry>;

    /// Supprime le favori de ce ticker (no-op s'il n'existe pas)
    fn remove(&self, symbol: &str) -> Result<()>;

    /// Ajoute ou remplace un favori
    fn upsert(&self, entry: FavoriteEntry) -> Result<()>;
}

/// Compare deux tickers sans tenir compte de la casse
fn same_symbol(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Insère ou remplace en conservant l'ordre d'insertion
fn upsert_into(entries: &mut Vec<FavoriteEntry>, entry: FavoriteEntry) {
    match entries.iter_mut().find(|e| same_symbol(&e.symbol, &entry.symbol)) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

// ============================================================================
// JsonFavoritesStore : fichier JSON
// ============================================================================

/// Favoris persistés dans un fichier JSON (tableau d'entrées)
#[derive(Debug, Clone)]
pub struct JsonFavoritesStore {
    path: PathBuf,
}

impl JsonFavoritesStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lit et valide le fichier, entrée par entrée
    ///
    /// CONCEPT : Parsing en deux temps
    /// - D'abord un tableau de serde_json::Value (structure générale)
    /// - Puis chaque élément vers FavoriteEntry : une entrée invalide est
    ///   ignorée sans invalider les autres
    fn read_entries(&self) -> Result<Vec<FavoriteEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No favorites file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Lecture impossible de {}", self.path.display())
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("Fichier de favoris invalide : {}", self.path.display()))?;

        let mut entries = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<FavoriteEntry>(value) {
                Ok(entry) if !entry.symbol.trim().is_empty() => upsert_into(&mut entries, entry),
                Ok(_) => warn!(index, "Skipping favorite without symbol"),
                Err(e) => warn!(index, error = %e, "Skipping malformed favorite"),
            }
        }

        Ok(entries)
    }

    /// Écrit la collection complète (fichier temporaire puis rename)
    fn write_entries(&self, entries: &[FavoriteEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Création du répertoire {} impossible", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(entries).context("Sérialisation des favoris")?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Écriture impossible de {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Remplacement impossible de {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = entries.len(), "Favorites written");
        Ok(())
    }
}

impl FavoritesRepository for JsonFavoritesStore {
    fn load(&self) -> Vec<FavoriteEntry> {
        match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                Logger::warn("Favoris illisibles, collection vide utilisée", Some(LogData::from(&e)));
                Vec::new()
            }
        }
    }

    fn remove(&self, symbol: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|e| !same_symbol(&e.symbol, symbol));

        if entries.len() == before {
            debug!(symbol, "Favorite not found, nothing to remove");
            return Ok(());
        }

        self.write_entries(&entries)?;
        info!(symbol, "Favorite removed");
        Ok(())
    }

    fn upsert(&self, entry: FavoriteEntry) -> Result<()> {
        let mut entries = self.read_entries()?;
        let symbol = entry.symbol.clone();
        upsert_into(&mut entries, entry);

        self.write_entries(&entries)?;
        info!(symbol = %symbol, "Favorite saved");
        Ok(())
    }
}

// ============================================================================
// InMemoryFavoritesStore : en mémoire
// ============================================================================

/// Favoris en mémoire (tests, mode démo)
///
/// CONCEPT RUST : Interior mutability
/// - Le trait prend &self, le Mutex permet quand même de modifier le Vec
#[derive(Debug, Default)]
pub struct InMemoryFavoritesStore {
    entries: Mutex<Vec<FavoriteEntry>>,
}

impl InMemoryFavoritesStore {
    pub fn new(entries: Vec<FavoriteEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FavoriteEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl FavoritesRepository for InMemoryFavoritesStore {
    fn load(&self) -> Vec<FavoriteEntry> {
        self.lock().clone()
    }

    fn remove(&self, symbol: &str) -> Result<()> {
        self.lock().retain(|e| !same_symbol(&e.symbol, symbol));
        Ok(())
    }

    fn upsert(&self, entry: FavoriteEntry) -> Result<()> {
        upsert_into(&mut self.lock(), entry);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
