//! Favorite cities, persisted as a small JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("Favorites file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Favorites serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCity {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl FavoriteCity {
    /// Same place: name compared case-insensitively, country exactly.
    pub fn matches(&self, name: &str, country: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase() && self.country == country
    }
}

#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    favorites: Vec<FavoriteCity>,
}

impl FavoritesStore {
    /// Open the store at `path`. A missing or unreadable file yields an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let favorites = load(&path);
        Self { path, favorites }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[FavoriteCity] {
        &self.favorites
    }

    pub fn is_favorited(&self, name: &str, country: &str) -> bool {
        self.favorites.iter().any(|f| f.matches(name, country))
    }

    /// Add a city unless it is already a favorite. Returns the updated list.
    ///
    /// # Errors
    /// Fails when the list cannot be written back to disk.
    pub fn add(
        &mut self,
        name: &str,
        country: &str,
        state: Option<&str>,
    ) -> Result<&[FavoriteCity], FavoritesError> {
        if self.is_favorited(name, country) {
            tracing::debug!("{}, {} is already a favorite", name, country);
            return Ok(&self.favorites);
        }

        let added_at = Utc::now();
        self.favorites.push(FavoriteCity {
            id: format!("{}-{}-{}", name, country, added_at.timestamp_millis()),
            name: name.to_string(),
            country: country.to_string(),
            state: state.map(str::to_string),
            added_at,
        });
        self.save()?;
        tracing::info!("Added {}, {} to favorites", name, country);
        Ok(&self.favorites)
    }

    /// Remove a favorite by id. Returns whether anything was removed.
    ///
    /// # Errors
    /// Fails when the list cannot be written back to disk.
    pub fn remove(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != id);
        let removed = self.favorites.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Forget every favorite and delete the file.
    ///
    /// # Errors
    /// Fails when an existing file cannot be deleted.
    pub fn clear(&mut self) -> Result<(), FavoritesError> {
        self.favorites.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self) -> Result<(), FavoritesError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.favorites)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

fn load(path: &Path) -> Vec<FavoriteCity> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("Error loading favorites from {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(favorites) => favorites,
        Err(e) => {
            tracing::warn!("Ignoring malformed favorites file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FavoritesStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::open(dir.path().join("favorites.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let (_dir, mut store) = store();
        store.add("Harare", "ZW", Some("Harare Province")).unwrap();

        let reopened = FavoritesStore::open(store.path());
        assert_eq!(reopened.list().len(), 1);
        let fav = &reopened.list()[0];
        assert_eq!(fav.name, "Harare");
        assert_eq!(fav.state.as_deref(), Some("Harare Province"));
        assert!(fav.id.starts_with("Harare-ZW-"));
    }

    #[test]
    fn test_duplicates_ignored_case_insensitively() {
        let (_dir, mut store) = store();
        store.add("London", "GB", None).unwrap();
        let list = store.add("LONDON", "GB", None).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_same_name_other_country_is_distinct() {
        let (_dir, mut store) = store();
        store.add("London", "GB", None).unwrap();
        store.add("London", "CA", None).unwrap();
        assert_eq!(store.list().len(), 2);
        assert!(store.is_favorited("london", "CA"));
        assert!(!store.is_favorited("London", "gb"));
    }

    #[test]
    fn test_remove_by_id() {
        let (_dir, mut store) = store();
        store.add("Paris", "FR", None).unwrap();
        let id = store.list()[0].id.clone();

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert!(FavoritesStore::open(store.path()).list().is_empty());
    }

    #[test]
    fn test_remove_unknown_id_leaves_no_file() {
        let (_dir, mut store) = store();

        assert!(!store.remove("Nowhere-XX-0").unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_deletes_file() {
        let (_dir, mut store) = store();
        store.add("Oslo", "NO", None).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(store.list().is_empty());
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(FavoritesStore::open(&path).list().is_empty());
    }

    #[test]
    fn test_file_uses_camel_case_fields() {
        let (_dir, mut store) = store();
        store.add("Lima", "PE", None).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"addedAt\""));
        assert!(!raw.contains("\"state\""));
    }
}
