//! Persistência chave-valor usada pelos repositórios.
//!
//! Cada repositório grava um snapshot parcial sob uma chave fixa. `JsonFileStore`
//! mantém um `<chave>.json` por chave num diretório; `MemoryStore` guarda tudo num mapa.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::error::{AppError, AppResult};

pub const PRODUCERS_KEY: &str = "producers-storage";
pub const FARMS_KEY: &str = "farms-storage";
pub const CROPS_KEY: &str = "crops-storage";
pub const SETTINGS_KEY: &str = "app-settings";

/// Armazenamento chave-valor síncrono de strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;

    fn contains(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// O que vai de fato para a chave: o estado parcial e a versão (para migrações).
#[derive(Debug, Serialize, Deserialize)]
pub struct Persisted<T> {
    pub state: T,
    pub version: u32,
}

pub fn save_snapshot<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    state: &T,
    version: u32,
) -> AppResult<()> {
    let json = serde_json::to_string(&Persisted { state, version })?;
    store.set(key, &json)?;
    tracing::debug!(key, bytes = json.len(), "snapshot gravado");
    Ok(())
}

pub fn load_snapshot<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> AppResult<Option<Persisted<T>>> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Um arquivo JSON por chave.
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> AppResult<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.base_dir.join(format!("{}.json", key)))
    }

    // Só alfanuméricos, hífen e sublinhado
    fn validate_key(key: &str) -> AppResult<()> {
        if key.is_empty() {
            return Err(AppError::validation("A chave de armazenamento não pode ser vazia."));
        }
        if !key.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return Err(AppError::validation(format!(
                "Chave de armazenamento inválida '{}': use apenas letras, números, hífen e sublinhado.",
                key
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.key_path(key)?;
        // Grava num temporário e renomeia: nunca fica arquivo pela metade
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
