// src/db/state.rs
//
// Estado em memória compartilhado pelos repositórios de entidades.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::storage::{self, KeyValueStore};

pub const ENTITY_SNAPSHOT_VERSION: u32 = 1;

// Lista de entidades + flags da interface. `loading` e `error` nunca são persistidos.
#[derive(Debug)]
pub struct RepoState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for RepoState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), loading: false, error: None }
    }
}

/// Lista persistida sob uma chave fixa do `KeyValueStore`.
pub struct PersistedList<T> {
    key: &'static str,
    store: Arc<dyn KeyValueStore>,
    state: RwLock<RepoState<T>>,
}

impl<T> PersistedList<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Carrega o snapshot salvo. Snapshot ilegível vira lista vazia (e vai para o log).
    pub fn hydrate(key: &'static str, store: Arc<dyn KeyValueStore>) -> Self {
        let items = match storage::load_snapshot::<Vec<T>>(store.as_ref(), key) {
            Ok(Some(snapshot)) => {
                tracing::debug!(key, version = snapshot.version, count = snapshot.state.len(), "snapshot carregado");
                snapshot.state
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(key, error = %e, "snapshot ilegível, iniciando vazio");
                Vec::new()
            }
        };

        Self {
            key,
            store,
            state: RwLock::new(RepoState { items, ..RepoState::default() }),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, RepoState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RepoState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Aplica a mutação e persiste em seguida (síncrono, sem transação).
    /// Falha de gravação fica só no log: o estado em memória já mudou.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut state = self.write();
        let out = f(&mut state.items);
        if let Err(e) = storage::save_snapshot(self.store.as_ref(), self.key, &state.items, ENTITY_SNAPSHOT_VERSION) {
            tracing::error!(key = self.key, error = %e, "falha ao persistir snapshot");
        }
        out
    }

    pub fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    pub fn set_error(&self, error: Option<String>) {
        self.write().error = error;
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().error.clone()
    }
}

/// Destino da mensagem de erro de uma operação de serviço.
pub trait ErrorSink {
    fn set_error(&self, error: Option<String>);
}
