use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::{
    db::state::ErrorSink,
    db::storage::{self, KeyValueStore, SETTINGS_KEY},
    models::settings::{AppSettings, AppStats, SETTINGS_VERSION},
};

// Registro único persistido inteiro sob `app-settings`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettingsState {
    pub settings: AppSettings,
    pub stats: AppStats,
}

#[derive(Default)]
struct Inner {
    data: SettingsState,
    error: Option<String>,
}

#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn KeyValueStore>,
    inner: Arc<RwLock<Inner>>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        // Sem registro salvo (ou ilegível) -> padrões
        let data = match storage::load_snapshot::<SettingsState>(store.as_ref(), SETTINGS_KEY) {
            Ok(Some(snapshot)) => {
                if snapshot.version != SETTINGS_VERSION {
                    tracing::warn!(found = snapshot.version, expected = SETTINGS_VERSION, "versão de configurações diferente");
                }
                snapshot.state
            }
            Ok(None) => SettingsState::default(),
            Err(e) => {
                tracing::error!(error = %e, "configurações ilegíveis, usando padrões");
                SettingsState::default()
            }
        };

        Self {
            store,
            inner: Arc::new(RwLock::new(Inner { data, error: None })),
        }
    }

    pub fn get_settings(&self) -> AppSettings {
        self.read(|s| s.settings.clone())
    }

    pub fn get_stats(&self) -> AppStats {
        self.read(|s| s.stats.clone())
    }

    pub fn snapshot(&self) -> SettingsState {
        self.read(|s| s.clone())
    }

    /// Altera e persiste o registro inteiro.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut SettingsState) -> R) -> R {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut inner.data);
        if let Err(e) = storage::save_snapshot(self.store.as_ref(), SETTINGS_KEY, &inner.data, SETTINGS_VERSION) {
            tracing::error!(error = %e, "falha ao persistir configurações");
        }
        out
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).error.clone()
    }

    fn read<R>(&self, f: impl FnOnce(&SettingsState) -> R) -> R {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner.data)
    }
}

impl ErrorSink for SettingsRepository {
    fn set_error(&self, error: Option<String>) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).error = error;
    }
}
