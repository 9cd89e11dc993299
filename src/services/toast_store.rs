// src/services/toast_store.rs
//
// Notificações transitórias da interface. Não persistem.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;

use crate::{
    common::validation::{generate_id, EntityKind},
    models::toast::{PromiseMessages, Toast, ToastConfig, ToastKind},
};

#[derive(Clone, Default)]
pub struct ToastStore {
    config: ToastConfig,
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastStore {
    pub fn new(config: ToastConfig) -> Self {
        Self {
            config,
            toasts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> ToastConfig {
        self.config
    }

    /// Mais recente primeiro; acima do limite o mais antigo sai.
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    /// Adiciona no topo e devolve o id. `duration_ms` ausente usa o padrão da
    /// configuração (exceto `Loading`, que fica até ser removido); zero desliga
    /// a remoção automática.
    pub fn add_toast(
        &self,
        kind: ToastKind,
        title: impl Into<String>,
        message: Option<String>,
        duration_ms: Option<u64>,
    ) -> String {
        let duration_ms = match (kind, duration_ms) {
            (_, Some(0)) => None,
            (_, Some(ms)) => Some(ms),
            (ToastKind::Loading, None) => None,
            (_, None) => Some(self.config.default_duration_ms).filter(|ms| *ms > 0),
        };

        let toast = Toast {
            id: generate_id(EntityKind::Toast),
            kind,
            title: title.into(),
            message,
            duration_ms,
            created_at: Utc::now(),
        };
        let id = toast.id.clone();

        {
            let mut toasts = self.lock();
            toasts.insert(0, toast);
            toasts.truncate(self.config.max_toasts);
        }

        if let Some(ms) = duration_ms {
            self.schedule_removal(id.clone(), ms);
        }
        id
    }

    pub fn remove_toast(&self, id: &str) {
        self.lock().retain(|t| t.id != id);
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    pub fn success(&self, title: impl Into<String>, message: Option<String>) -> String {
        self.add_toast(ToastKind::Success, title, message, None)
    }

    pub fn error(&self, title: impl Into<String>, message: Option<String>) -> String {
        self.add_toast(ToastKind::Error, title, message, None)
    }

    pub fn warning(&self, title: impl Into<String>, message: Option<String>) -> String {
        self.add_toast(ToastKind::Warning, title, message, None)
    }

    pub fn info(&self, title: impl Into<String>, message: Option<String>) -> String {
        self.add_toast(ToastKind::Info, title, message, None)
    }

    /// Mostra um toast de carregamento enquanto `fut` roda e troca por sucesso
    /// ou erro no fim. O erro volta para quem chamou.
    pub async fn promise<T, E, F>(&self, fut: F, messages: PromiseMessages) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let loading_id = self.add_toast(ToastKind::Loading, messages.loading, None, None);
        let result = fut.await;
        self.remove_toast(&loading_id);

        match &result {
            Ok(_) => {
                self.success(messages.success, None);
            }
            Err(e) => {
                self.error(messages.error, Some(e.to_string()));
            }
        }
        result
    }

    // Sem runtime tokio o toast fica até ser removido
    fn schedule_removal(&self, id: String, ms: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(toast_id = %id, "sem runtime, toast não expira sozinho");
            return;
        };

        let toasts = Arc::clone(&self.toasts);
        handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            toasts.lock().unwrap_or_else(PoisonError::into_inner).retain(|t| t.id != id);
        });
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(store: &ToastStore) -> Vec<String> {
        store.toasts().into_iter().map(|t| t.title).collect()
    }

    #[test]
    fn keeps_newest_up_to_cap() {
        let store = ToastStore::new(ToastConfig { max_toasts: 2, default_duration_ms: 5000 });
        store.info("Um", None);
        store.info("Dois", None);
        store.info("Três", None);

        assert_eq!(titles(&store), vec!["Três", "Dois"]);
    }

    #[test]
    fn remove_and_clear() {
        let store = ToastStore::new(ToastConfig::default());
        let a = store.success("Salvo", None);
        store.warning("Atenção", Some("Área quase no limite".into()));

        store.remove_toast(&a);
        assert_eq!(titles(&store), vec!["Atenção"]);

        store.clear_all();
        assert!(store.toasts().is_empty());
    }

    #[test]
    fn loading_and_zero_duration_do_not_expire() {
        let store = ToastStore::new(ToastConfig::default());
        store.add_toast(ToastKind::Loading, "Carregando", None, None);
        store.add_toast(ToastKind::Info, "Fixo", None, Some(0));
        store.add_toast(ToastKind::Info, "Padrão", None, None);

        let toasts = store.toasts();
        assert_eq!(toasts[0].duration_ms, Some(5000));
        assert_eq!(toasts[1].duration_ms, None);
        assert_eq!(toasts[2].duration_ms, None);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_duration() {
        let store = ToastStore::new(ToastConfig::default());
        store.add_toast(ToastKind::Success, "Rápido", None, Some(1000));
        store.add_toast(ToastKind::Info, "Lento", None, Some(10_000));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(titles(&store), vec!["Lento"]);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert!(store.toasts().is_empty());
    }
}
