// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::{
    db::{
        CropRepository, FarmRepository, JsonFileStore, KeyValueStore, MemoryStore,
        storage::SETTINGS_KEY, ProducerRepository, SettingsRepository,
    },
    models::settings::{Language, SettingsPatch},
    models::toast::ToastConfig,
    services::{
        seed_service::{self, SeedReport},
        CropService, DashboardService, FarmService, ProducerService, SettingsService, ToastStore,
    },
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub toast: ToastConfig,
    pub seed_demo: bool,
    /// Idioma inicial das preferências, aplicado só na primeira execução.
    pub language: Option<Language>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./.gestao-rural"),
            toast: ToastConfig::default(),
            seed_demo: true,
            language: None,
        }
    }
}

impl AppConfig {
    /// Lê o `.env` (se existir) e as variáveis `GESTAO_*`. Ausentes ficam no padrão.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let data_dir = env::var("GESTAO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let max_toasts = parse_var("GESTAO_MAX_TOASTS", defaults.toast.max_toasts)?;
        let default_duration_ms =
            parse_var("GESTAO_TOAST_DURATION_MS", defaults.toast.default_duration_ms)?;
        let seed_demo = parse_var("GESTAO_SEED_DEMO", defaults.seed_demo)?;
        let language = env::var("GESTAO_LANGUAGE")
            .or_else(|_| env::var("LANG"))
            .ok()
            .and_then(|raw| language_from_locale(&raw));

        Ok(Self {
            data_dir,
            toast: ToastConfig { max_toasts, default_duration_ms },
            seed_demo,
            language,
        })
    }
}

/// Aceita tanto "en-US,pt;q=0.5" quanto locale POSIX ("pt_BR.UTF-8").
/// "C", "POSIX" e vazio não escolhem nada.
fn language_from_locale(raw: &str) -> Option<Language> {
    let tag = if raw.contains([',', ';']) {
        raw.trim().to_string()
    } else {
        raw.split(['.', '@']).next().unwrap_or_default().trim().replace('_', "-")
    };
    if tag.is_empty() || tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(Language::negotiate(&tag))
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado da aplicação: armazenamento, repositórios e serviços
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn KeyValueStore>,

    pub producer_service: ProducerService,
    pub farm_service: FarmService,
    pub crop_service: CropService,
    pub settings_service: SettingsService,
    pub dashboard_service: DashboardService,
    pub toasts: ToastStore,
}

impl AppState {
    /// Monta o estado sobre arquivos JSON em `config.data_dir`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = JsonFileStore::new(config.data_dir.clone()).with_context(|| {
            format!("Falha ao abrir o diretório de dados {}", config.data_dir.display())
        })?;

        tracing::info!("✅ Armazenamento aberto em {}", store.base_dir().display());
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Mesmo grafo, sem tocar no disco.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        // --- Monta o gráfico de dependências ---
        let producer_repo = ProducerRepository::new(store.clone());
        let farm_repo = FarmRepository::new(store.clone());
        let crop_repo = CropRepository::new(store.clone());
        let fresh_settings = matches!(store.contains(SETTINGS_KEY), Ok(false));
        let settings_repo = SettingsRepository::new(store.clone());

        let producer_service =
            ProducerService::new(producer_repo.clone(), farm_repo.clone(), crop_repo.clone());
        let farm_service =
            FarmService::new(farm_repo.clone(), producer_repo.clone(), crop_repo.clone());
        let crop_service = CropService::new(crop_repo.clone(), farm_repo.clone(), farm_service.clone());
        let settings_service = SettingsService::new(
            settings_repo,
            producer_repo.clone(),
            farm_repo,
            crop_repo.clone(),
            farm_service.clone(),
        );
        let dashboard_service = DashboardService::new(producer_repo, crop_repo, farm_service.clone());
        let toasts = ToastStore::new(config.toast);

        if let (true, Some(language)) = (fresh_settings, config.language) {
            settings_service.update_settings(SettingsPatch { language: Some(language), ..Default::default() });
        }

        Self {
            config,
            store,
            producer_service,
            farm_service,
            crop_service,
            settings_service,
            dashboard_service,
            toasts,
        }
    }

    /// Popula com dados de demonstração quando é a primeira execução e o
    /// seed está habilitado.
    pub fn seed_if_first_run(&self) -> anyhow::Result<Option<SeedReport>> {
        if !self.config.seed_demo || !seed_service::is_first_run(self.store.as_ref())? {
            return Ok(None);
        }

        let report = seed_service::seed_demo_data(
            &self.producer_service,
            &self.farm_service,
            &self.crop_service,
        )
        .context("Falha ao criar os dados de demonstração")?;
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_state_seeds_only_once() {
        let state = AppState::in_memory(AppConfig::default());
        let report = state.seed_if_first_run().unwrap().unwrap();
        assert_eq!(report.producers, 4);
        assert!(state.seed_if_first_run().unwrap().is_none());
    }

    #[test]
    fn seed_can_be_disabled() {
        let config = AppConfig { seed_demo: false, ..AppConfig::default() };
        let state = AppState::in_memory(config);
        assert!(state.seed_if_first_run().unwrap().is_none());
        assert!(state.producer_service.repository().get_active_producers().is_empty());
    }

    #[test]
    fn locale_maps_to_supported_language() {
        assert_eq!(language_from_locale("en_US.UTF-8"), Some(Language::EnUs));
        assert_eq!(language_from_locale("es_ES@euro"), Some(Language::EsEs));
        assert_eq!(language_from_locale("pt-BR,en;q=0.5"), Some(Language::PtBr));
        assert_eq!(language_from_locale("fr;q=0.9,es;q=0.8"), Some(Language::EsEs));
        assert_eq!(language_from_locale("de_DE.UTF-8"), Some(Language::PtBr));
        assert_eq!(language_from_locale("C.UTF-8"), None);
        assert_eq!(language_from_locale(""), None);
    }

    #[test]
    fn configured_language_only_applies_to_fresh_settings() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let config = AppConfig { language: Some(Language::EnUs), seed_demo: false, ..AppConfig::default() };

        let state = AppState::with_store(config.clone(), store.clone());
        assert_eq!(state.settings_service.repository().get_settings().language, Language::EnUs);

        state
            .settings_service
            .update_settings(SettingsPatch { language: Some(Language::EsEs), ..Default::default() });

        // Preferência já gravada prevalece sobre a configuração
        let reopened = AppState::with_store(config, store);
        assert_eq!(reopened.settings_service.repository().get_settings().language, Language::EsEs);
    }
}
