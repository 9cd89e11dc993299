// src/services/settings_service.rs

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::{AppError, AppResult},
    common::validation::{validate_document, validate_farm_areas},
    db::{CropRepository, FarmRepository, ProducerRepository, SettingsRepository},
    models::settings::{
        AppSettings, AppStats, BackupEnvelope, BackupKind, BackupSummary, DashboardData,
        SettingsPatch, StatsCounter, BACKUP_VERSION,
    },
    services::{record, FarmService},
};

#[derive(Clone)]
pub struct SettingsService {
    settings: SettingsRepository,
    producers: ProducerRepository,
    farms: FarmRepository,
    crops: CropRepository,
    farm_service: FarmService,
}

impl SettingsService {
    pub fn new(
        settings: SettingsRepository,
        producers: ProducerRepository,
        farms: FarmRepository,
        crops: CropRepository,
        farm_service: FarmService,
    ) -> Self {
        Self { settings, producers, farms, crops, farm_service }
    }

    pub fn repository(&self) -> &SettingsRepository {
        &self.settings
    }

    // =========================================================================
    //  PREFERÊNCIAS
    // =========================================================================

    pub fn update_settings(&self, patch: SettingsPatch) -> AppSettings {
        self.settings.mutate(|s| {
            s.settings.apply(patch);
            s.settings.clone()
        })
    }

    pub fn reset_settings(&self) -> AppSettings {
        tracing::info!("configurações restauradas para o padrão");
        self.settings.mutate(|s| {
            s.settings = AppSettings::default();
            s.settings.clone()
        })
    }

    /// Zera preferências e estatísticas.
    pub fn reset_all(&self) {
        self.settings.mutate(|s| {
            s.settings = AppSettings::default();
            s.stats = AppStats::default();
        });
        tracing::info!("configurações e estatísticas zeradas");
    }

    // =========================================================================
    //  ESTATÍSTICAS DE USO
    // =========================================================================

    pub fn update_stats(&self, f: impl FnOnce(&mut AppStats)) -> AppStats {
        self.settings.mutate(|s| {
            f(&mut s.stats);
            s.stats.clone()
        })
    }

    pub fn increment_counter(&self, counter: StatsCounter) {
        self.update_stats(|stats| {
            let slot = match counter {
                StatsCounter::ProducersCreated => &mut stats.producers_created,
                StatsCounter::FarmsCreated => &mut stats.farms_created,
                StatsCounter::CropsCreated => &mut stats.crops_created,
                StatsCounter::ReportsGenerated => &mut stats.reports_generated,
            };
            *slot += 1;
        });
    }

    pub fn start_session(&self) {
        let now = Utc::now();
        self.update_stats(|stats| {
            stats.total_sessions += 1;
            stats.current_session_start = Some(now);
        });
        tracing::debug!(started_at = %now, "sessão iniciada");
    }

    pub fn end_session(&self) {
        self.end_session_at(Utc::now());
    }

    /// Soma os minutos inteiros da sessão aberta. Sem sessão aberta, nada muda.
    pub fn end_session_at(&self, now: DateTime<Utc>) {
        let Some(start) = self.settings.get_stats().current_session_start else {
            return;
        };

        let minutes = (now - start).num_minutes().max(0) as u64;
        self.update_stats(|stats| {
            stats.total_time_spent += minutes;
            stats.current_session_start = None;
            stats.last_session_end = Some(now);
        });
        tracing::debug!(minutes, "sessão encerrada");
    }

    // =========================================================================
    //  BACKUP
    // =========================================================================

    pub async fn export_settings_backup(&self, path: impl AsRef<Path>) -> AppResult<BackupEnvelope> {
        let result = self.write_backup(path.as_ref(), BackupKind::SettingsOnly).await;
        record(&self.settings, "export_settings_backup", result)
    }

    /// Inclui produtores, fazendas e culturas (inclusive inativos).
    pub async fn export_complete_backup(&self, path: impl AsRef<Path>) -> AppResult<BackupEnvelope> {
        let result = self.write_backup(path.as_ref(), BackupKind::CompleteData).await;
        record(&self.settings, "export_complete_backup", result)
    }

    async fn write_backup(&self, path: &Path, kind: BackupKind) -> AppResult<BackupEnvelope> {
        let now = Utc::now();
        // `last_backup` só é gravado depois que o arquivo existe
        let mut stats = self.settings.get_stats();
        stats.last_backup = Some(now);

        let dashboard_data = match kind {
            BackupKind::CompleteData => Some(DashboardData {
                producers: self.producers.all(),
                farms: self.farms.all(),
                crops: self.crops.all(),
            }),
            BackupKind::SettingsOnly => None,
        };

        let summary = BackupSummary {
            producers: self.producers.get_active_producers().len(),
            farms: self.farms.get_active_farms().len(),
            crops: self.crops.get_active_crops().len(),
            total_sessions: stats.total_sessions,
        };

        let envelope = BackupEnvelope {
            timestamp: now,
            version: BACKUP_VERSION.to_string(),
            kind,
            settings: self.settings.get_settings(),
            stats,
            dashboard_data,
            summary,
        };

        let json = serde_json::to_string_pretty(&envelope)?;
        tokio::fs::write(path, json).await?;
        self.update_stats(|stats| stats.last_backup = Some(now));

        tracing::info!(path = %path.display(), kind = ?kind, "backup exportado");
        Ok(envelope)
    }

    /// Aceita qualquer backup com `settings` e `timestamp`. Backup completo
    /// substitui os repositórios de entidades e reconstrói os caches.
    pub async fn import_backup(&self, path: impl AsRef<Path>) -> AppResult<BackupKind> {
        let result = self.read_backup(path.as_ref()).await;
        record(&self.settings, "import_backup", result)
    }

    async fn read_backup(&self, path: &Path) -> AppResult<BackupKind> {
        let raw = tokio::fs::read_to_string(path).await?;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::InvalidBackup(format!("arquivo não é um JSON válido ({})", e)))?;

        for field in ["settings", "timestamp"] {
            if value.get(field).is_none() {
                return Err(AppError::InvalidBackup(format!("campo obrigatório ausente: {}", field)));
            }
        }

        let envelope: BackupEnvelope = serde_json::from_value(value)
            .map_err(|e| AppError::InvalidBackup(e.to_string()))?;

        if envelope.version != BACKUP_VERSION {
            tracing::warn!(found = %envelope.version, expected = BACKUP_VERSION, "versão de backup diferente");
        }

        if let Some(ref data) = envelope.dashboard_data {
            check_consistency(data)?;
        }
        if let Some(data) = envelope.dashboard_data {
            self.restore_entities(data);
        }

        self.settings.mutate(|s| {
            s.settings = envelope.settings;
            s.stats = envelope.stats;
        });

        tracing::info!(path = %path.display(), kind = ?envelope.kind, "backup importado");
        Ok(envelope.kind)
    }

    fn restore_entities(&self, data: DashboardData) {
        self.producers.set_loading(true);
        self.farms.set_loading(true);
        self.crops.set_loading(true);

        self.producers.replace_all(data.producers);
        self.farms.replace_all(data.farms);
        self.crops.replace_all(data.crops);
        self.farm_service.resync_all();

        self.producers.set_loading(false);
        self.farms.set_loading(false);
        self.crops.set_loading(false);
    }
}

/// Os registros ativos do backup precisam respeitar as mesmas regras do
/// cadastro: documento válido e único, referências resolvidas, áreas dentro
/// dos limites.
fn check_consistency(data: &DashboardData) -> AppResult<()> {
    let invalid = |msg: String| Err(AppError::InvalidBackup(msg));

    let mut documents = HashSet::new();
    let mut producer_ids = HashSet::new();
    for p in data.producers.iter().filter(|p| p.active) {
        if !validate_document(&p.document, p.document_type) {
            return invalid(format!("produtor {} com {} inválido", p.id, p.document_type.as_str()));
        }
        if !documents.insert(p.document.as_str()) {
            return invalid(format!("documento duplicado entre produtores ativos: {}", p.document));
        }
        producer_ids.insert(p.id.as_str());
    }

    let mut agricultural: HashMap<&str, Decimal> = HashMap::new();
    for f in data.farms.iter().filter(|f| f.active) {
        if !producer_ids.contains(f.producer_id.as_str()) {
            return invalid(format!("fazenda {} aponta para produtor inexistente {}", f.id, f.producer_id));
        }
        if !validate_farm_areas(f.total_area, f.agricultural_area, f.vegetation_area) {
            return invalid(format!("fazenda {} com áreas inválidas", f.id));
        }
        agricultural.insert(f.id.as_str(), f.agricultural_area);
    }

    let mut planted: HashMap<&str, Decimal> = HashMap::new();
    for c in data.crops.iter().filter(|c| c.active) {
        if !agricultural.contains_key(c.farm_id.as_str()) {
            return invalid(format!("cultura {} aponta para fazenda inexistente {}", c.id, c.farm_id));
        }
        if c.planted_area <= Decimal::ZERO {
            return invalid(format!("cultura {} com área plantada não positiva", c.id));
        }
        *planted.entry(c.farm_id.as_str()).or_insert(Decimal::ZERO) += c.planted_area;
    }

    for (farm_id, area) in planted {
        if agricultural.get(farm_id).is_some_and(|limit| area > *limit) {
            return invalid(format!("culturas da fazenda {} excedem a área agricultável", farm_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{KeyValueStore, MemoryStore};
    use crate::models::settings::Theme;
    use chrono::Duration;
    use std::sync::Arc;

    fn service() -> SettingsService {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let producers = ProducerRepository::new(store.clone());
        let farms = FarmRepository::new(store.clone());
        let crops = CropRepository::new(store.clone());
        let farm_service = FarmService::new(farms.clone(), producers.clone(), crops.clone());
        SettingsService::new(SettingsRepository::new(store), producers, farms, crops, farm_service)
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let service = service();
        let updated = service.update_settings(SettingsPatch {
            theme: Some(Theme::Dark),
            compact_mode: Some(true),
            ..Default::default()
        });

        assert_eq!(updated.theme, Theme::Dark);
        assert!(updated.compact_mode);
        assert_eq!(updated.date_format, "dd/MM/yyyy");

        assert_eq!(service.reset_settings(), AppSettings::default());
    }

    #[test]
    fn session_adds_whole_minutes() {
        let service = service();
        service.start_session();
        let start = service.repository().get_stats().current_session_start.unwrap();

        service.end_session_at(start + Duration::seconds(90 * 60 + 59));
        let stats = service.repository().get_stats();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_time_spent, 90);
        assert!(stats.current_session_start.is_none());
        assert!(stats.last_session_end.is_some());

        // Sem sessão aberta
        service.end_session_at(start + Duration::hours(10));
        assert_eq!(service.repository().get_stats().total_time_spent, 90);
    }

    #[test]
    fn counters_and_reset_all() {
        let service = service();
        service.increment_counter(StatsCounter::FarmsCreated);
        service.increment_counter(StatsCounter::FarmsCreated);
        service.increment_counter(StatsCounter::ReportsGenerated);

        let stats = service.repository().get_stats();
        assert_eq!(stats.farms_created, 2);
        assert_eq!(stats.reports_generated, 1);

        service.reset_all();
        assert_eq!(service.repository().get_stats(), AppStats::default());
    }

    #[tokio::test]
    async fn import_rejects_file_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        tokio::fs::write(&path, r#"{"settings": {}, "version": "1.0.0"}"#).await.unwrap();

        let service = service();
        let err = service.import_backup(&path).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidBackup(_)));
        assert_eq!(
            service.repository().last_error().as_deref(),
            Some("campo obrigatório ausente: timestamp")
        );
    }

    #[tokio::test]
    async fn failed_export_does_not_record_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nao-existe").join("backup.json");

        let service = service();
        assert!(service.export_complete_backup(&path).await.is_err());
        assert!(service.repository().get_stats().last_backup.is_none());
        assert!(service.repository().last_error().is_some());
    }

    #[tokio::test]
    async fn settings_backup_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let source = service();
        source.update_settings(SettingsPatch { theme: Some(Theme::Light), ..Default::default() });
        let envelope = source.export_settings_backup(&path).await.unwrap();
        assert_eq!(envelope.kind, BackupKind::SettingsOnly);
        assert!(envelope.dashboard_data.is_none());

        let target = service();
        let kind = target.import_backup(&path).await.unwrap();
        assert_eq!(kind, BackupKind::SettingsOnly);
        assert_eq!(target.repository().get_settings().theme, Theme::Light);
        assert!(target.repository().get_stats().last_backup.is_some());
    }
}
