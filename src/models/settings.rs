// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::crop::Crop;
use super::farm::Farm;
use super::producer::Producer;

pub const SETTINGS_VERSION: u32 = 1;
pub const BACKUP_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "es-ES")]
    EsEs,
}

impl Language {
    /// Escolhe o idioma suportado a partir de uma lista de preferências
    /// no formato Accept-Language ("en-GB,en;q=0.9,pt;q=0.8").
    pub fn negotiate(preferences: &str) -> Self {
        accept_language::parse(preferences)
            .iter()
            .find_map(|tag| {
                // "pt-BR" -> "pt", "en" -> "en"
                match tag.split('-').next().unwrap_or(tag).to_lowercase().as_str() {
                    "pt" => Some(Language::PtBr),
                    "en" => Some(Language::EnUs),
                    "es" => Some(Language::EsEs),
                    _ => None,
                }
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Eur,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    #[default]
    Hectares,
    Acres,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub language: Language,
    pub currency: Currency,
    pub date_format: String,
    pub area_unit: AreaUnit,

    pub notifications_enabled: bool,
    pub auto_save: bool,
    pub compact_mode: bool,
    pub show_animations: bool,
    pub show_tips: bool,

    // Segundos
    pub dashboard_refresh_interval: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: Language::PtBr,
            currency: Currency::Brl,
            date_format: "dd/MM/yyyy".to_string(),
            area_unit: AreaUnit::Hectares,
            notifications_enabled: true,
            auto_save: true,
            compact_mode: false,
            show_animations: true,
            show_tips: true,
            dashboard_refresh_interval: 300,
        }
    }
}

// Atualização tipada: só os campos presentes são aplicados
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<Language>,
    pub currency: Option<Currency>,
    pub date_format: Option<String>,
    pub area_unit: Option<AreaUnit>,
    pub notifications_enabled: Option<bool>,
    pub auto_save: Option<bool>,
    pub compact_mode: Option<bool>,
    pub show_animations: Option<bool>,
    pub show_tips: Option<bool>,
    pub dashboard_refresh_interval: Option<u32>,
}

impl AppSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.theme { self.theme = v; }
        if let Some(v) = patch.language { self.language = v; }
        if let Some(v) = patch.currency { self.currency = v; }
        if let Some(v) = patch.date_format { self.date_format = v; }
        if let Some(v) = patch.area_unit { self.area_unit = v; }
        if let Some(v) = patch.notifications_enabled { self.notifications_enabled = v; }
        if let Some(v) = patch.auto_save { self.auto_save = v; }
        if let Some(v) = patch.compact_mode { self.compact_mode = v; }
        if let Some(v) = patch.show_animations { self.show_animations = v; }
        if let Some(v) = patch.show_tips { self.show_tips = v; }
        if let Some(v) = patch.dashboard_refresh_interval { self.dashboard_refresh_interval = v; }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStats {
    pub total_sessions: u64,
    // Minutos acumulados
    pub total_time_spent: u64,
    pub current_session_start: Option<DateTime<Utc>>,
    pub last_session_end: Option<DateTime<Utc>>,

    pub producers_created: u64,
    pub farms_created: u64,
    pub crops_created: u64,
    pub reports_generated: u64,

    pub last_backup: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsCounter {
    ProducersCreated,
    FarmsCreated,
    CropsCreated,
    ReportsGenerated,
}

// --- BACKUP ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackupKind {
    CompleteData,
    SettingsOnly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub producers: Vec<Producer>,
    pub farms: Vec<Farm>,
    pub crops: Vec<Crop>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupSummary {
    pub producers: usize,
    pub farms: usize,
    pub crops: usize,
    pub total_sessions: u64,
}

// Arquivo JSON de backup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type")]
    pub kind: BackupKind,
    pub settings: AppSettings,
    #[serde(default)]
    pub stats: AppStats,
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub dashboard_data: Option<DashboardData>,
    #[serde(default)]
    pub summary: BackupSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiate_picks_first_supported_language() {
        assert_eq!(Language::negotiate("en-GB,en;q=0.9"), Language::EnUs);
        assert_eq!(Language::negotiate("es-ES"), Language::EsEs);
        assert_eq!(Language::negotiate("fr-FR,pt;q=0.4"), Language::PtBr);
        assert_eq!(Language::negotiate("fr"), Language::PtBr);
    }
}
