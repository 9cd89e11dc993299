// src/models/crop.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CropType {
    Soja,
    Milho,
    #[serde(rename = "Algodão")]
    Algodao,
    #[serde(rename = "Café")]
    Cafe,
    #[serde(rename = "Cana de Açúcar")]
    CanaDeAcucar,
    Arroz,
    #[serde(rename = "Feijão")]
    Feijao,
    Trigo,
    Sorgo,
    Girassol,
    Amendoim,
    Outros,
}

impl CropType {
    pub fn label(&self) -> &'static str {
        match self {
            CropType::Soja => "Soja",
            CropType::Milho => "Milho",
            CropType::Algodao => "Algodão",
            CropType::Cafe => "Café",
            CropType::CanaDeAcucar => "Cana de Açúcar",
            CropType::Arroz => "Arroz",
            CropType::Feijao => "Feijão",
            CropType::Trigo => "Trigo",
            CropType::Sorgo => "Sorgo",
            CropType::Girassol => "Girassol",
            CropType::Amendoim => "Amendoim",
            CropType::Outros => "Outros",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: String,
    pub farm_id: String,

    #[serde(rename = "type")]
    pub crop_type: CropType,

    // Ex: "2024/2025" ou "2024"
    pub harvest_year: String,

    // Hectares, sempre > 0
    pub planted_area: Decimal,

    // Toneladas por hectare
    pub expected_yield: Option<Decimal>,

    pub planting_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

// Recalculado a cada leitura a partir das datas, nunca persistido
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    Planted,
    Growing,
    Ready,
    Harvested,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCropPayload {
    pub farm_id: String,

    #[serde(rename = "type")]
    pub crop_type: CropType,

    #[validate(length(min = 4, max = 9, message = "O ano da safra deve ter entre 4 e 9 caracteres."))]
    pub harvest_year: String,

    pub planted_area: Decimal,
    pub expected_yield: Option<Decimal>,
    pub planting_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,

    #[validate(length(max = 500, message = "As observações devem ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCropPayload {
    pub farm_id: Option<String>,

    #[serde(rename = "type")]
    pub crop_type: Option<CropType>,

    #[validate(length(min = 4, max = 9, message = "O ano da safra deve ter entre 4 e 9 caracteres."))]
    pub harvest_year: Option<String>,

    pub planted_area: Option<Decimal>,
    pub expected_yield: Option<Decimal>,
    pub planting_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,

    #[validate(length(max = 500, message = "As observações devem ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

// --- ESTATÍSTICAS ---

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropStats {
    pub total_crops: usize,
    pub active_crops: usize,
    pub total_planted_area: Decimal,
    pub average_planted_area: Decimal,
    pub average_expected_yield: Option<Decimal>,
    pub distinct_types: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropTypeDistribution {
    pub crop_type: CropType,
    pub count: usize,
    pub total_area: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HarvestYearSummary {
    pub harvest_year: String,
    pub crop_count: usize,
    pub total_area: Decimal,
    pub by_type: BTreeMap<CropType, usize>,
    pub average_yield: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeProductivity {
    pub crop_type: CropType,
    pub crop_count: usize,
    pub total_area: Decimal,
    // Σ área plantada × produtividade esperada
    pub total_production: Decimal,
    pub min_yield: Option<Decimal>,
    pub max_yield: Option<Decimal>,
    pub average_yield: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HarvestCalendarEntry {
    pub crop_id: String,
    pub farm_id: String,
    pub farm_name: Option<String>,
    pub crop_type: CropType,
    pub harvest_date: NaiveDate,
    pub planted_area: Decimal,
    pub status: CropStatus,
}
