// src/models/farm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::crop::Crop;
use super::producer::Producer;

// --- ENUMS ---

// Unidades federativas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BrazilianState {
    AC, AL, AP, AM, BA, CE, DF, ES, GO, MA, MT, MS, MG, PA,
    PB, PR, PE, PI, RJ, RN, RS, RO, RR, SC, SP, SE, TO,
}

impl BrazilianState {
    pub const ALL: [BrazilianState; 27] = [
        Self::AC, Self::AL, Self::AP, Self::AM, Self::BA, Self::CE, Self::DF, Self::ES, Self::GO,
        Self::MA, Self::MT, Self::MS, Self::MG, Self::PA, Self::PB, Self::PR, Self::PE, Self::PI,
        Self::RJ, Self::RN, Self::RS, Self::RO, Self::RR, Self::SC, Self::SP, Self::SE, Self::TO,
    ];

    pub fn code(&self) -> String {
        format!("{:?}", self)
    }
}

// --- FAZENDA ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub producer_id: String,

    pub name: String,
    pub city: String,
    pub state: BrazilianState,

    // Hectares
    pub total_area: Decimal,
    pub agricultural_area: Decimal,
    pub vegetation_area: Decimal,

    // Notas de 0 a 100
    pub productivity: i32,
    pub sustainability: i32,
    pub technology: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,

    // Cópia das culturas ativas. Fonte da verdade é o CropRepository.
    #[serde(default)]
    pub crops: Vec<Crop>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmPayload {
    pub producer_id: String,

    #[validate(length(min = 2, max = 120, message = "O nome da fazenda deve ter entre 2 e 120 caracteres."))]
    pub name: String,

    #[validate(length(min = 2, max = 120, message = "A cidade deve ter entre 2 e 120 caracteres."))]
    pub city: String,

    pub state: BrazilianState,

    pub total_area: Decimal,
    pub agricultural_area: Decimal,
    pub vegetation_area: Decimal,

    #[validate(range(min = 0, max = 100, message = "A produtividade deve estar entre 0 e 100."))]
    pub productivity: i32,

    #[validate(range(min = 0, max = 100, message = "A sustentabilidade deve estar entre 0 e 100."))]
    pub sustainability: i32,

    #[validate(range(min = 0, max = 100, message = "A tecnologia deve estar entre 0 e 100."))]
    pub technology: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmPayload {
    pub producer_id: Option<String>,

    #[validate(length(min = 2, max = 120, message = "O nome da fazenda deve ter entre 2 e 120 caracteres."))]
    pub name: Option<String>,

    #[validate(length(min = 2, max = 120, message = "A cidade deve ter entre 2 e 120 caracteres."))]
    pub city: Option<String>,

    pub state: Option<BrazilianState>,

    pub total_area: Option<Decimal>,
    pub agricultural_area: Option<Decimal>,
    pub vegetation_area: Option<Decimal>,

    #[validate(range(min = 0, max = 100, message = "A produtividade deve estar entre 0 e 100."))]
    pub productivity: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "A sustentabilidade deve estar entre 0 e 100."))]
    pub sustainability: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "A tecnologia deve estar entre 0 e 100."))]
    pub technology: Option<i32>,
}

impl UpdateFarmPayload {
    pub fn touches_areas(&self) -> bool {
        self.total_area.is_some() || self.agricultural_area.is_some() || self.vegetation_area.is_some()
    }
}

// --- ESTATÍSTICAS ---

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmStats {
    pub total_farms: usize,
    pub active_farms: usize,
    pub total_area: Decimal,
    pub total_agricultural_area: Decimal,
    pub total_vegetation_area: Decimal,
    pub average_area: Decimal,
    pub average_productivity: Decimal,
    pub average_sustainability: Decimal,
    pub average_technology: Decimal,
}

// Pequena < 50 ha, média 50..=500 ha, grande > 500 ha
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmsBySize {
    pub small: Vec<Farm>,
    pub medium: Vec<Farm>,
    pub large: Vec<Farm>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmWithDetails {
    pub farm: Farm,
    pub producer: Option<Producer>,
    pub crops: Vec<Crop>,
    pub planted_area: Decimal,
    pub available_area: Decimal,
    pub utilization_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateDistribution {
    pub state: BrazilianState,
    pub farm_count: usize,
    pub total_area: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmPerformance {
    pub farm_id: String,
    pub name: String,
    pub productivity: i32,
    pub sustainability: i32,
    pub technology: i32,
    pub overall_score: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FarmMetric {
    Productivity,
    Sustainability,
    Technology,
    TotalArea,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LandUse {
    pub total_area: Decimal,
    pub agricultural_area: Decimal,
    pub vegetation_area: Decimal,
    pub unused_area: Decimal,
    pub agricultural_percent: Decimal,
    pub vegetation_percent: Decimal,
    pub unused_percent: Decimal,
}
