// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

use super::crop::CropTypeDistribution;
use super::farm::{FarmPerformance, LandUse, StateDistribution};

// Os cards do topo + gráficos
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_producers: usize,
    pub total_farms: usize,
    pub total_crops: usize,
    pub total_area: Decimal,       // Hectares somados das fazendas ativas
    pub total_planted_area: Decimal,
    pub land_use: LandUse,
    pub by_state: Vec<StateDistribution>,
    pub by_crop_type: Vec<CropTypeDistribution>,
    pub top_farms: Vec<FarmPerformance>,
}
