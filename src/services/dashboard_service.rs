// src/services/dashboard_service.rs

use crate::{
    db::{CropRepository, ProducerRepository},
    models::dashboard::DashboardSummary,
    models::farm::FarmMetric,
    services::FarmService,
};

const TOP_FARMS: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    producers: ProducerRepository,
    crops: CropRepository,
    farm_service: FarmService,
}

impl DashboardService {
    pub fn new(producers: ProducerRepository, crops: CropRepository, farm_service: FarmService) -> Self {
        Self { producers, crops, farm_service }
    }

    /// Totais, distribuições e ranking das fazendas, só com registros ativos.
    pub fn summary(&self) -> DashboardSummary {
        let farm_stats = self.farm_service.repository().get_farm_stats();
        let crop_stats = self.crops.get_crop_stats();

        DashboardSummary {
            total_producers: self.producers.get_active_producers().len(),
            total_farms: farm_stats.active_farms,
            total_crops: crop_stats.active_crops,
            total_area: farm_stats.total_area,
            total_planted_area: crop_stats.total_planted_area,
            land_use: self.farm_service.get_land_use(),
            by_state: self.farm_service.get_farms_by_state_distribution(),
            by_crop_type: self.crops.get_crops_by_type_distribution(),
            top_farms: self.farm_service.get_top_farms(FarmMetric::Productivity, TOP_FARMS),
        }
    }
}
