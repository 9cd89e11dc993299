// src/services/farm_service.rs

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::{AppError, AppResult},
    common::validation::{generate_id, validate_farm_areas, EntityKind},
    db::crop_repo::percent_of,
    db::{CropRepository, FarmRepository, ProducerRepository},
    models::farm::{
        BrazilianState, CreateFarmPayload, Farm, FarmMetric, FarmPerformance, FarmWithDetails,
        FarmsBySize, LandUse, StateDistribution, UpdateFarmPayload,
    },
    services::record,
};

#[derive(Clone)]
pub struct FarmService {
    farms: FarmRepository,
    producers: ProducerRepository,
    crops: CropRepository,
}

impl FarmService {
    pub fn new(farms: FarmRepository, producers: ProducerRepository, crops: CropRepository) -> Self {
        Self { farms, producers, crops }
    }

    pub fn repository(&self) -> &FarmRepository {
        &self.farms
    }

    // =========================================================================
    //  CADASTRO
    // =========================================================================

    pub fn create_farm(&self, payload: CreateFarmPayload) -> AppResult<Farm> {
        let result = self.try_create(payload);
        record(&self.farms, "create_farm", result)
    }

    fn try_create(&self, payload: CreateFarmPayload) -> AppResult<Farm> {
        // Notas fora de 0..=100 e nomes vazios caem aqui
        payload.validate()?;

        ensure_areas(payload.total_area, payload.agricultural_area, payload.vegetation_area)?;

        if self.producers.get_producer_by_id(&payload.producer_id).is_none() {
            return Err(AppError::not_found("Produtor", &payload.producer_id));
        }

        let now = Utc::now();
        let farm = Farm {
            id: generate_id(EntityKind::Farm),
            producer_id: payload.producer_id,
            name: payload.name.trim().to_string(),
            city: payload.city.trim().to_string(),
            state: payload.state,
            total_area: payload.total_area,
            agricultural_area: payload.agricultural_area,
            vegetation_area: payload.vegetation_area,
            productivity: payload.productivity,
            sustainability: payload.sustainability,
            technology: payload.technology,
            created_at: now,
            updated_at: now,
            active: true,
            crops: Vec::new(),
        };

        self.farms.insert(farm.clone());
        self.sync_producer_farms(&farm.producer_id);

        tracing::info!(farm_id = %farm.id, producer_id = %farm.producer_id, "fazenda cadastrada");
        Ok(farm)
    }

    /// Mudança de área revalida o invariante e não deixa a área agricultável
    /// ficar abaixo do que já está plantado.
    pub fn update_farm(&self, id: &str, payload: UpdateFarmPayload) -> AppResult<Farm> {
        let result = self.try_update(id, payload);
        record(&self.farms, "update_farm", result)
    }

    fn try_update(&self, id: &str, payload: UpdateFarmPayload) -> AppResult<Farm> {
        let current = self
            .farms
            .get_farm_by_id(id)
            .ok_or_else(|| AppError::not_found("Fazenda", id))?;

        payload.validate()?;

        let total = payload.total_area.unwrap_or(current.total_area);
        let agricultural = payload.agricultural_area.unwrap_or(current.agricultural_area);
        let vegetation = payload.vegetation_area.unwrap_or(current.vegetation_area);

        if payload.touches_areas() {
            ensure_areas(total, agricultural, vegetation)?;

            let planted = self.crops.planted_area_for_farm(id);
            if agricultural < planted {
                return Err(AppError::validation(format!(
                    "A área agricultável ({} ha) não pode ser menor que a área já plantada ({} ha).",
                    agricultural, planted
                )));
            }
        }

        // Troca de dono: o novo produtor precisa existir
        let new_owner = match payload.producer_id {
            Some(ref pid) if *pid != current.producer_id => {
                if self.producers.get_producer_by_id(pid).is_none() {
                    return Err(AppError::not_found("Produtor", pid));
                }
                Some(pid.clone())
            }
            _ => None,
        };

        let updated = self
            .farms
            .update(id, |f| {
                if let Some(pid) = new_owner.clone() {
                    f.producer_id = pid;
                }
                if let Some(name) = payload.name {
                    f.name = name.trim().to_string();
                }
                if let Some(city) = payload.city {
                    f.city = city.trim().to_string();
                }
                if let Some(state) = payload.state {
                    f.state = state;
                }
                f.total_area = total;
                f.agricultural_area = agricultural;
                f.vegetation_area = vegetation;
                if let Some(v) = payload.productivity {
                    f.productivity = v;
                }
                if let Some(v) = payload.sustainability {
                    f.sustainability = v;
                }
                if let Some(v) = payload.technology {
                    f.technology = v;
                }
            })
            .ok_or_else(|| AppError::not_found("Fazenda", id))?;

        if new_owner.is_some() {
            self.sync_producer_farms(&current.producer_id);
            self.sync_producer_farms(&updated.producer_id);
        }

        tracing::info!(farm_id = %id, "fazenda atualizada");
        Ok(updated)
    }

    /// Bloqueado enquanto houver cultura ativa na fazenda.
    pub fn delete_farm(&self, id: &str) -> AppResult<()> {
        let result = self.try_delete(id);
        record(&self.farms, "delete_farm", result)
    }

    fn try_delete(&self, id: &str) -> AppResult<()> {
        let farm = self
            .farms
            .get_farm_by_id(id)
            .ok_or_else(|| AppError::not_found("Fazenda", id))?;

        let crop_count = self.crops.count_active_for_farm(id);
        if crop_count > 0 {
            return Err(AppError::conflict(format!(
                "Não é possível excluir a fazenda: existem {} cultura(s) vinculada(s).",
                crop_count
            )));
        }

        self.farms.soft_delete(id);
        self.sync_producer_farms(&farm.producer_id);

        tracing::info!(farm_id = %id, "fazenda excluída");
        Ok(())
    }

    // =========================================================================
    //  RESSINCRONIZAÇÃO DOS CACHES
    //  Únicos pontos que escrevem `Producer.farms_ids` e `Farm.crops`.
    // =========================================================================

    /// Recalcula `Farm.crops` a partir do CropRepository.
    pub fn sync_farm_crops(&self, farm_id: &str) {
        let crops = self.crops.get_crops_by_farm(farm_id);
        tracing::debug!(farm_id, count = crops.len(), "cache de culturas ressincronizado");
        self.farms.set_crops(farm_id, crops);
    }

    /// Recalcula `Producer.farms_ids` (fazendas ativas, na ordem de cadastro).
    pub fn sync_producer_farms(&self, producer_id: &str) {
        let ids: Vec<String> = self
            .farms
            .get_farms_by_producer(producer_id)
            .into_iter()
            .map(|f| f.id)
            .collect();
        tracing::debug!(producer_id, count = ids.len(), "cache de fazendas ressincronizado");
        self.producers.set_farms_ids(producer_id, ids);
    }

    /// Reconstrói todos os caches (após importação ou restauração).
    pub fn resync_all(&self) {
        for farm in self.farms.all() {
            self.sync_farm_crops(&farm.id);
        }
        for producer in self.producers.all() {
            self.sync_producer_farms(&producer.id);
        }
    }

    // =========================================================================
    //  VISÕES DERIVADAS
    // =========================================================================

    pub fn get_farm_with_details(&self, id: &str) -> AppResult<FarmWithDetails> {
        let farm = self
            .farms
            .get_farm_by_id(id)
            .ok_or_else(|| AppError::not_found("Fazenda", id))?;

        let producer = self.producers.get_producer_by_id(&farm.producer_id);
        let crops = self.crops.get_crops_by_farm(id);
        let planted_area: Decimal = crops.iter().map(|c| c.planted_area).sum();
        let available_area = (farm.agricultural_area - planted_area).max(Decimal::ZERO);
        let utilization_percent = percent_of(planted_area, farm.agricultural_area);

        Ok(FarmWithDetails {
            farm,
            producer,
            crops,
            planted_area,
            available_area,
            utilization_percent,
        })
    }

    pub fn get_farms_by_size(&self) -> FarmsBySize {
        self.farms.get_farms_by_size()
    }

    /// Fazendas e área por estado, do estado com mais fazendas para o com menos.
    pub fn get_farms_by_state_distribution(&self) -> Vec<StateDistribution> {
        let farms = self.farms.get_active_farms();
        let total_farms = Decimal::from(farms.len());

        let mut by_state: BTreeMap<BrazilianState, (usize, Decimal)> = BTreeMap::new();
        for farm in &farms {
            let entry = by_state.entry(farm.state).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += farm.total_area;
        }

        let mut distribution: Vec<StateDistribution> = by_state
            .into_iter()
            .map(|(state, (farm_count, total_area))| StateDistribution {
                state,
                farm_count,
                total_area,
                percentage: percent_of(Decimal::from(farm_count), total_farms),
            })
            .collect();

        // Empate: maior área primeiro
        distribution.sort_by(|a, b| {
            b.farm_count
                .cmp(&a.farm_count)
                .then_with(|| b.total_area.cmp(&a.total_area))
        });
        distribution
    }

    pub fn get_farm_performance(&self) -> Vec<FarmPerformance> {
        self.farms
            .get_active_farms()
            .into_iter()
            .map(performance_of)
            .collect()
    }

    pub fn get_top_farms(&self, metric: FarmMetric, limit: usize) -> Vec<FarmPerformance> {
        let mut farms = self.farms.get_active_farms();
        let key = |f: &Farm| match metric {
            FarmMetric::Productivity => Decimal::from(f.productivity),
            FarmMetric::Sustainability => Decimal::from(f.sustainability),
            FarmMetric::Technology => Decimal::from(f.technology),
            FarmMetric::TotalArea => f.total_area,
        };
        farms.sort_by(|a, b| key(b).cmp(&key(a)));
        farms.into_iter().take(limit).map(performance_of).collect()
    }

    pub fn get_land_use(&self) -> LandUse {
        let stats = self.farms.get_farm_stats();
        let unused_area = (stats.total_area
            - stats.total_agricultural_area
            - stats.total_vegetation_area)
            .max(Decimal::ZERO);

        LandUse {
            total_area: stats.total_area,
            agricultural_area: stats.total_agricultural_area,
            vegetation_area: stats.total_vegetation_area,
            unused_area,
            agricultural_percent: percent_of(stats.total_agricultural_area, stats.total_area),
            vegetation_percent: percent_of(stats.total_vegetation_area, stats.total_area),
            unused_percent: percent_of(unused_area, stats.total_area),
        }
    }
}

fn ensure_areas(total: Decimal, agricultural: Decimal, vegetation: Decimal) -> AppResult<()> {
    if !validate_farm_areas(total, agricultural, vegetation) {
        return Err(AppError::validation(format!(
            "Áreas inválidas: agricultável ({} ha) + vegetação ({} ha) deve ser no máximo a área total ({} ha), sem valores negativos.",
            agricultural, vegetation, total
        )));
    }
    Ok(())
}

fn performance_of(farm: Farm) -> FarmPerformance {
    let sum = Decimal::from(farm.productivity + farm.sustainability + farm.technology);
    FarmPerformance {
        overall_score: (sum / Decimal::from(3)).round_dp(2),
        farm_id: farm.id,
        name: farm.name,
        productivity: farm.productivity,
        sustainability: farm.sustainability,
        technology: farm.technology,
    }
}
