// src/services/crop_service.rs

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::{AppError, AppResult},
    common::validation::{generate_id, validate_planted_area, EntityKind},
    db::{CropRepository, FarmRepository},
    models::crop::{
        CreateCropPayload, Crop, CropStatus, CropType, HarvestCalendarEntry, HarvestYearSummary,
        TypeProductivity, UpdateCropPayload,
    },
    services::{record, FarmService},
};

/// Dias após a colheita em que a cultura ainda conta como pronta.
pub const HARVEST_GRACE_DAYS: i64 = 30;

#[derive(Clone)]
pub struct CropService {
    crops: CropRepository,
    farms: FarmRepository,
    farm_service: FarmService,
}

impl CropService {
    pub fn new(crops: CropRepository, farms: FarmRepository, farm_service: FarmService) -> Self {
        Self { crops, farms, farm_service }
    }

    pub fn repository(&self) -> &CropRepository {
        &self.crops
    }

    // =========================================================================
    //  CADASTRO
    // =========================================================================

    /// A área plantada somada às culturas ativas da fazenda não pode passar
    /// da área agricultável.
    pub fn create_crop(&self, payload: CreateCropPayload) -> AppResult<Crop> {
        let result = self.try_create(payload);
        record(&self.crops, "create_crop", result)
    }

    fn try_create(&self, payload: CreateCropPayload) -> AppResult<Crop> {
        payload.validate()?;

        let farm = self
            .farms
            .get_farm_by_id(&payload.farm_id)
            .ok_or_else(|| AppError::not_found("Fazenda", &payload.farm_id))?;

        ensure_positive_area(payload.planted_area)?;
        ensure_yield(payload.expected_yield)?;
        ensure_dates(payload.planting_date, payload.harvest_date)?;

        let used = self.crops.planted_area_for_farm(&farm.id);
        ensure_fits(used, payload.planted_area, farm.agricultural_area)?;

        let now = Utc::now();
        let crop = Crop {
            id: generate_id(EntityKind::Crop),
            farm_id: farm.id,
            crop_type: payload.crop_type,
            harvest_year: payload.harvest_year.trim().to_string(),
            planted_area: payload.planted_area,
            expected_yield: payload.expected_yield,
            planting_date: payload.planting_date,
            harvest_date: payload.harvest_date,
            notes: payload.notes,
            created_at: now,
            updated_at: now,
            active: true,
        };

        self.crops.insert(crop.clone());
        self.farm_service.sync_farm_crops(&crop.farm_id);

        tracing::info!(crop_id = %crop.id, farm_id = %crop.farm_id, crop_type = crop.crop_type.label(), "cultura cadastrada");
        Ok(crop)
    }

    pub fn update_crop(&self, id: &str, payload: UpdateCropPayload) -> AppResult<Crop> {
        let result = self.try_update(id, payload);
        record(&self.crops, "update_crop", result)
    }

    fn try_update(&self, id: &str, payload: UpdateCropPayload) -> AppResult<Crop> {
        let current = self
            .crops
            .get_crop_by_id(id)
            .ok_or_else(|| AppError::not_found("Cultura", id))?;

        payload.validate()?;

        let farm_id = payload.farm_id.clone().unwrap_or_else(|| current.farm_id.clone());
        let farm = self
            .farms
            .get_farm_by_id(&farm_id)
            .ok_or_else(|| AppError::not_found("Fazenda", &farm_id))?;

        let planted_area = payload.planted_area.unwrap_or(current.planted_area);
        let expected_yield = payload.expected_yield.or(current.expected_yield);
        let planting_date = payload.planting_date.or(current.planting_date);
        let harvest_date = payload.harvest_date.or(current.harvest_date);

        ensure_positive_area(planted_area)?;
        ensure_yield(expected_yield)?;
        ensure_dates(planting_date, harvest_date)?;

        // Na mesma fazenda a área antiga da própria cultura não conta
        let mut used = self.crops.planted_area_for_farm(&farm.id);
        if farm.id == current.farm_id {
            used -= current.planted_area;
        }
        ensure_fits(used, planted_area, farm.agricultural_area)?;

        let updated = self
            .crops
            .update(id, |c| {
                c.farm_id = farm_id;
                if let Some(t) = payload.crop_type {
                    c.crop_type = t;
                }
                if let Some(year) = payload.harvest_year {
                    c.harvest_year = year.trim().to_string();
                }
                c.planted_area = planted_area;
                c.expected_yield = expected_yield;
                c.planting_date = planting_date;
                c.harvest_date = harvest_date;
                if payload.notes.is_some() {
                    c.notes = payload.notes;
                }
            })
            .ok_or_else(|| AppError::not_found("Cultura", id))?;

        self.farm_service.sync_farm_crops(&updated.farm_id);
        if updated.farm_id != current.farm_id {
            self.farm_service.sync_farm_crops(&current.farm_id);
        }

        tracing::info!(crop_id = %id, "cultura atualizada");
        Ok(updated)
    }

    pub fn delete_crop(&self, id: &str) -> AppResult<()> {
        let result = self.try_delete(id);
        record(&self.crops, "delete_crop", result)
    }

    fn try_delete(&self, id: &str) -> AppResult<()> {
        let crop = self
            .crops
            .get_crop_by_id(id)
            .ok_or_else(|| AppError::not_found("Cultura", id))?;

        self.crops.soft_delete(id);
        self.farm_service.sync_farm_crops(&crop.farm_id);

        tracing::info!(crop_id = %id, "cultura excluída");
        Ok(())
    }

    // =========================================================================
    //  STATUS E AGREGADOS
    // =========================================================================

    pub fn get_crop_status(&self, crop: &Crop) -> CropStatus {
        crop_status_at(crop, Utc::now().date_naive())
    }

    /// Um resumo por ano de safra, do mais recente para o mais antigo.
    pub fn get_crops_by_year(&self) -> Vec<HarvestYearSummary> {
        let mut by_year: BTreeMap<String, Vec<Crop>> = BTreeMap::new();
        for crop in self.crops.get_active_crops() {
            by_year.entry(crop.harvest_year.clone()).or_default().push(crop);
        }

        by_year
            .into_iter()
            .rev()
            .map(|(harvest_year, crops)| {
                let mut by_type: BTreeMap<CropType, usize> = BTreeMap::new();
                for c in &crops {
                    *by_type.entry(c.crop_type).or_insert(0) += 1;
                }
                HarvestYearSummary {
                    crop_count: crops.len(),
                    total_area: crops.iter().map(|c| c.planted_area).sum(),
                    average_yield: average(crops.iter().filter_map(|c| c.expected_yield)),
                    by_type,
                    harvest_year,
                }
            })
            .collect()
    }

    /// Produção estimada por tipo, ordenada pela maior produção.
    pub fn get_productivity_by_type(&self) -> Vec<TypeProductivity> {
        let mut by_type: BTreeMap<CropType, Vec<Crop>> = BTreeMap::new();
        for crop in self.crops.get_active_crops() {
            by_type.entry(crop.crop_type).or_default().push(crop);
        }

        let mut out: Vec<TypeProductivity> = by_type
            .into_iter()
            .map(|(crop_type, crops)| {
                let yields: Vec<Decimal> = crops.iter().filter_map(|c| c.expected_yield).collect();
                TypeProductivity {
                    crop_type,
                    crop_count: crops.len(),
                    total_area: crops.iter().map(|c| c.planted_area).sum(),
                    total_production: crops
                        .iter()
                        .filter_map(|c| c.expected_yield.map(|y| y * c.planted_area))
                        .sum(),
                    min_yield: yields.iter().min().copied(),
                    max_yield: yields.iter().max().copied(),
                    average_yield: average(yields.iter().copied()),
                }
            })
            .collect();

        out.sort_by(|a, b| b.total_production.cmp(&a.total_production));
        out
    }

    /// Culturas com data de colheita, em ordem cronológica. `year` filtra pelo
    /// ano civil da colheita.
    pub fn get_harvest_calendar(&self, year: Option<i32>) -> Vec<HarvestCalendarEntry> {
        let today = Utc::now().date_naive();
        let mut entries: Vec<HarvestCalendarEntry> = self
            .crops
            .get_active_crops()
            .into_iter()
            .filter_map(|c| {
                let harvest_date = c.harvest_date?;
                if year.is_some_and(|y| harvest_date.year() != y) {
                    return None;
                }
                Some(HarvestCalendarEntry {
                    status: crop_status_at(&c, today),
                    farm_name: self.farms.get_farm_by_id(&c.farm_id).map(|f| f.name),
                    crop_id: c.id,
                    farm_id: c.farm_id,
                    crop_type: c.crop_type,
                    harvest_date,
                    planted_area: c.planted_area,
                })
            })
            .collect();

        entries.sort_by_key(|e| e.harvest_date);
        entries
    }
}

/// Status derivado das datas em relação a `today`.
///
/// Sem plantio ou plantio futuro: `Planted`. Plantada e sem colheita vencida:
/// `Growing`. Da colheita até `HARVEST_GRACE_DAYS` depois: `Ready`. Depois
/// disso: `Harvested`.
pub fn crop_status_at(crop: &Crop, today: NaiveDate) -> CropStatus {
    let Some(planting) = crop.planting_date else {
        return CropStatus::Planted;
    };
    if today < planting {
        return CropStatus::Planted;
    }

    match crop.harvest_date {
        // Colheita perto de NaiveDate::MAX: a carência nunca termina
        Some(harvest)
            if harvest
                .checked_add_signed(Duration::days(HARVEST_GRACE_DAYS))
                .is_some_and(|end| today > end) =>
        {
            CropStatus::Harvested
        }
        Some(harvest) if today >= harvest => CropStatus::Ready,
        _ => CropStatus::Growing,
    }
}

fn average(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values.fold((Decimal::ZERO, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some((sum / Decimal::from(count)).round_dp(2))
    }
}

fn ensure_positive_area(planted_area: Decimal) -> AppResult<()> {
    if planted_area <= Decimal::ZERO {
        return Err(AppError::validation("A área plantada deve ser maior que zero."));
    }
    Ok(())
}

fn ensure_yield(expected_yield: Option<Decimal>) -> AppResult<()> {
    if expected_yield.is_some_and(|y| y < Decimal::ZERO) {
        return Err(AppError::validation("A produtividade esperada não pode ser negativa."));
    }
    Ok(())
}

fn ensure_dates(planting: Option<NaiveDate>, harvest: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(p), Some(h)) = (planting, harvest) {
        if h <= p {
            return Err(AppError::validation(
                "A data de colheita deve ser posterior à data de plantio.",
            ));
        }
    }
    Ok(())
}

fn ensure_fits(used: Decimal, planted: Decimal, agricultural: Decimal) -> AppResult<()> {
    if !validate_planted_area(used + planted, agricultural) {
        let available = (agricultural - used).max(Decimal::ZERO);
        return Err(AppError::validation(format!(
            "Área plantada ({} ha) excede a área agricultável disponível ({} ha).",
            planted, available
        )));
    }
    Ok(())
}
