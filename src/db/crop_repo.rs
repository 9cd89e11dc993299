// src/db/crop_repo.rs

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    db::state::{ErrorSink, PersistedList},
    db::storage::{CROPS_KEY, KeyValueStore},
    models::crop::{Crop, CropStats, CropType, CropTypeDistribution},
};

#[derive(Clone)]
pub struct CropRepository {
    list: Arc<PersistedList<Crop>>,
}

impl CropRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            list: Arc::new(PersistedList::hydrate(CROPS_KEY, store)),
        }
    }

    // =========================================================================
    //  ESCRITA (sem validação)
    // =========================================================================

    pub fn insert(&self, crop: Crop) {
        self.list.mutate(|items| items.push(crop));
    }

    pub fn update<F>(&self, id: &str, f: F) -> Option<Crop>
    where
        F: FnOnce(&mut Crop),
    {
        self.list.mutate(|items| {
            let crop = items.iter_mut().find(|c| c.id == id)?;
            f(crop);
            crop.updated_at = Utc::now();
            Some(crop.clone())
        })
    }

    pub fn soft_delete(&self, id: &str) -> bool {
        self.update(id, |c| c.active = false).is_some()
    }

    pub fn replace_all(&self, crops: Vec<Crop>) {
        self.list.mutate(|items| *items = crops);
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub fn all(&self) -> Vec<Crop> {
        self.list.read().items.clone()
    }

    pub fn get_crop_by_id(&self, id: &str) -> Option<Crop> {
        self.list
            .read()
            .items
            .iter()
            .find(|c| c.active && c.id == id)
            .cloned()
    }

    pub fn get_active_crops(&self) -> Vec<Crop> {
        self.filter(|_| true)
    }

    pub fn get_crops_by_farm(&self, farm_id: &str) -> Vec<Crop> {
        self.filter(|c| c.farm_id == farm_id)
    }

    pub fn get_crops_by_year(&self, harvest_year: &str) -> Vec<Crop> {
        self.filter(|c| c.harvest_year == harvest_year)
    }

    /// Soma da área plantada das culturas ativas da fazenda.
    pub fn planted_area_for_farm(&self, farm_id: &str) -> Decimal {
        self.list
            .read()
            .items
            .iter()
            .filter(|c| c.active && c.farm_id == farm_id)
            .map(|c| c.planted_area)
            .sum()
    }

    pub fn count_active_for_farm(&self, farm_id: &str) -> usize {
        self.list
            .read()
            .items
            .iter()
            .filter(|c| c.active && c.farm_id == farm_id)
            .count()
    }

    /// Busca por tipo, ano da safra e observações.
    pub fn search_crops(&self, term: &str) -> Vec<Crop> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_active_crops();
        }
        self.filter(|c| {
            c.crop_type.label().to_lowercase().contains(&needle)
                || c.harvest_year.to_lowercase().contains(&needle)
                || c
                    .notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
    }

    pub fn get_crop_stats(&self) -> CropStats {
        let state = self.list.read();
        let active: Vec<&Crop> = state.items.iter().filter(|c| c.active).collect();

        let total_planted_area: Decimal = active.iter().map(|c| c.planted_area).sum();
        let average_planted_area = if active.is_empty() {
            Decimal::ZERO
        } else {
            (total_planted_area / Decimal::from(active.len())).round_dp(2)
        };

        let yields: Vec<Decimal> = active.iter().filter_map(|c| c.expected_yield).collect();
        let average_expected_yield = if yields.is_empty() {
            None
        } else {
            let sum: Decimal = yields.iter().sum();
            Some((sum / Decimal::from(yields.len())).round_dp(2))
        };

        let distinct_types = active.iter().map(|c| c.crop_type).collect::<HashSet<_>>().len();

        CropStats {
            total_crops: state.items.len(),
            active_crops: active.len(),
            total_planted_area,
            average_planted_area,
            average_expected_yield,
            distinct_types,
        }
    }

    /// Quantidade e área por tipo, com percentual sobre a área plantada total.
    /// Ordenado por área decrescente.
    pub fn get_crops_by_type_distribution(&self) -> Vec<CropTypeDistribution> {
        let mut by_type: BTreeMap<CropType, (usize, Decimal)> = BTreeMap::new();
        for crop in self.get_active_crops() {
            let entry = by_type.entry(crop.crop_type).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += crop.planted_area;
        }

        let total: Decimal = by_type.values().map(|(_, area)| *area).sum();
        let mut distribution: Vec<CropTypeDistribution> = by_type
            .into_iter()
            .map(|(crop_type, (count, total_area))| CropTypeDistribution {
                crop_type,
                count,
                total_area,
                percentage: percent_of(total_area, total),
            })
            .collect();

        distribution.sort_by(|a, b| b.total_area.cmp(&a.total_area));
        distribution
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn set_loading(&self, loading: bool) {
        self.list.set_loading(loading);
    }

    pub fn last_error(&self) -> Option<String> {
        self.list.last_error()
    }

    fn filter(&self, pred: impl Fn(&Crop) -> bool) -> Vec<Crop> {
        self.list
            .read()
            .items
            .iter()
            .filter(|c| c.active && pred(c))
            .cloned()
            .collect()
    }
}

impl ErrorSink for CropRepository {
    fn set_error(&self, error: Option<String>) {
        self.list.set_error(error);
    }
}

/// `part / whole * 100` com duas casas; zero quando `whole` é zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
}
