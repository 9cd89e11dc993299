// src/db/farm_repo.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    db::state::{ErrorSink, PersistedList},
    db::storage::{FARMS_KEY, KeyValueStore},
    models::crop::Crop,
    models::farm::{BrazilianState, Farm, FarmStats, FarmsBySize},
};

const SMALL_FARM_LIMIT: i64 = 50;
const LARGE_FARM_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct FarmRepository {
    list: Arc<PersistedList<Farm>>,
}

impl FarmRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            list: Arc::new(PersistedList::hydrate(FARMS_KEY, store)),
        }
    }

    // =========================================================================
    //  ESCRITA (sem validação)
    // =========================================================================

    pub fn insert(&self, farm: Farm) {
        self.list.mutate(|items| items.push(farm));
    }

    pub fn update<F>(&self, id: &str, f: F) -> Option<Farm>
    where
        F: FnOnce(&mut Farm),
    {
        self.list.mutate(|items| {
            let farm = items.iter_mut().find(|f| f.id == id)?;
            f(farm);
            farm.updated_at = Utc::now();
            Some(farm.clone())
        })
    }

    pub fn soft_delete(&self, id: &str) -> bool {
        self.update(id, |f| f.active = false).is_some()
    }

    /// Troca o cache de culturas sem mexer em `updated_at`.
    pub fn set_crops(&self, id: &str, crops: Vec<Crop>) {
        self.list.mutate(|items| {
            if let Some(f) = items.iter_mut().find(|f| f.id == id) {
                f.crops = crops;
            }
        });
    }

    pub fn replace_all(&self, farms: Vec<Farm>) {
        self.list.mutate(|items| *items = farms);
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub fn all(&self) -> Vec<Farm> {
        self.list.read().items.clone()
    }

    pub fn get_farm_by_id(&self, id: &str) -> Option<Farm> {
        self.list
            .read()
            .items
            .iter()
            .find(|f| f.active && f.id == id)
            .cloned()
    }

    pub fn get_active_farms(&self) -> Vec<Farm> {
        self.filter(|_| true)
    }

    /// Busca em nome, cidade e sigla do estado.
    pub fn search_farms(&self, term: &str) -> Vec<Farm> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_active_farms();
        }
        self.filter(|f| {
            f.name.to_lowercase().contains(&needle)
                || f.city.to_lowercase().contains(&needle)
                || f.state.code().to_lowercase().contains(&needle)
        })
    }

    // Na ordem de cadastro
    pub fn get_farms_by_producer(&self, producer_id: &str) -> Vec<Farm> {
        self.filter(|f| f.producer_id == producer_id)
    }

    pub fn get_farms_by_state(&self, state: BrazilianState) -> Vec<Farm> {
        self.filter(|f| f.state == state)
    }

    pub fn get_farm_stats(&self) -> FarmStats {
        let state = self.list.read();
        let active: Vec<&Farm> = state.items.iter().filter(|f| f.active).collect();
        let count = Decimal::from(active.len());

        let total_area: Decimal = active.iter().map(|f| f.total_area).sum();
        let average = |sum: Decimal| if count.is_zero() { Decimal::ZERO } else { (sum / count).round_dp(2) };

        FarmStats {
            total_farms: state.items.len(),
            active_farms: active.len(),
            total_area,
            total_agricultural_area: active.iter().map(|f| f.agricultural_area).sum(),
            total_vegetation_area: active.iter().map(|f| f.vegetation_area).sum(),
            average_area: average(total_area),
            average_productivity: average(active.iter().map(|f| Decimal::from(f.productivity)).sum()),
            average_sustainability: average(active.iter().map(|f| Decimal::from(f.sustainability)).sum()),
            average_technology: average(active.iter().map(|f| Decimal::from(f.technology)).sum()),
        }
    }

    pub fn get_farms_by_size(&self) -> FarmsBySize {
        let small = Decimal::from(SMALL_FARM_LIMIT);
        let large = Decimal::from(LARGE_FARM_LIMIT);

        let mut buckets = FarmsBySize::default();
        for farm in self.get_active_farms() {
            if farm.total_area < small {
                buckets.small.push(farm);
            } else if farm.total_area <= large {
                buckets.medium.push(farm);
            } else {
                buckets.large.push(farm);
            }
        }
        buckets
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

    fn filter(&self, pred: impl Fn(&Farm) -> bool) -> Vec<Farm> {
        self.list
            .read()
            .items
            .iter()
            .filter(|f| f.active && pred(f))
            .cloned()
            .collect()
    }
}

impl ErrorSink for FarmRepository {
    fn set_error(&self, error: Option<String>) {
        self.list.set_error(error);
    }
}
