// src/services/seed_service.rs
//
// Dados de demonstração para a primeira execução.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::error::{AppError, AppResult},
    db::storage::{KeyValueStore, PRODUCERS_KEY},
    models::crop::{CreateCropPayload, CropType},
    models::farm::{BrazilianState, CreateFarmPayload},
    models::producer::{CreateProducerPayload, DocumentType},
    services::{CropService, FarmService, ProducerService},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub producers: usize,
    pub farms: usize,
    pub crops: usize,
}

/// Instalação nova: a chave de produtores nunca foi gravada.
pub fn is_first_run(store: &dyn KeyValueStore) -> AppResult<bool> {
    Ok(!store.contains(PRODUCERS_KEY)?)
}

struct DemoFarm {
    name: &'static str,
    city: &'static str,
    state: BrazilianState,
    // total, agricultável, vegetação
    areas: (i64, i64, i64),
    scores: (i32, i32, i32),
    crops: &'static [DemoCrop],
}

struct DemoCrop {
    crop_type: CropType,
    harvest_year: &'static str,
    area: i64,
    // décimos de t/ha
    yield_tenths: i64,
    planting: (i32, u32, u32),
    harvest: (i32, u32, u32),
}

struct DemoProducer {
    name: &'static str,
    document: &'static str,
    document_type: DocumentType,
    email: &'static str,
    farms: &'static [DemoFarm],
}

const DEMO: &[DemoProducer] = &[
    DemoProducer {
        name: "João Carlos Pereira",
        document: "529.982.247-25",
        document_type: DocumentType::Cpf,
        email: "joao.pereira@email.com",
        farms: &[
            DemoFarm {
                name: "Fazenda Santa Helena",
                city: "Sorriso",
                state: BrazilianState::MT,
                areas: (1200, 900, 250),
                scores: (85, 72, 78),
                crops: &[
                    DemoCrop { crop_type: CropType::Soja, harvest_year: "2024/2025", area: 500, yield_tenths: 36, planting: (2024, 10, 5), harvest: (2025, 2, 20) },
                    DemoCrop { crop_type: CropType::Milho, harvest_year: "2024/2025", area: 300, yield_tenths: 62, planting: (2025, 2, 25), harvest: (2025, 7, 15) },
                ],
            },
            DemoFarm {
                name: "Sítio Boa Esperança",
                city: "Lucas do Rio Verde",
                state: BrazilianState::MT,
                areas: (45, 30, 10),
                scores: (60, 80, 55),
                crops: &[
                    DemoCrop { crop_type: CropType::Feijao, harvest_year: "2025", area: 20, yield_tenths: 18, planting: (2025, 3, 1), harvest: (2025, 6, 10) },
                ],
            },
        ],
    },
    DemoProducer {
        name: "Ana Beatriz Lima",
        document: "123.456.789-09",
        document_type: DocumentType::Cpf,
        email: "ana.lima@email.com",
        farms: &[DemoFarm {
            name: "Fazenda Café do Vale",
            city: "Patrocínio",
            state: BrazilianState::MG,
            areas: (320, 200, 100),
            scores: (78, 88, 70),
            crops: &[
                DemoCrop { crop_type: CropType::Cafe, harvest_year: "2024/2025", area: 150, yield_tenths: 22, planting: (2022, 11, 10), harvest: (2025, 5, 30) },
            ],
        }],
    },
    DemoProducer {
        name: "Agropecuária Horizonte Ltda",
        document: "11.222.333/0001-81",
        document_type: DocumentType::Cnpj,
        email: "contato@horizonteagro.com.br",
        farms: &[
            DemoFarm {
                name: "Fazenda Horizonte",
                city: "Rio Verde",
                state: BrazilianState::GO,
                areas: (2500, 1800, 600),
                scores: (90, 65, 92),
                crops: &[
                    DemoCrop { crop_type: CropType::Soja, harvest_year: "2023/2024", area: 1000, yield_tenths: 34, planting: (2023, 10, 1), harvest: (2024, 2, 10) },
                    DemoCrop { crop_type: CropType::Algodao, harvest_year: "2024/2025", area: 600, yield_tenths: 45, planting: (2025, 1, 10), harvest: (2025, 8, 1) },
                ],
            },
            DemoFarm {
                name: "Fazenda Canaã",
                city: "Ribeirão Preto",
                state: BrazilianState::SP,
                areas: (800, 650, 150),
                scores: (82, 60, 75),
                crops: &[
                    DemoCrop { crop_type: CropType::CanaDeAcucar, harvest_year: "2025", area: 600, yield_tenths: 800, planting: (2024, 3, 15), harvest: (2025, 5, 15) },
                ],
            },
        ],
    },
    DemoProducer {
        name: "Cooperativa Sul Grãos",
        document: "60.370.164/0001-32",
        document_type: DocumentType::Cnpj,
        email: "atendimento@sulgraos.coop.br",
        farms: &[DemoFarm {
            name: "Granja São Pedro",
            city: "Passo Fundo",
            state: BrazilianState::RS,
            areas: (450, 380, 60),
            scores: (74, 70, 68),
            crops: &[
                DemoCrop { crop_type: CropType::Trigo, harvest_year: "2025", area: 200, yield_tenths: 31, planting: (2025, 6, 1), harvest: (2025, 10, 20) },
                DemoCrop { crop_type: CropType::Soja, harvest_year: "2025/2026", area: 180, yield_tenths: 35, planting: (2025, 11, 1), harvest: (2026, 3, 15) },
            ],
        }],
    },
];

/// Cria produtores, fazendas e culturas pelos serviços, então os caches
/// saem pelo caminho normal de ressincronização.
pub fn seed_demo_data(
    producers: &ProducerService,
    farms: &FarmService,
    crops: &CropService,
) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    for demo in DEMO {
        let producer = producers.create_producer(CreateProducerPayload {
            document: demo.document.to_string(),
            document_type: demo.document_type,
            name: demo.name.to_string(),
            email: Some(demo.email.to_string()),
            phone: None,
            photo: None,
        })?;
        report.producers += 1;

        for demo_farm in demo.farms {
            let (total, agricultural, vegetation) = demo_farm.areas;
            let (productivity, sustainability, technology) = demo_farm.scores;
            let farm = farms.create_farm(CreateFarmPayload {
                producer_id: producer.id.clone(),
                name: demo_farm.name.to_string(),
                city: demo_farm.city.to_string(),
                state: demo_farm.state,
                total_area: Decimal::from(total),
                agricultural_area: Decimal::from(agricultural),
                vegetation_area: Decimal::from(vegetation),
                productivity,
                sustainability,
                technology,
            })?;
            report.farms += 1;

            for demo_crop in demo_farm.crops {
                crops.create_crop(CreateCropPayload {
                    farm_id: farm.id.clone(),
                    crop_type: demo_crop.crop_type,
                    harvest_year: demo_crop.harvest_year.to_string(),
                    planted_area: Decimal::from(demo_crop.area),
                    expected_yield: Some(Decimal::new(demo_crop.yield_tenths, 1)),
                    planting_date: Some(ymd(demo_crop.planting)?),
                    harvest_date: Some(ymd(demo_crop.harvest)?),
                    notes: None,
                })?;
                report.crops += 1;
            }
        }
    }

    tracing::info!(
        producers = report.producers,
        farms = report.farms,
        crops = report.crops,
        "dados de demonstração criados"
    );
    Ok(report)
}

fn ymd((y, m, d): (i32, u32, u32)) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::validation(format!("Data inválida: {}-{:02}-{:02}", y, m, d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CropRepository, FarmRepository, MemoryStore, ProducerRepository};
    use std::sync::Arc;

    #[test]
    fn seeds_once_with_consistent_caches() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        assert!(is_first_run(store.as_ref()).unwrap());

        let producer_repo = ProducerRepository::new(store.clone());
        let farm_repo = FarmRepository::new(store.clone());
        let crop_repo = CropRepository::new(store.clone());
        let producers = ProducerService::new(producer_repo.clone(), farm_repo.clone(), crop_repo.clone());
        let farms = FarmService::new(farm_repo.clone(), producer_repo.clone(), crop_repo.clone());
        let crops = CropService::new(crop_repo.clone(), farm_repo.clone(), farms.clone());

        let report = seed_demo_data(&producers, &farms, &crops).unwrap();
        assert_eq!(report, SeedReport { producers: 4, farms: 6, crops: 9 });
        assert!(!is_first_run(store.as_ref()).unwrap());

        for producer in producer_repo.get_active_producers() {
            let expected: Vec<String> = farm_repo
                .get_farms_by_producer(&producer.id)
                .into_iter()
                .map(|f| f.id)
                .collect();
            assert_eq!(producer.farms_ids, expected);
        }
        for farm in farm_repo.get_active_farms() {
            assert_eq!(farm.crops.len(), crop_repo.count_active_for_farm(&farm.id));
            assert!(crop_repo.planted_area_for_farm(&farm.id) <= farm.agricultural_area);
        }

        // Segunda tentativa esbarra na unicidade do documento
        assert!(seed_demo_data(&producers, &farms, &crops).is_err());
    }
}
