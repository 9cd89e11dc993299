use chrono::{Duration, Utc};
use gestao_rural::config::{AppConfig, AppState};
use gestao_rural::models::crop::{CreateCropPayload, CropStatus, CropType};
use gestao_rural::models::farm::{BrazilianState, CreateFarmPayload};
use gestao_rural::models::producer::{CreateProducerPayload, DocumentType};
use rust_decimal::Decimal;

#[test]
fn status_relative_to_today() {
    let app = AppState::in_memory(AppConfig { seed_demo: false, ..AppConfig::default() });

    let producer = app
        .producer_service
        .create_producer(CreateProducerPayload {
            document: "04.567.890/0001-79".to_string(),
            document_type: DocumentType::Cnpj,
            name: "Agro Cerrado S.A.".to_string(),
            email: None,
            phone: None,
            photo: None,
        })
        .unwrap();
    let farm = app
        .farm_service
        .create_farm(CreateFarmPayload {
            producer_id: producer.id,
            name: "Fazenda Cerrado".to_string(),
            city: "Barreiras".to_string(),
            state: BrazilianState::BA,
            total_area: Decimal::from(1000),
            agricultural_area: Decimal::from(700),
            vegetation_area: Decimal::from(300),
            productivity: 60,
            sustainability: 60,
            technology: 60,
        })
        .unwrap();

    let today = Utc::now().date_naive();
    let crops = &app.crop_service;
    let create = |planting, harvest| {
        crops
            .create_crop(CreateCropPayload {
                farm_id: farm.id.clone(),
                crop_type: CropType::Milho,
                harvest_year: "2025/2026".to_string(),
                planted_area: Decimal::from(10),
                expected_yield: None,
                planting_date: planting,
                harvest_date: harvest,
                notes: None,
            })
            .unwrap()
    };

    let tomorrow = create(Some(today + Duration::days(1)), None);
    let yesterday = create(Some(today - Duration::days(1)), None);
    let ready = create(Some(today - Duration::days(120)), Some(today - Duration::days(1)));
    let old = create(Some(today - Duration::days(400)), Some(today - Duration::days(200)));

    assert_eq!(crops.get_crop_status(&tomorrow), CropStatus::Planted);
    assert_eq!(crops.get_crop_status(&yesterday), CropStatus::Growing);
    assert_eq!(crops.get_crop_status(&ready), CropStatus::Ready);
    assert_eq!(crops.get_crop_status(&old), CropStatus::Harvested);
}
