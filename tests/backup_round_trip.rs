use gestao_rural::config::{AppConfig, AppState};
use gestao_rural::models::settings::{BackupKind, SettingsPatch, Theme};

fn state(seed: bool) -> AppState {
    AppState::in_memory(AppConfig { seed_demo: seed, ..AppConfig::default() })
}

#[tokio::test]
async fn complete_backup_restores_active_entities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gestao-rural-backup.json");

    let source = state(true);
    source.seed_if_first_run().unwrap();
    source
        .settings_service
        .update_settings(SettingsPatch { theme: Some(Theme::Dark), ..Default::default() });

    // Um registro inativo também vai no arquivo
    let crop = source.crop_service.repository().get_active_crops().remove(0);
    source.crop_service.delete_crop(&crop.id).unwrap();

    let envelope = source.settings_service.export_complete_backup(&path).await.unwrap();
    assert_eq!(envelope.kind, BackupKind::CompleteData);
    assert_eq!(envelope.summary.producers, 4);
    assert_eq!(envelope.summary.crops, 8);

    let target = state(false);
    let kind = target.settings_service.import_backup(&path).await.unwrap();
    assert_eq!(kind, BackupKind::CompleteData);

    assert_eq!(
        target.producer_service.repository().get_active_producers(),
        source.producer_service.repository().get_active_producers()
    );
    assert_eq!(
        target.farm_service.repository().get_active_farms(),
        source.farm_service.repository().get_active_farms()
    );
    assert_eq!(
        target.crop_service.repository().get_active_crops(),
        source.crop_service.repository().get_active_crops()
    );
    assert_eq!(target.crop_service.repository().all().len(), 9);

    assert_eq!(target.settings_service.repository().get_settings().theme, Theme::Dark);
    assert!(!target.farm_service.repository().is_loading());
}

#[tokio::test]
async fn import_of_garbage_keeps_current_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quebrado.json");
    tokio::fs::write(&path, "isso não é json").await.unwrap();

    let app = state(true);
    app.seed_if_first_run().unwrap();

    assert!(app.settings_service.import_backup(&path).await.is_err());
    assert!(app.settings_service.repository().last_error().is_some());
    assert_eq!(app.producer_service.repository().get_active_producers().len(), 4);
}

#[tokio::test]
async fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let app = state(false);
    let err = app
        .settings_service
        .import_backup(dir.path().join("nao-existe.json"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), gestao_rural::common::error::ErrorKind::Internal);
}

async fn tampered_import(tamper: impl FnOnce(&mut serde_json::Value)) -> AppState {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");

    let source = state(true);
    source.seed_if_first_run().unwrap();
    source.settings_service.export_complete_backup(&path).await.unwrap();

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    tamper(&mut value["dashboardData"]);
    tokio::fs::write(&path, value.to_string()).await.unwrap();

    let target = state(true);
    target.seed_if_first_run().unwrap();
    target
        .settings_service
        .update_settings(SettingsPatch { theme: Some(Theme::Light), ..Default::default() });

    let err = target.settings_service.import_backup(&path).await.unwrap_err();
    assert!(matches!(err, gestao_rural::common::error::AppError::InvalidBackup(_)));
    target
}

#[tokio::test]
async fn import_rejects_crops_over_agricultural_area() {
    let target = tampered_import(|data| data["crops"][0]["plantedArea"] = serde_json::json!(1_000_000)).await;

    // Nada foi aplicado: nem entidades nem preferências
    assert_eq!(target.crop_service.repository().all().len(), 9);
    assert!(target.crop_service.repository().get_active_crops().iter().all(|c| c.planted_area < 1_000_000.into()));
    assert_eq!(target.settings_service.repository().get_settings().theme, Theme::Light);
}

#[tokio::test]
async fn import_rejects_duplicate_documents_and_dangling_farms() {
    let target = tampered_import(|data| {
        let first = data["producers"][0]["document"].clone();
        data["producers"][1]["document"] = first;
    })
    .await;
    assert!(target.settings_service.repository().last_error().unwrap().contains("duplicado"));

    tampered_import(|data| data["farms"][0]["producerId"] = serde_json::json!("prod-inexistente")).await;
}
