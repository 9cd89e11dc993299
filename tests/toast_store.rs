use std::time::Duration;

use gestao_rural::models::toast::{PromiseMessages, ToastConfig, ToastKind};
use gestao_rural::services::ToastStore;

fn messages() -> PromiseMessages {
    PromiseMessages {
        loading: "Salvando...".to_string(),
        success: "Salvo!".to_string(),
        error: "Falha ao salvar".to_string(),
    }
}

#[test]
fn cap_keeps_newest_first() {
    let store = ToastStore::new(ToastConfig { max_toasts: 2, default_duration_ms: 5000 });
    for title in ["Um", "Dois", "Três"] {
        store.info(title, None);
    }

    let titles: Vec<String> = store.toasts().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Três", "Dois"]);
}

#[tokio::test(start_paused = true)]
async fn default_duration_removes_toast() {
    let store = ToastStore::new(ToastConfig { max_toasts: 5, default_duration_ms: 2000 });
    store.success("Produtor criado", None);
    assert_eq!(store.toasts().len(), 1);

    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert_eq!(store.toasts().len(), 1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(store.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn promise_swaps_loading_for_success() {
    let store = ToastStore::new(ToastConfig::default());

    let value = store
        .promise(async { Ok::<_, String>(42) }, messages())
        .await
        .unwrap();
    assert_eq!(value, 42);

    let toasts = store.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].title, "Salvo!");
}

#[tokio::test(start_paused = true)]
async fn promise_rethrows_and_shows_error() {
    let store = ToastStore::new(ToastConfig::default());

    let result = store
        .promise(async { Err::<(), _>("disco cheio".to_string()) }, messages())
        .await;
    assert_eq!(result, Err("disco cheio".to_string()));

    let toasts = store.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message.as_deref(), Some("disco cheio"));
}
