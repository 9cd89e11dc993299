pub mod producer_service;
pub use producer_service::ProducerService;
pub mod farm_service;
pub use farm_service::FarmService;
pub mod crop_service;
pub use crop_service::CropService;
pub mod settings_service;
pub use settings_service::SettingsService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod toast_store;
pub use toast_store::ToastStore;
pub mod seed_service;

use crate::{common::error::AppResult, db::state::ErrorSink};

/// Registra o resultado de uma operação no campo `error` do repositório dono:
/// sucesso limpa a mensagem, falha grava a mensagem para a interface.
pub(crate) fn record<T>(sink: &impl ErrorSink, operation: &str, result: AppResult<T>) -> AppResult<T> {
    match &result {
        Ok(_) => sink.set_error(None),
        Err(e) => {
            tracing::warn!(operation, error = %e, "operação rejeitada");
            sink.set_error(Some(e.user_message()));
        }
    }
    result
}
