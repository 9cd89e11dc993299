//src/main.rs

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gestao_rural::config::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env().context("Falha ao carregar a configuração.")?;
    let app_state = AppState::new(config).context("Falha ao inicializar o estado da aplicação.")?;

    if let Some(report) = app_state.seed_if_first_run()? {
        tracing::info!(
            "🌱 Primeira execução: {} produtores, {} fazendas e {} culturas de demonstração",
            report.producers,
            report.farms,
            report.crops
        );
    }

    let settings = app_state.settings_service.clone();
    settings.start_session();

    let summary = app_state.dashboard_service.summary();
    tracing::info!(
        "📊 {} produtores | {} fazendas | {} culturas | {} ha totais | {} ha plantados",
        summary.total_producers,
        summary.total_farms,
        summary.total_crops,
        summary.total_area,
        summary.total_planted_area
    );
    for state in &summary.by_state {
        tracing::info!("   {:?}: {} fazenda(s), {} ha ({}%)", state.state, state.farm_count, state.total_area, state.percentage);
    }
    for farm in &summary.top_farms {
        tracing::info!("   🏆 {} (nota geral {})", farm.name, farm.overall_score);
    }

    let stats = app_state.settings_service.repository().get_stats();
    tracing::info!("Sessão nº {} ({} min de uso acumulados)", stats.total_sessions, stats.total_time_spent);

    settings.end_session();
    Ok(())
}
