use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_match::config::MatchingConfig;
use talent_match::error::AppError;
use talent_match::matching::{
    InMemoryMatchStore, MatchingProviders, MatchingService, ScoringConfig,
};
use talent_match::seed::SeedDirectory;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the provider seams to seed data and back the service with the in-process store.
pub(crate) fn build_matching_service(
    config: &MatchingConfig,
    seed_override: Option<&Path>,
) -> Result<Arc<MatchingService>, AppError> {
    let seed_path = seed_override.or(config.seed_path.as_deref());
    let directory = SeedDirectory::load(seed_path)?;

    let seed_label = seed_path.map_or_else(
        || "bundled sample".to_string(),
        |path| path.display().to_string(),
    );
    info!(
        seed = %seed_label,
        candidates = directory.candidate_count(),
        jobs = directory.job_count(),
        "provider data loaded"
    );

    let service = MatchingService::new(
        MatchingProviders::from_directory(Arc::new(directory)),
        Arc::new(InMemoryMatchStore::default()),
        ScoringConfig::default(),
        config.batch_settings(),
    );
    Ok(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use talent_match::matching::JobId;

    fn matching_config() -> MatchingConfig {
        MatchingConfig {
            workers: 2,
            timeout: Duration::from_secs(5),
            seed_path: None,
        }
    }

    #[tokio::test]
    async fn bundled_sample_ranks_backend_job() {
        let service = build_matching_service(&matching_config(), None).expect("service builds");
        assert_eq!(service.settings().workers, 2);

        let outcome = service
            .calculate_job_matches(&JobId::new("job-backend"))
            .await
            .expect("batch succeeds");
        assert_eq!(outcome.match_count, 1);

        let matches = service
            .get_job_candidates(&JobId::new("job-backend"))
            .expect("matches listed");
        assert_eq!(matches[0].candidate_id.as_str(), "cand-ada");
    }

    #[test]
    fn missing_seed_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("seed.json");
        let result = build_matching_service(&matching_config(), Some(&missing));
        assert!(matches!(result, Err(AppError::Seed(_))));
    }
}
