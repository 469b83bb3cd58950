use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use waterway::config::ArtifactConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Applies command-line artifact paths over the configured ones.
pub(crate) fn override_artifacts(
    mut artifacts: ArtifactConfig,
    model: Option<PathBuf>,
    projections: Option<PathBuf>,
) -> ArtifactConfig {
    if let Some(model) = model {
        artifacts.model_bundle = Some(model);
    }
    if let Some(projections) = projections {
        artifacts.projections = Some(projections);
    }
    artifacts
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    waterway::forecast::parse_date(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_replace_only_the_paths_they_name() {
        let configured = ArtifactConfig {
            model_bundle: Some(PathBuf::from("env/bundle.json")),
            projections: Some(PathBuf::from("env/projections.csv")),
        };

        let merged = override_artifacts(configured, None, Some(PathBuf::from("cli.json")));

        assert_eq!(merged.model_bundle, Some(PathBuf::from("env/bundle.json")));
        assert_eq!(merged.projections, Some(PathBuf::from("cli.json")));
    }

    #[test]
    fn clap_date_parser_reports_expected_format() {
        assert!(parse_date("2025-10-01").is_ok());
        let error = parse_date("October").expect_err("rejected");
        assert!(error.contains("YYYY-MM-DD"));
    }
}
