use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use waterway::config::ArtifactConfig;
use waterway::forecast::{
    ClimateObservation, ConsumptionEstimator, ForecastContext, InferencePath, Month,
    ProjectionEngine, ProjectionSource, RiskClassifier, RiskLevel, StratumKey,
};

const BUNDLE: &str = r#"{
    "consumption_predictor": {
        "model": { "coefficients": [0, 0, 0, 0, 0, 1, 0], "intercept": 1.0 },
        "scaler": { "mean": [0, 0, 0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1, 0, 1] },
        "label_encoder_estrato": { "classes": ["1", "2", "3", "4", "5", "6"] }
    },
    "risk_classifier": {
        "model": {
            "coefficients": [[0, 0, -1, 0, 0, 0, 0], [0, 0, 1, 0, 0, 0, 0]],
            "intercepts": [25, -25]
        },
        "label_encoder_estrato": { "classes": ["1", "2", "3", "4", "5", "6"] },
        "label_encoder_riesgo": { "classes": ["Bajo", "Alto"] }
    },
    "proyecciones_12_meses": [
        {
            "fecha": "2026-01-01",
            "estrato": 3,
            "consumo_actual": 19.0,
            "consumo_pesimista": 20.33,
            "consumo_optimista": 19.67,
            "incremento_pesimista_pct": 7.0,
            "incremento_optimista_pct": 3.58
        }
    ],
    "metadata": {
        "fecha_entrenamiento": "2025-09-30T12:00:00",
        "num_registros_consumo": 2880,
        "estratos": ["1", "2", "3", "4", "5", "6"]
    }
}"#;

const PROJECTIONS_CSV: &str = "\
fecha,estrato,consumo_actual,consumo_pesimista,consumo_optimista,incremento_pesimista_pct,\
incremento_optimista_pct
2026-02-01,1,15.0,16.05,15.53,7.0,3.53
2026-03-01,1,15.0,16.05,15.53,7.0,3.53
";

/// Writes `contents` into the test's temporary directory and returns its path.
fn scratch_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("scratch file");
    path
}

fn now() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date")
}

#[test]
fn bundle_loaded_from_disk_drives_both_model_paths() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = ArtifactConfig {
        model_bundle: Some(scratch_file(&tmp, "bundle.json", BUNDLE)),
        projections: None,
    };
    let context = ForecastContext::load(&config);
    assert!(context.model_enabled());
    let metadata = &context.bundle().expect("bundle loaded").metadata;
    assert_eq!(metadata.consumption_records, Some(2880));

    let estimator = ConsumptionEstimator::new(&context);
    let june = Month::new(6).expect("valid month");
    let reference = ClimateObservation::REFERENCE;

    // baseline column passes through a zero scale untouched, plus the intercept
    let estimate = estimator.estimate(&StratumKey::new("3"), june, reference);
    assert_eq!(estimate.path, InferencePath::ModelBacked);
    assert_eq!(estimate.value_m3, 20.0);

    let commercial = estimator.estimate(&StratumKey::new("Comercial"), june, reference);
    assert_eq!(commercial.path, InferencePath::RuleBased);
    assert_eq!(commercial.value_m3, 150.0);

    let classifier = RiskClassifier::new(&context);
    let heavy = classifier.classify("Medellín", &"2".into(), 40.0, june, reference);
    assert_eq!(heavy.level, RiskLevel::High);
    assert_eq!(heavy.path, InferencePath::ModelBacked);
}

#[test]
fn embedded_projections_back_up_a_missing_projection_file() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = ArtifactConfig {
        model_bundle: Some(scratch_file(&tmp, "bundle-embedded.json", BUNDLE)),
        projections: Some(tmp.path().join("no-such-projections.csv")),
    };
    let context = ForecastContext::load(&config);
    assert!(!context.precomputed_enabled());

    let set = ProjectionEngine::new(&context).obtain("Medellín", None, now());

    assert_eq!(set.source, ProjectionSource::ModelEmbedded);
    assert_eq!(set.projections.len(), 1);
    assert_eq!(set.projections[0].stratum.as_str(), "3");
}

#[test]
fn csv_projection_file_takes_priority() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = ArtifactConfig {
        model_bundle: Some(scratch_file(&tmp, "bundle-priority.json", BUNDLE)),
        projections: Some(scratch_file(&tmp, "projections.csv", PROJECTIONS_CSV)),
    };
    let context = ForecastContext::load(&config);

    let set = ProjectionEngine::new(&context).obtain("Medellín", None, now());

    assert_eq!(set.source, ProjectionSource::Precomputed);
    assert_eq!(set.total_months(), 2);
    assert_eq!(set.projections[1].date, "2026-03-01");
}

#[test]
fn corrupt_bundle_disables_only_the_model_tier() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = ArtifactConfig {
        model_bundle: Some(scratch_file(
            &tmp,
            "corrupt.json",
            "{\"consumption_predictor\": [",
        )),
        projections: None,
    };
    let context = ForecastContext::load(&config);

    assert!(!context.model_enabled());
    let estimate = ConsumptionEstimator::new(&context).estimate(
        &StratumKey::new("6"),
        Month::new(1).expect("valid month"),
        ClimateObservation::REFERENCE,
    );
    assert_eq!(estimate.path, InferencePath::RuleBased);
    assert_eq!(estimate.value_m3, 30.0);
}

#[test]
fn scratch_artifacts_are_removed_with_their_directory() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let bundle = scratch_file(&tmp, "bundle.json", BUNDLE);
    assert!(ForecastContext::load(&ArtifactConfig {
        model_bundle: Some(bundle.clone()),
        projections: None,
    })
    .model_enabled());

    let root = tmp.path().to_path_buf();
    drop(tmp);

    assert!(!bundle.exists());
    assert!(!root.exists());
}
