//! Configuration loading from files and environment variables.

mod support;

use std::io::Write;

use gc_planner::config::PlannerConfig;
use gc_planner::error::PlannerError;
use support::with_scoped_env;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_from_file_reads_sections() {
    let file = write_config(
        r#"
        [scoring]
        min_altitude_deg = 12.5

        [window]
        quality_threshold = 0.55

        [calendar]
        default_nights = 14
        "#,
    );

    let config = PlannerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.scoring.min_altitude_deg, 12.5);
    assert_eq!(config.scoring.latitude_cutoff_deg, 61.0);
    assert_eq!(config.window.quality_threshold, 0.55);
    assert_eq!(config.calendar.default_nights, 14);
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_from_file_rejects_invalid_toml() {
    let file = write_config("[window\nquality_threshold = ");
    let err = PlannerConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, PlannerError::Configuration { .. }));
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_from_file_rejects_out_of_range_values() {
    let file = write_config("[window]\nquality_threshold = 2.0\n");
    assert!(PlannerConfig::from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let err = PlannerConfig::from_file("/nonexistent/planner.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/planner.toml"));
}

#[test]
fn test_env_overrides_apply_on_top_of_defaults() {
    let config = with_scoped_env(
        &[
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("9001")),
            ("GC_QUALITY_THRESHOLD", Some("0.6")),
            ("GC_CALENDAR_NIGHTS", Some("10")),
        ],
        || {
            let mut config = PlannerConfig::default();
            config.apply_env_overrides().map(|_| config)
        },
    )
    .unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9001);
    assert_eq!(config.window.quality_threshold, 0.6);
    assert_eq!(config.calendar.default_nights, 10);
}

#[test]
fn test_env_overrides_reject_bad_values() {
    let result = with_scoped_env(&[("PORT", Some("not-a-port"))], || {
        PlannerConfig::default().apply_env_overrides()
    });
    assert!(result.is_err());

    let result = with_scoped_env(
        &[("PORT", None), ("GC_CALENDAR_NIGHTS", Some("0"))],
        || PlannerConfig::default().apply_env_overrides(),
    );
    assert!(result.is_err());
}
