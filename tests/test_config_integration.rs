//! Integration tests for loading, validating and overriding configuration

use std::path::PathBuf;
use tempfile::TempDir;
use thoughtline::config::Config;
use thoughtline::error::Error;
use thoughtline::search::Score;
use thoughtline::services::SearchService;
use thoughtline::sources::JsonFileSource;

const CUSTOM_CONFIG: &str = r#"
[_meta]
schema_version = "1.0.0"

[storage]
thoughts_file = "/var/lib/thoughtline/thoughts.json"

[search]
default_page_size = 20
default_confidence = 0.6
max_suggestions = 3

[search.weights]
semantic = 0.5
keyword = 0.3
recency = 0.1
confidence = 0.1

[search.recency]
floor = 0.1

[[search.recency.tiers]]
max_age_days = 7
score = 1.0

[[search.recency.tiers]]
max_age_days = 30
score = 0.5

[timeline]
default_group_type = "temporal"
default_related_limit = 5

[logging]
level = "debug"

[profiles.keywords]
default_page_size = 50

[profiles.keywords.weights]
semantic = 0.1
keyword = 0.7
recency = 0.1
confidence = 0.1
"#;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_hand_written_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, CUSTOM_CONFIG);

    let config = Config::load(&path).unwrap();

    assert_eq!(config.search.default_page_size, 20);
    assert_eq!(config.search.recency.tiers.len(), 2);
    assert_eq!(config.timeline.default_related_limit, 5);
    assert_eq!(config.logging.level, "debug");
    assert!(config.profiles.contains_key("keywords"));

    let weights = config.scoring_weights().unwrap();
    assert_eq!(weights.semantic(), 0.5);
    println!("✓ Loaded config with weights {:?}", weights);
}

#[test]
fn test_profile_changes_weights() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, CUSTOM_CONFIG);

    let config = Config::load_with_profile(&path, "keywords").unwrap();
    assert_eq!(config.search.default_page_size, 50);
    assert_eq!(config.scoring_weights().unwrap().keyword(), 0.7);

    let err = Config::load_with_profile(&path, "missing").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_invalid_config_reports_every_problem() {
    let temp_dir = TempDir::new().unwrap();
    let broken = CUSTOM_CONFIG
        .replace("semantic = 0.5", "semantic = 0.9")
        .replace("default_related_limit = 5", "default_related_limit = 80")
        .replace("level = \"debug\"", "level = \"chatty\"");
    let path = write_config(&temp_dir, &broken);

    let err = Config::load(&path).unwrap_err();

    match err {
        Error::ConfigValidation { errors } => {
            let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(
                paths,
                vec![
                    "search.weights",
                    "timeline.default_related_limit",
                    "logging.level"
                ]
            );
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(&temp_dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[test]
fn test_saved_default_config_loads_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    Config::default().save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();

    assert_eq!(loaded.search, Config::default().search);
    assert_eq!(loaded.timeline, Config::default().timeline);
}

#[test]
fn test_overrides_feed_scoring() {
    let mut config = Config::default();
    config.apply_overrides([
        ("THOUGHTLINE_SEARCH__SEMANTIC_WEIGHT".to_string(), "0.7".to_string()),
        ("THOUGHTLINE_SEARCH__KEYWORD_WEIGHT".to_string(), "0.0".to_string()),
        ("OTHER_SEARCH__RECENCY_WEIGHT".to_string(), "0.9".to_string()),
    ]);

    let weights = config.scoring_weights().unwrap();
    assert_eq!(weights.semantic(), 0.7);
    assert_eq!(weights.keyword(), 0.0);
    assert_eq!(weights.recency(), 0.2);

    let service = SearchService::from_config(JsonFileSource::new("unused.json"), &config).unwrap();
    let score: Score = service.pipeline().scoring().score(1.0, 1.0, 0.0, 0.0);
    assert!((score.final_score() - 0.7).abs() < 1e-9);
}

#[test]
fn test_invalid_weights_rejected_by_service() {
    let mut config = Config::default();
    config.search.weights.semantic = 0.9;

    let result = SearchService::from_config(JsonFileSource::new("unused.json"), &config);
    assert!(matches!(result, Err(Error::Weights(_))));
}
