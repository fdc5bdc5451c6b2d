use std::io::Write;

use rankboard::{Alphabet, RankConfig, RankEngine, Ranker};
use tempfile::NamedTempFile;

#[test]
fn test_partial_config_fills_defaults() {
    let config = RankConfig::from_json_str(r#"{ "rebalance_threshold": 12 }"#).unwrap();
    assert_eq!(config.rebalance_threshold, 12);
    assert_eq!(config.alphabet, Alphabet::default());
    assert_eq!(config.retry, RankConfig::default().retry);
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "alphabet": "0123456789A",
            "spread_min_length": 3,
            "retry": {{ "max_attempts": 2 }},
            "worker": {{ "interval_ms": 250 }}
        }}"#
    )
    .unwrap();

    let config = RankConfig::from_file(file.path()).unwrap();
    assert_eq!(config.alphabet.radix(), 11);
    assert_eq!(config.retry.max_attempts, 2);
    assert_eq!(config.worker.interval_ms, 250);

    let engine = RankEngine::from_config(&config).unwrap();
    assert_eq!(engine.initial(), "5");
    assert!(engine.spread(3).unwrap().iter().all(|key| key.len() <= 3));
}

#[test]
fn test_invalid_configs_are_rejected() {
    // Symbols must ascend
    let err = RankConfig::from_json_str(r#"{ "alphabet": "ba" }"#).unwrap_err();
    assert_eq!(err.module(), "serialize");

    let err = RankConfig::from_json_str(r#"{ "rebalance_threshold": 0 }"#).unwrap_err();
    assert!(err.is_configuration_error());

    let err = RankConfig::from_json_str(r#"{ "spread_headroom": 1 }"#).unwrap_err();
    assert!(err.is_configuration_error());

    let err = RankConfig::from_json_str(r#"{ "retry": { "base_delay_ms": 10, "max_delay_ms": 5 } }"#)
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_missing_config_file() {
    let err = RankConfig::from_file("/nonexistent/rankboard.json").unwrap_err();
    assert!(err.is_io_error());
}
