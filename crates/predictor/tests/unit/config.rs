//! # Configuration Tests
//!
//! Tests for configuration structures, JSON deserialization, defaults,
//! structural validation, and storage-cost arithmetic.

use pretty_assertions::assert_eq;
use specbp_core::common::SetupError;
use specbp_core::config::{
    Config, PerceptronConfig, PredictorKind, TableSpec, TageConfig, TwoLevelConfig, defaults,
};

#[test]
fn config_defaults() {
    let config = Config::default();
    assert_eq!(config.predictor, PredictorKind::Tage);
    assert_eq!(config.budget_bytes, 192 * 1024);
    assert_eq!(config.tage.base_index_bits, 14);
    assert_eq!(config.tage.max_history, 640);
    assert_eq!(config.tage.history_buffer, 32);
    assert_eq!(config.tage.reset_period, 512 * 1024);
    assert_eq!(config.bimodal.index_bits, 14);
    assert_eq!(config.two_level.history_bits, 4);
    assert_eq!(config.two_level.sets, 256);
    assert_eq!(config.perceptron.history_length, 32);
    assert_eq!(config.perceptron.table_bits, 12);
    assert_eq!(config.perceptron.theta, 20);
}

#[test]
fn default_table_spread_is_geometric() {
    let tage = TageConfig::default();
    assert_eq!(tage.tables.len(), 12);
    assert_eq!(
        tage.tables[0],
        TableSpec {
            history: 4,
            index_bits: 10,
            tag_bits: 7
        }
    );
    assert_eq!(
        tage.tables[11],
        TableSpec {
            history: 640,
            index_bits: 9,
            tag_bits: 15
        }
    );

    // Strictly increasing history lengths, all within the maximum.
    for pair in tage.tables.windows(2) {
        assert!(pair[0].history < pair[1].history);
    }
    assert!(tage.tables.iter().all(|t| t.history <= tage.max_history));
    assert!(tage.validate().is_ok());
}

#[test]
fn json_deserialization_partial_overrides() {
    let json = r#"{
        "predictor": "TwoLevel",
        "budget_bytes": 65536,
        "tage": { "max_history": 128 },
        "two_level": { "sets": 64 }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.predictor, PredictorKind::TwoLevel);
    assert_eq!(config.budget_bytes, 65536);
    assert_eq!(config.tage.max_history, 128);
    // Unspecified fields keep their defaults.
    assert_eq!(config.tage.base_index_bits, 14);
    assert_eq!(config.two_level.sets, 64);
    assert_eq!(config.two_level.history_bits, 4);
}

#[test]
fn json_predictor_kind_accepts_tage_alias() {
    let config: Config = serde_json::from_str(r#"{ "predictor": "TAGE" }"#).unwrap();
    assert_eq!(config.predictor, PredictorKind::Tage);
    let config: Config = serde_json::from_str(r#"{ "predictor": "Perceptron" }"#).unwrap();
    assert_eq!(config.predictor, PredictorKind::Perceptron);
}

#[test]
fn json_custom_table_spread() {
    let json = r#"{
        "tage": {
            "tables": [
                { "history": 8, "index_bits": 6, "tag_bits": 8 },
                { "history": 32, "index_bits": 5, "tag_bits": 10 }
            ]
        }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.tage.tables.len(), 2);
    assert_eq!(config.tage.tables[1].entries(), 32);
    assert!(config.tage.validate().is_ok());
}

#[test]
fn validate_rejects_empty_spread() {
    let tage = TageConfig {
        tables: Vec::new(),
        ..TageConfig::default()
    };
    assert_eq!(tage.validate(), Err(SetupError::NoTables));
}

#[test]
fn validate_rejects_non_increasing_histories() {
    let tage = TageConfig {
        tables: vec![
            TableSpec {
                history: 16,
                index_bits: 6,
                tag_bits: 8,
            },
            TableSpec {
                history: 16,
                index_bits: 6,
                tag_bits: 8,
            },
        ],
        ..TageConfig::default()
    };
    assert_eq!(
        tage.validate(),
        Err(SetupError::HistoryNotIncreasing {
            table: 1,
            len: 16,
            prev_len: 16
        })
    );
}

#[test]
fn validate_rejects_history_beyond_maximum() {
    let tage = TageConfig {
        max_history: 64,
        tables: vec![TableSpec {
            history: 128,
            index_bits: 6,
            tag_bits: 8,
        }],
        ..TageConfig::default()
    };
    assert_eq!(
        tage.validate(),
        Err(SetupError::HistoryTooLong {
            table: 0,
            len: 128,
            max: 64
        })
    );
}

#[test]
fn validate_rejects_unsupported_widths() {
    let wide_tag = TageConfig {
        tables: vec![TableSpec {
            history: 8,
            index_bits: 6,
            tag_bits: 16,
        }],
        ..TageConfig::default()
    };
    assert_eq!(
        wide_tag.validate(),
        Err(SetupError::TagWidthUnsupported {
            table: 0,
            bits: 16,
            max: defaults::MAX_TAG_BITS
        })
    );

    let zero_index = TageConfig {
        tables: vec![TableSpec {
            history: 8,
            index_bits: 0,
            tag_bits: 8,
        }],
        ..TageConfig::default()
    };
    assert_eq!(
        zero_index.validate(),
        Err(SetupError::IndexWidthUnsupported {
            table: 0,
            bits: 0,
            max: defaults::MAX_INDEX_BITS
        })
    );
}

#[test]
fn validate_rejects_unsupported_base_index_width() {
    let tage = TageConfig {
        base_index_bits: 48,
        ..TageConfig::default()
    };
    assert_eq!(
        tage.validate(),
        Err(SetupError::BaseIndexWidthUnsupported {
            bits: 48,
            max: defaults::MAX_INDEX_BITS
        })
    );
}

#[test]
fn two_level_validate_rejects_degenerate_geometry() {
    let no_sets = TwoLevelConfig {
        sets: 0,
        ..TwoLevelConfig::default()
    };
    assert_eq!(no_sets.validate(), Err(SetupError::NoSets));

    let wide_history = TwoLevelConfig {
        history_bits: 32,
        ..TwoLevelConfig::default()
    };
    assert_eq!(
        wide_history.validate(),
        Err(SetupError::LocalHistoryWidthUnsupported {
            bits: 32,
            max: defaults::MAX_TWO_LEVEL_HISTORY_BITS
        })
    );
}

#[test]
fn perceptron_validate_rejects_unsupported_geometry() {
    let wide_table = PerceptronConfig {
        table_bits: 40,
        ..PerceptronConfig::default()
    };
    assert_eq!(
        wide_table.validate(),
        Err(SetupError::WeightTableWidthUnsupported {
            bits: 40,
            max: defaults::MAX_INDEX_BITS
        })
    );

    let long_history = PerceptronConfig {
        history_length: 65,
        ..PerceptronConfig::default()
    };
    assert_eq!(
        long_history.validate(),
        Err(SetupError::HistoryLengthUnsupported {
            len: 65,
            max: defaults::MAX_PERCEPTRON_HISTORY
        })
    );
}

#[test]
fn storage_arithmetic_counts_true_bit_widths() {
    // 16 base counters * 2 bits + 10 history bits + 8 entries * (7 tag + 3
    // counter + 2 usefulness) + 4 meta bits = 142 bits = 18 bytes.
    let tage = TageConfig {
        base_index_bits: 4,
        max_history: 8,
        history_buffer: 2,
        tables: vec![TableSpec {
            history: 4,
            index_bits: 3,
            tag_bits: 7,
        }],
        ..TageConfig::default()
    };
    assert_eq!(tage.storage_bits(), 142);
    assert_eq!(tage.storage_bytes(), 18);
}

#[test]
fn default_spread_fits_default_budget() {
    let tage = TageConfig::default();
    assert_eq!(tage.storage_bits(), 251_044);
    assert_eq!(tage.storage_bytes(), 31_381);
    assert!(tage.storage_bytes() <= defaults::BUDGET_BYTES);
}

#[test]
fn perceptron_storage_is_one_byte_per_weight() {
    let config = Config::default();
    // 4096 rows * (32 history + 1 bias) weights.
    assert_eq!(config.perceptron.storage_bytes(), 4096 * 33);
}
