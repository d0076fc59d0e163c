//! 設定ファイルの読み書きテスト

use inspect_ai_rust::config::{Config, JwtSettings, DEFAULT_ANALYSIS_URL};
use inspect_ai_rust::error::InspectAiError;
use tempfile::tempdir;

/// 設定ファイルがなければ既定値
#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.analysis_url, DEFAULT_ANALYSIS_URL);
    assert_eq!(config.timeout_seconds, 30);
}

/// 保存した設定を読み戻せる（親ディレクトリは自動作成）
#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_analysis_url("http://localhost:8080/analyze".to_string()).unwrap();
    config.timeout_seconds = 10;
    config.jwt = JwtSettings {
        url: Some("http://localhost:8080/jwt".to_string()),
        user: Some("inspector".to_string()),
        password: None,
        authorization: None,
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

/// 一部のキーだけの設定ファイルは残りを既定値で補う
#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"timeout_seconds": 5}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.timeout_seconds, 5);
    assert_eq!(config.jpeg_quality, 85);
    assert_eq!(config.max_image_size, 1568);
}

/// 壊れた設定ファイルはJSONエラー
#[test]
fn test_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(InspectAiError::JsonParse(_))));
}
