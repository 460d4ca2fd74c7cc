use tempdir::TempDir;

use zk_provable::{BaseConfig, Composer, Config, ConstraintSystem, FieldType, MerkleListType, Mode};

#[test]
fn config_roundtrip() {
    let dir = TempDir::new("zk-provable").expect("failed to create temp dir");
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();

    config.with_mode(Mode::Native).with_list_prefix("stored");
    config.save(&path).expect("failed to save config");

    let loaded = Config::load_from(&path).expect("failed to load config");

    assert_eq!(loaded, config);
}

#[test]
fn malformed_config_is_rejected() {
    let dir = TempDir::new("zk-provable").expect("failed to create temp dir");
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "mode = 3").expect("failed to write config");

    Config::load_from(&path).expect_err("mode must be a string");
}

#[test]
fn configured_types_follow_the_config() {
    let mut config = Config::default();

    config.with_mode(Mode::Native).with_list_prefix("configured");

    let cs = ConstraintSystem::with_config(&config);
    let configured = MerkleListType::with_config(FieldType, &config).expect("short prefix");
    let prefixed = MerkleListType::with_prefix(FieldType, "configured").expect("short prefix");

    let mut a = configured.empty();
    let mut b = prefixed.empty();

    a.push(5u64.into()).expect("push");
    b.push(5u64.into()).expect("push");

    assert_eq!(a.hash(), b.hash());
    assert!(!cs.is_checked());
}
