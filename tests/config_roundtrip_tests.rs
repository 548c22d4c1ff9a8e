use fritz_watcher::config::{Config, ConfigError, ConfigStore};

/// Integration tests for the persisted configuration record: a created
/// config must re-load byte-for-byte equal in meaning, with the password
/// stored only in encrypted form.

fn entered_config() -> Config {
    Config {
        router_address: "192.168.178.1".into(),
        user: "fritz3000".into(),
        password: "correct horse battery staple".into(),
        max_upload_mbit: 40.0,
        max_download_mbit: 100.0,
    }
}

#[test]
fn created_config_loads_back_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::new(dir.path().join("config.toml"));

    store.save(&entered_config()).expect("save failed");
    let loaded = store.load().expect("load failed");

    assert_eq!(loaded.router_address, "192.168.178.1");
    assert_eq!(loaded.user, "fritz3000");
    assert_eq!(loaded.max_upload_mbit, 40.0);
    assert_eq!(loaded.max_download_mbit, 100.0);
    // The plaintext survives the round trip even though only a ciphertext
    // ever touches the disk.
    assert_eq!(loaded.password, "correct horse battery staple");
}

#[test]
fn record_uses_the_installation_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::new(dir.path().join("config.toml"));
    store.save(&entered_config()).expect("save failed");

    let text = std::fs::read_to_string(store.path()).expect("read failed");
    for field in ["[FritzBox]", "fritzUser", "fritzPass", "key", "maxUpload", "maxDownload", "ip"] {
        assert!(text.contains(field), "record is missing {field}");
    }
    assert!(!text.contains("correct horse battery staple"));
}

#[test]
fn two_saves_produce_different_ciphertexts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::new(dir.path().join("config.toml"));

    store.save(&entered_config()).expect("save failed");
    let first = std::fs::read_to_string(store.path()).expect("read failed");
    store.save(&entered_config()).expect("save failed");
    let second = std::fs::read_to_string(store.path()).expect("read failed");

    // Fresh key and nonce per save; both still decrypt to the same password.
    assert_ne!(first, second);
    assert_eq!(store.load().expect("load failed").password, "correct horse battery staple");
}

#[test]
fn truncated_record_is_a_fatal_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::new(dir.path().join("config.toml"));
    store.save(&entered_config()).expect("save failed");

    let text = std::fs::read_to_string(store.path()).expect("read failed");
    let without_user: String = text
        .lines()
        .filter(|line| !line.contains("fritzUser"))
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(store.path(), without_user).expect("write failed");

    assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
}
