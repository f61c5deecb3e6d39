use relaycache::config::{CONFIG_ENV, Config, LISTEN_ENV};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:54321");
    assert_eq!(cfg.origin.default_port, 80);
}

#[test]
fn test_config_from_yaml() {
    let raw = "server:\n  listen_addr: \"0.0.0.0:3128\"\norigin:\n  default_port: 8080\n";
    let cfg = Config::from_yaml_str(raw).unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3128");
    assert_eq!(cfg.origin.default_port, 8080);
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str("origin:\n  default_port: 8000\n").unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:54321");
    assert_eq!(cfg.origin.default_port, 8000);
}

#[test]
fn test_config_rejects_bad_port() {
    assert!(Config::from_yaml_str("origin:\n  default_port: 70000\n").is_err());
}

#[test]
fn test_config_missing_file_is_error() {
    let err = Config::from_file("/nonexistent/relaycache.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

// Only this test touches the process environment.
#[test]
fn test_config_load_from_env() {
    let path = std::env::temp_dir().join(format!("relaycache-{}.yaml", std::process::id()));
    std::fs::write(&path, "server:\n  listen_addr: \"127.0.0.1:9000\"\n").unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
        std::env::remove_var(LISTEN_ENV);
    }
    let from_file = Config::load().unwrap();

    unsafe {
        std::env::set_var(LISTEN_ENV, "0.0.0.0:5000");
    }
    let overridden = Config::load().unwrap();

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(LISTEN_ENV);
    }
    std::fs::remove_file(&path).unwrap();

    assert_eq!(from_file.server.listen_addr, "127.0.0.1:9000");
    assert_eq!(overridden.server.listen_addr, "0.0.0.0:5000");
    assert_eq!(overridden.origin.default_port, 80);
}
