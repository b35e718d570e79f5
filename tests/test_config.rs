use strand::config::{Config, LISTEN_ENV, Limits};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:5000");
    assert_eq!(cfg.server.read_buffer_size, 4096);
    assert!(cfg.server.error_responses);
    assert_eq!(cfg.limits, Limits::default());
}

#[test]
fn test_limits_defaults() {
    let limits = Limits::default();
    assert_eq!(limits.max_method_len, 255);
    assert_eq!(limits.max_path_len, 4096);
    assert_eq!(limits.max_request_len, 10 * 1024 * 1024);
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml(
        "server:\n  listen_addr: 0.0.0.0:3000\nlimits:\n  max_path_len: 128\n",
    )
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.server.read_buffer_size, 4096);
    assert_eq!(cfg.limits.max_path_len, 128);
    assert_eq!(cfg.limits.max_method_len, 255);
}

#[test]
fn test_config_from_yaml_error_responses_off() {
    let cfg = Config::from_yaml("server:\n  error_responses: false\n").unwrap();
    assert!(!cfg.server.error_responses);
}

#[test]
fn test_config_from_yaml_rejects_bad_types() {
    assert!(Config::from_yaml("limits:\n  max_path_len: lots\n").is_err());
}

#[test]
fn test_config_listen_env_override() {
    unsafe {
        std::env::set_var(LISTEN_ENV, "0.0.0.0:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    unsafe {
        std::env::remove_var(LISTEN_ENV);
    }
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.listen_addr, cfg2.server.listen_addr);
}
