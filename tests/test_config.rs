use portico::config::{Config, LISTEN_VAR, SCRIPT_BASE_VAR, SERVER_NAME_VAR};

// Environment variables are process-wide, so every env-dependent check
// lives in this one test.
#[test]
fn test_config_env_layers() {
    unsafe {
        std::env::remove_var("PORTICO_CONFIG");
        std::env::remove_var(LISTEN_VAR);
        std::env::remove_var(SERVER_NAME_VAR);
        std::env::remove_var(SCRIPT_BASE_VAR);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");

    unsafe {
        std::env::set_var(LISTEN_VAR, "0.0.0.0:3000");
        std::env::set_var(SCRIPT_BASE_VAR, "/app");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.script_base, "/app");
    assert_eq!(cfg.server_name, "127.0.0.1");

    unsafe {
        std::env::set_var("PORTICO_CONFIG", "/definitely/not/here.yaml");
    }
    assert!(Config::load().is_err());

    unsafe {
        std::env::remove_var("PORTICO_CONFIG");
        std::env::remove_var(LISTEN_VAR);
        std::env::remove_var(SCRIPT_BASE_VAR);
    }
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml("server_name: example.org\nscript_base: /shop\n").unwrap();

    assert_eq!(cfg.server_name, "example.org");
    assert_eq!(cfg.script_base, "/shop");
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
}

#[test]
fn test_config_from_yaml_rejects_garbage() {
    assert!(Config::from_yaml("listen_addr: [1, 2").is_err());
}

#[test]
fn test_config_server_context() {
    let cfg = Config {
        listen_addr: "0.0.0.0:5000".to_string(),
        server_name: "svc.local".to_string(),
        script_base: "/api".to_string(),
    };
    let ctx = cfg.server_context();

    assert_eq!(ctx.server_port, 5000);
    assert_eq!(ctx.server_name, "svc.local");
    assert_eq!(ctx.script_base, "/api");
}

#[test]
fn test_config_listen_port_fallbacks() {
    let mut cfg = Config::default();
    cfg.listen_addr = "localhost:9000".to_string();
    assert_eq!(cfg.listen_port(), 9000);

    cfg.listen_addr = "localhost".to_string();
    assert_eq!(cfg.listen_port(), 0);
}
