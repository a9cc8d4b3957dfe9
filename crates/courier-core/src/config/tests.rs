use super::*;

#[test]
fn test_defaults_when_empty() {
    let cfg = parse("").unwrap();
    assert_eq!(cfg.courier.name, "Courier");
    assert_eq!(cfg.discord.command_prefix, "!");
    assert_eq!(cfg.tracker.poll_interval_secs, 10);
    assert_eq!(cfg.tracker.timezone, "America/New_York");
    assert_eq!(cfg.tracker.destination, DestinationMode::Append);
    assert_eq!(cfg.tracker.default_ping, PingDefault::Everyone);
    assert!(cfg.shop.channel_id.is_empty());
    assert_eq!(cfg.payments.file, "~/.courier/payments.json");
}

#[test]
fn test_full_config_from_toml() {
    let toml_str = r#"
        [courier]
        data_dir = "/var/lib/courier"
        log_level = "debug"

        [discord]
        bot_token = "abc"
        command_prefix = "?"
        owners = ["1006450046876778566"]
        staff_roles = ["111", "222"]

        [tracker]
        endpoint = "http://localhost:9000/status"
        poll_interval_secs = 5
        destination = "edit"
        default_ping = "requester"

        [shop]
        channel_id = "999"
        open_label = "open-now"
        closed_label = "closed-now"

        [payments]
        file = "/tmp/payments.json"
    "#;
    let cfg = parse(toml_str).unwrap();
    assert_eq!(cfg.courier.data_dir, "/var/lib/courier");
    assert_eq!(cfg.discord.command_prefix, "?");
    assert_eq!(cfg.discord.owners, vec!["1006450046876778566"]);
    assert_eq!(cfg.discord.staff_roles.len(), 2);
    assert_eq!(cfg.tracker.endpoint, "http://localhost:9000/status");
    assert_eq!(cfg.tracker.poll_interval_secs, 5);
    assert_eq!(cfg.tracker.request_timeout_secs, 15);
    assert_eq!(cfg.tracker.destination, DestinationMode::Edit);
    assert_eq!(cfg.tracker.default_ping, PingDefault::Requester);
    assert_eq!(cfg.shop.open_label, "open-now");
    assert_eq!(cfg.payments.file, "/tmp/payments.json");
}

#[test]
fn test_zero_interval_rejected() {
    let err = parse("[tracker]\npoll_interval_secs = 0").unwrap_err();
    assert!(matches!(err, CourierError::Config(_)));
}

#[test]
fn test_invalid_destination_rejected() {
    let err = parse("[tracker]\ndestination = \"sideways\"").unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let cfg = load("/nonexistent/__courier_config__.toml").unwrap();
    assert_eq!(cfg.tracker.poll_interval_secs, 10);
}

#[test]
fn test_load_from_file() {
    let dir = std::env::temp_dir().join(format!("__courier_cfg_test_{}__", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("config.toml");
    std::fs::write(&path, "[shop]\nchannel_id = \"42\"\n").unwrap();

    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.shop.channel_id, "42");
    assert_eq!(cfg.shop.closed_label, "🔴-closed");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_resolved_token_prefers_config() {
    let cfg = DiscordConfig {
        bot_token: "from-config".into(),
        ..Default::default()
    };
    assert_eq!(cfg.resolved_token().as_deref(), Some("from-config"));
}

#[test]
fn test_shellexpand_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let expanded = shellexpand("~/.courier/payments.json");
        assert_eq!(
            expanded,
            format!("{}/.courier/payments.json", home.to_string_lossy())
        );
    }
    assert_eq!(shellexpand("/abs/path"), "/abs/path");
}
