use ig_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing any issues.  Also reports
/// whether the key env vars it names are populated, without printing them.
///
/// Returns `false` when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    let key_env = &config.encryption.key_env;
    let key_set = std::env::var(key_env).is_ok_and(|v| !v.trim().is_empty());
    println!(
        "{key_env}: {}",
        if key_set { "set" } else { "NOT SET (sessions cannot be sealed)" }
    );

    if issues.is_empty() {
        println!("Config OK ({config_path})");
    } else {
        println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");
    }

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    print!("{output}");
    Ok(())
}
