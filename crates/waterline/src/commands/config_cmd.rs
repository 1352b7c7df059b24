//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML-like text.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "refresh_interval = {}", cfg.defaults.refresh_interval);
    let _ = writeln!(out, "max_level_cm = {}", cfg.defaults.max_level_cm);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "endpoint = \"{}\"", p.endpoint);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.refresh_interval {
            let _ = writeln!(out, "refresh_interval = {interval}");
        }
        if let Some(max) = p.max_level_cm {
            let _ = writeln!(out, "max_level_cm = {max}");
        }
    }

    out.trim_end().to_owned()
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}, got '{value}'"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "endpoint" | "url" => {
            let url = waterline_config::parse_endpoint(value)?;
            profile.endpoint = url.to_string();
        }
        "timeout" => profile.timeout = Some(parse_value(key, value, "a number of seconds")?),
        "refresh_interval" | "refresh-interval" => {
            profile.refresh_interval = Some(parse_value(key, value, "a number of seconds")?);
        }
        "max_level_cm" | "max-level-cm" => {
            let max: f64 = parse_value(key, value, "a positive number")?;
            if !(max.is_finite() && max > 0.0) {
                return Err(CliError::Validation {
                    field: key.into(),
                    reason: "must be a positive number".into(),
                });
            }
            profile.max_level_cm = Some(max);
        }
        "insecure" => profile.insecure = Some(parse_value(key, value, "'true' or 'false'")?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: endpoint, timeout, \
                     refresh_interval, max_level_cm, insecure, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, &value)?;

            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: waterline config init");
                return Ok(());
            }
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            let lines: Vec<String> = names
                .into_iter()
                .map(|name| {
                    let marker = if name == default { " *" } else { "" };
                    format!("{name}{marker}")
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

/// Interactive wizard: adds (or replaces) one profile and makes it default.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("Waterline configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&profile_name) {
        let replace = Confirm::new()
            .with_prompt(format!("Profile '{profile_name}' exists. Replace it?"))
            .default(false)
            .interact()
            .map_err(prompt_err)?;
        if !replace {
            eprintln!("Nothing changed.");
            return Ok(());
        }
    }

    let endpoint: String = Input::new()
        .with_prompt("Feed URL")
        .validate_with(|input: &String| {
            waterline_config::parse_endpoint(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let refresh_interval: u64 = Input::new()
        .with_prompt("Refresh interval (seconds)")
        .default(cfg.defaults.refresh_interval)
        .interact_text()
        .map_err(prompt_err)?;

    let max_level_cm: f64 = Input::new()
        .with_prompt("Gauge full scale (cm)")
        .default(cfg.defaults.max_level_cm)
        .validate_with(|v: &f64| {
            if v.is_finite() && *v > 0.0 {
                Ok(())
            } else {
                Err("must be a positive number")
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let profile = Profile {
        endpoint: endpoint.trim().to_owned(),
        refresh_interval: Some(refresh_interval),
        max_level_cm: Some(max_level_cm),
        ..Profile::default()
    };
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: waterline latest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_validates_and_applies_keys() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "endpoint", "https://example.com/exec").is_ok());
        assert_eq!(profile.endpoint, "https://example.com/exec");

        assert!(set_profile_key(&mut profile, "refresh-interval", "15").is_ok());
        assert_eq!(profile.refresh_interval, Some(15));

        assert!(set_profile_key(&mut profile, "max_level_cm", "0").is_err());
        assert!(set_profile_key(&mut profile, "timeout", "soon").is_err());
        assert!(set_profile_key(&mut profile, "endpoint", "ftp://x").is_err());
        assert!(set_profile_key(&mut profile, "colour", "red").is_err());
    }

    #[test]
    fn show_lists_profiles_sorted() {
        let mut cfg = Config::default();
        for name in ["tank-b", "tank-a"] {
            cfg.profiles.insert(
                name.into(),
                Profile {
                    endpoint: format!("https://example.com/{name}"),
                    ..Profile::default()
                },
            );
        }
        let text = format_config(&cfg);
        let a = text.find("[profiles.tank-a]");
        let b = text.find("[profiles.tank-b]");
        assert!(a.is_some() && a < b);
        assert!(text.contains("refresh_interval = 60"));
    }
}
