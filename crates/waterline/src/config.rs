//! CLI configuration: a thin wrapper around `waterline_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--endpoint,
//! --insecure, --timeout) on top of the shared profile types.

use waterline_core::MonitorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use waterline_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Build a `MonitorConfig` from the config file, the selected profile, and
/// CLI overrides. Flags take priority over profile values, which take
/// priority over `[defaults]`.
pub fn resolve_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None if global.endpoint.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);
    Ok(waterline_config::profile_to_monitor_config(
        &profile,
        &cfg.defaults,
    )?)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint.clone_from(endpoint);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ColorMode, OutputFormat};

    fn global() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            endpoint: None,
            output: OutputFormat::Table,
            color: ColorMode::Never,
            verbose: 0,
            quiet: false,
            insecure: false,
            timeout: None,
        }
    }

    #[test]
    fn flags_override_profile_values() {
        let mut profile = Profile {
            endpoint: "https://old.example.com/exec".into(),
            timeout: Some(10),
            ..Profile::default()
        };
        let opts = GlobalOpts {
            endpoint: Some("https://new.example.com/exec".into()),
            insecure: true,
            timeout: Some(3),
            ..global()
        };
        apply_overrides(&mut profile, &opts);
        assert_eq!(profile.endpoint, "https://new.example.com/exec");
        assert_eq!(profile.insecure, Some(true));
        assert_eq!(profile.timeout, Some(3));
    }

    #[test]
    fn absent_flags_leave_profile_alone() {
        let mut profile = Profile {
            endpoint: "https://feed.example.com/exec".into(),
            timeout: Some(10),
            ..Profile::default()
        };
        apply_overrides(&mut profile, &global());
        assert_eq!(profile.timeout, Some(10));
        assert_eq!(profile.insecure, None);
    }

    #[test]
    fn profile_flag_wins_over_default() {
        let cfg = Config::default();
        assert_eq!(active_profile_name(&global(), &cfg), "default");
        let opts = GlobalOpts {
            profile: Some("tank".into()),
            ..global()
        };
        assert_eq!(active_profile_name(&opts, &cfg), "tank");
        assert_eq!(available_profiles(&cfg), "(none)");
    }
}
