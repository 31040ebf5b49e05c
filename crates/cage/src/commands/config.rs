use clap::ArgMatches;
use serde_json::json;
use tracing::{error, info};

use cage_core::config::{SourceStatus, render_defaults, render_with_sources};
use cage_core::{CageError, LaunchProfile, default_config, events};

use super::helpers::{config_loader, repo_name};

pub(crate) fn handle_config_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => handle_show_command(sub_matches),
        Some(("defaults", sub_matches)) => handle_defaults_command(sub_matches),
        Some(("paths", sub_matches)) => handle_paths_command(sub_matches),
        Some(("effective", sub_matches)) => handle_effective_command(sub_matches),
        _ => {
            error!(event = "cli.config_subcommand_unknown");
            Err("Unknown config subcommand".into())
        }
    }
}

fn handle_show_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.config_show_started", json_output = json_output);

    let loader = config_loader(matches);
    match loader.load_all_with_sources() {
        Ok((config, provenance)) => {
            if json_output {
                let document = json!({ "config": config, "provenance": provenance });
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                let home = loader.paths().home_dir.as_deref();
                print!("{}", render_with_sources(&config, &provenance, home));
            }

            info!(event = "cli.config_show_completed");
            Ok(())
        }
        Err(e) => {
            error!(
                event = "cli.config_show_failed",
                error = %e,
                error_code = e.error_code()
            );

            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_defaults_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.config_defaults_started", json_output = json_output);

    let config = default_config();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", render_defaults(&config));
    }

    info!(event = "cli.config_defaults_completed");
    Ok(())
}

fn handle_paths_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.config_paths_started", json_output = json_output);

    let sources = config_loader(matches).sources();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&sources)?);
    } else {
        for source in &sources {
            println!("{}", format_source_line(source));
        }
    }

    info!(event = "cli.config_paths_completed", count = sources.len());
    Ok(())
}

fn format_source_line(source: &SourceStatus) -> String {
    let path = source
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<8} {:<8} {}",
        source.kind.to_string(),
        source.status.to_string(),
        path
    )
}

fn handle_effective_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let repo = repo_name(matches);
    let tool_override = matches.get_one::<String>("tool").map(String::as_str);

    info!(
        event = "cli.config_effective_started",
        repo = ?repo,
        tool_override = ?tool_override,
        json_output = json_output
    );

    let config = match config_loader(matches).load() {
        Ok(config) => config,
        Err(e) => {
            error!(
                event = "cli.config_effective_failed",
                error = %e,
                error_code = e.error_code()
            );

            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    match LaunchProfile::resolve(&config, repo.as_deref(), tool_override) {
        Ok(profile) => {
            if json_output {
                let mut document = serde_json::to_value(&profile)?;
                document["mount_paths"] = json!(profile.mount_paths());
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                print!("{}", format_profile(&profile));
            }

            info!(event = "cli.config_effective_completed", tool = %profile.tool);
            Ok(())
        }
        Err(e) => {
            error!(
                event = "cli.config_effective_failed",
                error = %e,
                error_code = e.error_code()
            );

            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn format_profile(profile: &LaunchProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("tool:    {}\n", profile.tool));
    out.push_str(&format!(
        "repo:    {}\n",
        profile.repo.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("backend: {}\n", profile.backend));

    let sections = [
        ("mounts_ro", &profile.mounts_ro),
        ("mounts_rw", &profile.mounts_rw),
        ("env", &profile.env),
        ("pre_run_hooks", &profile.pre_run_hooks),
        ("post_build_hooks", &profile.post_build_hooks),
    ];
    for (name, values) in sections {
        if values.is_empty() {
            out.push_str(&format!("{name}: (none)\n"));
            continue;
        }
        out.push_str(&format!("{name}:\n"));
        for value in values {
            out.push_str(&format!("  {value}\n"));
        }
    }
    out
}
