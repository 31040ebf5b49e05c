use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;

pub fn build_cli() -> Command {
    Command::new("cage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run third-party CLI tools inside containers")
        .long_about("CAGE sandboxes CLI tools inside containers, mounting host paths and passing environment variables according to layered configuration: compiled-in defaults, a global config file and a per-repository config file.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .help("Directory holding the global config.json (overrides $CAGE_CONFIG_DIR)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("repo-root")
                .long("repo-root")
                .help("Repository root holding .cage/config.json (default: current directory)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("config")
                .about("Inspect the resolved configuration")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("show")
                        .about("Show the effective configuration with the origin of every value")
                        .arg(json_flag())
                )
                .subcommand(
                    Command::new("defaults")
                        .about("Show the compiled-in default configuration")
                        .arg(json_flag())
                )
                .subcommand(
                    Command::new("paths")
                        .about("List configuration layers and whether each is present")
                        .arg(json_flag())
                )
                .subcommand(
                    Command::new("effective")
                        .about("Show what a tool launch would use: mounts, env and hooks")
                        .arg(
                            Arg::new("repo")
                                .long("repo")
                                .short('r')
                                .help("Repository overlay to apply (default: name of the repository root)")
                        )
                        .arg(
                            Arg::new("tool")
                                .long("tool")
                                .short('t')
                                .help("Tool to launch (overrides config)")
                        )
                        .arg(json_flag())
                )
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .index(1)
                        .value_parser(value_parser!(Shell))
                )
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "cage");
    }

    #[test]
    fn test_cli_config_show_command() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["cage", "config", "show", "--json"]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        let config_matches = matches.subcommand_matches("config").unwrap();
        let show_matches = config_matches.subcommand_matches("show").unwrap();
        assert!(show_matches.get_flag("json"));
    }

    #[test]
    fn test_cli_config_requires_subcommand() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["cage", "config"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_global_paths_after_subcommand() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec![
            "cage",
            "config",
            "paths",
            "--config-dir",
            "/tmp/cage",
            "--repo-root",
            "/work/site",
        ]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        let paths_matches = matches
            .subcommand_matches("config")
            .and_then(|m| m.subcommand_matches("paths"))
            .unwrap();
        assert_eq!(
            paths_matches.get_one::<PathBuf>("config-dir").unwrap(),
            &PathBuf::from("/tmp/cage")
        );
        assert_eq!(
            paths_matches.get_one::<PathBuf>("repo-root").unwrap(),
            &PathBuf::from("/work/site")
        );
    }

    #[test]
    fn test_cli_effective_command() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec![
            "cage", "config", "effective", "--repo", "site", "-t", "codex",
        ]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        let effective = matches
            .subcommand_matches("config")
            .and_then(|m| m.subcommand_matches("effective"))
            .unwrap();
        assert_eq!(effective.get_one::<String>("repo").unwrap(), "site");
        assert_eq!(effective.get_one::<String>("tool").unwrap(), "codex");
    }

    #[test]
    fn test_cli_completions_invalid_shell() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["cage", "completions", "cmd.exe"]);
        assert!(matches.is_err());
    }
}
