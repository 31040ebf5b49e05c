use std::path::PathBuf;

use clap::ArgMatches;
use tracing::debug;

use cage_core::{ConfigLoader, ConfigPaths};

/// Build a loader from the discovered paths, applying `--config-dir` and
/// `--repo-root` when given.
pub fn config_loader(matches: &ArgMatches) -> ConfigLoader {
    let discovered = ConfigPaths::discover();
    let overrides = ConfigPaths::new(
        matches.get_one::<PathBuf>("config-dir").cloned(),
        matches.get_one::<PathBuf>("repo-root").cloned(),
    );

    let paths = ConfigPaths {
        global_file: overrides.global_file.or(discovered.global_file),
        repo_file: overrides.repo_file.or(discovered.repo_file),
        home_dir: discovered.home_dir,
    };
    debug!(
        event = "cli.config_paths_resolved",
        global_file = ?paths.global_file,
        repo_file = ?paths.repo_file
    );

    ConfigLoader::new(paths)
}

/// Repository name for overlay lookup: `--repo`, else the final component
/// of the repository root.
pub fn repo_name(matches: &ArgMatches) -> Option<String> {
    if let Some(repo) = matches.get_one::<String>("repo") {
        return Some(repo.clone());
    }

    let root = match matches.get_one::<PathBuf>("repo-root") {
        Some(root) => root.clone(),
        None => std::env::current_dir().ok()?,
    };
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_cli;
    use std::path::Path;

    fn effective_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["cage", "config", "effective"];
        argv.extend_from_slice(args);
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        matches
            .subcommand_matches("config")
            .and_then(|m| m.subcommand_matches("effective"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_config_loader_applies_overrides() {
        let matches = effective_matches(&["--config-dir", "/etc/cage", "--repo-root", "/work/site"]);
        let loader = config_loader(&matches);

        assert_eq!(
            loader.paths().global_file.as_deref(),
            Some(Path::new("/etc/cage/config.json"))
        );
        assert_eq!(
            loader.paths().repo_file.as_deref(),
            Some(Path::new("/work/site/.cage/config.json"))
        );
    }

    #[test]
    fn test_repo_name_from_flag() {
        let matches = effective_matches(&["--repo", "api", "--repo-root", "/work/site"]);
        assert_eq!(repo_name(&matches).as_deref(), Some("api"));
    }

    #[test]
    fn test_repo_name_from_repo_root() {
        let matches = effective_matches(&["--repo-root", "/work/site"]);
        assert_eq!(repo_name(&matches).as_deref(), Some("site"));
    }
}
