//! Shared helpers for CLI commands: project root resolution, configuration
//! loading and architecture list parsing.

use std::path::{Path, PathBuf};

use fabex_arch::ArchPoint;
use fabex_config::{resolve_paths, ExploreConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `fabex.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `fabex.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads the project configuration with every path resolved against the project root.
pub fn load_project(global: &GlobalArgs) -> Result<ExploreConfig, Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let mut config = fabex_config::load_config(&root)
        .map_err(|e| format!("{}: {e}", root.join(CONFIG_FILE).display()))?;
    config.paths = resolve_paths(&config.paths, &root);
    Ok(config)
}

/// Loads the project configuration if one can be found, for commands that
/// also work without one.
pub fn try_load_project(
    global: &GlobalArgs,
) -> Result<Option<ExploreConfig>, Box<dyn std::error::Error>> {
    if global.config.is_none() && find_project_root(&std::env::current_dir()?).is_err() {
        return Ok(None);
    }
    load_project(global).map(Some)
}

/// Parses an architecture list: one label per line, blank lines and `#`
/// comments ignored.
pub fn parse_point_list(text: &str) -> Result<Vec<ArchPoint>, Box<dyn std::error::Error>> {
    text.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(n, line)| {
            line.parse::<ArchPoint>()
                .map_err(|e| Box::<dyn std::error::Error>::from(format!("line {n}: {e}")))
        })
        .collect()
}

/// Collects points from positional labels followed by an optional list file.
pub fn collect_points(
    labels: &[String],
    list: Option<&Path>,
) -> Result<Vec<ArchPoint>, Box<dyn std::error::Error>> {
    let mut points = labels
        .iter()
        .map(|l| l.parse::<ArchPoint>())
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(path) = list {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        points.extend(
            parse_point_list(&text).map_err(|e| format!("{}: {e}", path.display()))?,
        );
    }
    if points.is_empty() {
        return Err("no architectures given (pass labels or --list)".into());
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const A: &str = "k4_s2_wilton_topology-single-wirelength_fcin0.3_fcout0.6";
    const B: &str = "k6_s4_g16_universal_topology-on-cbsb-off-cbsb_fcin0.05_fcout0.2";

    fn global(config: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: config.map(|p| p.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn list_skips_blanks_and_comments() {
        let text = format!("# sweep\n{A}\n\n   \n{B}  # prime topology\n");
        let points = parse_point_list(&text).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label(), A);
        assert_eq!(points[1].label(), B);
    }

    #[test]
    fn list_reports_bad_line() {
        let err = parse_point_list(&format!("{A}\nk5_s2_bogus\n")).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn labels_come_before_list_entries() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("archs.txt");
        fs::write(&list, format!("{A}\n")).unwrap();
        let points = collect_points(&[B.to_string()], Some(&list)).unwrap();
        assert_eq!(points[0].label(), B);
        assert_eq!(points[1].label(), A);
    }

    #[test]
    fn empty_selection_is_an_error() {
        assert!(collect_points(&[], None).is_err());
    }

    #[test]
    fn project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(CONFIG_FILE);
        fs::write(&config_path, "").unwrap();
        let root = resolve_project_root(&global(Some(&config_path))).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn project_paths_are_resolved_against_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[paths]\narch_base = \"archs\"\nrouter = \"/opt/vtr/vpr\"\n",
        )
        .unwrap();
        let config = load_project(&global(Some(tmp.path()))).unwrap();
        assert_eq!(config.paths.arch_base, tmp.path().join("archs"));
        assert_eq!(config.paths.router, PathBuf::from("/opt/vtr/vpr"));
        assert_eq!(config.paths.work_dir, tmp.path().join("work"));
    }

    #[test]
    fn find_project_root_walks_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let nested = tmp.path().join("runs/today");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested).unwrap(), tmp.path());
    }
}
