use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};

/// Directory name used under the platform configuration directory.
pub const CONFIG_DIR_NAME: &str = "lumen";

/// Expands a leading `~` (Unix or Windows separator) to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    if let Some(rest) = p.strip_prefix("~\\") {
        // Windows-style
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Path-typed variant of [`expand_tilde`]; paths that do not start with `~` are returned untouched.
pub fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.components().next() {
        Some(first) if first.as_os_str() == "~" => expand_tilde(&path.to_string_lossy()),
        _ => path.to_path_buf(),
    }
}

/// Resolves a file path from an environment override, falling back to
/// `<config_dir>/lumen/<file_name>`.
pub fn config_file_path(env_var: &str, file_name: &str) -> PathBuf {
    if let Ok(path) = std::env::var(env_var)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_untouched() {
        assert_eq!(expand_tilde("  /tmp/walkthroughs.json "), PathBuf::from("/tmp/walkthroughs.json"));
        assert_eq!(expand_tilde_path(Path::new("relative/file.json")), PathBuf::from("relative/file.json"));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/lumen/state.json"), home.join("lumen/state.json"));
            assert_eq!(expand_tilde_path(Path::new("~/state.json")), home.join("state.json"));
        }
    }

    #[test]
    fn config_file_path_honors_env_override() {
        temp_env::with_var("LUMEN_TEST_CONFIG_PATH", Some("/tmp/lumen-test/custom.json"), || {
            let path = config_file_path("LUMEN_TEST_CONFIG_PATH", "ignored.json");
            assert_eq!(path, PathBuf::from("/tmp/lumen-test/custom.json"));
        });
    }

    #[test]
    fn config_file_path_ignores_blank_override() {
        temp_env::with_var("LUMEN_TEST_BLANK_PATH", Some("   "), || {
            let path = config_file_path("LUMEN_TEST_BLANK_PATH", "state.json");
            assert!(path.ends_with("lumen/state.json"));
        });
    }
}
