use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Render flags that can be saved as defaults in a `.clinmarkrc` file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub pdf: bool,
    pub margin: Option<f32>,
    pub line_height: Option<f32>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            pdf: self.pdf || other.pdf,
            margin: other.margin.or(self.margin),
            line_height: other.line_height.or(self.line_height),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("clinmark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("clinmark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("clinmark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("clinmark")
                .join("config");
        }
    }

    PathBuf::from(".clinmarkrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".clinmarkrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# clinmark defaults (saved with --save)".to_string());
    if flags.pdf {
        lines.push("--pdf".to_string());
    }
    if let Some(margin) = flags.margin {
        lines.push(format!("--margin {margin}"));
    }
    if let Some(line_height) = flags.line_height {
        lines.push(format!("--line-height {line_height}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--pdf" {
            flags.pdf = true;
        } else if token == "--margin" {
            if let Some(next) = tokens.get(i + 1) {
                flags.margin = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--margin=") {
            flags.margin = value.parse().ok();
        } else if token == "--line-height" {
            if let Some(next) = tokens.get(i + 1) {
                flags.line_height = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--line-height=") {
            flags.line_height = value.parse().ok();
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "clinmark".to_string(),
            "--pdf".to_string(),
            "--margin".to_string(),
            "15".to_string(),
            "--line-height=5.5".to_string(),
            "note.txt".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.pdf);
        assert_eq!(flags.margin, Some(15.0));
        assert_eq!(flags.line_height, Some(5.5));
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            pdf: true,
            margin: Some(25.0),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            margin: Some(15.0),
            line_height: Some(7.0),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.pdf);
        assert_eq!(merged.margin, Some(15.0));
        assert_eq!(merged.line_height, Some(7.0));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".clinmarkrc");
        let flags = ConfigFlags {
            pdf: true,
            margin: Some(18.0),
            line_height: Some(6.5),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
