use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;

/// A 24-bit color written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .with_context(|| format!("color {s:?} must start with '#'"))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("color {s:?} must be #RRGGBB");
        }
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .with_context(|| format!("invalid channel in color {s:?}"))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Colors used to draw task-item check boxes. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskPalette {
    pub box_color: Rgb,
    pub outline_color: Rgb,
    pub background_color: Rgb,
}

impl Default for TaskPalette {
    fn default() -> Self {
        Self {
            box_color: Rgb::new(0x62, 0x00, 0xEE),
            outline_color: Rgb::new(0x62, 0x00, 0xEE),
            background_color: Rgb::new(0xFF, 0xFF, 0xFF),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub task_box_color: Option<Rgb>,
    pub task_outline_color: Option<Rgb>,
    pub task_background_color: Option<Rgb>,
    pub perf: bool,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            task_box_color: other.task_box_color.or(self.task_box_color),
            task_outline_color: other.task_outline_color.or(self.task_outline_color),
            task_background_color: other.task_background_color.or(self.task_background_color),
            perf: self.perf || other.perf,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// Task palette with unset colors falling back to the defaults.
    pub fn palette(&self) -> TaskPalette {
        let defaults = TaskPalette::default();
        TaskPalette {
            box_color: self.task_box_color.unwrap_or(defaults.box_color),
            outline_color: self.task_outline_color.unwrap_or(defaults.outline_color),
            background_color: self
                .task_background_color
                .unwrap_or(defaults.background_color),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("markedit").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("markedit")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("markedit").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("markedit")
                .join("config");
        }
    }

    PathBuf::from(".markeditrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".markeditrc")
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
    lines.push("# markedit defaults (saved with --save)".to_string());
    if let Some(color) = flags.task_box_color {
        lines.push(format!("--task-box-color {color}"));
    }
    if let Some(color) = flags.task_outline_color {
        lines.push(format!("--task-outline-color {color}"));
    }
    if let Some(color) = flags.task_background_color {
        lines.push(format!("--task-background-color {color}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
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

/// Pick the known flags out of a token list. Unknown tokens and malformed
/// colors are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let takes_value = matches!(
            name,
            "--task-box-color" | "--task-outline-color" | "--task-background-color" | "--debug-log"
        );
        let value = if takes_value && inline_value.is_none() {
            i += 1;
            tokens.get(i).map(String::as_str)
        } else {
            inline_value
        };
        match (name, value) {
            ("--perf", None) => flags.perf = true,
            ("--task-box-color", Some(v)) => flags.task_box_color = v.parse().ok(),
            ("--task-outline-color", Some(v)) => flags.task_outline_color = v.parse().ok(),
            ("--task-background-color", Some(v)) => flags.task_background_color = v.parse().ok(),
            ("--debug-log", Some(v)) => flags.debug_log = Some(PathBuf::from(v)),
            _ => {}
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_rgb_parses_and_displays() {
        let color: Rgb = "#1a2B3c".parse().unwrap();
        assert_eq!(color, Rgb::new(0x1A, 0x2B, 0x3C));
        assert_eq!(color.to_string(), "#1A2B3C");
    }

    #[test]
    fn test_rgb_rejects_malformed_input() {
        assert!("1a2b3c".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#12345g".parse::<Rgb>().is_err());
        assert!("#ééé".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "markedit",
            "--task-box-color",
            "#FF0000",
            "--task-background-color=#000000",
            "--perf",
            "--debug-log=edit.log",
            "notes.md",
        ]);
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.task_box_color, Some(Rgb::new(0xFF, 0, 0)));
        assert_eq!(flags.task_outline_color, None);
        assert_eq!(flags.task_background_color, Some(Rgb::new(0, 0, 0)));
        assert!(flags.perf);
        assert_eq!(flags.debug_log, Some(PathBuf::from("edit.log")));
    }

    #[test]
    fn test_bad_color_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--task-box-color", "red", "--perf"]));
        assert_eq!(flags.task_box_color, None);
        assert!(flags.perf);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            perf: true,
            task_box_color: Some(Rgb::new(1, 1, 1)),
            task_outline_color: Some(Rgb::new(2, 2, 2)),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            task_box_color: Some(Rgb::new(9, 9, 9)),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.perf);
        assert_eq!(merged.task_box_color, Some(Rgb::new(9, 9, 9)));
        assert_eq!(merged.task_outline_color, Some(Rgb::new(2, 2, 2)));
    }

    #[test]
    fn test_palette_falls_back_to_defaults() {
        let flags = ConfigFlags {
            task_outline_color: Some(Rgb::new(0, 0x80, 0)),
            ..ConfigFlags::default()
        };
        let palette = flags.palette();
        assert_eq!(palette.outline_color, Rgb::new(0, 0x80, 0));
        assert_eq!(palette.box_color, TaskPalette::default().box_color);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".markeditrc");
        let flags = ConfigFlags {
            task_box_color: Some(Rgb::new(0x10, 0x20, 0x30)),
            task_outline_color: Some(Rgb::new(0x40, 0x50, 0x60)),
            task_background_color: Some(Rgb::new(0x70, 0x80, 0x90)),
            perf: true,
            debug_log: Some(PathBuf::from("edit.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }
}
