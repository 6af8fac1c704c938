use crate::constants::{DEFAULT_CPUS, DEFAULT_DOMAINS, DEFAULT_IMAGE, DEFAULT_MEMORY, SESSION_PREFIX};
use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// The persisted configuration tree. Every field has a default so that a
/// missing file (or the wizard's minimal write) still yields a usable
/// dashboard.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    pub session: SessionConfig,
    pub firewall: FirewallConfig,
    pub daemon: DaemonConfig,
    pub ui: UiConfig,
    pub wizard: WizardConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SessionConfig {
    /// Name prefix identifying containers managed by this tool.
    pub prefix: String,
    /// Image used when creating new sessions.
    pub image: String,
    /// Memory limit passed to the runtime, e.g. "4g".
    pub memory: String,
    /// CPU limit passed to the runtime, e.g. "2".
    pub cpus: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prefix: SESSION_PREFIX.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            memory: DEFAULT_MEMORY.to_string(),
            cpus: DEFAULT_CPUS.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FirewallConfig {
    /// Domains sessions are allowed to reach.
    pub domains: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            domains: DEFAULT_DOMAINS.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DaemonConfig {
    /// Desktop notifications from the monitoring daemon.
    pub notifications: bool,
    /// Automatic credential refresh into running sessions.
    pub token_refresh: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            notifications: true,
            token_refresh: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct UiConfig {
    /// Show the footer hint line and welcome tips.
    pub show_tips: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { show_tips: true }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct WizardConfig {
    /// Force the setup wizard on every start (mainly for development).
    pub always_run: bool,
    /// Set while an external authentication handoff is pending; makes the
    /// next start re-enter the wizard directly at the auth step.
    pub resume_after_auth: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Primary accent color (default: "cyan").
    #[serde(
        default = "ThemeConfig::default_accent",
        deserialize_with = "deserialize_color"
    )]
    pub accent: ThemeColor,
    /// Success/positive color (default: "green").
    #[serde(
        default = "ThemeConfig::default_success",
        deserialize_with = "deserialize_color"
    )]
    pub success: ThemeColor,
    /// Error color (default: "red").
    #[serde(
        default = "ThemeConfig::default_error",
        deserialize_with = "deserialize_color"
    )]
    pub error: ThemeColor,
    /// Warning color (default: "yellow").
    #[serde(
        default = "ThemeConfig::default_warning",
        deserialize_with = "deserialize_color"
    )]
    pub warning: ThemeColor,
    /// Muted/dim text color (default: "darkgray").
    #[serde(
        default = "ThemeConfig::default_muted",
        deserialize_with = "deserialize_color"
    )]
    pub muted: ThemeColor,
    /// Border color (default: "darkgray").
    #[serde(
        default = "ThemeConfig::default_border",
        deserialize_with = "deserialize_color"
    )]
    pub border: ThemeColor,
    /// Hint/key binding color (default: "blue").
    #[serde(
        default = "ThemeConfig::default_hint",
        deserialize_with = "deserialize_color"
    )]
    pub hint: ThemeColor,
    /// Foreground color for the selected row (default: "black").
    #[serde(
        default = "ThemeConfig::default_highlight_fg",
        deserialize_with = "deserialize_color"
    )]
    pub highlight_fg: ThemeColor,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: Self::default_accent(),
            success: Self::default_success(),
            error: Self::default_error(),
            warning: Self::default_warning(),
            muted: Self::default_muted(),
            border: Self::default_border(),
            hint: Self::default_hint(),
            highlight_fg: Self::default_highlight_fg(),
        }
    }
}

impl ThemeConfig {
    fn default_accent() -> ThemeColor {
        ThemeColor::Named(NamedColor::Cyan)
    }
    fn default_success() -> ThemeColor {
        ThemeColor::Named(NamedColor::Green)
    }
    fn default_error() -> ThemeColor {
        ThemeColor::Named(NamedColor::Red)
    }
    fn default_warning() -> ThemeColor {
        ThemeColor::Named(NamedColor::Yellow)
    }
    fn default_muted() -> ThemeColor {
        ThemeColor::Named(NamedColor::DarkGray)
    }
    fn default_border() -> ThemeColor {
        ThemeColor::Named(NamedColor::DarkGray)
    }
    fn default_hint() -> ThemeColor {
        ThemeColor::Named(NamedColor::Blue)
    }
    fn default_highlight_fg() -> ThemeColor {
        ThemeColor::Named(NamedColor::Black)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeColor {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    DarkGray,
}

impl NamedColor {
    /// All named colours in alphabetical order, as accepted by the config parser.
    pub const fn all() -> &'static [(&'static str, NamedColor)] {
        &[
            ("black", NamedColor::Black),
            ("blue", NamedColor::Blue),
            ("cyan", NamedColor::Cyan),
            ("darkgray", NamedColor::DarkGray),
            ("gray", NamedColor::Gray),
            ("green", NamedColor::Green),
            ("magenta", NamedColor::Magenta),
            ("red", NamedColor::Red),
            ("white", NamedColor::White),
            ("yellow", NamedColor::Yellow),
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
            Self::Gray => "gray",
            Self::DarkGray => "darkgray",
        }
    }
}

impl std::fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(n) => f.write_str(n.as_str()),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl Serialize for ThemeColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl ThemeColor {
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#')
            && hex.len() == 6
        {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Self::Rgb(r, g, b));
        }
        let lower = s.to_lowercase();
        // Handle aliases not in the canonical list
        let lookup = match lower.as_str() {
            "grey" => "gray",
            "darkgrey" | "dark_gray" => "darkgray",
            other => other,
        };
        NamedColor::all()
            .iter()
            .find(|(name, _)| *name == lookup)
            .map(|(_, color)| Self::Named(*color))
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<ThemeColor, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ThemeColor::parse(&s).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid color '{s}': expected a named color (black, red, green, yellow, blue, magenta, cyan, white, gray/grey, darkgray) or hex (#rrggbb)"
        ))
    })
}

pub fn load_settings_from_str(s: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(s)?;
    Ok(settings)
}

/// Read the settings file, falling back to defaults when it does not exist.
/// A present-but-invalid file is an error; silently replacing a broken
/// config would lose user edits.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let settings = load_settings_from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let serialized = toml::to_string_pretty(settings).context("failed to serialize settings")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, serialized)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

/// Injected persistence boundary for settings. Background tasks hold this as
/// `Arc<dyn ConfigStore>`; the dashboard never touches the filesystem
/// directly.
pub trait ConfigStore: Send + Sync {
    /// Current settings snapshot.
    fn load(&self) -> Settings;
    /// Persist the given settings, replacing the previous contents.
    fn store(&self, settings: &Settings) -> Result<()>;
    fn config_exists(&self) -> bool;
    fn credentials_exist(&self) -> bool;
}

/// Filesystem-backed store writing TOML under the config dir.
pub struct TomlConfigStore {
    config_path: PathBuf,
    credentials_path: PathBuf,
    cached: Mutex<Settings>,
}

impl TomlConfigStore {
    pub fn new(config_override: Option<&Path>) -> Result<Self> {
        // Shells leave `--config=~/...` unexpanded.
        let config_path = match config_override {
            Some(path) => match path.to_str() {
                Some(raw) => paths::expand_tilde(raw).ok_or_else(|| {
                    anyhow::anyhow!("cannot resolve {}: home directory unknown", path.display())
                })?,
                None => path.to_path_buf(),
            },
            None => paths::config_file(),
        };
        let settings = load_settings(&config_path)?;
        Ok(Self {
            config_path,
            credentials_path: paths::credentials_file(),
            cached: Mutex::new(settings),
        })
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Settings {
        self.cached.lock().expect("settings cache poisoned").clone()
    }

    fn store(&self, settings: &Settings) -> Result<()> {
        save_settings(&self.config_path, settings)?;
        *self.cached.lock().expect("settings cache poisoned") = settings.clone();
        Ok(())
    }

    fn config_exists(&self) -> bool {
        self.config_path.exists()
    }

    fn credentials_exist(&self) -> bool {
        self.credentials_path.exists()
    }
}

/// In-memory store for tests, with a switch to make writes fail.
#[derive(Default)]
pub struct MemoryConfigStore {
    pub settings: Mutex<Settings>,
    pub has_config: Mutex<bool>,
    pub has_credentials: Mutex<bool>,
    pub fail_writes: bool,
    pub stored: Mutex<Vec<Settings>>,
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Settings {
        self.settings.lock().unwrap().clone()
    }

    fn store(&self, settings: &Settings) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("disk full");
        }
        self.stored.lock().unwrap().push(settings.clone());
        *self.settings.lock().unwrap() = settings.clone();
        *self.has_config.lock().unwrap() = true;
        Ok(())
    }

    fn config_exists(&self) -> bool {
        *self.has_config.lock().unwrap()
    }

    fn credentials_exist(&self) -> bool {
        *self.has_credentials.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = load_settings_from_str("").unwrap();
        assert_eq!(settings.session.prefix, "bosun-");
        assert_eq!(settings.session.memory, "4g");
        assert_eq!(settings.session.cpus, "2");
        assert!(settings.daemon.notifications);
        assert!(settings.daemon.token_refresh);
        assert!(settings.ui.show_tips);
        assert!(!settings.wizard.always_run);
        assert!(!settings.wizard.resume_after_auth);
        assert!(
            settings
                .firewall
                .domains
                .iter()
                .any(|d| d == "github.com")
        );
    }

    #[test]
    fn test_partial_config_overrides() {
        let settings = load_settings_from_str(
            r#"
[session]
memory = "8g"

[firewall]
domains = ["example.com"]
"#,
        )
        .unwrap();
        assert_eq!(settings.session.memory, "8g");
        assert_eq!(settings.session.cpus, "2");
        assert_eq!(settings.firewall.domains, vec!["example.com".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = load_settings_from_str("unknown_field = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_section_field_rejected() {
        let result = load_settings_from_str(
            r#"
[session]
memroy = "8g"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_theme_config_defaults() {
        let settings = load_settings_from_str("").unwrap();
        assert_eq!(settings.theme.accent, ThemeColor::Named(NamedColor::Cyan));
        assert_eq!(settings.theme.success, ThemeColor::Named(NamedColor::Green));
        assert_eq!(settings.theme.error, ThemeColor::Named(NamedColor::Red));
        assert_eq!(
            settings.theme.muted,
            ThemeColor::Named(NamedColor::DarkGray)
        );
        assert_eq!(
            settings.theme.highlight_fg,
            ThemeColor::Named(NamedColor::Black)
        );
    }

    #[test]
    fn test_theme_config_custom() {
        let settings = load_settings_from_str(
            r##"
[theme]
accent = "magenta"
border = "#ff00ff"
"##,
        )
        .unwrap();
        assert_eq!(
            settings.theme.accent,
            ThemeColor::Named(NamedColor::Magenta)
        );
        assert_eq!(settings.theme.border, ThemeColor::Rgb(255, 0, 255));
        assert_eq!(settings.theme.success, ThemeColor::Named(NamedColor::Green));
    }

    #[test]
    fn test_theme_invalid_color_rejected() {
        let result = load_settings_from_str(
            r#"
[theme]
accent = "notacolor"
"#,
        );
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid color"), "Error was: {err}");
    }

    #[test]
    fn test_theme_color_parse() {
        assert_eq!(
            ThemeColor::parse("magenta"),
            Some(ThemeColor::Named(NamedColor::Magenta))
        );
        assert_eq!(
            ThemeColor::parse("RED"),
            Some(ThemeColor::Named(NamedColor::Red))
        );
        assert_eq!(
            ThemeColor::parse("#ff0000"),
            Some(ThemeColor::Rgb(255, 0, 0))
        );
        assert_eq!(
            ThemeColor::parse("grey"),
            Some(ThemeColor::Named(NamedColor::Gray))
        );
        assert_eq!(
            ThemeColor::parse("darkgrey"),
            Some(ThemeColor::Named(NamedColor::DarkGray))
        );
        assert_eq!(ThemeColor::parse("notacolor"), None);
        assert_eq!(ThemeColor::parse("#fff"), None);
        assert_eq!(ThemeColor::parse("#zzzzzz"), None);
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.session.memory = "16g".to_string();
        settings.wizard.resume_after_auth = true;
        settings.theme.accent = ThemeColor::Rgb(1, 2, 3);

        let serialized = toml::to_string_pretty(&settings).unwrap();
        let reloaded = load_settings_from_str(&serialized).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_load_settings_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not toml [").unwrap();
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.firewall.domains = vec!["one.example".to_string(), "two.example".to_string()];
        save_settings(&path, &settings).unwrap();

        let reloaded = load_settings(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_toml_store_expands_tilde_override() {
        let store = TomlConfigStore::new(Some(Path::new("~/bosun-nonexistent.toml"))).unwrap();
        let rendered = store.config_path.to_string_lossy().into_owned();
        assert!(!rendered.contains('~'), "path was: {rendered}");
        assert!(rendered.ends_with("bosun-nonexistent.toml"));
    }

    #[test]
    fn test_memory_store_write_failure() {
        let store = MemoryConfigStore {
            fail_writes: true,
            ..Default::default()
        };
        assert!(store.store(&Settings::default()).is_err());
        assert!(!store.config_exists());
    }

    #[test]
    fn test_memory_store_records_writes() {
        let store = MemoryConfigStore::default();
        let mut settings = Settings::default();
        settings.session.cpus = "8".to_string();
        store.store(&settings).unwrap();

        assert!(store.config_exists());
        assert_eq!(store.load().session.cpus, "8");
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }
}
