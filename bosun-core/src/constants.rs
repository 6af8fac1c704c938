use std::time::Duration;

pub const APP_NAME: &str = "bosun";

/// Containers managed by bosun carry this name prefix and these labels.
pub const SESSION_PREFIX: &str = "bosun-";
pub const BRANCH_LABEL: &str = "bosun.branch";
pub const MANAGED_LABEL: &str = "bosun.managed";

/// Banner reveal advances one column per tick.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(80);
/// Status dot pulse and toast countdown cadence.
pub const PULSE_INTERVAL: Duration = Duration::from_millis(750);
/// Background session enumeration cadence.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Braille spinner cycle length; the renderer owns the frames.
pub const SPINNER_FRAME_COUNT: usize = 10;
/// Columns in the onboarding banner art.
pub const REVEAL_COLUMNS: u16 = 44;

/// Toasts survive this many pulse ticks (~3s).
pub const TOAST_PULSES: u8 = 4;

/// Stock firewall allow-list applied to fresh configurations.
pub const DEFAULT_DOMAINS: &[&str] = &[
    "registry.npmjs.org",
    "api.anthropic.com",
    "github.com",
    "pypi.org",
    "files.pythonhosted.org",
    "sentry.io",
    "statsig.anthropic.com",
    "statsig.com",
];

/// Where refreshed credentials land inside a session.
pub const CONTAINER_CREDENTIALS_PATH: &str = "/home/bosun/.credentials.json";
/// Helper baked into the workspace image that opens one outbound domain.
pub const FIREWALL_HELPER: &str = "/usr/local/bin/bosun-allow-domain";

pub const DEFAULT_MEMORY: &str = "4g";
pub const DEFAULT_CPUS: &str = "2";
pub const DEFAULT_IMAGE: &str = "bosun-workspace:latest";
