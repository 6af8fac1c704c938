use bosun_core::paths;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Logging goes to a rotating file under the cache dir; writing to the
/// terminal would tear the dashboard.
pub fn setup_logging(level: log::LevelFilter) -> anyhow::Result<()> {
    let log_file = paths::log_file();
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    simple_log::file(log_file.to_string_lossy().into_owned(), level, 10, 10)
        .map_err(|e| anyhow::anyhow!(e))?;
    log::info!("bosun logging initialised (level={level})");
    Ok(())
}
