//! External process handoffs: attaching to a session, creating one, and
//! the interactive authentication container. These take over the terminal,
//! so they run after the TUI has been torn down.

use anyhow::{Context, Result, bail};
use bosun_core::config::Settings;
use bosun_core::constants::{BRANCH_LABEL, CONTAINER_CREDENTIALS_PATH, MANAGED_LABEL};
use bosun_core::outcome::CreateParams;
use bosun_core::paths;
use std::process::{Command, Stdio};

/// Attach to a session's tmux, starting the container first if it has
/// stopped.
pub fn connect(name: &str) -> Result<()> {
    if !is_running(name)? {
        log::info!("starting stopped session {name} before attaching");
        run_quiet(&["start", name], "docker start")?;
    }

    println!("Connecting to {name}... detach with Ctrl+b d");
    run_interactive(&attach_args(name))
}

/// Create a session container from the settings and attach to it unless
/// the caller asked not to.
pub fn create_session(params: &CreateParams, settings: &Settings) -> Result<()> {
    let container = container_name(&params.name, &settings.session.prefix);
    println!("Creating session {container}...");

    let args = create_args(&container, params.branch.as_deref(), settings);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_quiet(&args, "docker run")?;

    let credentials = paths::credentials_file();
    if credentials.exists() {
        let source = credentials.to_string_lossy().to_string();
        let dest = format!("{container}:{CONTAINER_CREDENTIALS_PATH}");
        run_quiet(&["cp", &source, &dest], "docker cp")?;
    } else {
        println!("No credentials found; run `bosun auth` to authenticate the agent.");
    }

    if params.no_connect {
        println!("Session {container} created.");
        return Ok(());
    }
    connect(&container)
}

/// Run the interactive authentication container. The auth directory is
/// mounted read-write so the agent login can write credentials that later
/// sessions receive read-only.
pub fn run_auth(settings: &Settings) -> Result<()> {
    let auth_dir = paths::auth_dir();
    std::fs::create_dir_all(&auth_dir)
        .with_context(|| format!("failed to create {}", auth_dir.display()))?;

    let container = format!("{}auth", settings.session.prefix);
    // A leftover auth container from an aborted run would collide on name.
    let _ = run_quiet(&["rm", "-f", &container], "docker rm");

    println!("Starting authentication container...");
    println!("Complete the login flow, then exit the shell to save credentials.");

    let args = auth_args(&container, &auth_dir.to_string_lossy(), &settings.session.image);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = run_interactive(&args);

    let _ = run_quiet(&["rm", "-f", &container], "docker rm");
    result?;

    if paths::credentials_file().exists() {
        println!("Authentication complete.");
        Ok(())
    } else {
        bail!("authentication finished but no credentials were written")
    }
}

fn container_name(name: &str, prefix: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{prefix}{name}")
    }
}

fn attach_args(name: &str) -> Vec<&str> {
    vec!["exec", "-it", name, "tmux", "attach", "-t", "main"]
}

fn create_args(container: &str, branch: Option<&str>, settings: &Settings) -> Vec<String> {
    let mut args: Vec<String> = ["run", "-d", "--name", container, "--hostname", container]
        .iter()
        .map(ToString::to_string)
        .collect();
    args.push("--cap-add".to_string());
    args.push("NET_ADMIN".to_string());
    args.push("--memory".to_string());
    args.push(settings.session.memory.clone());
    args.push("--cpus".to_string());
    args.push(settings.session.cpus.clone());
    args.push("--label".to_string());
    args.push(format!("{MANAGED_LABEL}=true"));
    if let Some(branch) = branch {
        args.push("--label".to_string());
        args.push(format!("{BRANCH_LABEL}={branch}"));
    }
    args.push(settings.session.image.clone());
    args
}

fn auth_args(container: &str, auth_dir: &str, image: &str) -> Vec<String> {
    vec![
        "run".to_string(),
        "-it".to_string(),
        "--name".to_string(),
        container.to_string(),
        "-v".to_string(),
        format!("{auth_dir}:/home/bosun"),
        "-w".to_string(),
        "/workspace".to_string(),
        image.to_string(),
        "login".to_string(),
    ]
}

fn is_running(name: &str) -> Result<bool> {
    let output = Command::new("docker")
        .args(["inspect", "--format", "{{.State.Running}}", name])
        .output()
        .context("failed to invoke docker")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("docker inspect failed: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
}

fn run_quiet(args: &[&str], context: &str) -> Result<()> {
    let output = Command::new("docker")
        .args(args)
        .output()
        .context("failed to invoke docker")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{context} failed: {}", stderr.trim());
    }
    Ok(())
}

fn run_interactive(args: &[&str]) -> Result<()> {
    let status = Command::new("docker")
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .context("failed to invoke docker")?;
    if !status.success() {
        bail!("docker exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_name_adds_prefix_once() {
        assert_eq!(container_name("api", "bosun-"), "bosun-api");
        assert_eq!(container_name("bosun-api", "bosun-"), "bosun-api");
    }

    #[test]
    fn test_attach_args() {
        assert_eq!(
            attach_args("bosun-api"),
            ["exec", "-it", "bosun-api", "tmux", "attach", "-t", "main"]
        );
    }

    #[test]
    fn test_create_args_include_limits_and_labels() {
        let settings = Settings::default();
        let args = create_args("bosun-api", Some("feat/auth"), &settings);
        let joined = args.join(" ");
        assert!(joined.starts_with("run -d --name bosun-api"));
        assert!(joined.contains("--cap-add NET_ADMIN"));
        assert!(joined.contains("--memory 4g"));
        assert!(joined.contains("--cpus 2"));
        assert!(joined.contains("--label bosun.managed=true"));
        assert!(joined.contains("--label bosun.branch=feat/auth"));
        assert_eq!(args.last().unwrap(), &settings.session.image);
    }

    #[test]
    fn test_create_args_without_branch_skip_label() {
        let args = create_args("bosun-api", None, &Settings::default());
        assert!(!args.join(" ").contains("bosun.branch"));
    }

    #[test]
    fn test_auth_args_mount_auth_dir() {
        let args = auth_args("bosun-auth", "/data/auth", "bosun-workspace:latest");
        let joined = args.join(" ");
        assert!(joined.contains("-v /data/auth:/home/bosun"));
        assert!(joined.ends_with("bosun-workspace:latest login"));
    }
}
