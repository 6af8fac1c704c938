use super::{parse_inspect, parse_ps_line, provider::Registry};
use crate::constants::{CONTAINER_CREDENTIALS_PATH, FIREWALL_HELPER, MANAGED_LABEL};
use crate::paths;
use crate::session::{SessionDetails, SessionSummary};
use anyhow::Result;
use std::process::Command;

/// Talks to the local docker daemon through the `docker` binary.
pub struct DockerRegistry;

impl DockerRegistry {
    fn docker(args: &[&str]) -> Result<std::process::Output> {
        let output = Command::new("docker").args(args).output()?;
        Ok(output)
    }

    fn docker_checked(args: &[&str], context: &str) -> Result<String> {
        let output = Self::docker(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{context} failed: {}", stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Registry for DockerRegistry {
    fn list_sessions(&self, prefix: &str) -> Result<Vec<SessionSummary>> {
        let label_filter = format!("label={MANAGED_LABEL}=true");
        let name_filter = format!("name={prefix}");
        let format = "{{.Names}}\t{{.State}}\t{{.Status}}\t{{.Label \"bosun.branch\"}}";
        let stdout = Self::docker_checked(
            &[
                "ps",
                "-a",
                "--filter",
                &label_filter,
                "--filter",
                &name_filter,
                "--format",
                format,
            ],
            "docker ps",
        )?;

        let mut sessions: Vec<SessionSummary> =
            stdout.lines().filter_map(parse_ps_line).collect();
        sessions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sessions)
    }

    fn describe(&self, name: &str) -> Result<SessionDetails> {
        let stdout = Self::docker_checked(&["inspect", name], "docker inspect")?;
        parse_inspect(&stdout)
    }

    fn stop(&self, name: &str) -> Result<()> {
        Self::docker_checked(&["stop", name], "docker stop")?;
        Ok(())
    }

    fn restart(&self, name: &str) -> Result<()> {
        Self::docker_checked(&["restart", name], "docker restart")?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        Self::docker_checked(&["rm", "-f", name], "docker rm")?;
        Ok(())
    }

    fn refresh_tokens(&self, name: &str) -> Result<()> {
        let source = paths::credentials_file();
        if !source.exists() {
            anyhow::bail!(
                "no credentials found at {}; run `bosun auth` first",
                source.display()
            );
        }
        let source = source.to_string_lossy().to_string();
        let dest = format!("{name}:{CONTAINER_CREDENTIALS_PATH}");
        Self::docker_checked(&["cp", &source, &dest], "docker cp")?;
        Ok(())
    }

    fn add_domain(&self, name: &str, domain: &str) -> Result<()> {
        Self::docker_checked(&["exec", name, FIREWALL_HELPER, domain], "docker exec")?;
        Ok(())
    }
}
