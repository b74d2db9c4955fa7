//! # Tool Runner
//!
//! Runs the external `fortune` and `cowsay` utilities.
//! Both are looked up on `PATH` extended by `/usr/games`, where Debian installs them.

use anyhow::{Context as AnyhowContext, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use crate::domain::config::ToolsConfig;

const GAMES_DIR: &str = "/usr/games";
const BUNDLED_CROW: &str = include_str!("../../../assets/crow.cow");

/// Executes the decorative console tools.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    cowsay: String,
    fortune: String,
    cow_file: Option<PathBuf>,
    data_dir: PathBuf,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(config: &ToolsConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            cowsay: config.cowsay.clone(),
            fortune: config.fortune.clone(),
            cow_file: config.cow_file.as_ref().map(PathBuf::from),
            data_dir: data_dir.into(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// A random epigram from `fortune`.
    pub async fn fortune(&self) -> Result<String> {
        self.execute(&self.fortune, &[]).await
    }

    /// Renders `text` in a speech bubble next to the crow.
    pub async fn cowsay(&self, text: &str) -> Result<String> {
        let cow_file = self.cow_file().await?;
        let cow_file = cow_file.to_string_lossy().to_string();
        self.execute(&self.cowsay, &["-f", &cow_file, "--", text]).await
    }

    /// Configured cow file, or the bundled crow written to the data directory.
    async fn cow_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cow_file {
            return Ok(path.clone());
        }
        let path = self.data_dir.join("crow.cow");
        if !path.exists() {
            tokio::fs::create_dir_all(&self.data_dir)
                .await
                .context("Failed to create data directory")?;
            tokio::fs::write(&path, BUNDLED_CROW)
                .await
                .context("Failed to write crow.cow")?;
        }
        Ok(path)
    }

    async fn execute(&self, program: &str, args: &[&str]) -> Result<String> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        cmd.env("PATH", search_path(std::env::var("PATH").ok().as_deref()));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{program}`"))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("`{program}` timed out"))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("`{}` failed ({}): {}", program, output.status, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// `PATH` with the games directory appended when missing.
fn search_path(current: Option<&str>) -> String {
    match current {
        Some(path) if path.split(':').any(|p| Path::new(p) == Path::new(GAMES_DIR)) => path.to_string(),
        Some(path) if !path.is_empty() => format!("{path}:{GAMES_DIR}"),
        _ => format!("/usr/local/bin:/usr/bin:/bin:{GAMES_DIR}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(cowsay: &str, fortune: &str, dir: &Path) -> ToolRunner {
        let config = ToolsConfig {
            cowsay: cowsay.to_string(),
            fortune: fortune.to_string(),
            cow_file: None,
            timeout_secs: 5,
        };
        ToolRunner::new(&config, dir)
    }

    #[test]
    fn games_dir_is_appended_once() {
        assert_eq!(search_path(Some("/bin")), "/bin:/usr/games");
        assert_eq!(search_path(Some("/bin:/usr/games")), "/bin:/usr/games");
        assert!(search_path(None).ends_with(":/usr/games"));
    }

    #[tokio::test]
    async fn cowsay_passes_bundled_crow() {
        let dir = tempfile::tempdir().unwrap();
        let tools = runner("echo", "echo", dir.path());

        let out = tools.cowsay("-Krah").await.unwrap();
        assert!(out.contains("-f"));
        assert!(out.trim_end().ends_with("-- -Krah"));

        let crow = std::fs::read_to_string(dir.path().join("crow.cow")).unwrap();
        assert!(crow.contains("$the_cow"));
    }

    #[tokio::test]
    async fn failing_tools_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = runner("no-such-cowsay-binary", "false", dir.path());

        assert!(missing.cowsay("hi").await.is_err());
        assert!(missing.fortune().await.is_err());
    }
}
