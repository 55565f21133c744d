//! Configuration file watcher for hot reload.
//!
//! Reloads go through the same load + validate path as startup. A reload
//! that fails keeps the current snapshot; the whitelist a visitor is
//! checked against never becomes empty because of a typo.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by renaming a temp file over the config are picked up too.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::GateConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GateConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GateConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name: Option<OsString> = path.file_name().map(OsString::from);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(OsString::from) == file_name);
                    if !ours {
                        return;
                    }
                    if let Some(new_config) = reload(&path) {
                        let _ = tx.send(new_config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(watch_dir(&self.path), RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Load the changed file. `None` means the current snapshot stays.
fn reload(path: &Path) -> Option<GateConfig> {
    // A truncate-then-write save shows up as an empty file first. Parsing
    // it would swap in the built-in defaults.
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => {
            tracing::debug!(path = ?path, "Config file is empty, waiting for the write to finish");
            return None;
        }
        _ => {}
    }

    tracing::info!(path = ?path, "Config file change detected, reloading");
    match load_config(path) {
        Ok(new_config) => {
            tracing::info!(
                enabled = new_config.gate.enabled,
                whitelist_entries = new_config.gate.whitelist.len(),
                stores = ?new_config.stores.keys().collect::<Vec<_>>(),
                "Config reloaded"
            );
            Some(new_config)
        }
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                tracing::error!(path = ?path, problem = %error, "Rejected config field");
            }
            tracing::error!(
                path = ?path,
                errors = errors.len(),
                "Config failed validation, keeping current whitelist and redirect targets"
            );
            None
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current configuration");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_text(rule: &str) -> String {
        format!(
            r#"
            [gate]
            redirect_url = "/login"

            [[gate.whitelist]]
            url_rule = "{rule}"
            "#
        )
    }

    const INVALID: &str = r#"
        [timeouts]
        request_secs = 0

        [gate]
        redirect_url = "/login"

        [[gate.whitelist]]
        url_rule = "/promo("
        "#;

    /// Save the way editors do: write a sibling temp file, rename it over.
    fn save(path: &Path, content: &str) {
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content).unwrap();
        fs::rename(&tmp, path).unwrap();
    }

    #[test]
    fn test_reload_rejects_invalid_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("force-login.toml");

        fs::write(&path, config_text("/blog")).unwrap();
        let config = reload(&path).unwrap();
        assert_eq!(config.gate.whitelist[0].url_rule, "/blog");

        fs::write(&path, INVALID).unwrap();
        assert!(reload(&path).is_none());

        fs::write(&path, "").unwrap();
        assert!(reload(&path).is_none());
    }

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("force-login.toml")), Path::new("."));
        assert_eq!(
            watch_dir(Path::new("/etc/force-login/gate.toml")),
            Path::new("/etc/force-login")
        );
    }

    #[tokio::test]
    async fn test_only_valid_changes_are_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("force-login.toml");
        fs::write(&path, config_text("/checkout")).unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _guard = watcher.run().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        save(&path, &config_text("/blog"));
        let config = tokio::time::timeout(Duration::from_secs(10), updates.recv())
            .await
            .expect("no reload after a valid change")
            .unwrap();
        assert_eq!(config.gate.whitelist[0].url_rule, "/blog");

        save(&path, INVALID);
        tokio::time::sleep(Duration::from_secs(3)).await;

        // Repeated events for the valid save may still arrive; the invalid
        // one never does.
        while let Ok(config) = updates.try_recv() {
            assert_eq!(config.gate.whitelist[0].url_rule, "/blog");
        }
    }
}
