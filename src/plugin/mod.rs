//! Plugin discovery and execution
//!
//! Plugins are separate `cirrus-{name}` executables discovered from the
//! config plugins directory and `$PATH`. They run with the invocation's
//! streams inherited and receive the client state through `CIRRUS_*`
//! environment variables, so any language can implement one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use anyhow::{bail, Context, Result};

/// Prefix every plugin executable carries.
const PLUGIN_PREFIX: &str = "cirrus-";

/// Environment handed to a plugin process.
#[derive(Debug, Clone, Default)]
pub struct PluginEnv {
    pub target: Option<String>,
    pub token: Option<String>,
    pub verbosity: u8,
}

/// Information about a discovered plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name, without the executable prefix
    pub name: String,

    /// Path to the plugin executable
    pub path: PathBuf,
}

/// Plugin discovery and pass-through execution
pub struct PluginRunner {
    plugins_dir: PathBuf,
}

impl PluginRunner {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    /// Discovers all available plugins, first found under a name wins.
    /// The local plugins directory shadows `$PATH`.
    pub fn discover(&self) -> Vec<PluginInfo> {
        let mut found: BTreeMap<String, PluginInfo> = BTreeMap::new();
        self.scan_directory(&self.plugins_dir, &mut found);
        if let Ok(path_var) = std::env::var("PATH") {
            for dir in std::env::split_paths(&path_var) {
                self.scan_directory(&dir, &mut found);
            }
        }
        found.into_values().collect()
    }

    /// Finds one plugin by name.
    pub fn find(&self, name: &str) -> Option<PluginInfo> {
        self.discover().into_iter().find(|p| p.name == name)
    }

    fn scan_directory(&self, dir: &Path, found: &mut BTreeMap<String, PluginInfo>) {
        if !dir.is_dir() {
            return;
        }
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return, // Ignore unreadable directories
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if let Some(plugin_name) = name.strip_prefix(PLUGIN_PREFIX) {
                if plugin_name.is_empty() || !is_executable(&path) {
                    continue;
                }
                let plugin_name = plugin_name.to_string();
                found
                    .entry(plugin_name.clone())
                    .or_insert_with(|| PluginInfo {
                        name: plugin_name,
                        path,
                    });
            }
        }
    }

    /// Runs a plugin with the given arguments, inheriting the process
    /// streams. Refuses to run a plugin from inside itself.
    pub fn run(&self, name: &str, args: &[String], env: &PluginEnv) -> Result<()> {
        if std::env::var("CIRRUS_PLUGIN_NAME").as_deref() == Ok(name) {
            bail!("refusing to run recursive plugin {name:?}");
        }
        let plugin = self
            .find(name)
            .ok_or_else(|| anyhow::anyhow!("unknown plugin {name:?}"))?;

        let mut process = Process::new(&plugin.path);
        process
            .args(args)
            .env("CIRRUS_TARGET", env.target.as_deref().unwrap_or(""))
            .env("CIRRUS_TOKEN", env.token.as_deref().unwrap_or(""))
            .env("CIRRUS_VERBOSITY", env.verbosity.to_string())
            .env("CIRRUS_PLUGIN_NAME", name);

        let status = process
            .status()
            .with_context(|| format!("Failed to run plugin: {}", plugin.path.display()))?;
        if !status.success() {
            bail!(
                "plugin {name:?} exited with status {}",
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
        false
    }

    #[cfg(windows)]
    {
        path.extension()
            .map(|ext| ext == "exe" || ext == "bat" || ext == "cmd")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_directory_has_no_plugins() {
        let dir = TempDir::new().unwrap();
        let runner = PluginRunner::new(dir.path());
        // $PATH may contribute plugins on a developer machine; only check
        // the local name we control.
        assert!(runner.find("no-such-plugin-xyz").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn discovers_prefixed_executables() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cirrus-hello");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let runner = PluginRunner::new(dir.path());
        let plugin = runner.find("hello").expect("plugin discovered");
        assert_eq!(plugin.path, path);
    }

    #[cfg(unix)]
    #[test]
    fn ignores_non_executable_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cirrus-flat"), "not executable").unwrap();

        let runner = PluginRunner::new(dir.path());
        assert!(runner.find("flat").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn runs_a_plugin_and_propagates_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cirrus-fail");
        std::fs::write(&path, "#!/bin/sh\nexit 3\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let runner = PluginRunner::new(dir.path());
        let err = runner
            .run("fail", &[], &PluginEnv::default())
            .unwrap_err();
        assert!(err.to_string().contains("status 3"));
    }
}
