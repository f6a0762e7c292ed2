//! Plugin commands

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;

use crate::command::{Command, CommandInfo, Context};
use crate::plugin::{PluginEnv, PluginRunner};
use crate::storage::ConfigStore;

pub struct PluginList {
    store: Arc<ConfigStore>,
}

impl PluginList {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for PluginList {
    fn info(&self) -> CommandInfo {
        CommandInfo::new("plugin-list", "List the installed plugins.")
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let runner = PluginRunner::new(self.store.plugins_dir());
        let plugins = runner.discover();
        if plugins.is_empty() {
            writeln!(ctx.stdout(), "No plugins installed.")?;
            return Ok(());
        }
        for plugin in plugins {
            writeln!(ctx.stdout(), "{:<16} {}", plugin.name, plugin.path.display())?;
        }
        Ok(())
    }
}

pub struct PluginRun {
    store: Arc<ConfigStore>,
}

impl PluginRun {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for PluginRun {
    fn info(&self) -> CommandInfo {
        CommandInfo::new(
            "plugin-run",
            "Run an installed plugin.\n\n\
             Everything after the plugin name is passed through verbatim;\n\
             the plugin inherits this invocation's streams.",
        )
        .usage("<plugin> [args...]")
        .at_least(1)
        .disable_flag_parsing()
        .silence_usage()
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        // The plugin writes directly to the terminal.
        ctx.raw_output();
        let name = ctx.args()[0].clone();
        let args = ctx.args()[1..].to_vec();

        let config = self.store.load()?;
        let env = PluginEnv {
            target: config.current_url().map(str::to_string),
            token: config.token.clone(),
            verbosity: 0,
        };

        let runner = PluginRunner::new(self.store.plugins_dir());
        runner.run(&name, &args, &env)
    }
}
