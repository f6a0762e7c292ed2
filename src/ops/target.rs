//! Target management commands
//!
//! A target is a labelled Cirrus API endpoint. The catalogue registers
//! these under the `target` topic, so they are reachable both as
//! `cirrus target-add` and `cirrus target add`.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Arg, ArgAction};

use crate::command::{
    assume_yes_flag, confirm, Command, CommandInfo, Completable, Context, FlagSet,
};
use crate::storage::{ConfigError, ConfigStore};

pub struct TargetAdd {
    store: Arc<ConfigStore>,
}

impl TargetAdd {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for TargetAdd {
    fn info(&self) -> CommandInfo {
        CommandInfo::new(
            "target-add",
            "Add a new named target endpoint.\n\n\
             The label identifies the endpoint in later invocations; pass\n\
             --set-current to start using it immediately.",
        )
        .usage("<label> <url>")
        .args(2, 2)
    }

    fn flags(&self) -> Option<FlagSet> {
        Some(
            FlagSet::new("target-add").flag(
                Arg::new("set-current")
                    .short('s')
                    .long("set-current")
                    .action(ArgAction::SetTrue)
                    .help("Set the new target as the current one."),
            ),
        )
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let label = ctx.args()[0].clone();
        let url = ctx.args()[1].clone();
        let set_current = ctx.flags().flag("set-current");

        self.store.mutate(|config| {
            if config.targets.contains_key(&label) {
                bail!(ConfigError::DuplicateTarget(label.clone()));
            }
            config.targets.insert(label.clone(), url.clone());
            if set_current {
                config.current = Some(label.clone());
            }
            Ok(())
        })?;

        writeln!(ctx.stdout(), "New target {label} -> {url} added to target list")?;
        if set_current {
            writeln!(ctx.stdout(), "New target {label} set as current")?;
        }
        Ok(())
    }
}

pub struct TargetList {
    store: Arc<ConfigStore>,
}

impl TargetList {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for TargetList {
    fn info(&self) -> CommandInfo {
        CommandInfo::new("target-list", "List the configured targets.")
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let config = self.store.load()?;
        if config.targets.is_empty() {
            writeln!(
                ctx.stdout(),
                "No targets configured. Run \"cirrus target add <label> <url>\" first."
            )?;
            return Ok(());
        }
        for (label, url) in &config.targets {
            let marker = if config.current.as_deref() == Some(label) {
                "*"
            } else {
                " "
            };
            writeln!(ctx.stdout(), "{marker} {label:<16} {url}")?;
        }
        Ok(())
    }
}

pub struct TargetSet {
    store: Arc<ConfigStore>,
}

impl TargetSet {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    fn labels(&self) -> Result<Vec<String>> {
        Ok(self.store.load()?.targets.keys().cloned().collect())
    }
}

impl Command for TargetSet {
    fn info(&self) -> CommandInfo {
        CommandInfo::new(
            "target-set",
            "Change the current target.\n\nThe label must name a configured target.",
        )
        .usage("<label>")
        .args(1, 1)
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let label = ctx.args()[0].clone();
        let config = self.store.mutate(|config| {
            if !config.targets.contains_key(&label) {
                bail!(ConfigError::UnknownTarget(label.clone()));
            }
            config.current = Some(label.clone());
            Ok(())
        })?;
        let url = config.current_url().unwrap_or_default();
        writeln!(ctx.stdout(), "New target is {label} -> {url}")?;
        Ok(())
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }
}

impl Completable for TargetSet {
    fn complete(&self, _args: &[String], partial: &str) -> Result<Vec<String>> {
        Ok(self
            .labels()?
            .into_iter()
            .filter(|label| label.starts_with(partial))
            .collect())
    }
}

pub struct TargetRemove {
    store: Arc<ConfigStore>,
}

impl TargetRemove {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for TargetRemove {
    fn info(&self) -> CommandInfo {
        CommandInfo::new("target-remove", "Remove a target from the target list.")
            .usage("<label>")
            .args(1, 1)
    }

    fn flags(&self) -> Option<FlagSet> {
        Some(FlagSet::new("target-remove").flag(assume_yes_flag()))
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let label = ctx.args()[0].clone();
        let config = self.store.load()?;
        if !config.targets.contains_key(&label) {
            bail!(ConfigError::UnknownTarget(label));
        }
        let question = format!("Are you sure you want to remove target {label:?}?");
        if !confirm(ctx, &question)? {
            return Ok(());
        }
        self.store.mutate(|config| {
            config.targets.remove(&label);
            if config.current.as_deref() == Some(label.as_str()) {
                config.current = None;
            }
            Ok(())
        })?;
        writeln!(ctx.stdout(), "Target {label} removed")?;
        Ok(())
    }
}

/// Completion function for `--target` flags: configured labels matching
/// the partial input.
pub fn target_label_completion(store: Arc<ConfigStore>) -> crate::dispatch::CompletionFn {
    Arc::new(move |partial: &str| {
        let config = store.load()?;
        Ok(config
            .targets
            .keys()
            .filter(|label| label.starts_with(partial))
            .cloned()
            .collect())
    })
}
