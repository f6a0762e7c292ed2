//! Decorator commands: deprecation and shorthand entry points
//!
//! Both wrappers hold the inner command and forward every capability
//! explicitly; only the fields they override (name, usage, visibility,
//! grouping) differ from straight pass-through.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;

use super::{Cancelable, Command, CommandInfo, Completable, Context, FlagSet, Group};

/// Keeps an old invocation name alive while warning the user about the
/// replacement. The humanized form swaps dashes for spaces and prefixes the
/// program name, so `target-set` is advertised as `cirrus target set`.
pub struct DeprecatedCommand {
    inner: Arc<dyn Command>,
    old_name: String,
    program: String,
}

impl DeprecatedCommand {
    pub fn new(inner: Arc<dyn Command>, old_name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            inner,
            old_name: old_name.into(),
            program: program.into(),
        }
    }

    fn humanized_replacement(&self) -> String {
        format!("{} {}", self.program, self.inner.info().name.replace('-', " "))
    }
}

impl Command for DeprecatedCommand {
    fn info(&self) -> CommandInfo {
        let mut info = self.inner.info();
        info.desc = format!(
            "DEPRECATED: use \"{}\" instead.\n\n{}",
            self.humanized_replacement(),
            info.desc
        );
        info.usage = info.usage.replacen(&info.name, &self.old_name, 1);
        info.name = self.old_name.clone();
        info.hidden = true;
        info
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let warning = format!(
            "WARNING: \"{}\" has been deprecated, please use \"{}\" instead.",
            self.old_name,
            self.humanized_replacement()
        );
        writeln!(ctx.stderr(), "{}\n", warning.yellow())?;
        self.inner.run(ctx)
    }

    fn flags(&self) -> Option<FlagSet> {
        self.inner.flags()
    }

    fn as_cancelable(&self) -> Option<&dyn Cancelable> {
        self.inner.as_cancelable()
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        self.inner.as_completable()
    }
}

/// Exposes an inner command under an alternative short top-level name,
/// always visible and grouped with the other shorthands.
pub struct ShorthandCommand {
    inner: Arc<dyn Command>,
    shorthand: String,
}

impl ShorthandCommand {
    pub fn new(inner: Arc<dyn Command>, shorthand: impl Into<String>) -> Self {
        Self {
            inner,
            shorthand: shorthand.into(),
        }
    }
}

impl Command for ShorthandCommand {
    fn info(&self) -> CommandInfo {
        let mut info = self.inner.info();
        info.name = self.shorthand.clone();
        info.group = Some(Group::Shorthands);
        info.only_append_on_root = true;
        info.hidden = false;
        info
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        self.inner.run(ctx)
    }

    fn flags(&self) -> Option<FlagSet> {
        self.inner.flags()
    }

    fn as_cancelable(&self) -> Option<&dyn Cancelable> {
        self.inner.as_cancelable()
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        self.inner.as_completable()
    }
}
