//! The command contract
//!
//! Every operation the client exposes implements [`Command`]: metadata via
//! `info` and execution via `run`. The optional capabilities — a declared
//! flag set, cancellation, argument completion — are surfaced through
//! accessor methods so the dispatcher checks them once instead of probing
//! concrete types at runtime.

mod confirm;
mod context;
mod flags;
mod info;
mod wrappers;

pub use confirm::{assume_yes_flag, confirm};
pub use context::Context;
pub use flags::{FlagMatches, FlagSet, Parsed};
pub use info::{ArgPolicy, CommandInfo, Group};
pub use wrappers::{DeprecatedCommand, ShorthandCommand};

use anyhow::Result;

/// A registered operation. `info` must be stable across calls; the tree is
/// built from it once at startup.
pub trait Command: Send + Sync {
    fn info(&self) -> CommandInfo;

    fn run(&self, ctx: &mut Context) -> Result<()>;

    /// The command's own flag set, for commands that take flags. The
    /// dispatcher parses it before `run` and defers native flag handling.
    fn flags(&self) -> Option<FlagSet> {
        None
    }

    /// Cancellation capability, if the command supports being interrupted.
    fn as_cancelable(&self) -> Option<&dyn Cancelable> {
        None
    }

    /// Argument-completion capability, if the command can suggest values.
    fn as_completable(&self) -> Option<&dyn Completable> {
        None
    }
}

/// Implemented by commands that support cancellation.
///
/// `cancel` runs on a different thread than `run`, must be safe to call
/// while `run` is executing, and may be delivered multiple times.
pub trait Cancelable: Send + Sync {
    fn cancel(&self) -> Result<()>;
}

/// Implemented by commands that can suggest completions for their
/// positional arguments.
pub trait Completable: Send + Sync {
    fn complete(&self, args: &[String], partial: &str) -> Result<Vec<String>>;
}
