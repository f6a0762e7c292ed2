//! Authentication entry points
//!
//! `login` and `logout` stay visible at the top level; the wire protocol
//! behind the token is the transport layer's concern, not the client's.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Arg, ArgAction};

use crate::command::{Command, CommandInfo, Context, FlagSet, Group};
use crate::storage::{ConfigError, ConfigStore};

pub struct Login {
    store: Arc<ConfigStore>,
}

impl Login {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for Login {
    fn info(&self) -> CommandInfo {
        CommandInfo::new(
            "login",
            "Authenticate against a target.\n\n\
             Stores the API token for the selected target. Without --token\n\
             the token is read interactively.",
        )
        .usage("[--target <label>] [--token <token>]")
        .group(Group::Auth)
        .only_append_on_root()
    }

    fn flags(&self) -> Option<FlagSet> {
        Some(
            FlagSet::new("login")
                .flag(
                    Arg::new("target")
                        .short('t')
                        .long("target")
                        .action(ArgAction::Set)
                        .value_name("LABEL")
                        .help("Target to authenticate against (defaults to the current one)."),
                )
                .flag(
                    Arg::new("token")
                        .long("token")
                        .action(ArgAction::Set)
                        .value_name("TOKEN")
                        .help("API token (skips the interactive prompt)."),
                ),
        )
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let config = self.store.load()?;
        let label = match ctx.flags().string("target").or_else(|| config.current.clone()) {
            Some(label) => label,
            None => bail!("no target configured; run \"cirrus target add <label> <url>\" first"),
        };
        let url = match config.targets.get(&label) {
            Some(url) => url.clone(),
            None => bail!(ConfigError::UnknownTarget(label)),
        };

        let token = match ctx.flags().string("token") {
            Some(token) => token,
            None => {
                ctx.raw_output();
                write!(ctx.stdout(), "Token: ")?;
                ctx.stdout().flush()?;
                ctx.read_line()?
            }
        };
        let token = token.trim().to_string();
        if token.is_empty() {
            bail!("no token provided");
        }

        self.store.mutate(|config| {
            config.current = Some(label.clone());
            config.token = Some(token.clone());
            config.token_updated_at = Some(Utc::now());
            Ok(())
        })?;

        writeln!(ctx.stdout(), "Successfully logged in to {url}!")?;
        Ok(())
    }
}

pub struct Logout {
    store: Arc<ConfigStore>,
}

impl Logout {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Command for Logout {
    fn info(&self) -> CommandInfo {
        CommandInfo::new("logout", "Discard the stored API token.")
            .group(Group::Auth)
            .only_append_on_root()
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        let had_token = self.store.load()?.token.is_some();
        if !had_token {
            writeln!(ctx.stdout(), "You are not logged in.")?;
            return Ok(());
        }
        self.store.mutate(|config| {
            config.token = None;
            config.token_updated_at = None;
            Ok(())
        })?;
        writeln!(ctx.stdout(), "Successfully logged out!")?;
        Ok(())
    }
}
