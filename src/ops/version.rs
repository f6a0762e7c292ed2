//! Version command

use std::io::Write;

use anyhow::Result;

use crate::command::{Command, CommandInfo, Context};

pub struct Version;

impl Command for Version {
    fn info(&self) -> CommandInfo {
        CommandInfo::new("version", "Print the client version.").only_append_on_root()
    }

    fn run(&self, ctx: &mut Context) -> Result<()> {
        writeln!(ctx.stdout(), "cirrus version {}", env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }
}
