//! Confirmation prompt for destructive commands

use std::io::{self, Write};

use clap::{Arg, ArgAction};

use super::Context;

/// The `-y/--assume-yes` flag shared by commands that prompt.
pub fn assume_yes_flag() -> Arg {
    Arg::new("assume-yes")
        .short('y')
        .long("assume-yes")
        .action(ArgAction::SetTrue)
        .help("Don't ask for confirmation.")
}

/// Asks the user to confirm before proceeding. Returns `true` immediately
/// when `--assume-yes` was passed. The prompt goes through the raw stream
/// so it is visible before input is awaited.
pub fn confirm(ctx: &mut Context, question: &str) -> io::Result<bool> {
    if ctx.flags().flag("assume-yes") {
        return Ok(true);
    }
    ctx.raw_output();
    write!(ctx.stdout(), "{question} (y/n) ")?;
    ctx.stdout().flush()?;
    let answer = ctx.read_line()?;
    if answer.trim() != "y" {
        writeln!(ctx.stdout(), "Abort.")?;
        return Ok(false);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{FlagMatches, FlagSet, Parsed};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn context_with(flags: FlagMatches, input: &str) -> (Context, SharedBuf) {
        let out = SharedBuf::default();
        let ctx = Context::with_streams(
            Vec::new(),
            flags,
            Box::new(out.clone()),
            Box::new(SharedBuf::default()),
            Box::new(io::Cursor::new(input.as_bytes().to_vec())),
        );
        (ctx, out)
    }

    fn parsed_flags(args: &[&str]) -> FlagMatches {
        let set = FlagSet::new("confirm-test").flag(assume_yes_flag());
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        match set.parse(&args).unwrap() {
            Parsed::Matches(m, _) => m,
            Parsed::Help(_) => panic!("unexpected help"),
        }
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let (mut ctx, out) = context_with(parsed_flags(&["-y"]), "");
        assert!(confirm(&mut ctx, "Remove?").unwrap());
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn answer_y_confirms() {
        let (mut ctx, out) = context_with(FlagMatches::empty(), "y\n");
        assert!(confirm(&mut ctx, "Remove?").unwrap());
        assert!(out.contents().contains("Remove? (y/n)"));
    }

    #[test]
    fn other_answers_abort() {
        let (mut ctx, out) = context_with(FlagMatches::empty(), "n\n");
        assert!(!confirm(&mut ctx, "Remove?").unwrap());
        assert!(out.contents().contains("Abort."));
    }
}
