//! Flag sets declared by individual commands
//!
//! Commands that take flags declare a [`FlagSet`]; the dispatcher parses the
//! remaining invocation tokens against it before calling `run` and hands the
//! result over inside the [`Context`](super::Context). Parsing is backed by
//! the clap builder API since flag sets are assembled at runtime.

use clap::{Arg, ArgAction};

use crate::dispatch::error::UsageError;

/// Internal catch-all positional collecting the non-flag tokens.
const REST: &str = "__rest";

/// Outcome of parsing an argument vector against a flag set.
pub enum Parsed {
    /// Flags parsed; the vector holds the remaining positional arguments.
    Matches(FlagMatches, Vec<String>),
    /// `--help` was requested; contains the rendered flag summary.
    Help(String),
}

/// A named set of flags owned by a single command.
pub struct FlagSet {
    cmd: clap::Command,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        let cmd = clap::Command::new(name.into())
            .no_binary_name(true)
            .disable_help_flag(true)
            .arg(
                Arg::new("help")
                    .short('h')
                    .long("help")
                    .action(ArgAction::SetTrue)
                    .help("Display help and exit"),
            )
            .arg(
                Arg::new(REST)
                    .num_args(0..)
                    .value_name("ARGS")
                    .hide(true),
            );
        Self { cmd }
    }

    /// Adds a flag definition.
    pub fn flag(mut self, arg: Arg) -> Self {
        self.cmd = self.cmd.arg(arg);
        self
    }

    /// Whether a flag with the given id is declared on this set.
    pub fn has_flag(&self, name: &str) -> bool {
        self.cmd
            .get_arguments()
            .any(|a| a.get_id().as_str() == name && a.get_id().as_str() != REST)
    }

    /// Ids of the declared flags, excluding internals.
    pub fn flag_names(&self) -> Vec<String> {
        self.cmd
            .get_arguments()
            .map(|a| a.get_id().as_str().to_string())
            .filter(|id| id != REST && id != "help")
            .collect()
    }

    /// Parses a full argument vector: flags anywhere, positionals collected
    /// in order. Unknown or malformed flags become usage errors.
    pub fn parse(&self, args: &[String]) -> Result<Parsed, UsageError> {
        match self.cmd.clone().try_get_matches_from(args.iter().map(String::as_str)) {
            Ok(matches) => {
                if matches.get_flag("help") {
                    return Ok(Parsed::Help(self.flag_usages()));
                }
                let rest = matches
                    .get_many::<String>(REST)
                    .map(|v| v.cloned().collect())
                    .unwrap_or_default();
                Ok(Parsed::Matches(FlagMatches::new(matches), rest))
            }
            Err(err) => Err(UsageError::from_clap(err)),
        }
    }

    /// Parses only the flags preceding the first positional token; the rest
    /// of the vector passes through untouched as arguments. `--` ends flag
    /// handling explicitly.
    pub fn parse_leading(&self, args: &[String]) -> Result<Parsed, UsageError> {
        let (leading, rest) = self.split_leading(args);
        match self.parse(&leading)? {
            Parsed::Help(text) => Ok(Parsed::Help(text)),
            Parsed::Matches(matches, _) => Ok(Parsed::Matches(matches, rest)),
        }
    }

    fn split_leading(&self, args: &[String]) -> (Vec<String>, Vec<String>) {
        let mut leading = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let token = &args[i];
            if !token.starts_with('-') || token == "-" {
                break;
            }
            if token == "--" {
                i += 1;
                break;
            }
            leading.push(token.clone());
            i += 1;
            if !token.contains('=') && self.flag_takes_value(token) {
                if i >= args.len() {
                    break;
                }
                leading.push(args[i].clone());
                i += 1;
            }
        }
        (leading, args[i..].to_vec())
    }

    fn flag_takes_value(&self, token: &str) -> bool {
        let arg = if let Some(long) = token.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or(long);
            self.cmd
                .get_arguments()
                .find(|a| a.get_long() == Some(name))
        } else {
            let short = token.chars().nth(1);
            self.cmd.get_arguments().find(|a| a.get_short() == short)
        };
        match arg {
            Some(a) => matches!(a.get_action(), ArgAction::Set | ArgAction::Append),
            None => false,
        }
    }

    /// Plain-text summary of the declared flags, one per line.
    pub fn flag_usages(&self) -> String {
        let mut out = String::new();
        for arg in self.cmd.get_arguments() {
            let id = arg.get_id().as_str();
            if id == REST {
                continue;
            }
            let mut spec = String::new();
            if let Some(short) = arg.get_short() {
                spec.push_str(&format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                if !spec.is_empty() {
                    spec.push_str(", ");
                }
                spec.push_str(&format!("--{long}"));
            }
            if matches!(arg.get_action(), ArgAction::Set | ArgAction::Append) {
                let value = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str().to_string())
                    .unwrap_or_else(|| "value".to_string());
                spec.push_str(&format!(" <{value}>"));
            }
            let help = arg
                .get_help()
                .map(|h| h.to_string())
                .unwrap_or_default();
            out.push_str(&format!("  {spec:<24} {help}\n"));
        }
        out
    }
}

/// Parsed flag values handed to a command through its `Context`.
pub struct FlagMatches {
    inner: Option<clap::ArgMatches>,
}

impl FlagMatches {
    fn new(inner: clap::ArgMatches) -> Self {
        Self { inner: Some(inner) }
    }

    /// Matches for a command with no flag set.
    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// Value of a string flag, if set.
    pub fn string(&self, id: &str) -> Option<String> {
        self.inner
            .as_ref()?
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .cloned()
    }

    /// All values of a repeatable string flag.
    pub fn strings(&self, id: &str) -> Vec<String> {
        self.inner
            .as_ref()
            .and_then(|m| m.try_get_many::<String>(id).ok().flatten())
            .map(|v| v.cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a boolean flag was set.
    pub fn flag(&self, id: &str) -> bool {
        self.inner
            .as_ref()
            .and_then(|m| m.try_get_one::<bool>(id).ok().flatten())
            .copied()
            .unwrap_or(false)
    }
}

impl Default for FlagMatches {
    fn default() -> Self {
        Self::empty()
    }
}
