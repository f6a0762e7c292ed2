//! Command resolution and execution
//!
//! The [`Dispatcher`] owns the command tree, resolves an argument vector to
//! a bound command, enforces the argument/flag policy of the resolved leaf,
//! runs the command under the cancellation contract, and classifies
//! failures as usage vs runtime errors. It is constructed once in the entry
//! point; there is no global state.

pub mod error;
pub mod help;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Arg, ArgAction};

use crate::command::{
    ArgPolicy, Command, Context, DeprecatedCommand, FlagMatches, FlagSet, Parsed,
    ShorthandCommand,
};
use crate::tree::{CommandTree, TreeNode};
use error::{is_usage_error, UsageError};

/// Dynamic value-suggestion function attached to a flag name.
pub type CompletionFn = Arc<dyn Fn(&str) -> Result<Vec<String>> + Send + Sync>;

/// Hook consulted after a failed execution; returning true triggers exactly
/// one re-invocation with the same arguments.
pub type RetryHook = Box<dyn Fn(&anyhow::Error) -> bool + Send + Sync>;

pub struct Dispatcher {
    program: String,
    version: String,
    description: String,
    tree: CommandTree,
    completions: HashMap<String, CompletionFn>,
    retry_hook: Option<RetryHook>,
    interrupts: Option<Receiver<()>>,
    verbose: bool,
    last_usage: Option<String>,
}

impl Dispatcher {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            version: "dev".to_string(),
            description: String::new(),
            tree: CommandTree::new(program),
            completions: HashMap::new(),
            retry_hook: None,
            interrupts: None,
            verbose: false,
            last_usage: None,
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Installs the retry hook consulted by [`run`](Self::run).
    pub fn set_retry_hook(&mut self, hook: RetryHook) {
        self.retry_hook = Some(hook);
    }

    /// Channel delivering interrupt signals to cancelable commands.
    pub fn set_interrupts(&mut self, interrupts: Receiver<()>) {
        self.interrupts = Some(interrupts);
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Registers a command under both addressing modes: the flat root-level
    /// name and, unless the command only lives on the root, its
    /// hierarchical path. Disabled commands are skipped entirely.
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        self.register_arc(Arc::new(command));
    }

    pub fn register_arc(&mut self, command: Arc<dyn Command>) {
        let info = command.info();
        if info.disabled {
            return;
        }
        self.tree.insert_root(command.clone());
        if info.only_append_on_root {
            return;
        }
        self.tree.insert_path(command);
    }

    /// Pre-seeds a grouping topic. Panics on duplicate topic paths.
    pub fn register_topic(&mut self, name: &str, content: &str) {
        self.tree.register_topic(name, content);
    }

    /// Registers the command under its current name and, additionally,
    /// under a deprecated old name that warns before delegating.
    pub fn register_deprecated(&mut self, command: Arc<dyn Command>, old_name: &str) {
        self.register_arc(command.clone());
        let wrapper = DeprecatedCommand::new(command, old_name, self.program.clone());
        self.register_arc(Arc::new(wrapper));
    }

    /// Registers an always-visible top-level shorthand for the command.
    pub fn register_shorthand(&mut self, command: Arc<dyn Command>, shorthand: &str) {
        self.register_arc(Arc::new(ShorthandCommand::new(command, shorthand)));
    }

    /// Installs the flag-completion table.
    pub fn set_completions(&mut self, completions: HashMap<String, CompletionFn>) {
        self.completions = completions;
    }

    /// Top-level entry point: executes, consults the retry hook on failure
    /// for at most one re-invocation, and prints usage text when the final
    /// error is a usage error.
    pub fn run(&mut self, argv: &[String]) -> Result<()> {
        let mut result = self.execute(argv);
        if let Err(err) = &result {
            let retry = match &self.retry_hook {
                Some(hook) => hook(err),
                None => false,
            };
            if retry {
                self.trace("retrying after recoverable failure");
                result = self.execute(argv);
            }
        }
        if let Err(err) = &result {
            if is_usage_error(err) {
                if let Some(usage) = &self.last_usage {
                    eprintln!("{usage}");
                }
            }
        }
        result
    }

    /// Resolves and executes a single invocation.
    pub fn execute(&mut self, argv: &[String]) -> Result<()> {
        self.last_usage = None;

        let root_flags = self.root_flag_set();
        let (root_matches, tokens) = match root_flags.parse_leading(argv)? {
            Parsed::Help(_) => {
                print!("{}", self.render_root());
                return Ok(());
            }
            Parsed::Matches(matches, rest) => (matches, rest),
        };
        if root_matches.flag("verbose") {
            self.verbose = true;
        }
        if root_matches.flag("version") {
            println!("{} version {}", self.program, self.version);
            return Ok(());
        }
        if tokens.is_empty() {
            print!("{}", self.render_root());
            return Ok(());
        }
        if tokens[0] == "help" {
            return self.run_help(&tokens[1..]);
        }

        enum Step {
            Leaf {
                handle: Arc<dyn Command>,
                policy: ArgPolicy,
                path: Vec<String>,
                rest: Vec<String>,
                usage: String,
                silence: bool,
            },
            GroupHelp(String),
            Unknown(String),
        }

        let step = {
            let (node, path, rest) = self.resolve(&tokens);
            if let Some(handle) = node.handle() {
                Step::Leaf {
                    handle: handle.clone(),
                    policy: node.arg_policy(),
                    usage: help::usage_line(&self.program, &path, node),
                    silence: node.silences_usage(),
                    path,
                    rest,
                }
            } else if path.is_empty() {
                Step::Unknown(tokens[0].clone())
            } else if rest.is_empty() {
                Step::GroupHelp(help::render_node(&self.program, &path, node))
            } else {
                Step::Unknown(format!("{} {}", path.join(" "), rest[0]))
            }
        };

        match step {
            Step::Unknown(what) => {
                Err(UsageError::new(format!("unknown command \"{what}\"")).into())
            }
            Step::GroupHelp(text) => {
                print!("{text}");
                Ok(())
            }
            Step::Leaf {
                handle,
                policy,
                path,
                rest,
                usage,
                silence,
            } => {
                if !silence {
                    self.last_usage = Some(usage);
                }
                self.dispatch(handle, policy, &path, rest)
            }
        }
    }

    /// Parses flags per the command's mode, enforces the argument policy,
    /// builds the execution context, and runs the command under the
    /// cancellation watcher.
    fn dispatch(
        &mut self,
        handle: Arc<dyn Command>,
        policy: ArgPolicy,
        path: &[String],
        rest: Vec<String>,
    ) -> Result<()> {
        let info = handle.info();
        let (matches, positionals) = if info.disable_flag_parsing {
            (FlagMatches::empty(), rest)
        } else if let Some(set) = handle.flags() {
            let parsed = if info.parse_first_flags_only {
                set.parse_leading(&rest)?
            } else {
                set.parse(&rest)?
            };
            match parsed {
                Parsed::Help(flag_help) => {
                    print!("{}", self.help_for_path(path));
                    if !flag_help.is_empty() {
                        print!("\nFlags:\n{flag_help}");
                    }
                    return Ok(());
                }
                Parsed::Matches(matches, positionals) => (matches, positionals),
            }
        } else {
            // Simple commands still get native parsing so --help and
            // unknown flags turn into usage errors.
            let set = FlagSet::new(info.name.clone());
            match set.parse(&rest)? {
                Parsed::Help(_) => {
                    print!("{}", self.help_for_path(path));
                    return Ok(());
                }
                Parsed::Matches(matches, positionals) => (matches, positionals),
            }
        };

        policy.validate(positionals.len())?;
        self.trace(&format!(
            "running {} with {} argument(s)",
            info.name,
            positionals.len()
        ));

        let mut ctx = Context::from_process(positionals, matches);
        let watcher = self.spawn_cancel_watcher(&handle);
        let result = handle.run(&mut ctx);
        if let Some(done) = watcher {
            done.store(true, Ordering::SeqCst);
        }
        ctx.finish();
        result
    }

    /// Starts the watcher thread that relays interrupt signals to a
    /// cancelable command. Cancellation may be delivered repeatedly; the
    /// watcher stops once a cancel attempt succeeds or the run finishes.
    fn spawn_cancel_watcher(&mut self, handle: &Arc<dyn Command>) -> Option<Arc<AtomicBool>> {
        handle.as_cancelable()?;
        let interrupts = self.interrupts.take()?;
        let done = Arc::new(AtomicBool::new(false));
        let thread_done = done.clone();
        let command = handle.clone();
        thread::spawn(move || {
            while !thread_done.load(Ordering::SeqCst) {
                match interrupts.recv_timeout(Duration::from_millis(100)) {
                    Ok(()) => {
                        eprintln!("Attempting command cancellation...");
                        match command.as_cancelable() {
                            Some(cancelable) => match cancelable.cancel() {
                                Ok(()) => return,
                                Err(e) => {
                                    eprintln!("Error canceling command: {e}. Proceeding.")
                                }
                            },
                            None => return,
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });
        Some(done)
    }

    /// Completes positional arguments: a resolved completable leaf supplies
    /// its own candidates; an unresolved prefix suggests visible child
    /// names.
    pub fn complete(&self, tokens: &[String], partial: &str) -> Result<Vec<String>> {
        let (node, _path, rest) = self.resolve(tokens);
        match node.handle() {
            Some(handle) => match handle.as_completable() {
                Some(completable) => completable.complete(&rest, partial),
                None => Ok(Vec::new()),
            },
            None => {
                let mut names: Vec<String> = node
                    .children()
                    .filter(|c| !c.is_hidden())
                    .map(|c| c.name().to_string())
                    .filter(|n| n.starts_with(partial))
                    .collect();
                names.sort();
                Ok(names)
            }
        }
    }

    /// Completes a flag value through the completion table. `Ok(None)`
    /// means no completion is attached to this flag on the resolved
    /// command; an error is the explicit completion-failure signal.
    pub fn complete_flag(
        &self,
        tokens: &[String],
        flag: &str,
        partial: &str,
    ) -> Result<Option<Vec<String>>> {
        let (node, _path, _rest) = self.resolve(tokens);
        let handle = match node.handle() {
            Some(h) => h,
            None => return Ok(None),
        };
        let set = match handle.flags() {
            Some(s) => s,
            None => return Ok(None),
        };
        if !set.has_flag(flag) {
            return Ok(None);
        }
        match self.completions.get(flag) {
            Some(complete) => complete(partial).map(Some),
            None => Ok(None),
        }
    }

    fn run_help(&self, tokens: &[String]) -> Result<()> {
        if tokens.is_empty() {
            print!("{}", self.render_root());
            return Ok(());
        }
        let (node, path, rest) = self.resolve(tokens);
        if path.is_empty() || !rest.is_empty() {
            bail!("unknown command \"{}\"", tokens.join(" "));
        }
        print!("{}", help::render_node(&self.program, &path, node));
        if let Some(handle) = node.handle() {
            if let Some(set) = handle.flags() {
                print!("\nFlags:\n{}", set.flag_usages());
            }
        }
        Ok(())
    }

    /// Walks the tree as far as the tokens match child names or aliases.
    /// Returns the deepest node reached, the matched path, and the
    /// remaining tokens.
    fn resolve<'a>(&'a self, tokens: &[String]) -> (&'a TreeNode, Vec<String>, Vec<String>) {
        let mut node = self.tree.root();
        let mut path = Vec::new();
        let mut idx = 0;
        while idx < tokens.len() {
            match node.find_child(&tokens[idx]) {
                Some(child) => {
                    path.push(child.name().to_string());
                    node = child;
                    idx += 1;
                }
                None => break,
            }
        }
        (node, path, tokens[idx..].to_vec())
    }

    fn help_for_path(&self, path: &[String]) -> String {
        let mut node = self.tree.root();
        for segment in path {
            match node.child(segment) {
                Some(child) => node = child,
                None => return String::new(),
            }
        }
        help::render_node(&self.program, path, node)
    }

    fn render_root(&self) -> String {
        help::render_root(&self.program, &self.description, &self.tree)
    }

    fn root_flag_set(&self) -> FlagSet {
        FlagSet::new(self.program.clone())
            .flag(
                Arg::new("version")
                    .long("version")
                    .action(ArgAction::SetTrue)
                    .help("Print the client version and exit"),
            )
            .flag(
                Arg::new("verbose")
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Enable verbose diagnostics"),
            )
    }

    fn trace(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {message}");
        }
    }
}
