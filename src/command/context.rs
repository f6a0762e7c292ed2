//! Execution context handed to a command's `run`

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::command::flags::FlagMatches;
use crate::pager::PagerStream;

/// Everything a command receives for one invocation: the positional
/// arguments left after path resolution, the parsed flag values, and the
/// standard streams. Stdout may be routed through a pager; stdin reads are
/// synchronized with it so prompts are visible before input is awaited.
pub struct Context {
    args: Vec<String>,
    flags: FlagMatches,
    stdout: PagerStream,
    stderr: Box<dyn Write + Send>,
    stdin: BufReader<Box<dyn Read + Send>>,
}

impl Context {
    /// Context bound to the process streams, with pager support.
    pub fn from_process(args: Vec<String>, flags: FlagMatches) -> Self {
        Self {
            args,
            flags,
            stdout: PagerStream::auto(),
            stderr: Box::new(io::stderr()),
            stdin: BufReader::new(Box::new(io::stdin()) as Box<dyn Read + Send>),
        }
    }

    /// Context with caller-provided streams; never pages. Used by tests and
    /// by embedders that capture output.
    pub fn with_streams(
        args: Vec<String>,
        flags: FlagMatches,
        stdout: Box<dyn Write + Send>,
        stderr: Box<dyn Write + Send>,
        stdin: Box<dyn Read + Send>,
    ) -> Self {
        Self {
            args,
            flags,
            stdout: PagerStream::raw(stdout),
            stderr,
            stdin: BufReader::new(stdin),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn flags(&self) -> &FlagMatches {
        &self.flags
    }

    pub fn stdout(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    pub fn stderr(&mut self) -> &mut dyn Write {
        &mut self.stderr
    }

    /// Bypasses the pager for the remainder of this invocation. Must be
    /// called before interactive prompts or streamed progress output.
    pub fn raw_output(&mut self) {
        self.stdout.bypass();
    }

    /// The standard input reader. Closes the pager first so anything
    /// already written is on screen before input is awaited.
    pub fn stdin(&mut self) -> &mut dyn BufRead {
        self.stdout.bypass();
        &mut self.stdin
    }

    /// Reads one line from stdin, trimmed of the trailing newline.
    pub fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.stdin().read_line(&mut line)?;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Flushes command output and shuts the pager down, waiting for it to
    /// exit. Called by the dispatcher once `run` returns.
    pub fn finish(&mut self) {
        let _ = self.stdout.flush();
        self.stdout.close();
        let _ = self.stderr.flush();
    }
}
