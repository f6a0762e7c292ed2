//! Pager-aware standard output
//!
//! Command output may be buffered through a pager subprocess
//! (`$CIRRUS_PAGER`, falling back to `$PAGER`, falling back to `less`) when
//! stdout is a terminal. The pager is spawned lazily on first write and
//! closed when the invocation finishes. Commands that need direct,
//! synchronous interaction with the user switch to the raw stream via
//! [`Context::raw_output`](crate::command::Context::raw_output).

use std::env;
use std::io::{self, IsTerminal, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

struct Pager {
    child: Child,
    stdin: ChildStdin,
}

enum Inner {
    /// No write has happened yet; the pager decision is still open.
    Undecided,
    Paging(Pager),
    Raw(Box<dyn Write + Send>),
}

/// Writer that lazily routes output through a pager subprocess.
pub struct PagerStream {
    inner: Inner,
}

impl PagerStream {
    /// Stream that decides on first write whether to page, based on the
    /// terminal and the pager environment.
    pub fn auto() -> Self {
        Self {
            inner: Inner::Undecided,
        }
    }

    /// Stream writing directly to the given sink; never pages.
    pub fn raw(sink: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Inner::Raw(sink),
        }
    }

    /// True when output is currently routed through a pager.
    pub fn is_paging(&self) -> bool {
        matches!(self.inner, Inner::Paging(_))
    }

    /// Stops paging for the remainder of the invocation. Any pager already
    /// spawned is closed and waited for so its output lands before ours.
    pub fn bypass(&mut self) {
        self.close();
        if matches!(self.inner, Inner::Undecided) {
            self.inner = Inner::Raw(Box::new(io::stdout()));
        }
    }

    /// Closes the pager, if one is running, and waits for it to exit.
    pub fn close(&mut self) {
        if matches!(self.inner, Inner::Paging(_)) {
            let previous = std::mem::replace(&mut self.inner, Inner::Raw(Box::new(io::stdout())));
            if let Inner::Paging(pager) = previous {
                let Pager { mut child, stdin } = pager;
                drop(stdin);
                let _ = child.wait();
            }
        }
    }

    fn decide(&mut self) {
        if matches!(self.inner, Inner::Undecided) {
            self.inner = match spawn_pager() {
                Some(pager) => Inner::Paging(pager),
                None => Inner::Raw(Box::new(io::stdout())),
            };
        }
    }
}

impl Write for PagerStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.decide();
        match &mut self.inner {
            Inner::Paging(pager) => match pager.stdin.write(buf) {
                // The user quit the pager early; swallow the rest quietly.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(buf.len()),
                other => other,
            },
            Inner::Raw(sink) => sink.write(buf),
            Inner::Undecided => unreachable!("decide() always resolves the stream"),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            Inner::Paging(pager) => pager.stdin.flush(),
            Inner::Raw(sink) => sink.flush(),
            Inner::Undecided => Ok(()),
        }
    }
}

impl Drop for PagerStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Spawns the configured pager, or returns `None` when output should go
/// straight to stdout (not a terminal, pager disabled, or spawn failure).
fn spawn_pager() -> Option<Pager> {
    if !io::stdout().is_terminal() {
        return None;
    }
    let pager = env::var("CIRRUS_PAGER")
        .or_else(|_| env::var("PAGER"))
        .unwrap_or_else(|_| "less".to_string());
    if pager.trim().is_empty() {
        return None;
    }
    let mut parts = pager.split_whitespace();
    let program = parts.next()?;
    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .env("LESS", "FRX")
        .spawn()
        .ok()?;
    let stdin = child.stdin.take()?;
    Some(Pager { child, stdin })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_stream_writes_to_sink() {
        // Exercised through a boxed Vec sink shared with the test via a
        // pass-through writer.
        struct Probe(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
        impl Write for Probe {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buf = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut stream = PagerStream::raw(Box::new(Probe(buf.clone())));
        stream.write_all(b"hello").unwrap();
        stream.flush().unwrap();
        assert_eq!(&*buf.lock().unwrap(), b"hello");
        assert!(!stream.is_paging());
    }

    #[test]
    fn bypass_on_raw_stream_is_a_no_op() {
        let buf = Vec::new();
        let mut stream = PagerStream::raw(Box::new(buf));
        stream.bypass();
        assert!(!stream.is_paging());
    }
}
