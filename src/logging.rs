//! tracing setup. Log lines emitted while the selector owns the tty are held
//! back and written to stderr once the terminal is restored.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

static STDERR_LOG: LogBuffer = LogBuffer::new();

pub fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(|| HeldStderr)
        .try_init();

    Ok(())
}

/// Starts holding log output; called when the alternate screen is entered.
pub fn hold() {
    STDERR_LOG.hold();
}

/// Writes out whatever was held and goes back to writing straight through.
pub fn release() {
    let _ = STDERR_LOG.release(&mut io::stderr().lock());
}

struct HeldStderr;

impl Write for HeldStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        STDERR_LOG.write(buf, &mut io::stderr().lock())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[derive(Debug, Default)]
pub struct LogBuffer {
    held: Mutex<Option<Vec<u8>>>,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            held: Mutex::new(None),
        }
    }

    pub fn hold(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.get_or_insert_with(Vec::new);
    }

    pub fn release(&self, out: &mut impl Write) -> io::Result<()> {
        let taken = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(bytes) if !bytes.is_empty() => {
                out.write_all(&bytes)?;
                out.flush()
            }
            _ => Ok(()),
        }
    }

    pub fn write(&self, buf: &[u8], out: &mut impl Write) -> io::Result<usize> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        match held.as_mut() {
            Some(pending) => {
                pending.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => out.write(buf),
        }
    }
}
