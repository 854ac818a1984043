use crate::IRRError;
use anyhow::Result;
use log::debug;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigint(_: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to a flag checked between jobs, instead of killing the run.
pub fn install() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic.
    unsafe { signal::sigaction(signal::SIGINT, &action)? };
    debug!("SIGINT handler installed");
    Ok(())
}

pub fn request() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

pub fn requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// If an interrupt arrived, ask the operator whether to quit. A "y" answer
/// aborts the run; anything else resumes it.
pub fn confirm_if_requested(input: &mut dyn BufRead, output: &mut dyn Write) -> Result<()> {
    if !INTERRUPTED.swap(false, Ordering::SeqCst) {
        return Ok(());
    }
    write!(output, "\nReally quit? (y/n)> ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if answer.trim().to_lowercase().starts_with('y') {
        return Err(IRRError::Interrupted.into());
    }
    Ok(())
}
