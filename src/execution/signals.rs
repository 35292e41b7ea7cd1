//! Process signal operations
//!
//! Commands run in their own process group so a single signal reaches
//! the shell and everything it started (an `ssh` client, a pipeline).

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;

use crate::error::{Error, Result};

/// Send SIGTERM to the process group led by `pid`.
/// A group that has already exited is not an error.
pub fn terminate_group(pid: u32) -> Result<()> {
    signal_group(pid, Signal::SIGTERM)
}

/// Send SIGKILL to the process group led by `pid`
pub fn kill_group(pid: u32) -> Result<()> {
    signal_group(pid, Signal::SIGKILL)
}

fn signal_group(pid: u32, signal: Signal) -> Result<()> {
    if pid == 0 {
        return Ok(());
    }
    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(Error::SignalSendFailed {
            signal: signal.as_str().to_string(),
            reason: e.to_string(),
        }),
    }
}
