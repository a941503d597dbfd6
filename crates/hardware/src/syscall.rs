//! Linux AArch64 syscall ABI bridge.
//!
//! The execute stage invokes a [`SyscallHandler`] whenever an `SVC`
//! instruction reaches it. This module provides:
//! 1. **The Handler Seam:** A trait object so embedders (and tests) can
//!    substitute their own syscall semantics.
//! 2. **The Default ABI:** `read` (63), `write` (64), and `exit` (93) against
//!    caller-supplied standard streams, with negative-errno error returns.
//!
//! ABI contract: the syscall number is in X8 (masked to its low 16 bits),
//! arguments in X0-X5, and the result in X0 as a two's-complement negative
//! errno on failure.

use std::io::{Read, Write};

use tracing::debug;

use crate::common::REG_SYSCALL;
use crate::core::arch::RegFile;
use crate::mem::Memory;

/// `read` syscall number.
pub const SYS_READ: u64 = 63;
/// `write` syscall number.
pub const SYS_WRITE: u64 = 64;
/// `exit` syscall number.
pub const SYS_EXIT: u64 = 93;

/// Bad file descriptor.
pub const EBADF: i64 = 9;
/// Host I/O error.
pub const EIO: i64 = 5;
/// Function not implemented.
pub const ENOSYS: i64 = 38;

/// Result of handling one syscall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallResult {
    /// True if the program terminated (via `exit`).
    pub exited: bool,
    /// Exit status when `exited` is set.
    pub exit_code: i64,
}

impl SyscallResult {
    /// A result that continues execution.
    pub const CONTINUE: Self = Self {
        exited: false,
        exit_code: 0,
    };

    /// A result that terminates the program with `code`.
    pub fn exit(code: i64) -> Self {
        Self {
            exited: true,
            exit_code: code,
        }
    }
}

/// Callable invoked by the execute stage when `SVC` reaches it.
pub trait SyscallHandler {
    /// Interprets the syscall described by the current register state,
    /// mutating registers and memory as the ABI requires.
    fn handle(&mut self, regs: &mut RegFile, mem: &mut Memory) -> SyscallResult;
}

/// The default Linux AArch64 ABI handler.
///
/// Owns the program's standard streams. `stdout`/`stderr` default to the
/// host's; `stdin` defaults to none, which makes `read` return 0 (EOF).
pub struct LinuxAbi {
    stdin: Option<Box<dyn Read>>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl std::fmt::Debug for LinuxAbi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinuxAbi")
            .field("stdin", &self.stdin.is_some())
            .finish()
    }
}

impl Default for LinuxAbi {
    fn default() -> Self {
        Self {
            stdin: None,
            stdout: Box::new(std::io::stdout()),
            stderr: Box::new(std::io::stderr()),
        }
    }
}

impl LinuxAbi {
    /// Creates a handler bound to the host's standard streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stdin source.
    pub fn set_stdin(&mut self, stdin: Box<dyn Read>) {
        self.stdin = Some(stdin);
    }

    /// Replaces the stdout sink.
    pub fn set_stdout(&mut self, stdout: Box<dyn Write>) {
        self.stdout = stdout;
    }

    /// Replaces the stderr sink.
    pub fn set_stderr(&mut self, stderr: Box<dyn Write>) {
        self.stderr = stderr;
    }

    fn sys_read(&mut self, regs: &mut RegFile, mem: &mut Memory) -> i64 {
        let fd = regs.read(0);
        let buf = regs.read(1);
        let count = regs.read(2) as usize;

        if fd != 0 {
            return -EBADF;
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return 0; // no reader configured: EOF
        };
        if count == 0 {
            return 0;
        }

        let mut data = vec![0u8; count];
        match stdin.read(&mut data) {
            Ok(n) => {
                mem.write_bytes(buf, &data[..n]);
                n as i64
            }
            Err(_) => -EIO,
        }
    }

    fn sys_write(&mut self, regs: &mut RegFile, mem: &mut Memory) -> i64 {
        let fd = regs.read(0);
        let buf = regs.read(1);
        let count = regs.read(2) as usize;

        let sink: &mut dyn Write = match fd {
            1 => self.stdout.as_mut(),
            2 => self.stderr.as_mut(),
            _ => return -EBADF,
        };

        let data = mem.read_bytes(buf, count);
        match sink.write_all(&data).and_then(|()| sink.flush()) {
            Ok(()) => count as i64,
            Err(_) => -EIO,
        }
    }
}

impl SyscallHandler for LinuxAbi {
    fn handle(&mut self, regs: &mut RegFile, mem: &mut Memory) -> SyscallResult {
        // Only the low 16 bits of X8 participate in dispatch.
        let number = regs.read(REG_SYSCALL) & 0xFFFF;
        debug!(number, "svc");

        match number {
            SYS_EXIT => SyscallResult::exit(regs.read(0) as i64),
            SYS_READ => {
                let ret = self.sys_read(regs, mem);
                regs.write(0, ret as u64);
                SyscallResult::CONTINUE
            }
            SYS_WRITE => {
                let ret = self.sys_write(regs, mem);
                regs.write(0, ret as u64);
                SyscallResult::CONTINUE
            }
            _ => {
                regs.write(0, (-ENOSYS) as u64);
                SyscallResult::CONTINUE
            }
        }
    }
}
