//! Terminal utilities

use crate::Result;
use nix::libc;
use std::fs;
use std::io::{self, Write};
use std::os::unix::io::RawFd;

/// Get the terminal size for the given file descriptor
pub fn get_terminal_size(fd: RawFd) -> Result<(u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Ok((ws.ws_col, ws.ws_row))
    } else {
        // Default size if ioctl fails
        Ok((80, 24))
    }
}

/// Set raw mode on a terminal file descriptor
///
/// Raw mode delivers every keystroke, including Enter and Alt sequences,
/// without line buffering or echo.
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let mut original_termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut original_termios) } != 0 {
        return Err(io::Error::last_os_error().into());
    }

    let mut raw_termios = original_termios;

    unsafe {
        libc::cfmakeraw(&mut raw_termios);
        if libc::tcsetattr(fd, libc::TCSANOW, &raw_termios) != 0 {
            return Err(io::Error::last_os_error().into());
        }
    }

    Ok(original_termios)
}

/// Restore terminal attributes
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}

/// Switch to the alternate screen, hide the cursor and enable bracketed paste
pub fn enter_ui(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"\x1b[?1049h\x1b[?25l\x1b[?2004h")?;
    out.flush()
}

/// Undo [`enter_ui`]
pub fn leave_ui(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"\x1b[?2004l\x1b[?25h\x1b[?1049l")?;
    out.flush()
}

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// WSL doesn't support epoll on TTY file descriptors, so the event loop
/// falls back to `select()` there.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_escape_sequences() {
        let mut out = Vec::new();
        enter_ui(&mut out).unwrap();
        assert!(out.ends_with(b"\x1b[?2004h"));

        out.clear();
        leave_ui(&mut out).unwrap();
        assert!(out.starts_with(b"\x1b[?2004l"));
    }
}
