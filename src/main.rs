//! recite main entry point
//!
//! The main loop monitors two sources:
//! 1. stdin (user keyboard input) - decoded and routed to the key handlers
//! 2. Signals (SIGWINCH for resize) - triggers a redraw
//!
//! Between reads it pumps the speech service so playback advances on time.

use log::{debug, error, info};
use mio::{Events, Interest, Poll, Token};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use recite::input::{
    create_default_keymap, dispatch_key, DefaultKeyHandler, KeyDecoder, KeyEvent, ESCAPE_TIMEOUT,
};
use recite::speech::create_speech_service;
use recite::require_speech;
use recite::state::config::Config;
use recite::state::State;
use recite::terminal::{
    draw, enter_ui, get_terminal_size, is_wsl, leave_ui, restore_termios, set_raw_mode,
};
use recite::{ReciteError, Result};
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

/// Global flag set by SIGWINCH handler
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// SIGWINCH handler - sets flag when terminal is resized
extern "C" fn handle_sigwinch(_: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Command line options
struct Options {
    debug: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Options {
    let mut options = Options {
        debug: false,
        config: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--config" | "-c" => options.config = args.next().map(PathBuf::from),
            "--help" | "-h" => {
                println!("Usage: recite [--debug] [--config PATH]");
                process::exit(0);
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }
    options
}

fn main() {
    let options = parse_args();

    // Initialize logger
    if options.debug {
        // Debug mode: write to recite.log so the screen is not disturbed
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("recite.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open recite.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "recite version {} starting (debug mode, logging to recite.log)",
            recite::VERSION
        );
    } else {
        // Normal mode: minimal logging to stderr, only errors
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run(options) {
        error!("Fatal error: {}", e);
        eprintln!("recite: {}", e);
        process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    debug!("Initializing recite");

    let stdin_fd = io::stdin().as_raw_fd();
    if unsafe { libc::isatty(stdin_fd) } == 0 {
        eprintln!("Error: recite requires an interactive terminal (stdin is not a TTY)");
        process::exit(1);
    }

    let config = match options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!("Configuration loaded from {:?}", config.path());

    // Without a speech engine there is nothing to offer
    let speech = match require_speech(create_speech_service()) {
        Ok(speech) => speech,
        Err(message) => {
            println!("{}", message);
            process::exit(1);
        }
    };

    let mut state = State::new(config, speech)?;

    // Raw mode lets us see Enter, Alt and paste sequences directly
    let original_termios = set_raw_mode(stdin_fd)?;
    let _guard = TerminalGuard {
        fd: stdin_fd,
        termios: original_termios,
    };
    enter_ui(&mut io::stdout())?;

    let (mut cols, mut rows) = get_terminal_size(stdin_fd)?;
    info!("Terminal size: {}x{}", cols, rows);

    let keymap = create_default_keymap();
    info!("Key handler initialized with {} bindings", keymap.len());
    let mut default_handler = DefaultKeyHandler::new(keymap);
    let mut decoder = KeyDecoder::new();

    unsafe {
        signal::signal(Signal::SIGWINCH, SigHandler::Handler(handle_sigwinch)).map_err(|e| {
            ReciteError::Terminal(format!("Failed to set SIGWINCH handler: {}", e))
        })?;
    }

    // WSL doesn't support epoll on TTY file descriptors, so use select() instead
    let use_select = is_wsl();
    let mut mio_poll = if !use_select {
        debug!("Using mio::Poll for event loop");
        let poll = Poll::new()?;
        let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN, Interest::READABLE)?;
        Some((poll, Events::with_capacity(16)))
    } else {
        debug!("Using select() for event loop (WSL mode)");
        None
    };

    info!("recite ready - entering event loop");
    draw(&mut io::stdout(), &state, cols, rows)?;

    while !state.quit {
        let mut dirty = false;

        if RESIZE_PENDING.swap(false, Ordering::Relaxed) {
            (cols, rows) = get_terminal_size(stdin_fd)?;
            info!("Terminal resized to {}x{}", cols, rows);
            dirty = true;
        }

        dirty |= state.pump(Instant::now());

        let mut timeout = state.poll_timeout(Instant::now());
        if decoder.has_pending() {
            timeout = timeout.min(ESCAPE_TIMEOUT);
        }
        let readable = if let Some((ref mut poll, ref mut events)) = mio_poll {
            match poll.poll(events, Some(timeout)) {
                Ok(()) => events.iter().any(|event| event.token() == STDIN),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
                Err(e) => return Err(e.into()),
            }
        } else {
            wait_readable_select(stdin_fd, timeout)?
        };

        if readable {
            handle_stdin(&mut decoder, &mut state, &mut default_handler)?;
            dirty = true;
        }

        let expired = decoder.flush_expired(Instant::now());
        if !expired.is_empty() {
            dispatch_keys(expired, &mut state, &mut default_handler);
            dirty = true;
        }

        if dirty {
            draw(&mut io::stdout(), &state, cols, rows)?;
        }
    }

    info!("Exiting");
    state.stop()?;
    Ok(())
}

/// Wait for stdin with select(), for platforms where epoll on a TTY fails
fn wait_readable_select(stdin_fd: RawFd, timeout: Duration) -> Result<bool> {
    use nix::sys::select::{select, FdSet};
    use nix::sys::time::{TimeVal, TimeValLike};
    use std::os::unix::io::BorrowedFd;

    let stdin_borrowed = unsafe { BorrowedFd::borrow_raw(stdin_fd) };
    let mut read_fds = FdSet::new();
    read_fds.insert(stdin_borrowed);
    let mut timeout = TimeVal::milliseconds(timeout.as_millis() as i64);

    match select(None, Some(&mut read_fds), None, None, Some(&mut timeout)) {
        Ok(_) => Ok(read_fds.contains(stdin_borrowed)),
        Err(nix::errno::Errno::EINTR) => {
            debug!("select() interrupted by signal");
            Ok(false)
        }
        Err(e) => {
            error!("select() error: {:?}", e);
            Err(e.into())
        }
    }
}

/// Read user input and route each key through the handlers
fn handle_stdin(
    decoder: &mut KeyDecoder,
    state: &mut State,
    default_handler: &mut DefaultKeyHandler,
) -> Result<()> {
    let mut buf = [0u8; 4096];

    let n = io::stdin().read(&mut buf)?;
    if n == 0 {
        info!("stdin closed");
        state.quit = true;
        return Ok(());
    }

    let keys = decoder.feed(&buf[..n]);
    dispatch_keys(keys, state, default_handler);
    Ok(())
}

/// Route decoded keys, reporting failures on the status line
fn dispatch_keys(keys: Vec<KeyEvent>, state: &mut State, default_handler: &mut DefaultKeyHandler) {
    for key in keys {
        if let Err(e) = dispatch_key(&key, state, default_handler) {
            error!("Key handling failed: {}", e);
            state.status = Some(e.to_string());
        }
    }
}

/// RAII guard to restore terminal on exit
///
/// Ensures the terminal is returned to normal mode even on an error path
struct TerminalGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = leave_ui(&mut io::stdout());
        restore_termios(self.fd, &self.termios);
        debug!("Terminal attributes restored");
    }
}
