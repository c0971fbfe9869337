//! Terminal setup and screen drawing

pub mod render;
pub mod util;

pub use render::{draw, render_lines};
pub use util::{
    enter_ui, get_terminal_size, is_wsl, leave_ui, restore_termios, set_raw_mode,
};
