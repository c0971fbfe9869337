//! Input handling and key bindings
//!
//! The input system uses a stack-based handler architecture where handlers
//! can be pushed/popped to create modal interfaces (e.g. the interval prompt).
//! Keys no modal handler claims go to the default handler, which runs keymap
//! commands and feeds everything else to the script form.

pub mod buffer_handler;
pub mod default_handler;
pub mod handler;
pub mod keymap;
pub mod keys;

pub use buffer_handler::BufferHandler;
pub use default_handler::{dispatch_key, DefaultKeyHandler};
pub use handler::{HandlerAction, HandlerStack, KeyHandler};
pub use keymap::{create_default_keymap, KeyAction};
pub use keys::{KeyDecoder, KeyEvent, ESCAPE_TIMEOUT};
