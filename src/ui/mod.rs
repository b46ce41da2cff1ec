//! Terminal User Interface module.
//!
//! A thin front-end over [`listsync::controller::ListController`]: it turns
//! key presses into controller operations and redraws when the list state
//! revision changes. No synchronization logic lives here.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling and the drag gesture source
//! - `view` - Cursor and viewport state, scroll metrics
//! - `render` - Search bar, banners and item table
//! - `status` - Status bar widget

mod input;
mod loop_runner;
mod render;
mod status;
mod view;

pub use loop_runner::run;
