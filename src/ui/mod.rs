//! Rendering to the client's terminal.
//!
//! - **canvas**: cursor placement, clearing and line-ending normalization
//! - **animation**: typewriter reveal and diagonal grid wipe
//! - **art**: glyph grid, static art, layout coordinates, success script
//!
//! Everything here writes to a generic `Write` sink and holds no
//! connection state of its own.

pub mod animation;
pub mod art;
pub mod canvas;
