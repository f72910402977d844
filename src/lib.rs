//! Paintable player map.
//!
//! A square RGBA canvas the player draws on, shown either as a corner minimap
//! or as a full-screen sheet, with a marker following the player's position
//! and heading. The canvas is saved as a PNG whenever the full-screen map is
//! closed and when the program exits.
//!
//! [`session::MapSession`] ties the pieces together; the host feeds it one
//! [`input::InputSample`] per frame and draws what it reports back.

pub mod blend;
pub mod brush;
pub mod canvas;
pub mod config;
pub mod coords;
pub mod error;
pub mod grid;
pub mod input;
pub mod layout;
pub mod persist;
pub mod present;
pub mod session;
pub mod types;
pub mod view;
pub mod walker;

pub use error::{Error, Result};
