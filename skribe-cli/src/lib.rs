//! `skribe` command-line client
//!
//! Thin front end over `skribe-client`: every subcommand maps to one screen
//! action (dashboard, creation form, live session) or one maintenance
//! endpoint, and prints the result with [`render`].
//!
//! ```bash
//! skribe new --doctor "Dr. Lee" --patient "Ana Ruiz"
//! skribe record 3f2c9a --file visit.webm
//! skribe soap 3f2c9a
//! skribe show 3f2c9a --tab compliance
//! skribe qr 3f2c9a --png summary.png
//! ```

pub mod cli;
pub mod commands;
pub mod render;
