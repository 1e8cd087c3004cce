//! Output generation for CLI responses and snapshot files.
//!
//! Everything the CLI prints is JSON on stdout; logs go to stderr.
//!
//! # Snapshot Structure
//!
//! ```text
//! export_dir/
//! ├── articles-2025-05-06.json
//! └── articles-2025-05-07.json
//! ```

pub mod json;
