//! bitpub-lib: packaging pipeline for the Bitmapflow Windows distribution.
//!
//! - `config`: publisher settings and their resolution against a project root
//! - `process`: explicit, working-directory-scoped tool invocations
//! - `publish`: the clean → provision → build → stage → export → archive pipeline

pub mod config;
pub mod consts;
pub mod process;
pub mod publish;
pub mod util;
