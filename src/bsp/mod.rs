//! BSP packaging pipeline.
//!
//! The steps that turn a vendor ESP32 release into the nuttyfi32 archive:
//!
//! - [`extract`] - vendor ZIP extraction and single-root normalization
//! - [`rebrand`] - esp32 → nuttyfi32 identifier renames
//! - [`archive`] - ZIP creation for the rebranded tree
//! - [`checksum`] - streaming SHA-256 for built archives
//! - [`fs`] - directory copy/remove helpers

pub mod archive;
pub mod checksum;
pub mod extract;
pub mod fs;
pub mod rebrand;
