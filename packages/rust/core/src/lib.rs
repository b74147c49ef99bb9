//! Pipeline orchestration for subjects-fast.
//!
//! Ties the downloader and the converter together into the end-to-end
//! `refresh` workflow: fetch archives → extract → convert to YAML.

pub mod pipeline;
