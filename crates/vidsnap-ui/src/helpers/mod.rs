// crates/vidsnap-ui/src/helpers/mod.rs
pub mod format;
pub mod log;
pub mod shortcuts;
