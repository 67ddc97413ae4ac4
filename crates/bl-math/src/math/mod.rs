//! Core math modules.

pub mod format;
pub mod odds;
pub mod rates;
