//! Ledger endpoint calls

pub mod autocomplete;
pub mod documents;
pub mod entries;
pub mod upload;
