//! Core library components.
//!
//! Key discovery, selection, and the encrypt/decrypt orchestration an
//! editor host drives, on top of a pluggable OpenPGP provider.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod detect;
pub mod editor;
pub mod operation;
pub mod provider;
pub mod selection;
