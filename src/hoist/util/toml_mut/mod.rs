//! Format-preserving editing of `Hoist.toml`, used by `hoist add` and
//! `hoist remove`.

pub mod dependency;
pub mod manifest;
