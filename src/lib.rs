//! Two-way code generator between designer widget trees and Dear ImGui
//! source.
//!
//! [`export::export_source`] writes a tree as tagged C++ statements and
//! [`import::import_source`] rebuilds the tree from such source, tolerating
//! hand-written code between the separator markers.

pub mod binding;
pub mod config;
pub mod cpp;
pub mod draw;
pub mod export;
pub mod flags;
pub mod import;
pub mod iteration;
pub mod session;
pub mod vars;
pub mod widget;
