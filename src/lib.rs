//! Fuzzy-select a namespace, then a resource inside it, then act on the pick.
//!
//! The selection core is [`fuzzy`], [`selector`] and [`pipeline`]; everything
//! the four kubectl plugins share lives in [`plugin`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod input;
pub mod k8s;
pub mod logging;
pub mod pipeline;
pub mod plugin;
pub mod plugins;
pub mod selector;
pub mod terminal;
pub mod ui;
