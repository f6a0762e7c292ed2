//! Cirrus CLI - A command-line client for the Cirrus application platform
//!
//! Cirrus exposes every operation twice: under its legacy flat name
//! (`cirrus target-add`) and through a discoverable verb tree
//! (`cirrus target add`). The dispatch core builds that tree from the
//! operation catalogue at startup and layers deprecation, aliasing,
//! argument validation, completion, retry and cancellation on top.

pub mod command;
pub mod dispatch;
pub mod ops;
pub mod pager;
pub mod plugin;
pub mod storage;
pub mod tree;

pub use command::{Command, CommandInfo, Context, FlagSet};
pub use dispatch::Dispatcher;
