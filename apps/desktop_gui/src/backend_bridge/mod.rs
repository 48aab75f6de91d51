//! Backend bridge: command queue types and the worker thread hosting the async runtime.

pub mod commands;
pub mod runtime;
