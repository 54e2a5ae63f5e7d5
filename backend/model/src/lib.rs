//! Core models for Beacon: the build tree, its deltas, and notifications.
//!
//! ## Node Identity
//! Tree nodes live in an arena and are addressed by [tree::NodeId].
//! A node that keeps representing the same key across merges keeps its id,
//! so consumers can diff two tree states by id instead of by content.

pub mod delta;
pub mod notification;
pub mod tree;
