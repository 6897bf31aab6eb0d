//! Wrappers that let a runner inject system resources into a pure [`StateMachine`].
//!
//! [`StateMachine`]: super::StateMachine

pub mod input;
