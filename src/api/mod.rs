//! HTTP API surface, one router per role.

pub mod primary;
pub mod secondary;
