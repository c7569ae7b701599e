//! Types shared between the validation client and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
