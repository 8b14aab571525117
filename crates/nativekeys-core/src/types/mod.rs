//! Core types shared by the resolver and configuration

mod secret;

pub use secret::{SecretKind, ResolutionPolicy};
