//! Identity provider outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `IdentityProvider`
//! port for Microsoft Entra ID.

mod dto;
mod entra_id;

pub use entra_id::{EntraIdConfig, EntraIdProvider};
