//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **identity**: the hosted users REST API behind `IdentityDirectory`.
//!
//! Adapters are thin translators between domain types and wire
//! representations. They contain no business logic.

pub mod identity;
