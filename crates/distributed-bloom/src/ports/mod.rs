//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - membership API for callers
//! - Driven Ports (outbound) - the remote bit store

pub mod inbound;
pub mod outbound;

pub use inbound::MembershipFilter;
pub use outbound::BitStore;
