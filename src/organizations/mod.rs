//! Organizations and invite-gated access.
//!
//! An organization carries a name, a description and a set of invited
//! emails. The [`InviteGate`] admits a caller to a single-organization route
//! only if their email is in that set.

mod invite_gate;
mod service;

pub use invite_gate::{InviteGate, ORGANIZATION_ID_PARAM};
pub use service::OrganizationService;
