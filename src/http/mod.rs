//! HTTP surface: routes, handlers and request bodies.

mod dto;
mod extract;
mod handlers;
mod routes;

pub use dto::{CreatedOrganization, InviteRequest, OrganizationRequest, OrganizationView};
pub use extract::{JsonBody, ValidatedJson};
pub use routes::{auth_routes, organization_routes, router};
