//! Two-phase node enrollment: setup-token → create-token → signed daemon
//! credentials (§4.I).
//!
//! [`setup::SetupService`] and [`create::CreateService`] are independent —
//! the only coupling between them is the `node-create-token` cache key they
//! share, matching the spec's description of enrollment as two HTTP
//! endpoints backed by one token cache rather than one stateful object.

mod create;
mod error;
mod script;
mod setup;
mod token;

pub use create::{CreateRequest, CreateResponse, CreateService};
pub use error::EnrollError;
pub use script::{render_setup_script, HostContext};
pub use setup::{SetupService, AUTO_SETUP_TOKEN_KEY, CREATE_TOKEN_KEY, CREATE_TOKEN_TTL};
pub use token::random_base62;
