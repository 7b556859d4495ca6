//! Host side of MipsVM.
//!
//! [`protocol`] defines the request/response messages of the remote variant,
//! [`Session`] drives an interpreter from those messages and [`ShadowState`]
//! is a host copy of the machine kept up to date purely from patches.

pub mod protocol;
mod session;
mod shadow;

pub use protocol::{
    Command, InitPayload, InputKind, IoInterruption, Request, Response, StatusUpdatePayload,
};
pub use session::{Session, SessionError};
pub use shadow::{ShadowError, ShadowState};
