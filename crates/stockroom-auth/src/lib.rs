//! Identity and session management for Stockroom.
//!
//! This crate answers one question for every other layer: *who is calling?*
//!
//! 1. **Hashing** — turning passwords into salted secrets and checking them
//!    ([`CredentialHasher`])
//! 2. **Identities** — registered users and their secrets ([`IdentityStore`])
//! 3. **Sessions** — opaque tokens bound to a user, with expiry
//!    ([`SessionAuthority`] over a [`SessionRegistry`])
//! 4. **The gate** — login, logout, and the `require_caller` checkpoint
//!    that every inventory call goes through ([`AccessGate`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Front (above)       ← turns requests into gate calls
//!     ↕
//! Auth (this crate)   ← token → UserId
//!     ↕
//! Protocol (below)    ← UserId, User, ValidationError
//! ```
//!
//! The identity store and the session authority never call each other;
//! only the gate holds both.

mod authority;
mod error;
mod gate;
mod hasher;
mod identity;
mod registry;
mod session;

pub use authority::SessionAuthority;
pub use error::AuthError;
pub use gate::AccessGate;
pub use hasher::{CredentialHasher, HasherConfig};
pub use identity::IdentityStore;
pub use registry::{MemorySessionRegistry, SessionRegistry};
pub use session::{Session, SessionConfig, SessionState};
