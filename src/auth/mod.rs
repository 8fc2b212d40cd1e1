//! Authentication types for the storefront session engine.
//!
//! # Overview
//!
//! - [`Session`]: the authenticated-identity record plus its credential
//! - [`SessionStore`]: login, signup, logout, and restoration
//! - [`SessionCell`] / [`AuthState`]: the shared state the gateway reads
//! - [`SessionStorage`]: durable key-value store for the persisted session
//! - [`CredentialClaims`]: unverified view of a credential's claims
//!
//! # Lifecycle
//!
//! `Anonymous -> Authenticating -> Authenticated -> Anonymous`. Logging out
//! and a 401 from the backend both land in `Anonymous` with the persisted
//! session removed.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storefront_session::auth::{AuthState, MemoryStorage, SessionCell};
//!
//! let cell = SessionCell::new(Arc::new(MemoryStorage::new()));
//! # tokio_test::block_on(async {
//! assert_eq!(cell.state().await, AuthState::Anonymous);
//! # });
//! ```

mod claims;
mod error;
mod session;
mod state;
mod storage;
mod store;

pub use claims::CredentialClaims;
pub use error::{AuthError, StorageError};
pub use session::{IdentityRecord, Profile, Session};
pub use state::{AuthState, SessionCell};
pub use storage::{keys, FileStorage, MemoryStorage, SessionStorage};
pub use store::{LoginRequest, SessionStore, SignupReceipt, SignupRequest};
