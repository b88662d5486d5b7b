//! # vp_auth — account, session, and second-factor lifecycle for Veilpass
//!
//! The stateful half of the engine. [`vp_crypto`] supplies the primitives;
//! this crate supplies the policy and the flows: registration, login with
//! progressive lockout, TOTP + backup-code second factor, dual-timeout
//! sessions with a background expiry sweep, and full account deletion.
//!
//! Persistence is abstract: everything talks to [`store::VaultStore`] and
//! [`store::AuditLog`], with in-memory reference implementations in
//! [`memory`] for tests and in-process embedders.
//!
//! ## Module layout
//! - [`models`] — persisted record shapes (`Account`, `Session`, audit events)
//! - [`policy`] — session timeout and lockout policy
//! - [`store`]  — storage and audit collaborator traits
//! - [`memory`] — in-memory reference store implementations
//! - [`session`] — session creation, validation, and the expiry sweep
//! - [`auth`]   — the orchestrator tying all of it together
//! - [`error`]  — `AuthError` / `StoreError`

pub mod auth;
pub mod error;
pub mod memory;
pub mod models;
pub mod policy;
pub mod session;
pub mod store;

pub use auth::{AuthOrchestrator, SecondFactorEnrollment};
pub use error::{AuthError, AuthResult, StoreError};
pub use memory::{MemoryAuditLog, MemoryStore};
pub use models::{Account, EventKind, SecurityEvent, Session};
pub use policy::{LockoutPolicy, SessionPolicy};
pub use session::SessionManager;
pub use store::{AuditLog, VaultStore};
