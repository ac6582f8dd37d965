//! Credential storage and lookup.
//!
//! Personal access token secrets live in the OS keychain, keyed by the
//! application id. Environment variables take precedence so scripts and CI
//! can run without a keychain.

pub mod credentials;

pub use credentials::{resolve_credentials, CredentialStore, APP_ID_ENV, SECRET_ENV};
