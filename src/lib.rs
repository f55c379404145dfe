//! # URL Shortener Core
//!
//! Storage engines, anonymous identity and the batched soft-delete pipeline of
//! a URL shortening service. HTTP routing, body decoding and flag parsing live
//! in the caller; this crate exposes the operations they call.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, the storage contract and the delete pipeline
//! - **Application Layer** ([`application`]) - Anonymous identity service
//! - **Infrastructure Layer** ([`infrastructure`]) - Memory, file and PostgreSQL backends
//!
//! ## Features
//!
//! - Three interchangeable backends behind [`domain::repositories::UrlRepository`]
//! - Numeric short codes allocated in process or by a database identity column
//! - Soft deletes queued and applied in batches by a background worker
//! - Signed `UserID`/`UserSigned` cookie pair for per-user ownership
//!
//! ## Quick Start
//!
//! ```no_run
//! use url_shortener_core::config;
//! use url_shortener_core::runtime::{Runtime, init_tracing};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = config::load_from_env()?;
//! init_tracing(&config);
//!
//! let runtime = Runtime::start(&config).await?;
//! let identity = runtime.state.identity.resolve(None, None);
//! let added = runtime
//!     .state
//!     .repository
//!     .add_url("https://example.com/", &identity.user_id)
//!     .await?;
//! println!("{}", added.reference());
//!
//! runtime.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runtime;
pub mod state;
pub mod utils;

pub use error::StorageError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{Identity, IdentityService, SecretKey};
    pub use crate::domain::delete_request::DeleteRequest;
    pub use crate::domain::delete_worker::{DeletePipeline, DeleteQueue};
    pub use crate::domain::entities::{UrlRecord, UserUrl};
    pub use crate::domain::repositories::{AddOutcome, ListOutcome, SearchOutcome, UrlRepository};
    pub use crate::error::StorageError;
    pub use crate::infrastructure::persistence::{
        FileUrlRepository, MemoryUrlRepository, PgUrlRepository,
    };
    pub use crate::state::AppState;
}
