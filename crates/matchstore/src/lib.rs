//! Matchstore - Recommendation Lookup Store
//!
//! Durable mapping from a matching request to the candidate users recommended
//! for it. Records are keyed by `request_id` (partition) and
//! `recommended_user_id` (sort key), so a request's full recommendation set is
//! one range query away.
//!
//! Two backends implement the [`RecommendationStore`] contract:
//!
//! - [`MemoryStore`] keeps everything in-process and backs tests and local runs
//! - [`DynamoDbStore`] talks to DynamoDB (or DynamoDB Local) through the AWS SDK
//!
//! Neither backend retries on its own. Callers own their backoff policy.

pub mod config;
pub mod dynamodb;
pub mod error;
pub mod memory;
pub mod record;
pub mod schema;
pub mod store;

pub use config::{BackendKind, StoreArgs, StoreConfig};
pub use dynamodb::DynamoDbStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::{ranked, RecommendationRecord};
pub use schema::{SchemaStatus, TableSchema, TableSummary};
pub use store::{open_store, wait_until_active, RecommendationStore};

#[cfg(any(test, feature = "mocks"))]
pub use store::MockRecommendationStore;
