// service/src/lib.rs

//! The aggregation layer shared by every admin screen: one collection
//! reader, one stat aggregator, one document probe, one mutation gateway,
//! one live feed. Each component takes its store handle at construction;
//! lifecycle is owned by the application root, never by module globals.

pub mod live;
pub mod mutations;
pub mod probe;
pub mod reader;
pub mod stats;

pub use live::{LiveFeed, RecentRequests};
pub use mutations::{MutationGateway, StatusRecord, TransitionError};
pub use probe::{DocumentKind, DocumentProbe, ProbeResult};
pub use reader::{CollectionReader, FetchOutcome, ReadError};
pub use stats::{daily_series, group_counts, DailyBucket, DashboardStats};
