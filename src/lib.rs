pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod schema;
pub mod search;
pub mod server;
pub mod session;
pub mod source;
pub mod store;
pub mod tools;
pub mod tracing;
pub mod types;

pub use config::SearchConfig;
pub use engine::{IndexOptions, SearchIndex};
pub use error::{IndexError, Result};
pub use search::{IndexEntry, IndexSection, Manifest, Shard, ShardId, Target};
pub use server::IndexServer;
pub use session::{Delivery, QueryState, QueryStatus, SearchOutcome, SearchSession};
pub use source::{DirectorySource, MemorySource, ShardSource};
pub use store::ShardCache;
pub use types::DisplayResult;
