//! Bounded multi-target store router.
//!
//! Writes go to the first target with free capacity and, once every
//! reachable target is full, overwrite the oldest record of the first one.
//! Reads fan out to every target and merge into one newest-first view.

pub mod aggregator;
pub mod config;
pub mod connection;
pub mod error;
pub mod gallery;
pub mod pool;
pub mod router;

pub use aggregator::{Aggregator, ListRequest, MoviePage};
pub use config::{MarqueeConfig, TargetConfig};
pub use connection::ConnectionCache;
pub use error::GalleryError;
pub use gallery::{Gallery, TargetStatus};
pub use pool::TargetPool;
pub use router::{DeleteOutcome, InsertOutcome, Router};
