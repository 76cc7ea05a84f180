//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     WEBHOOK_ROUTES (JSON object)
//!     → router.rs (parse, drop unusable entries)
//!     → matcher.rs (normalize keys)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request path
//!     → matcher.rs (strip leading/trailing slashes)
//!     → router.rs (exact key lookup)
//!     → Return: upstream URL or no-match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact key match only, no prefixes or patterns
//! - Deterministic: same path always resolves to the same target

pub mod matcher;
pub mod router;

pub use matcher::route_key;
pub use router::{RouteTable, RouteTableError};
