//! Trade search collaborator and the refinement loop driving it.

mod client;
mod rate_limiter;
mod refine;
mod types;

pub use client::TradeClient;
pub use rate_limiter::{RateLimitStatus, RateLimiterPool, TokenBucket};
pub use refine::{
    next_to_drop, refine, DroppedFilter, RefineOutcome, RefineState, Refinement, TrimReason,
};
pub use types::*;
