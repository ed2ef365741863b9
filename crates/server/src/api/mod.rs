pub mod handlers;
pub mod middleware;
pub mod pricing;
pub mod routes;

pub use routes::create_router;
