pub mod routes;
pub mod storage;

pub use routes::create_routes;
