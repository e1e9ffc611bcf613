pub mod request;
pub mod response;
pub mod routes;

pub use request::{ScoreRequest, TxRecord};
pub use response::{ErrorResponse, HealthResponse, ReadyResponse, ScoreResponse};
pub use routes::{create_router, AppState};
