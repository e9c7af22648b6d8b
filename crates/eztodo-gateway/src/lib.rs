pub mod chat;
pub mod router;
pub mod server;
pub mod state;

pub use chat::{APOLOGY, ChatRequest, FailureMeta, GatewayResult, SuccessMeta};
pub use server::GatewayServer;
pub use state::{AppState, SharedState};
