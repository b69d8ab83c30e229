pub mod extract;
pub mod gate;
pub mod response;
pub mod session;

pub use extract::{RequireSession, ValidJson};
pub use gate::{decide, gate_middleware, GateDecision, PathClass};
pub use response::{ApiResponse, ApiResult};
pub use session::session_middleware;
