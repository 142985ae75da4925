pub mod controller;
pub mod state;

pub use controller::{EngineEvent, SessionController, SessionSnapshot};
pub use state::{SessionState, SessionStatus};
