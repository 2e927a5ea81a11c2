//! Application layer containing the use-case services and shared state.

pub mod sneakers;
pub mod state;
pub mod users;

pub use sneakers::SneakerService;
pub use state::AppState;
pub use users::{RegisterValidator, UserService};
