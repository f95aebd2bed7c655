pub mod conversation;
pub mod picker;
pub mod state;
pub mod turn_task;

pub use conversation::{Conversation, TurnHandle};
pub use picker::RandomPicker;
pub use state::{TurnId, TurnState};
pub use turn_task::Responder;
