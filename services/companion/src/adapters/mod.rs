pub mod console;
pub mod http;
pub mod memory;

pub use console::ConsoleSink;
pub use http::ReqwestExchange;
pub use memory::{MessageLog, SinkEvent};
