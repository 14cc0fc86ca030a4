pub mod scorecard;
pub mod service;
pub mod session;

pub use scorecard::*;
pub use service::*;
pub use session::*;
