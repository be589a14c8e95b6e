// HTTP routes
pub mod analyze;
pub mod capture;
pub mod health;
pub mod inbox;

pub use analyze::*;
pub use capture::*;
pub use health::*;
pub use inbox::*;
