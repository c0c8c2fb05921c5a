pub mod credential;
pub mod live;
pub mod podium;
pub mod status;
pub mod validation;

// Re-export main components
pub use credential::*;
pub use live::*;
pub use podium::*;
pub use status::*;
pub use validation::*;
