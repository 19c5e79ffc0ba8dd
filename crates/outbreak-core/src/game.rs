pub mod error;
pub mod lookup;
pub mod outbreak;
pub mod serialization;
pub mod session;
pub mod setup;
pub mod turns;
