pub mod dashboard;
pub mod intake;
pub mod registry;
pub mod risk;
