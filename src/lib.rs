pub mod cloud;
pub mod domains;
pub mod fixtures;
pub mod harness;
pub mod runner;
