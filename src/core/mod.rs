pub mod brewery;
pub mod ca;
pub mod client;
pub mod ip_echo;
pub mod mtls;
pub mod runner;

pub use crate::domain::model::Brewery;
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
