pub mod driver;
pub mod session;
