pub mod credentials;
pub mod users;
