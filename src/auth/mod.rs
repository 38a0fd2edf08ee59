mod claims;
pub mod jwt;
pub mod password;

pub use claims::Role;
pub use jwt::AuthReseller;
