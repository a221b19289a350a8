pub mod security;

pub use security::Security;
