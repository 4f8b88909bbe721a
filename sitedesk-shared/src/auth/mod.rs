/// Authentication utilities
///
/// - [`credentials`]: login and password-change checks
/// - [`session`]: signed session tokens handed out at login

pub mod credentials;
pub mod session;
