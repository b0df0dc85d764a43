/// Router Module Index
///
/// Organizes routing into security-segregated modules so that access control
/// is applied explicitly at the module level:
///
/// - `public`: anonymous access (registration, login, post reads).
/// - `authenticated`: behind the authentication middleware; every handler
///   receives a validated identity claim.
/// - `admin`: behind the authentication middleware AND the admin guard in
///   each handler.
pub mod admin;
pub mod authenticated;
pub mod public;
