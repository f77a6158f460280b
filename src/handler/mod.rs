//! Request handler module
//!
//! Site pages backed by the content cache, and static directory mounts.

pub mod site;
pub mod static_files;

pub use site::register_routes;
pub use static_files::StaticMount;
