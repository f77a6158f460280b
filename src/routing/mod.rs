//! Routing module
//!
//! Provides ordered, first-match routing:
//! - Path patterns with named parameters and wildcards
//! - Method + pattern bindings kept in registration order
//! - Dispatch that turns handler errors into HTTP responses

pub mod pattern;
pub mod router;

pub use pattern::{percent_decode, percent_encode, PathParams, Pattern, PatternError};
pub use router::{
    Handler, HandlerFuture, HandlerResult, HttpResponse, RouteBinding, RouteMatch, RouteRequest,
    Router,
};
