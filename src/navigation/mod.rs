//! Navigation between the landing, rules and game views

mod router;

pub use router::{NavigationError, Route, Router};
