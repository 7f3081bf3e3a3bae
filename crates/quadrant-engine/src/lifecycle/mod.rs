//! Resource release bound to host teardown.

mod teardown;

pub use teardown::Teardown;
