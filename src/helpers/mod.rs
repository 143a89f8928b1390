//! Helper functions shared by the page features

mod html;

pub use html::*;
