//! The language-model driven stages: which stylesheets to read, which
//! element is the call to action, and what each CSS chunk says about the
//! palette.

pub mod cta;
pub mod palette;
pub mod stylesheets;
