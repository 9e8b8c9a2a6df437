//! Subcommands that are more than a one-liner in `main`.

pub(crate) mod check;
pub(crate) mod create_restaurant;
pub(crate) mod theme;
