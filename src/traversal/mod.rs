//! Deterministic bottom-up ordering over a [`crate::tree::PathTree`].

mod post_order;

pub use post_order::post_order;
