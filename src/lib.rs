#![cfg_attr(not(any(feature = "std", test)), no_std)]

// Tests always build against std so 'cargo test' works on the host,
// even with --no-default-features.

pub mod common;
pub mod fixed;
pub mod float;

#[cfg(test)]
mod test_util;
