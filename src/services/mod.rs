//! Gateways: one per backend, each translating a request into a single store
//! operation behind an object-safe trait.

pub mod object_service;
pub mod product_service;
pub mod unconfigured;
pub mod user_service;

#[cfg(test)]
pub mod memory;
