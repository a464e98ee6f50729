//! Business logic services

pub mod repeat;
