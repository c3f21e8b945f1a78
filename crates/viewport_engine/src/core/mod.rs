//! Core infrastructure modules

pub mod config;
