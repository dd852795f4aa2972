// ABOUTME: Library module for inventory-cutover
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod error;
pub mod migration;
pub mod postgres;
pub mod sqlite;
pub mod tables;
pub mod utils;
