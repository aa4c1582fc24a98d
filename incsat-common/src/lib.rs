//! Internal modules for incsat

pub mod config;
#[macro_use]
pub mod macros;
pub mod output;
#[macro_use]
pub mod memory;
pub mod assignment;
pub mod clause;
pub mod clausedatabase;
pub mod input;
pub mod literal;
pub mod parser;
