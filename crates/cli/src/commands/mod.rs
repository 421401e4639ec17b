//! Subcommand implementations.

pub mod cart;
pub mod demo;
pub mod product;
pub mod shipping;

/// Write a line for the shopper on stdout. Logs go to stderr.
#[allow(clippy::print_stdout)]
pub fn say(line: &str) {
    println!("{line}");
}
