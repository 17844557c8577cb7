//! Finds wallets that keep buying a token right before a given "smart"
//! wallet does, across every token that wallet has traded.

pub mod config;
pub mod interfaces;
pub mod services;
pub mod utils;
