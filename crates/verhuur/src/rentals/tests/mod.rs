mod common;
mod deposits;
mod service;
mod tickets;
