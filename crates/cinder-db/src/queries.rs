//! Query functions, one module per table.

pub mod chat_links;
pub mod registrations;
