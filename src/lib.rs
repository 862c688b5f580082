pub mod assets;
pub mod config;
pub mod content;
pub mod listing;
pub mod logger;
pub mod paginator;
pub mod query_string;
pub mod render;
pub mod server;
pub mod service;
pub mod text_utils;
pub mod util;
pub mod view;
pub mod watcher;
#[cfg(test)]
mod test_data;
