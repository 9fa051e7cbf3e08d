pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    CrawlSettings, EXIT_ABORTED, EXIT_FAILURE, exit_status, handle_crawl, parse_crawl_settings,
};
