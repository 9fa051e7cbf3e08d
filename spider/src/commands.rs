use clap::arg;
use spider_core::crawl::DEFAULT_OUTPUT_DIR;
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("spider")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("spider")
        .about("Download the images of a web page, optionally following links on the same domain")
        .override_usage("spider [-r] [-l N] [-p PATH] URL")
        .styles(CLAP_STYLING)
        .arg(
            arg!(<URL>)
                .help("The URL to extract images from")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(-r --"recursive")
                .help("Recursively follow links that stay on the same domain")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-l --"level" <N>)
                .required(false)
                .help("Maximum recursion depth (only meaningful with -r)")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            arg!(-p --"path" <PATH>)
                .required(false)
                .help("Directory the downloaded images are saved to (created if absent)")
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds for every page and image")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("5"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-q --"quiet")
                .help("Suppress banner and progress output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-v --"verbose")
                .help("Increase log verbosity (-v info, -vv debug)")
                .action(clap::ArgAction::Count),
        )
}
