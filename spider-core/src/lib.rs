pub mod crawl;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    println!("{}", "═".repeat(60).bright_blue().bold());
    println!(
        "  {} {}",
        "🕷  ARACHNIDA SPIDER".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "═".repeat(60).bright_blue().bold());
}
