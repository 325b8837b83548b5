use anyhow::Result;
use blogindex::build::{build_index, build_projects, collection};
use blogindex::config::Config;
use clap::{App, AppSettings, Arg, SubCommand};
use std::path::Path;

fn main() -> Result<()> {
    let matches = App::new("blogindex")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("root")
                .short("r")
                .long("root")
                .value_name("DIR")
                .takes_value(true)
                .help("The site directory, or any directory below it (default: .)"),
        )
        .subcommand(SubCommand::with_name("index").about("Rebuilds the paginated blog index"))
        .subcommand(SubCommand::with_name("projects").about("Regenerates the photo-project page"))
        .subcommand(
            SubCommand::with_name("collection")
                .about("Lists the photo-project articles found for each year"),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format_timestamp(None)
        .init();

    let config = Config::from_directory(Path::new(matches.value_of("root").unwrap_or(".")))?;
    match matches.subcommand_name() {
        Some("index") => {
            build_index(&config)?;
        }
        Some("projects") => {
            build_projects(&config)?;
        }
        Some("collection") => {
            for bucket in collection(&config)? {
                println!("\n=== {} ({} articles) ===", bucket.year, bucket.articles.len());
                for article in bucket.articles.iter().take(config.collection.preview) {
                    println!("{}: {}", article.title, article.image);
                }
            }
        }
        _ => {}
    }
    Ok(())
}
