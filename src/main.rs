#[macro_use]
extern crate log;

mod command;
mod config;
mod db_meta;
mod error;
mod logger;
mod menu;
mod query;
mod scan;
mod schema;
mod store;
mod table;
mod tune;

use std::io;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use crate::command::{Command, OutputFormat, ParseError};
use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::logger::Logger;
use crate::store::StoreSource;

fn build_app() -> App<'static, 'static> {
    App::new("tunedb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Indexes folders of ABC tune books into SQLite and queries them")
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("books-dir")
                .long("books-dir")
                .value_name("DIR")
                .help("Folder holding the numbered book folders")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("db")
                .long("db")
                .value_name("FILE")
                .help("SQLite database file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("off, error, warn, info, debug or trace")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("atomic")
                .long("atomic")
                .help("Rebuild inside a single transaction"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Print results as JSON instead of tables"),
        )
        .subcommand(SubCommand::with_name("rebuild").about("Re-read every book into the database"))
        .subcommand(
            SubCommand::with_name("book")
                .about("List the tunes in a book")
                .arg(Arg::with_name("number").required(true)),
        )
        .subcommand(
            SubCommand::with_name("type")
                .about("List the tunes of a rhythm")
                .arg(Arg::with_name("rhythm").required(true)),
        )
        .subcommand(
            SubCommand::with_name("search")
                .about("List the tunes whose title contains a text")
                .arg(Arg::with_name("text").required(true)),
        )
        .subcommand(SubCommand::with_name("stats").about("Count the tunes in each book"))
        .subcommand(
            SubCommand::with_name("show")
                .about("Print the ABC text of a tune")
                .arg(Arg::with_name("id").required(true)),
        )
        .subcommand(SubCommand::with_name("menu").about("Interactive menu (default)"))
}

/// Builds the command for a subcommand. Text arguments are taken exactly as
/// given; only ids and book numbers are parsed.
fn subcommand(matches: &ArgMatches) -> std::result::Result<Option<Command>, ParseError> {
    let sub = match matches.subcommand() {
        (_, Some(sub)) => sub,
        _ => return Ok(None),
    };
    let value = |name| sub.value_of(name).unwrap_or("");

    let cmd = match matches.subcommand_name() {
        Some("rebuild") => Command::Rebuild,
        Some("book") => Command::Book(command::number(value("number"), "book number")?),
        Some("type") => Command::Type(value("rhythm").to_string()),
        Some("search") => Command::Search(value("text").to_string()),
        Some("stats") => Command::Stats,
        Some("show") => Command::Show(command::number(value("id"), "tune id")?),
        _ => return Ok(None),
    };

    Ok(Some(cmd))
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = Config::resolve(&Overrides {
        config_file: matches.value_of("config"),
        books_dir: matches.value_of("books-dir"),
        db_path: matches.value_of("db"),
        log_level: matches.value_of("log-level"),
        atomic_rebuild: matches.is_present("atomic"),
    })?;

    if let Err(e) = Logger::init(config.log_level) {
        eprintln!("can't install logger: {}", e);
    }

    debug!("{:?}", config);

    let format = if matches.is_present("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let source = StoreSource::create(config.db_path.clone())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match subcommand(matches)? {
        Some(cmd) => {
            command::execute(&cmd, &source, &config, format, &mut out)?;
        }
        None => {
            let stdin = io::stdin();
            menu::run(&source, &config, format, stdin.lock(), &mut out)?;
        }
    }

    Ok(())
}

fn main() {
    let matches = build_app().get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("tunedb: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Option<Command>, ParseError> {
        let matches = build_app().get_matches_from(args);
        subcommand(&matches)
    }

    #[test]
    fn subcommands_become_commands() {
        assert_eq!(parse(&["tunedb", "book", "3"]), Ok(Some(Command::Book(3))));
        assert_eq!(
            parse(&["tunedb", "--json", "search", "drowsy maggie"]),
            Ok(Some(Command::Search("drowsy maggie".to_string())))
        );
        assert_eq!(parse(&["tunedb", "stats"]), Ok(Some(Command::Stats)));
        assert_eq!(parse(&["tunedb", "show", "17"]), Ok(Some(Command::Show(17))));
        assert_eq!(parse(&["tunedb", "menu"]), Ok(None));
        assert_eq!(parse(&["tunedb"]), Ok(None));
    }

    #[test]
    fn text_arguments_are_kept_verbatim() {
        assert_eq!(
            parse(&["tunedb", "search", ""]),
            Ok(Some(Command::Search(String::new())))
        );
        assert_eq!(
            parse(&["tunedb", "search", "  kesh"]),
            Ok(Some(Command::Search("  kesh".to_string())))
        );
        assert_eq!(
            parse(&["tunedb", "type", " reel "]),
            Ok(Some(Command::Type(" reel ".to_string())))
        );
    }

    #[test]
    fn numeric_arguments_are_checked() {
        assert_eq!(
            parse(&["tunedb", "book", "three"]),
            Err(ParseError::InvalidNumber {
                value: "three".to_string(),
                what: "book number"
            })
        );
    }
}
