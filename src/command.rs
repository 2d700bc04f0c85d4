use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::error::Result;
use crate::query;
use crate::scan;
use crate::store::StoreSource;
use crate::table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rebuild,
    Book(i64),
    Type(String),
    Search(String),
    Stats,
    Show(i64),
    Help,
    Quit,
}

/// Problems with a line typed at the menu prompt.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("'{value}' is not a valid {what}")]
    InvalidNumber { value: String, what: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub const HELP: &str = "commands:
  rebuild          re-read every book folder into the database
  book <N>         list the tunes in book N
  type <RHYTHM>    list the tunes of a rhythm, e.g. reel or jig
  search <TEXT>    list the tunes whose title contains TEXT
  stats            count the tunes in each book
  show <ID>        print the ABC text of a tune
  help             show this list
  quit             leave";

pub fn number(value: &str, what: &'static str) -> std::result::Result<i64, ParseError> {
    value.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
        value: value.to_string(),
        what,
    })
}

fn argument<'a>(
    name: &'static str,
    rest: &'a str,
) -> std::result::Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(name))
    } else {
        Ok(rest)
    }
}

impl Command {
    /// Parses one line of menu input. Returns `None` for a blank line.
    pub fn parse(line: &str) -> std::result::Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.find(char::is_whitespace) {
            Some(pos) => (&line[..pos], line[pos..].trim()),
            None => (line, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "rebuild" => Command::Rebuild,
            "book" => Command::Book(number(argument("book", rest)?, "book number")?),
            "type" => Command::Type(argument("type", rest)?.to_string()),
            "search" => Command::Search(argument("search", rest)?.to_string()),
            "stats" => Command::Stats,
            "show" => Command::Show(number(argument("show", rest)?, "tune id")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(ParseError::Unknown(name.to_string())),
        };

        Ok(Some(command))
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn write_tunes<W: Write>(
    out: &mut W,
    format: OutputFormat,
    tunes: &[&crate::store::StoredTune],
) -> Result<()> {
    match format {
        OutputFormat::Table => table::print_tunes(out, tunes)?,
        OutputFormat::Json => write_json(out, &tunes)?,
    }
    Ok(())
}

/// Runs `command`, writing its result to `out`. The store is opened for the
/// duration of the command only.
pub fn execute<W: Write>(
    command: &Command,
    source: &StoreSource,
    config: &Config,
    format: OutputFormat,
    out: &mut W,
) -> Result<Flow> {
    debug!("execute {:?}", command);

    match command {
        Command::Rebuild => {
            let stat = scan::rebuild(source, &config.books_dir, config.rebuild_mode)?;
            match format {
                OutputFormat::Table => writeln!(
                    out,
                    "processed {} books, {} files, {} tunes",
                    stat.books, stat.files, stat.tunes
                )?,
                OutputFormat::Json => write_json(out, &stat)?,
            }
        }
        Command::Book(book) => {
            let tunes = source.get()?.load_all()?;
            write_tunes(out, format, &query::by_book(&tunes, *book))?;
        }
        Command::Type(label) => {
            let tunes = source.get()?.load_all()?;
            write_tunes(out, format, &query::by_type(&tunes, label))?;
        }
        Command::Search(term) => {
            let tunes = source.get()?.load_all()?;
            write_tunes(out, format, &query::search(&tunes, term))?;
        }
        Command::Stats => {
            let tunes = source.get()?.load_all()?;
            let stats = query::stats_by_book(&tunes);
            match format {
                OutputFormat::Table => table::print_stats(out, &stats)?,
                OutputFormat::Json => write_json(out, &stats)?,
            }
        }
        Command::Show(tune_id) => {
            let tune = source.get()?.tune(*tune_id)?;
            match (format, tune) {
                // a missing tune is written as null
                (OutputFormat::Json, tune) => write_json(out, &tune)?,
                (OutputFormat::Table, Some(tune)) => writeln!(
                    out,
                    "% tune {} from book {}, {}\n{}",
                    tune.tune_id,
                    tune.tune.book.map_or("-".to_string(), |b| b.to_string()),
                    tune.tune.file_path,
                    tune.tune.raw_text
                )?,
                (OutputFormat::Table, None) => writeln!(out, "no tune with id {}", tune_id)?,
            }
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::RebuildMode;
    use std::fs;
    use std::path::Path;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(Command::parse("rebuild"), Ok(Some(Command::Rebuild)));
        assert_eq!(Command::parse("BOOK 12"), Ok(Some(Command::Book(12))));
        assert_eq!(
            Command::parse("search  the  kesh "),
            Ok(Some(Command::Search("the  kesh".to_string())))
        );
        assert_eq!(
            Command::parse("type Reel"),
            Ok(Some(Command::Type("Reel".to_string())))
        );
        assert_eq!(Command::parse("q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            Command::parse("book three"),
            Err(ParseError::InvalidNumber {
                value: "three".to_string(),
                what: "book number"
            })
        );
        assert_eq!(
            Command::parse("search"),
            Err(ParseError::MissingArgument("search"))
        );
        assert_eq!(
            Command::parse("play 1"),
            Err(ParseError::Unknown("play".to_string()))
        );
    }

    fn setup() -> (tempfile::TempDir, StoreSource, Config) {
        let dir = tempfile::tempdir().unwrap();
        let books = dir.path().join("books");
        fs::create_dir_all(books.join("3")).unwrap();
        fs::write(
            books.join("3").join("reels.abc"),
            "X:1\nT:Cooley's\nR:reel\nK:Edor\nX:2\nT:The Kesh\nR:jig\nK:G\n",
        )
        .unwrap();

        let config = Config {
            books_dir: books,
            db_path: dir.path().join("tunes.db"),
            log_level: log::LevelFilter::Off,
            rebuild_mode: RebuildMode::PerFile,
        };
        let source = StoreSource::create(config.db_path.clone()).unwrap();

        (dir, source, config)
    }

    fn run(command: Command, source: &StoreSource, config: &Config, format: OutputFormat) -> String {
        let mut out = Vec::new();
        execute(&command, source, config, format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn rebuild_then_query() {
        let (_dir, source, config) = setup();

        let text = run(Command::Rebuild, &source, &config, OutputFormat::Table);
        assert_eq!(text, "processed 1 books, 1 files, 2 tunes\n");

        let text = run(Command::Type("JIG".to_string()), &source, &config, OutputFormat::Table);
        assert!(text.contains("The Kesh"));
        assert!(!text.contains("Cooley's"));

        let text = run(Command::Book(4), &source, &config, OutputFormat::Table);
        assert_eq!(text, "no tunes found\n");
    }

    #[test]
    fn json_output() {
        let (_dir, source, config) = setup();
        run(Command::Rebuild, &source, &config, OutputFormat::Json);

        let text = run(Command::Search("cool".to_string()), &source, &config, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let tunes = value.as_array().unwrap();
        assert_eq!(tunes.len(), 1);
        assert_eq!(tunes[0]["title"], "Cooley's");
        assert_eq!(tunes[0]["book"], 3);
        assert_eq!(tunes[0]["index"], 1);
        assert_eq!(tunes[0]["file_path"], "3/reels.abc");

        let text = run(Command::Stats, &source, &config, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!([{ "book": 3, "tunes": 2 }]));
    }

    #[test]
    fn show_and_quit() {
        let (_dir, source, config) = setup();
        run(Command::Rebuild, &source, &config, OutputFormat::Table);

        let id = source.get().unwrap().load_all().unwrap()[0].tune_id;
        let text = run(Command::Show(id), &source, &config, OutputFormat::Table);
        assert!(text.contains("X:1\nT:Cooley's"));
        assert!(!text.contains("X:2"));

        let text = run(Command::Show(id + 100), &source, &config, OutputFormat::Table);
        assert!(text.starts_with("no tune with id"));

        let text = run(Command::Show(id), &source, &config, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tune_id"], id);
        assert_eq!(value["title"], "Cooley's");

        let text = run(Command::Show(id + 100), &source, &config, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.is_null());

        let mut out = Vec::new();
        let flow = execute(&Command::Quit, &source, &config, OutputFormat::Table, &mut out);
        assert_eq!(flow.unwrap(), Flow::Quit);
        assert!(Path::new(&config.db_path).exists());
    }
}
