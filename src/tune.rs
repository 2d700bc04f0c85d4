use serde::Serialize;

const INDEX_PREFIX: &str = "X:";
const TITLE_PREFIX: &str = "T:";
const RHYTHM_PREFIX: &str = "R:";
const METER_PREFIX: &str = "M:";
const KEY_PREFIX: &str = "K:";

/// One tune parsed out of an ABC file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tune {
    /// Number of the owning book. Always set by the parser, the column
    /// itself is nullable.
    pub book: Option<i64>,
    pub file_path: String,
    /// Value of the `X:` line, `None` when it isn't an integer.
    pub index: Option<i64>,
    pub title: Option<String>,
    pub rhythm: Option<String>,
    pub meter: Option<String>,
    pub key: Option<String>,
    /// Every line of the tune, starting with its `X:` line.
    pub raw_text: String,
}

struct PendingTune {
    tune: Tune,
    lines: Vec<String>,
}

impl PendingTune {
    fn open(book: i64, file_path: &str, header: &str) -> PendingTune {
        PendingTune {
            tune: Tune {
                book: Some(book),
                file_path: file_path.to_string(),
                index: header[INDEX_PREFIX.len()..].trim().parse::<i64>().ok(),
                title: None,
                rhythm: None,
                meter: None,
                key: None,
                raw_text: String::new(),
            },
            lines: vec![header.to_string()],
        }
    }

    fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());

        let field = if line.starts_with(TITLE_PREFIX) {
            &mut self.tune.title
        } else if line.starts_with(RHYTHM_PREFIX) {
            &mut self.tune.rhythm
        } else if line.starts_with(METER_PREFIX) {
            &mut self.tune.meter
        } else if line.starts_with(KEY_PREFIX) {
            &mut self.tune.key
        } else {
            return;
        };

        // All field prefixes are two bytes long
        *field = Some(line[2..].trim().to_string());
    }

    fn finish(self) -> Tune {
        let mut tune = self.tune;
        tune.raw_text = self.lines.join("\n");
        tune
    }
}

/// Splits the lines of one file into tunes.
///
/// A tune starts at an `X:` line and runs up to the next `X:` line or the end
/// of input. Lines before the first `X:` are dropped. Within a tune the last
/// `T:`, `R:`, `M:` and `K:` line wins.
pub fn parse<I, S>(lines: I, book: i64, file_path: &str) -> Vec<Tune>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tunes = Vec::new();
    let mut pending: Option<PendingTune> = None;

    for line in lines {
        let line = line.as_ref();

        if line.starts_with(INDEX_PREFIX) {
            if let Some(tune) = pending.take() {
                tunes.push(tune.finish());
            }
            pending = Some(PendingTune::open(book, file_path, line));
        } else if let Some(tune) = pending.as_mut() {
            tune.push(line);
        }
    }

    if let Some(tune) = pending {
        tunes.push(tune.finish());
    }

    trace!("parsed {} tunes from '{}'", tunes.len(), file_path);

    tunes
}

/// Convenience wrapper over `parse` for a whole file's text.
pub fn parse_text(text: &str, book: i64, file_path: &str) -> Vec<Tune> {
    parse(text.lines(), book, file_path)
}
