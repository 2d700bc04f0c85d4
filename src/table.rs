use std::io::{self, Write};

use crate::query::BookStat;
use crate::store::StoredTune;

const MAX_CELL: usize = 40;

fn cell(value: Option<&str>) -> String {
    let value = value.unwrap_or("-");

    if value.chars().count() > MAX_CELL {
        let mut s: String = value.chars().take(MAX_CELL - 1).collect();
        s.push('…');
        s
    } else {
        value.to_string()
    }
}

fn write_table<W: Write>(out: &mut W, header: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let line = |out: &mut W, values: &[String]| -> io::Result<()> {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect();
        writeln!(out, "{}", padded.join("  ").trim_end())
    };

    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    line(&mut *out, &header)?;

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&mut *out, &rule)?;

    for row in rows {
        line(&mut *out, row)?;
    }

    Ok(())
}

pub fn print_tunes<W: Write>(out: &mut W, tunes: &[&StoredTune]) -> io::Result<()> {
    if tunes.is_empty() {
        return writeln!(out, "no tunes found");
    }

    let rows: Vec<Vec<String>> = tunes
        .iter()
        .map(|t| {
            vec![
                t.tune_id.to_string(),
                cell(t.tune.book.map(|b| b.to_string()).as_deref()),
                cell(t.tune.index.map(|x| x.to_string()).as_deref()),
                cell(t.tune.title.as_deref()),
                cell(t.tune.rhythm.as_deref()),
                cell(t.tune.meter.as_deref()),
                cell(t.tune.key.as_deref()),
                cell(Some(t.tune.file_path.as_str())),
            ]
        })
        .collect();

    write_table(
        out,
        &["id", "book", "X", "title", "rhythm", "meter", "key", "file"],
        &rows,
    )?;

    writeln!(out, "{} tunes", tunes.len())
}

pub fn print_stats<W: Write>(out: &mut W, stats: &[BookStat]) -> io::Result<()> {
    if stats.is_empty() {
        return writeln!(out, "no tunes found");
    }

    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| vec![s.book.to_string(), s.tunes.to_string()])
        .collect();

    write_table(out, &["book", "tunes"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tune::Tune;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn tunes_table_aligns_columns() {
        let tune = StoredTune {
            tune_id: 12,
            tune: Tune {
                book: Some(3),
                file_path: "3/reels.abc".to_string(),
                index: None,
                title: Some("Cooley's".to_string()),
                rhythm: Some("reel".to_string()),
                meter: None,
                key: Some("Edor".to_string()),
                raw_text: "X:?".to_string(),
            },
        };

        let text = render(|out| print_tunes(out, &[&tune]));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id  book  X  title     rhythm"));
        assert!(lines[2].starts_with("12  3     -  Cooley's  reel"));
        assert_eq!(lines[3], "1 tunes");
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "a".repeat(100);
        assert_eq!(cell(Some(&long)).chars().count(), MAX_CELL);
        assert_eq!(cell(None), "-");
    }

    #[test]
    fn stats_and_empty_output() {
        let text = render(|out| print_stats(out, &[BookStat { book: 1, tunes: 25 }]));
        assert_eq!(text, "book  tunes\n----  -----\n1     25\n");

        assert_eq!(render(|out| print_tunes(out, &[])), "no tunes found\n");
    }
}
