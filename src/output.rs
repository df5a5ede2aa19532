//! Output formatting for regex and record search results

use crate::index::records::RecordSearch;
use crate::index::types::{IndexStats, RecordId};
use crate::regex::matches::{LocationMatch, MatchSet};
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// A match placed within the record it starts in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchLine {
    pub record: RecordId,
    pub offset: u64,
    pub length: u64,
    /// Record text, lossily decoded
    pub text: String,
    /// Byte range of the match within `text`, clipped to the record
    #[serde(skip)]
    pub span: (usize, usize),
}

/// Place a match within its record
pub fn locate_match<I: RecordSearch + ?Sized>(index: &I, m: &LocationMatch) -> Option<MatchLine> {
    let record = index.record_of(m.offset)?;
    let (start, end) = index.record_span(record)?;
    let bytes = index.record_bytes(record)?;

    let match_start = (m.offset - start) as usize;
    let match_end = (m.end().min(end) - start) as usize;

    Some(MatchLine {
        record,
        offset: m.offset,
        length: m.length,
        text: String::from_utf8_lossy(bytes).into_owned(),
        span: (match_start.min(bytes.len()), match_end.min(bytes.len())),
    })
}

fn stdout_for(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print matches as `record:offset:text` with the match highlighted
pub fn print_matches<I: RecordSearch + ?Sized>(
    index: &I,
    matches: &MatchSet,
    color: bool,
) -> io::Result<()> {
    let mut stdout = stdout_for(color);

    for m in matches {
        let Some(line) = locate_match(index, m) else {
            continue;
        };
        print_match_line(&mut stdout, &line)?;
    }

    Ok(())
}

/// Print matches as JSON lines
pub fn print_matches_json<I: RecordSearch + ?Sized>(
    index: &I,
    matches: &MatchSet,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for m in matches {
        let Some(line) = locate_match(index, m) else {
            continue;
        };
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }

    Ok(())
}

/// Print a match line with highlighted match
fn print_match_line(stdout: &mut StandardStream, line: &MatchLine) -> io::Result<()> {
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(stdout, "{}", line.record)?;
    stdout.reset()?;
    write!(stdout, ":")?;

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(stdout, "{}", line.offset)?;
    stdout.reset()?;
    write!(stdout, ":")?;

    // Lossy decoding may have shifted byte positions; fall back to plain text
    let (start, end) = line.span;
    if !line.text.is_char_boundary(start) || !line.text.is_char_boundary(end) {
        return writeln!(stdout, "{}", line.text);
    }

    write!(stdout, "{}", &line.text[..start])?;
    if end > start {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stdout, "{}", &line.text[start..end])?;
        stdout.reset()?;
    }
    writeln!(stdout, "{}", &line.text[end..])?;

    Ok(())
}

/// Print whole records, one per line
pub fn print_records(records: &[Vec<u8>], json: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for record in records {
        let text = String::from_utf8_lossy(record);
        if json {
            serde_json::to_writer(&mut out, &text)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", text)?;
        }
    }

    Ok(())
}

/// Print index statistics
pub fn print_stats(stats: &IndexStats, json: bool) -> io::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(stats)?;
        println!("{}", text);
        return Ok(());
    }

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Text size:        {}", format_size(stats.text_size as u64));
    println!("Suffixes:         {}", stats.suffix_count);
    println!("Records:          {}", stats.record_count);
    println!("Case-insensitive: {}", stats.case_insensitive);

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::SuffixArrayBuilder;

    #[test]
    fn test_locate_match() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_text(b"alpha\nbeta gamma\n");
        let sa = builder.build();

        let line = locate_match(&sa, &LocationMatch::new(11, 3)).unwrap();
        assert_eq!(line.record, 1);
        assert_eq!(line.text, "beta gamma");
        assert_eq!(line.span, (5, 8));
    }

    #[test]
    fn test_locate_match_clips_to_record() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_text(b"alpha\nbeta\n");
        let sa = builder.build();

        let line = locate_match(&sa, &LocationMatch::new(3, 6)).unwrap();
        assert_eq!(line.record, 0);
        assert_eq!(line.span, (3, 5));
        assert!(locate_match(&sa, &LocationMatch::new(100, 1)).is_none());
    }

    #[test]
    fn test_match_line_json() {
        let line = MatchLine {
            record: 2,
            offset: 40,
            length: 3,
            text: "foo".to_string(),
            span: (0, 3),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["record"], 2);
        assert_eq!(json["offset"], 40);
        assert!(json.get("span").is_none());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
