//! Frame blocks: entry count, comment line, data rows.
//!
//! A stream is a sequence of blocks. Each block is a line holding the number
//! of entries `N`, one comment line, and `N` data rows laid out according to
//! the block's `Properties` schema (`species:S:1:pos:R:3` if absent).
//!
//! [`FrameReader`] reads blocks lazily from any [`BufRead`] source. Reading
//! stops at end of input; a tail of blank lines also ends the stream.
//!
//! ```rust
//! use extxyz::FrameReader;
//!
//! let text = "2\nenergy=-1.5\nH 0 0 0\nH 0 0 0.74\n1\n\nHe 1 1 1\n";
//! let frames: Vec<_> = FrameReader::new(text.as_bytes()).collect::<Result<_, _>>().unwrap();
//!
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames[0].n_atoms(), 2);
//! assert_eq!(frames[0].info.get("energy").and_then(|v| v.as_float()), Some(-1.5));
//! assert!(frames[1].info.is_empty());
//! ```

use crate::properties::{CompiledSchema, PropertiesSchema, Table};
use crate::{
    parse_comment_line, write_comment_line_with_options, write_rows, CommentLine, Document, Error,
    Lattice, Result, Value, WriteOptions,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One parsed block.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub info: Document,
    pub lattice: Option<Lattice>,
    pub schema: Arc<CompiledSchema>,
    pub table: Table,
}

impl Frame {
    /// Builds a frame whose schema is derived from `table`'s columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the table is empty or has non-array columns.
    pub fn new(info: Document, lattice: Option<Lattice>, table: Table) -> Result<Self> {
        let schema = PropertiesSchema::from_table(&table)?.compile()?;
        Ok(Frame {
            info,
            lattice,
            schema: Arc::new(schema),
            table,
        })
    }

    #[must_use]
    pub fn n_atoms(&self) -> usize {
        self.table.n_rows()
    }

    /// The comment line this frame is written with.
    #[must_use]
    pub fn comment_line(&self) -> CommentLine {
        CommentLine {
            info: self.info.clone(),
            lattice: self.lattice,
            properties: Some(self.schema.schema().clone()),
        }
    }
}

/// Time spent in each reading stage, accumulated across calls.
///
/// Owned by the caller and passed to [`FrameReader::next_timed`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timings {
    pub comment: Duration,
    pub compile: Duration,
    pub rows: Duration,
    pub frames: usize,
    pub rows_read: usize,
    /// Blocks that reused the previous block's compiled schema.
    pub schema_reuses: usize,
}

impl Timings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.comment + self.compile + self.rows
    }
}

/// Parsing state shared by [`FrameReader`] and [`parse_frame`].
#[derive(Default)]
struct BlockParser {
    previous: Option<Arc<CompiledSchema>>,
    lenient_comments: bool,
}

impl BlockParser {
    fn count(line: &str) -> Result<usize> {
        line.trim().parse().map_err(|_| {
            Error::syntax(0, 0, vec!["entry count".to_string()], "")
        })
    }

    fn comment(&self, line: &str) -> Result<CommentLine> {
        match parse_comment_line(line) {
            Ok(comment) => Ok(comment),
            Err(Error::Syntax { .. }) if self.lenient_comments => {
                log::warn!("storing unparsable comment line as plain text: {:?}", line);
                let mut info = Document::new();
                info.insert("comment".to_string(), Value::Str(line.trim().to_string()));
                Ok(CommentLine::new(info))
            }
            Err(err) => Err(err),
        }
    }

    fn schema(&mut self, properties: Option<PropertiesSchema>, timings: &mut Timings) -> Result<Arc<CompiledSchema>> {
        let properties = properties.unwrap_or_else(PropertiesSchema::default_schema);
        if let Some(previous) = &self.previous {
            if previous.schema() == &properties {
                timings.schema_reuses += 1;
                return Ok(Arc::clone(previous));
            }
        }
        let start = Instant::now();
        let compiled = Arc::new(properties.compile()?);
        timings.compile += start.elapsed();
        self.previous = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    fn block<'a, I>(&mut self, comment: &str, rows: I, timings: &mut Timings) -> Result<Frame>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let start = Instant::now();
        let comment = self.comment(comment)?;
        timings.comment += start.elapsed();

        let schema = self.schema(comment.properties, timings)?;

        let start = Instant::now();
        let table = schema.parse_rows(rows)?;
        timings.rows += start.elapsed();
        timings.rows_read += table.n_rows();
        timings.frames += 1;

        Ok(Frame {
            info: comment.info,
            lattice: comment.lattice,
            schema,
            table,
        })
    }
}

/// Lazy, forward-only reader of frame blocks.
///
/// Each step consumes exactly the lines of one block. After an error in the
/// comment line or data rows the block has still been consumed, so the next
/// call continues with the following block.
pub struct FrameReader<R> {
    reader: R,
    line: String,
    parser: BlockParser,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        FrameReader {
            reader,
            line: String::new(),
            parser: BlockParser::default(),
        }
    }

    /// Stores an unparsable comment line as a single `comment` string entry
    /// instead of failing the block.
    #[must_use]
    pub fn lenient_comments(mut self, lenient: bool) -> Self {
        self.parser.lenient_comments = lenient;
        self
    }

    fn read_line(&mut self) -> Result<Option<&str>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }

    /// Reads the next block.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// - [`Error::Syntax`] for a bad entry count or comment line
    /// - [`Error::ColumnCount`] if the input ends before `N` data rows
    /// - any error from the comment line or row parsing
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut timings = Timings::default();
        self.next_timed(&mut timings)
    }

    /// Like [`FrameReader::next_frame`], accumulating stage times into `timings`.
    pub fn next_timed(&mut self, timings: &mut Timings) -> Result<Option<Frame>> {
        let count = loop {
            match self.read_line()? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break BlockParser::count(line)?,
            }
        };

        let comment = match self.read_line()? {
            Some(line) => line.to_string(),
            None => {
                return Err(Error::syntax(0, 0, vec!["comment line".to_string()], ""));
            }
        };

        let mut rows = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            match self.read_line()? {
                Some(line) => rows.push(line.to_string()),
                None => return Err(Error::column_count(count, rows.len())),
            }
        }

        let frame = self
            .parser
            .block(&comment, rows.iter().map(String::as_str), timings)?;
        log::debug!(
            "read frame with {} entries and Properties {}",
            frame.n_atoms(),
            frame.schema.schema()
        );
        Ok(Some(frame))
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Parses a single block held in memory.
///
/// # Errors
///
/// Returns [`Error::ColumnCount`] if the text holds fewer or more data rows
/// than the entry count, in addition to the errors of [`FrameReader::next_frame`].
///
/// # Examples
///
/// ```rust
/// use extxyz::{parse_frame, Error};
///
/// let frame = parse_frame("1\nProperties=Z:I:1\n8\n").unwrap();
/// assert_eq!(frame.n_atoms(), 1);
///
/// let err = parse_frame("2\n\nH 0 0 0\n").unwrap_err();
/// assert_eq!(err, Error::column_count(2, 1));
/// ```
pub fn parse_frame(text: &str) -> Result<Frame> {
    let mut lines = text.lines();
    let count_line = lines
        .next()
        .ok_or_else(|| Error::syntax(0, 0, vec!["entry count".to_string()], ""))?;
    let count = BlockParser::count(count_line)?;
    let comment = lines
        .next()
        .ok_or_else(|| Error::syntax(0, 0, vec!["comment line".to_string()], ""))?;

    let mut rows: Vec<&str> = lines.collect();
    while rows.len() > count && rows.last().map_or(false, |l| l.trim().is_empty()) {
        rows.pop();
    }
    if rows.len() != count {
        return Err(Error::column_count(count, rows.len()));
    }

    BlockParser::default().block(comment, rows, &mut Timings::default())
}

/// Writes one block: entry count, comment line (with `Properties`), data rows.
///
/// The output ends with a newline.
///
/// # Errors
///
/// Any writer error for the comment line or rows.
pub fn write_frame(frame: &Frame, options: &WriteOptions) -> Result<String> {
    let comment = write_comment_line_with_options(&frame.comment_line(), options)?;
    let rows = write_rows(&frame.schema, &frame.table, &options.formats)?;
    let mut out = format!("{}\n{}\n", frame.n_atoms(), comment);
    if frame.n_atoms() > 0 {
        out.push_str(&rows);
        out.push('\n');
    }
    Ok(out)
}

/// Writes one block to `writer`.
pub fn write_frame_to<W: Write>(writer: &mut W, frame: &Frame, options: &WriteOptions) -> Result<()> {
    let text = write_frame(frame, options)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}
