//! Input sources: a named file or standard input, read lazily line by line

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Open a file, or stdin when `path` is `None` or `-`
pub fn open(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(p) if p != Path::new("-") => {
            tracing::debug!(path = %p.display(), "reading file");
            Ok(Box::new(BufReader::new(File::open(p)?)))
        }
        _ => {
            tracing::debug!("reading stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}

/// Lazy sequence of lines with `\n` / `\r\n` terminators removed.
///
/// Invalid UTF-8 is replaced rather than reported, so one bad byte does not
/// abort a search over a large file.
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
}

pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        reader,
        buf: Vec::new(),
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
