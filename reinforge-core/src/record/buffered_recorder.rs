use super::{Record, Recorder};

/// Buffered recorder.
///
/// Keeps every record in memory. Used in tests and for inspecting a short run
/// after it finished.
#[derive(Debug, Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the records having the given key.
    pub fn with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.buf.iter().filter(move |r| r.get(key).is_some())
    }
}

impl Recorder for BufferedRecorder {
    /// Write a [`Record`] to the buffer.
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}
