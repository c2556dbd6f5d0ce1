use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use pixtone_spec::SampleWidth;

use super::Sink;
use crate::error::{SinkError, SinkResult};
use crate::pcm::encode_sample;

/// Writes headerless signed little-endian PCM to any writer.
#[derive(Debug)]
pub struct RawSink<W: Write> {
    name: String,
    writer: W,
    width: SampleWidth,
    scratch: Vec<u8>,
    finished: bool,
}

impl<W: Write> RawSink<W> {
    /// Wraps a writer.
    pub fn new(name: impl Into<String>, writer: W, width: SampleWidth) -> Self {
        Self {
            name: name.into(),
            writer,
            width,
            scratch: Vec::new(),
            finished: false,
        }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for RawSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_frame(&mut self, frame: &[i32]) -> SinkResult<()> {
        self.scratch.clear();
        for &sample in frame {
            encode_sample(sample, self.width, &mut self.scratch);
        }
        self.writer.write_all(&self.scratch)?;
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        if !self.finished {
            self.finished = true;
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Headerless PCM written to a file.
///
/// Same cleanup rules as [`FileSink`](super::FileSink): the file survives only
/// if every write and the final flush succeed.
pub struct RawFileSink<W: Write = BufWriter<File>> {
    name: String,
    path: PathBuf,
    inner: Option<RawSink<W>>,
    failed: bool,
}

impl RawFileSink {
    /// Creates (or truncates) the file.
    pub fn create(path: impl AsRef<Path>, width: SampleWidth) -> SinkResult<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Ok(Self::from_writer(path, BufWriter::new(file), width))
    }
}

impl<W: Write> RawFileSink<W> {
    /// Wraps an already open writer for the file at `path`.
    pub fn from_writer(path: impl AsRef<Path>, writer: W, width: SampleWidth) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self {
            inner: Some(RawSink::new(name.clone(), writer, width)),
            name,
            path,
            failed: false,
        }
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once a failure has removed the file.
    pub fn is_discarded(&self) -> bool {
        self.failed
    }

    fn discard(&mut self) {
        self.failed = true;
        self.inner = None;
        let _ = fs::remove_file(&self.path);
    }
}

impl<W: Write> Sink for RawFileSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_frame(&mut self, frame: &[i32]) -> SinkResult<()> {
        let Some(inner) = self.inner.as_mut() else {
            return Err(SinkError::Io(io::Error::other(format!(
                "{} is already closed",
                self.name
            ))));
        };
        if let Err(err) = inner.write_frame(frame) {
            self.discard();
            return Err(err);
        }
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        let Some(mut inner) = self.inner.take() else {
            return Ok(());
        };
        if let Err(err) = inner.finish() {
            drop(inner);
            self.discard();
            return Err(err);
        }
        Ok(())
    }
}

impl<W: Write> Drop for RawFileSink<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            self.discard();
        }
    }
}

impl<W: Write> std::fmt::Debug for RawFileSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFileSink")
            .field("path", &self.path)
            .field("open", &self.inner.is_some())
            .field("failed", &self.failed)
            .finish()
    }
}
