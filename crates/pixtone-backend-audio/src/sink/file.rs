use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use pixtone_spec::RenderConfig;

use super::Sink;
use crate::error::{SinkError, SinkResult};

/// Writes a WAVE file.
///
/// The file is either finalized by [`Sink::finish`] or removed: after the
/// first failed write, after a failed finalize, or when the sink is dropped
/// without being finished.
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<WavWriter<BufWriter<File>>>,
    failed: bool,
}

impl FileSink {
    /// Validates `config` and creates the file.
    pub fn create(path: impl AsRef<Path>, config: &RenderConfig) -> SinkResult<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let spec = WavSpec {
            channels: config.channels,
            sample_rate: config.sample_rate,
            bits_per_sample: config.sample_width.bits(),
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&path, spec)?;
        Ok(Self {
            name: path.display().to_string(),
            path,
            writer: Some(writer),
            failed: false,
        })
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once a failure has removed the file.
    pub fn is_discarded(&self) -> bool {
        self.failed
    }

    /// Drops the writer and deletes the file.
    fn discard(&mut self) {
        self.failed = true;
        self.writer = None;
        // The file may already be gone; nothing else to clean up.
        let _ = fs::remove_file(&self.path);
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_frame(&mut self, frame: &[i32]) -> SinkResult<()> {
        let result = match self.writer.as_mut() {
            Some(writer) => frame
                .iter()
                .try_for_each(|&sample| writer.write_sample(sample)),
            None => {
                return Err(SinkError::Io(io::Error::other(format!(
                    "{} is already closed",
                    self.name
                ))))
            }
        };
        if let Err(err) = result {
            self.discard();
            return Err(err.into());
        }
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        if let Err(err) = writer.finalize() {
            self.discard();
            return Err(err.into());
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if self.writer.is_some() {
            self.discard();
        }
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .field("failed", &self.failed)
            .finish()
    }
}
