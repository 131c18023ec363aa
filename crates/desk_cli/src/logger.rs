use anyhow::{Context, Result};
use desk_core::{StepLogger, StepRecord, StepRow};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Appends one CSV row per tick. The header is written on creation so an
/// empty run still produces a readable file.
pub struct CsvStepLogger<W: Write + Send = File> {
    writer: csv::Writer<W>,
}

impl CsvStepLogger<File> {
    /// Create (or truncate) `path`, making parent directories as needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create step log {}", path.display()))?;
        tracing::info!("Logging steps to {}", path.display());
        Self::from_writer(file)
    }
}

impl<W: Write + Send> CsvStepLogger<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(StepRow::HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush step log: {}", e.error()))
    }
}

impl<W: Write + Send> StepLogger for CsvStepLogger<W> {
    fn log_step(&mut self, record: &StepRecord) -> Result<()> {
        self.writer
            .serialize(StepRow::from(record))
            .context("Failed to write step row")?;
        // Readers may tail the file mid-run.
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
