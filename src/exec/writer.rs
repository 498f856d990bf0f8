//! Writer for binary execution data files.
//!
//! Produces the same block layout `ExecutionDataReader` consumes. Used by
//! the `merge` command to persist merged coverage.

use super::mutf8;
use super::store::{ExecutionData, MergedCoverage, SessionInfo};
use crate::utils::config::{
    BLOCK_EXECUTION_DATA, BLOCK_HEADER, BLOCK_SESSION_INFO, EXEC_FORMAT_VERSION, EXEC_MAGIC,
};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Streaming encoder; the header is written on construction
pub struct ExecutionDataWriter<W: Write> {
    output: W,
}

impl<W: Write> ExecutionDataWriter<W> {
    pub fn new(mut output: W) -> io::Result<Self> {
        output.write_all(&[BLOCK_HEADER])?;
        output.write_all(&EXEC_MAGIC.to_be_bytes())?;
        output.write_all(&EXEC_FORMAT_VERSION.to_be_bytes())?;
        Ok(Self { output })
    }

    pub fn write_session(&mut self, info: &SessionInfo) -> io::Result<()> {
        self.output.write_all(&[BLOCK_SESSION_INFO])?;
        self.write_utf(&info.id)?;
        self.output.write_all(&info.start.to_be_bytes())?;
        self.output.write_all(&info.dump.to_be_bytes())
    }

    pub fn write_class(&mut self, data: &ExecutionData) -> io::Result<()> {
        self.output.write_all(&[BLOCK_EXECUTION_DATA])?;
        self.output.write_all(&(data.id as i64).to_be_bytes())?;
        self.write_utf(&data.name)?;
        self.write_bool_array(&data.probes)
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> io::Result<W> {
        self.output.flush()?;
        Ok(self.output)
    }

    fn write_utf(&mut self, value: &str) -> io::Result<()> {
        let bytes = mutf8::encode(value);
        let len = u16::try_from(bytes.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "string too long for execution data")
        })?;
        self.output.write_all(&len.to_be_bytes())?;
        self.output.write_all(&bytes)
    }

    fn write_var_int(&mut self, mut value: u32) -> io::Result<()> {
        while value & 0xFFFF_FF80 != 0 {
            self.output.write_all(&[0x80 | (value & 0x7F) as u8])?;
            value >>= 7;
        }
        self.output.write_all(&[value as u8])
    }

    fn write_bool_array(&mut self, values: &[bool]) -> io::Result<()> {
        let len = u32::try_from(values.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "probe array too long")
        })?;
        self.write_var_int(len)?;

        for chunk in values.chunks(8) {
            let byte = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &v)| if v { acc | (1 << i) } else { acc });
            self.output.write_all(&[byte])?;
        }
        Ok(())
    }
}

/// Write merged coverage to a single execution data file
///
/// **Public** - used by the `merge` command
pub fn write_merged(coverage: &MergedCoverage, output_path: impl AsRef<Path>) -> io::Result<()> {
    let output_path = output_path.as_ref();

    info!("Writing merged execution data to: {}", output_path.display());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output_path)?;
    let mut writer = ExecutionDataWriter::new(BufWriter::new(file))?;

    for session in coverage.sessions() {
        writer.write_session(session)?;
    }
    for data in coverage.execution_data().contents() {
        writer.write_class(data)?;
    }

    writer.into_inner()?;
    Ok(())
}
