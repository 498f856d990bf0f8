//! Reader for binary execution data files.
//!
//! File layout: a sequence of blocks, each starting with a one-byte type.
//! - `0x01` header: magic `0xC0C0`, format version `0x1007`
//! - `0x10` session info: id (UTF), start (i64), dump (i64)
//! - `0x11` execution data: class id (i64), class name (UTF), probes
//!
//! Integers are big-endian, strings carry a u16 byte-length prefix, and
//! probe arrays are a varint length followed by bits packed LSB first.
//! The first block must be a header; an empty file holds no data.

use super::mutf8;
use super::store::{Accumulator, ExecutionData, SessionInfo};
use crate::utils::config::{
    BLOCK_EXECUTION_DATA, BLOCK_HEADER, BLOCK_SESSION_INFO, EXEC_FORMAT_VERSION, EXEC_MAGIC,
};
use crate::utils::error::ExecDataError;
use std::io::{ErrorKind, Read};

/// Upper bound on probes reserved up front; longer arrays grow as bytes arrive
const MAX_PROBE_PREALLOCATION: usize = 1 << 16;

/// Receiver for decoded records
pub trait ExecutionDataVisitor {
    fn visit_session(&mut self, info: SessionInfo);
    fn visit_class(&mut self, data: ExecutionData) -> Result<(), ExecDataError>;
}

impl ExecutionDataVisitor for Accumulator {
    fn visit_session(&mut self, info: SessionInfo) {
        Accumulator::visit_session(self, info);
    }

    fn visit_class(&mut self, data: ExecutionData) -> Result<(), ExecDataError> {
        Accumulator::visit_class(self, data)
    }
}

/// Records of a single file, in file order, without merging
#[derive(Debug, Default)]
pub struct RecordList {
    pub sessions: Vec<SessionInfo>,
    pub classes: Vec<ExecutionData>,
}

impl ExecutionDataVisitor for RecordList {
    fn visit_session(&mut self, info: SessionInfo) {
        self.sessions.push(info);
    }

    fn visit_class(&mut self, data: ExecutionData) -> Result<(), ExecDataError> {
        self.classes.push(data);
        Ok(())
    }
}

/// Streaming decoder over any byte source
pub struct ExecutionDataReader<R: Read> {
    input: R,
}

impl<R: Read> ExecutionDataReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Decode every block and hand records to `visitor`
    ///
    /// # Errors
    /// * `ExecDataError::InvalidFile` - first block is not a header
    /// * `ExecDataError::BadMagic` / `IncompatibleVersion` - foreign file
    /// * `ExecDataError::UnknownBlock` - unsupported block type
    /// * `ExecDataError::MalformedString` - a name is not modified UTF-8
    /// * `ExecDataError::Io` - read failure or truncated block
    pub fn read(&mut self, visitor: &mut dyn ExecutionDataVisitor) -> Result<(), ExecDataError> {
        let mut first_block = true;

        while let Some(block) = self.next_block_type()? {
            if first_block && block != BLOCK_HEADER {
                return Err(ExecDataError::InvalidFile);
            }
            first_block = false;

            match block {
                BLOCK_HEADER => self.read_header()?,
                BLOCK_SESSION_INFO => {
                    let id = self.read_utf()?;
                    let start = self.read_i64()?;
                    let dump = self.read_i64()?;
                    visitor.visit_session(SessionInfo::new(id, start, dump));
                }
                BLOCK_EXECUTION_DATA => {
                    let id = self.read_i64()? as u64;
                    let name = self.read_utf()?;
                    let probes = self.read_bool_array()?;
                    visitor.visit_class(ExecutionData::new(id, name, probes))?;
                }
                other => return Err(ExecDataError::UnknownBlock(other)),
            }
        }

        Ok(())
    }

    fn next_block_type(&mut self) -> Result<Option<u8>, ExecDataError> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_header(&mut self) -> Result<(), ExecDataError> {
        let magic = self.read_u16()?;
        if magic != EXEC_MAGIC {
            return Err(ExecDataError::BadMagic(magic));
        }
        let version = self.read_u16()?;
        if version != EXEC_FORMAT_VERSION {
            return Err(ExecDataError::IncompatibleVersion {
                found: version,
                expected: EXEC_FORMAT_VERSION,
            });
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, ExecDataError> {
        let mut buf = [0u8; 1];
        self.input.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self) -> Result<u16, ExecDataError> {
        let mut buf = [0u8; 2];
        self.input.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_i64(&mut self) -> Result<i64, ExecDataError> {
        let mut buf = [0u8; 8];
        self.input.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_utf(&mut self) -> Result<String, ExecDataError> {
        let len = self.read_u16()? as usize;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        mutf8::decode(&buf)
    }

    fn read_var_int(&mut self) -> Result<u32, ExecDataError> {
        let mut value: u32 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7F) as u32) << shift;
            if byte & 0x80 == 0 || shift >= 28 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn read_bool_array(&mut self) -> Result<Vec<bool>, ExecDataError> {
        let len = self.read_var_int()? as usize;
        let mut probes = Vec::with_capacity(len.min(MAX_PROBE_PREALLOCATION));
        let mut buffer = 0u8;
        for i in 0..len {
            if i % 8 == 0 {
                buffer = self.read_u8()?;
            }
            probes.push(buffer & 0x01 != 0);
            buffer >>= 1;
        }
        Ok(probes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::writer::ExecutionDataWriter;

    fn sample_bytes() -> Vec<u8> {
        let mut writer = ExecutionDataWriter::new(Vec::new()).unwrap();
        writer.write_session(&SessionInfo::new("host-1", 1000, 2000)).unwrap();
        writer
            .write_class(&ExecutionData::new(
                0xABCD,
                "com/example/Foo",
                vec![true, false, true, true, false, false, false, false, true],
            ))
            .unwrap();
        writer.into_inner().unwrap()
    }

    #[test]
    fn test_empty_input_has_no_records() {
        let mut records = RecordList::default();
        ExecutionDataReader::new(&[0u8; 0][..]).read(&mut records).unwrap();
        assert!(records.classes.is_empty());
        assert!(records.sessions.is_empty());
    }

    #[test]
    fn test_reads_written_records() {
        let bytes = sample_bytes();
        let mut records = RecordList::default();
        ExecutionDataReader::new(&bytes[..]).read(&mut records).unwrap();

        assert_eq!(records.sessions, vec![SessionInfo::new("host-1", 1000, 2000)]);
        assert_eq!(records.classes.len(), 1);
        assert_eq!(records.classes[0].name, "com/example/Foo");
        assert_eq!(records.classes[0].probes.len(), 9);
        assert_eq!(records.classes[0].covered_probes(), 4);
    }

    #[test]
    fn test_missing_header_rejected() {
        let bytes = [BLOCK_SESSION_INFO, 0, 0];
        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::InvalidFile)));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let bytes = [BLOCK_HEADER, 0x12, 0x34, 0x10, 0x07];
        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::BadMagic(0x1234))));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let bytes = [BLOCK_HEADER, 0xC0, 0xC0, 0x10, 0x06];
        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::IncompatibleVersion { .. })));
    }

    #[test]
    fn test_unknown_block_rejected() {
        let bytes = [BLOCK_HEADER, 0xC0, 0xC0, 0x10, 0x07, 0x7F];
        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::UnknownBlock(0x7F))));
    }

    #[test]
    fn test_truncated_block_is_io_error() {
        let mut bytes = sample_bytes();
        bytes.truncate(bytes.len() - 1);
        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::Io(_))));
    }

    #[test]
    fn test_large_probe_array_uses_multibyte_varint() {
        let probes: Vec<bool> = (0..300).map(|i| i % 3 == 0).collect();
        let mut writer = ExecutionDataWriter::new(Vec::new()).unwrap();
        writer.write_class(&ExecutionData::new(7, "Big", probes.clone())).unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut records = RecordList::default();
        ExecutionDataReader::new(&bytes[..]).read(&mut records).unwrap();
        assert_eq!(records.classes[0].probes, probes);
    }

    #[test]
    fn test_huge_array_length_fails_on_missing_bytes() {
        let mut bytes = vec![BLOCK_HEADER, 0xC0, 0xC0, 0x10, 0x07, BLOCK_EXECUTION_DATA];
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);

        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::Io(_))));
    }

    #[test]
    fn test_class_name_with_nul_and_supplementary_character() {
        let name = "com/ex/A\0\u{1D11E}";
        let mut writer = ExecutionDataWriter::new(Vec::new()).unwrap();
        writer.write_class(&ExecutionData::new(5, name, vec![true])).unwrap();
        let bytes = writer.into_inner().unwrap();

        // NUL as C0 80, the clef as two 3-byte surrogates
        assert_eq!(&bytes[14..16], &[0x00, 8 + 2 + 6]);
        assert_eq!(&bytes[24..26], &[0xC0, 0x80]);

        let mut records = RecordList::default();
        ExecutionDataReader::new(&bytes[..]).read(&mut records).unwrap();
        assert_eq!(records.classes[0].name, name);
    }

    #[test]
    fn test_invalid_name_bytes_rejected() {
        let mut bytes = vec![BLOCK_HEADER, 0xC0, 0xC0, 0x10, 0x07, BLOCK_EXECUTION_DATA];
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0x00, 0x01, 0xFF, 0x00]);

        let result = ExecutionDataReader::new(&bytes[..]).read(&mut RecordList::default());
        assert!(matches!(result, Err(ExecDataError::MalformedString(_))));
    }
}
