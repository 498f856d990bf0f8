//! Loading collaborator used by the report driver.

use super::reader::ExecutionDataReader;
use super::store::Accumulator;
use crate::utils::error::ExecDataError;
use std::io::Read;

/// Decodes one execution data source into the run's accumulator
pub trait ExecutionDataLoader {
    /// Merge everything in `source` into `accumulator`
    ///
    /// # Errors
    /// Any decode or merge failure; the run is aborted by the caller
    fn load(&self, source: &mut dyn Read, accumulator: &mut Accumulator) -> Result<(), ExecDataError>;
}

/// Loader for the binary `.exec` format
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecFileLoader;

impl ExecutionDataLoader for ExecFileLoader {
    fn load(&self, source: &mut dyn Read, accumulator: &mut Accumulator) -> Result<(), ExecDataError> {
        ExecutionDataReader::new(source).read(accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecutionData, ExecutionDataWriter, SessionInfo};

    #[test]
    fn test_load_merges_into_accumulator() {
        let mut writer = ExecutionDataWriter::new(Vec::new()).unwrap();
        writer.write_session(&SessionInfo::new("s", 1, 2)).unwrap();
        writer
            .write_class(&ExecutionData::new(9, "a/A", vec![false, true]))
            .unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut acc = Accumulator::new();
        ExecFileLoader.load(&mut bytes.as_slice(), &mut acc).unwrap();
        ExecFileLoader.load(&mut bytes.as_slice(), &mut acc).unwrap();

        let merged = acc.freeze();
        assert_eq!(merged.execution_data().len(), 1);
        assert_eq!(merged.sessions().len(), 2);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut acc = Accumulator::new();
        let result = ExecFileLoader.load(&mut &b"not exec"[..], &mut acc);
        assert!(result.is_err());
    }
}
