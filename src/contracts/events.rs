use crate::contracts::error::MalformedEvent;

/// The first, unsorted tier of the LSM tree.
pub const BASE_LEVEL: u8 = 0;

/// A single on-disk table taking part in a compaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableInfo {
    /// Engine file number of the table
    pub file_num: u64,
    /// Table size in bytes
    pub size: u64,
}

/// The tables a compaction reads from (or writes to) at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u8,
    pub tables: Vec<TableInfo>,
}

impl LevelInfo {
    pub fn new(level: u8, tables: Vec<TableInfo>) -> Self {
        Self { level, tables }
    }
}

/// Payload the engine passes to compaction begin/end callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactionInfo {
    /// Engine-assigned compaction job id
    pub job_id: u64,
    /// Input levels, usually the start level first
    pub inputs: Vec<LevelInfo>,
    /// Level the compaction writes into
    pub output: LevelInfo,
}

impl CompactionInfo {
    /// Returns the lowest level among the inputs.
    ///
    /// An event without inputs cannot be classified and is reported as
    /// [`MalformedEvent::NoInputLevels`].
    #[inline]
    pub fn lowest_input_level(&self) -> Result<u8, MalformedEvent> {
        self.inputs
            .iter()
            .map(|l| l.level)
            .min()
            .ok_or(MalformedEvent::NoInputLevels {
                job_id: self.job_id,
            })
    }
}

/// Payload the engine passes when it starts stalling writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStallBeginInfo {
    /// Engine-provided explanation, e.g. "L0 file count limit exceeded"
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(level: u8, sizes: &[u64]) -> LevelInfo {
        LevelInfo::new(
            level,
            sizes
                .iter()
                .enumerate()
                .map(|(i, &size)| TableInfo {
                    file_num: i as u64,
                    size,
                })
                .collect(),
        )
    }

    #[test]
    fn test_lowest_input_level_picks_minimum() {
        let info = CompactionInfo {
            job_id: 1,
            inputs: vec![level(3, &[10]), level(2, &[20])],
            output: level(3, &[]),
        };
        assert_eq!(info.lowest_input_level(), Ok(2));
    }

    #[test]
    fn test_l0_compaction() {
        let info = CompactionInfo {
            job_id: 2,
            inputs: vec![level(0, &[1, 2, 3]), level(1, &[4])],
            output: level(1, &[]),
        };
        assert_eq!(info.lowest_input_level(), Ok(BASE_LEVEL));
    }

    #[test]
    fn test_empty_inputs_are_malformed() {
        let info = CompactionInfo {
            job_id: 9,
            ..Default::default()
        };
        assert_eq!(
            info.lowest_input_level(),
            Err(MalformedEvent::NoInputLevels { job_id: 9 })
        );
    }
}
