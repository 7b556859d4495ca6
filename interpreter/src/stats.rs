use strum::EnumCount;
use tracing::info;

use crate::Opcode;

/// Per-opcode execution counts of an interpreter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStats {
    counts: [u64; Opcode::COUNT],
    labels: u64,
}

impl Default for ExecutionStats {
    fn default() -> Self {
        Self {
            counts: [0; Opcode::COUNT],
            labels: 0,
        }
    }
}

impl ExecutionStats {
    /// Records one executed statement; `None` stands for a label marker.
    pub(crate) fn record(&mut self, opcode: Option<Opcode>) {
        match opcode {
            Some(opcode) => self.counts[u8::from(opcode) as usize] += 1,
            None => self.labels += 1,
        }
    }

    pub fn count(&self, opcode: Opcode) -> u64 {
        self.counts[u8::from(opcode) as usize]
    }

    /// Label markers stepped over.
    pub const fn label_steps(&self) -> u64 {
        self.labels
    }

    pub fn total_steps(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.labels
    }

    /// Logs the count of every opcode that executed at least once.
    pub fn log_summary(&self) {
        for (index, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            if let Ok(opcode) = Opcode::try_from(index as u8) {
                info!(%opcode, count, "opcode executions");
            }
        }
        info!(
            labels = self.labels,
            total = self.total_steps(),
            "execution summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut stats = ExecutionStats::default();
        stats.record(Some(Opcode::Li));
        stats.record(Some(Opcode::Li));
        stats.record(Some(Opcode::Halt));
        stats.record(None);

        assert_eq!(stats.count(Opcode::Li), 2);
        assert_eq!(stats.count(Opcode::Syscall), 0);
        assert_eq!(stats.label_steps(), 1);
        assert_eq!(stats.total_steps(), 4);
    }
}
