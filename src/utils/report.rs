//! Parse reporting for document-level runs.

use serde::Serialize;

/// One failed block, preserved verbatim for manual review.
#[derive(Debug, Clone, Serialize)]
pub struct BlockError {
    /// 0-based index of the block within the document scan.
    pub index: usize,
    pub message: String,
    pub raw_block: String,
}

/// Summary of a document parse: how many blocks were seen, how many became
/// questions, and every failure with its source text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub total_blocks: usize,
    pub parsed: usize,
    pub errors: Vec<BlockError>,
}

impl ParseReport {
    pub fn record_error(&mut self, index: usize, message: impl Into<String>, raw_block: &str) {
        self.errors.push(BlockError {
            index,
            message: message.into(),
            raw_block: raw_block.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accounting() {
        let mut report = ParseReport::default();
        report.total_blocks = 3;
        report.parsed = 2;
        report.record_error(1, "no environment", "\\begin{ex}broken");
        assert!(!report.is_clean());
        assert_eq!(report.errors[0].index, 1);
        assert!(report.errors[0].raw_block.contains("broken"));
    }

    #[test]
    fn test_report_serializes() {
        let report = ParseReport::default();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"total_blocks\":0"));
    }
}
