#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    SkippedIrregularTable,
    DuplicateHeader,
    StatedTotalMissing,
    StatedTotalUnparseable,
    ReviewerCallFailed,
}

impl WarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SkippedIrregularTable => "skipped_irregular_table",
            Self::DuplicateHeader => "duplicate_header",
            Self::StatedTotalMissing => "stated_total_missing",
            Self::StatedTotalUnparseable => "stated_total_unparseable",
            Self::ReviewerCallFailed => "reviewer_call_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditWarning {
    pub code: WarningCode,
    pub message: String,
    pub page: Option<u32>,
    pub table_id: Option<usize>,
}

impl AuditWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
            table_id: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_table_id(mut self, table_id: usize) -> Self {
        self.table_id = Some(table_id);
        self
    }
}

impl std::fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)?;
        if let Some(page) = self.page {
            write!(f, " (page {page}")?;
            if let Some(table_id) = self.table_id {
                write!(f, ", table {table_id}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
