#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryReportDto {
    pub succeeded: usize,
    pub failed: usize,
    pub abandoned: usize,
}
