use super::config::AnalysisConfig;
use super::gateway::Gateway;
use super::progress::ProgressReporter;

/// Everything an analysis run borrows from its caller.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub gateway: &'a Gateway,
    pub reporter: &'a ProgressReporter<'a>,
    pub config: &'a AnalysisConfig,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        gateway: &'a Gateway,
        reporter: &'a ProgressReporter<'a>,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            gateway,
            reporter,
            config,
        }
    }
}
