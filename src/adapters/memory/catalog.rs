//! In-memory step catalog.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::domain::foundation::DomainError;
use crate::domain::pipeline::{PipelineStep, StepCatalog, StepKind};
use crate::ports::StepCatalogReader;

/// Default onboarding catalog. Mirrors the seed migration.
pub static DEFAULT_STEPS: Lazy<Vec<PipelineStep>> = Lazy::new(|| {
    vec![
        PipelineStep::standard(1, "Discovery: Intro Call", 1),
        PipelineStep::new(2, "Discovery: Initial Survey", 2, StepKind::InitialSurvey),
        PipelineStep::standard(3, "Discovery: Survey Follow-up Call", 3),
        PipelineStep::standard(4, "Discovery: Process Mapping", 4),
        PipelineStep::standard(5, "Discovery: ROI Assessment", 5),
        PipelineStep::standard(6, "Discovery: Stakeholder Review", 6),
        PipelineStep::new(7, "Discovery: Survey Analysis", 7, StepKind::SurveyAnalysis),
        PipelineStep::new(8, "Factory Build: ADA Proposal Sent", 8, StepKind::FactoryBuild),
    ]
});

/// Step catalog held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryStepCatalog {
    catalog: StepCatalog,
}

impl InMemoryStepCatalog {
    pub fn new(steps: Vec<PipelineStep>) -> Self {
        Self {
            catalog: StepCatalog::new(steps),
        }
    }
}

impl Default for InMemoryStepCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS.clone())
    }
}

#[async_trait]
impl StepCatalogReader for InMemoryStepCatalog {
    async fn load_catalog(&self) -> Result<StepCatalog, DomainError> {
        Ok(self.catalog.clone())
    }
}
