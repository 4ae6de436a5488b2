use crate::models::Stage;

/// Keyword table mapping stage labels to funnel phases. Labels are
/// free-text and locale-dependent, so each phase registers both accented
/// and unaccented spellings. Matching is case-insensitive substring.
#[derive(Debug, Clone)]
pub struct PhaseKeywords {
    pub approval_sent: Vec<String>,
    pub validation_sent: Vec<String>,
    pub implemented: Vec<String>,
}

impl Default for PhaseKeywords {
    fn default() -> Self {
        Self {
            approval_sent: lowercase(&["aprovadores", "aprovação", "aprovacao"]),
            validation_sent: lowercase(&["validação", "validacao"]),
            implemented: lowercase(&["implantada", "implantação", "implantacao"]),
        }
    }
}

fn lowercase(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

/// At most one representative stage per funnel phase.
#[derive(Debug, Default)]
pub struct FunnelStages<'a> {
    pub approval_sent: Option<&'a Stage>,
    pub validation_sent: Option<&'a Stage>,
    pub implemented: Option<&'a Stage>,
}

/// Walks the stage sequence in its given order and keeps, per phase, the
/// last stage whose label matches that phase's keywords. Phases are
/// evaluated independently; one stage may represent several phases when
/// keyword sets overlap.
pub fn classify<'a>(stages: &'a [Stage], keywords: &PhaseKeywords) -> FunnelStages<'a> {
    let mut phases = FunnelStages::default();

    for stage in stages {
        let Some(label) = stage.label() else { continue };
        let label = label.to_lowercase();

        if matches_any(&label, &keywords.approval_sent) {
            phases.approval_sent = Some(stage);
        }
        if matches_any(&label, &keywords.validation_sent) {
            phases.validation_sent = Some(stage);
        }
        if matches_any(&label, &keywords.implemented) {
            phases.implemented = Some(stage);
        }
    }

    phases
}

fn matches_any(label: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| label.contains(k.as_str()))
}

/// Outcome of an idea sitting on someone's implementation plate, judged
/// from its current stage label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplementationOutcome {
    Completed,
    Pending,
    Excluded,
}

/// Keyword table for the individual report's implementation triage.
#[derive(Debug, Clone)]
pub struct ImplementationKeywords {
    pub completed: Vec<String>,
    pub excluded: Vec<String>,
}

impl Default for ImplementationKeywords {
    fn default() -> Self {
        Self {
            completed: lowercase(&[
                "implantada",
                "implantação",
                "implantacao",
                "validada",
                "concluida",
            ]),
            excluded: lowercase(&["cancelada", "reprovada"]),
        }
    }
}

impl ImplementationKeywords {
    /// Completion wins over exclusion; anything else is pending.
    pub fn triage(&self, status: &str) -> ImplementationOutcome {
        let status = status.to_lowercase();
        if matches_any(&status, &self.completed) {
            ImplementationOutcome::Completed
        } else if matches_any(&status, &self.excluded) {
            ImplementationOutcome::Excluded
        } else {
            ImplementationOutcome::Pending
        }
    }
}
