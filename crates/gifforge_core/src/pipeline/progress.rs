//! Stage-weighted progress model.
//!
//! Each stage owns a fixed sub-range of [0, 100]; within extraction,
//! progress is linear in segments completed. The mapping is a pure
//! function so exact percentages can be asserted at known checkpoints.

/// The sequential stages of one export task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    /// Task startup: working directory created, nothing invoked yet.
    Preparing,
    /// Per-segment trimming and filtering, 5-25%.
    ExtractingSegments,
    /// Palette generation milestone, 30%.
    GeneratingPalette,
    /// Final composition milestone, 60%.
    ComposingOutput,
    /// Destination verified, 100%.
    Finished,
}

impl ExportStage {
    /// Human-readable stage label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Preparing => "Preparing video segments",
            Self::ExtractingSegments => "Extracting segments",
            Self::GeneratingPalette => "Generating color palette",
            Self::ComposingOutput => "Creating GIF",
            Self::Finished => "Done",
        }
    }
}

/// Overall percentage for a stage and its internal completion count.
///
/// `completed`/`total` only matter during extraction; the other stages
/// report fixed milestones.
pub fn stage_progress(stage: ExportStage, completed: usize, total: usize) -> u32 {
    match stage {
        ExportStage::Preparing => 5,
        ExportStage::ExtractingSegments => {
            let fraction = completed as f64 / total.max(1) as f64;
            5 + (fraction * 20.0) as u32
        }
        ExportStage::GeneratingPalette => 30,
        ExportStage::ComposingOutput => 60,
        ExportStage::Finished => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_linear_in_segments() {
        assert_eq!(stage_progress(ExportStage::ExtractingSegments, 0, 4), 5);
        assert_eq!(stage_progress(ExportStage::ExtractingSegments, 1, 4), 10);
        assert_eq!(stage_progress(ExportStage::ExtractingSegments, 2, 4), 15);
        assert_eq!(stage_progress(ExportStage::ExtractingSegments, 3, 4), 20);
        assert_eq!(stage_progress(ExportStage::ExtractingSegments, 4, 4), 25);
    }

    #[test]
    fn extraction_tolerates_zero_total() {
        assert_eq!(stage_progress(ExportStage::ExtractingSegments, 0, 0), 5);
    }

    #[test]
    fn fixed_milestones() {
        assert_eq!(stage_progress(ExportStage::Preparing, 0, 0), 5);
        assert_eq!(stage_progress(ExportStage::GeneratingPalette, 0, 0), 30);
        assert_eq!(stage_progress(ExportStage::ComposingOutput, 0, 0), 60);
        assert_eq!(stage_progress(ExportStage::Finished, 0, 0), 100);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(ExportStage::GeneratingPalette.label(), "Generating color palette");
        assert_eq!(ExportStage::ComposingOutput.label(), "Creating GIF");
        assert_eq!(ExportStage::Finished.label(), "Done");
    }

    #[test]
    fn stage_sequence_is_monotonic() {
        let sequence = [
            stage_progress(ExportStage::Preparing, 0, 0),
            stage_progress(ExportStage::ExtractingSegments, 0, 3),
            stage_progress(ExportStage::ExtractingSegments, 3, 3),
            stage_progress(ExportStage::GeneratingPalette, 0, 0),
            stage_progress(ExportStage::ComposingOutput, 0, 0),
            stage_progress(ExportStage::Finished, 0, 0),
        ];
        assert!(sequence.windows(2).all(|w| w[0] <= w[1]));
    }
}
