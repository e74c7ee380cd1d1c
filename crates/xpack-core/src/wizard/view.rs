//! Pure mapping from navigation state to what the wizard shows.

use super::layout::{Controls, WizardLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Active,
    Inactive,
}

/// State of one progress dot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Completed,
    Active,
    Pending,
}

/// Optional parts of the markup that take part in rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFeatures {
    pub progress: bool,
    pub counter: bool,
    pub controls: Controls,
}

impl From<&WizardLayout> for ViewFeatures {
    fn from(layout: &WizardLayout) -> Self {
        Self {
            progress: layout.progress,
            counter: layout.counter,
            controls: layout.controls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub steps: Vec<StepStatus>,
    /// Empty when the markup has no progress dots
    pub progress: Vec<ProgressStatus>,
    pub counter: Option<String>,
    pub back_visible: bool,
    pub next_visible: bool,
    pub submit_visible: bool,
    pub next_enabled: bool,
}

impl ViewState {
    /// Compute the view for `current` out of `total` steps.
    /// `next_enabled` is left false; it depends on field state.
    pub fn compute(current: usize, total: usize, features: ViewFeatures) -> Self {
        let is_first = current == 0;
        let is_last = current + 1 >= total;

        let steps = (0..total)
            .map(|i| if i == current { StepStatus::Active } else { StepStatus::Inactive })
            .collect();

        let progress = if features.progress {
            (0..total)
                .map(|i| match i.cmp(&current) {
                    std::cmp::Ordering::Less => ProgressStatus::Completed,
                    std::cmp::Ordering::Equal => ProgressStatus::Active,
                    std::cmp::Ordering::Greater => ProgressStatus::Pending,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            steps,
            progress,
            counter: features.counter.then(|| counter_text(current, total)),
            back_visible: features.controls.back && !is_first,
            next_visible: features.controls.next && !is_last,
            submit_visible: features.controls.submit && is_last,
            next_enabled: false,
        }
    }
}

/// Step counter phrasing shown to users
pub fn counter_text(current: usize, total: usize) -> String {
    format!("Paso {} de {}", current + 1, total)
}
