use crate::types::Prediction;
use crate::util::round_display;
use serde::Serialize;

/// Staffing signal derived from the sign of `prediction - current`.
/// Zero is its own branch; there is no dead band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    IncreaseCapacity,
    OptimizeBacklog,
    MaintainStable,
}

impl Recommendation {
    pub fn from_diff(diff: f64) -> Self {
        if diff > 0.0 {
            Recommendation::IncreaseCapacity
        } else if diff < 0.0 {
            Recommendation::OptimizeBacklog
        } else {
            Recommendation::MaintainStable
        }
    }

    pub fn for_prediction(p: &Prediction) -> Self {
        Self::from_diff(p.diff)
    }

    pub fn text(&self) -> &'static str {
        match self {
            Recommendation::IncreaseCapacity => {
                "Allocate extra operators/machines and increase appointment slots to reduce waiting time."
            }
            Recommendation::OptimizeBacklog => {
                "Optimize staffing schedule and use time for backlog updates or maintenance."
            }
            Recommendation::MaintainStable => {
                "Workload is expected to remain stable. Maintain current staffing and monitoring."
            }
        }
    }

    pub fn headline(&self, diff: f64) -> String {
        match self {
            Recommendation::IncreaseCapacity => {
                format!("Workload may increase by ~{} next month.", round_display(diff))
            }
            Recommendation::OptimizeBacklog => {
                format!("Workload may decrease by ~{} next month.", round_display(diff).abs())
            }
            Recommendation::MaintainStable => {
                "Workload is expected to remain stable next month.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_decides_the_branch() {
        assert_eq!(Recommendation::from_diff(5.0), Recommendation::IncreaseCapacity);
        assert_eq!(Recommendation::from_diff(-5.0), Recommendation::OptimizeBacklog);
        assert_eq!(Recommendation::from_diff(0.0), Recommendation::MaintainStable);
        assert_eq!(Recommendation::from_diff(-0.0), Recommendation::MaintainStable);
    }

    #[test]
    fn tiny_differences_are_not_rounded_away() {
        assert_eq!(Recommendation::from_diff(1e-9), Recommendation::IncreaseCapacity);
        assert_eq!(Recommendation::from_diff(-1e-9), Recommendation::OptimizeBacklog);
    }

    #[test]
    fn headlines_report_rounded_magnitude() {
        assert_eq!(
            Recommendation::IncreaseCapacity.headline(4.6),
            "Workload may increase by ~5 next month."
        );
        assert_eq!(
            Recommendation::OptimizeBacklog.headline(-12.2),
            "Workload may decrease by ~12 next month."
        );
        assert_eq!(
            Recommendation::OptimizeBacklog.headline(-0.3),
            "Workload may decrease by ~0 next month."
        );
        assert_eq!(
            Recommendation::IncreaseCapacity.headline(2.5),
            "Workload may increase by ~2 next month."
        );
    }
}
