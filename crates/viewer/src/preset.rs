use foundation::math::Vec3;

/// Canned camera placements around the current view center.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ViewPreset {
    /// Corner view, offset equally on all three axes.
    #[default]
    Default,
    /// Straight down from above.
    Top,
    /// Along the depth axis.
    Front,
}

impl ViewPreset {
    /// Camera position and up vector for a view at `distance` from `center`.
    pub fn placement(self, center: Vec3, distance: f64) -> (Vec3, Vec3) {
        match self {
            ViewPreset::Default => {
                let d = distance / 3f64.sqrt();
                (center + Vec3::splat(d), Vec3::new(0.0, 1.0, 0.0))
            }
            ViewPreset::Top => (
                center + Vec3::new(0.0, distance, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
            ),
            ViewPreset::Front => (
                center + Vec3::new(0.0, 0.0, distance),
                Vec3::new(0.0, 1.0, 0.0),
            ),
        }
    }
}

impl std::str::FromStr for ViewPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ViewPreset::Default),
            "top" => Ok(ViewPreset::Top),
            "front" => Ok(ViewPreset::Front),
            other => Err(format!("unknown view preset {other:?} (expected default|top|front)")),
        }
    }
}
