/// A single text region reported by a backend that can return several
/// candidates for one crop.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub text: String,
    pub confidence: Option<f32>,
}

impl TextRegion {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Picks the region with the highest confidence. Regions without a score rank
/// below every scored region; on ties the earliest region wins.
pub fn best_region(regions: &[TextRegion]) -> Option<&TextRegion> {
    let mut best: Option<&TextRegion> = None;
    for region in regions {
        let better = match best {
            None => true,
            Some(current) => rank(region) > rank(current),
        };
        if better {
            best = Some(region);
        }
    }
    best
}

fn rank(region: &TextRegion) -> f32 {
    region.confidence.unwrap_or(f32::NEG_INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_region_empty() {
        assert!(best_region(&[]).is_none());
    }

    #[test]
    fn test_best_region_picks_highest_confidence() {
        let regions = vec![
            TextRegion::new("ACC", Some(0.41)),
            TextRegion::new("0012345", Some(0.97)),
            TextRegion::new("No.", Some(0.63)),
        ];
        assert_eq!(best_region(&regions).unwrap().text, "0012345");
    }

    #[test]
    fn test_best_region_tie_keeps_first() {
        let regions = vec![
            TextRegion::new("first", Some(0.5)),
            TextRegion::new("second", Some(0.5)),
        ];
        assert_eq!(best_region(&regions).unwrap().text, "first");
    }

    #[test]
    fn test_unscored_regions_rank_last() {
        let regions = vec![
            TextRegion::new("unscored", None),
            TextRegion::new("scored", Some(0.01)),
        ];
        assert_eq!(best_region(&regions).unwrap().text, "scored");
    }
}
