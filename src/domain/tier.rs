//! Audience descriptions for the five explanation levels.

use super::level::LevelNumber;

/// Who a level is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub level: LevelNumber,
    pub name: &'static str,
    /// Short label for badges and headings
    pub label: &'static str,
    pub audience: &'static str,
}

static TIERS: [Tier; 5] = [
    Tier {
        level: LevelNumber::ALL[0],
        name: "Child",
        label: "Kids",
        audience: "Children ages 5-12",
    },
    Tier {
        level: LevelNumber::ALL[1],
        name: "Patient",
        label: "Patient",
        audience: "General adult patients and caregivers",
    },
    Tier {
        level: LevelNumber::ALL[2],
        name: "Nursing/Allied Health",
        label: "Nursing",
        audience: "Nurses, PAs, respiratory therapists, allied health professionals",
    },
    Tier {
        level: LevelNumber::ALL[3],
        name: "Medical Student",
        label: "Med Student",
        audience: "Medical students, PA students, advanced learners",
    },
    Tier {
        level: LevelNumber::ALL[4],
        name: "Physician",
        label: "Physician",
        audience: "Attending physicians, specialists, researchers",
    },
];

impl Tier {
    /// Tier description for a level
    pub fn of(level: LevelNumber) -> &'static Tier {
        &TIERS[(level.get() - 1) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_lookup_matches_level() {
        for level in LevelNumber::ALL {
            assert_eq!(Tier::of(level).level, level);
        }
        assert_eq!(Tier::of(LevelNumber::MAX).label, "Physician");
    }
}
