use serde::Deserialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// One sub-image to synthesize: a square resolution and a bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IconTarget {
    pub size: u32,
    pub bits: u16,
}

impl IconTarget {
    pub const fn new(size: u32, bits: u16) -> Self {
        Self { size, bits }
    }
}

impl fmt::Display for IconTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.size, self.size, self.bits)
    }
}

/// Set of Windows generations an icon should look right on.
///
/// Each flag contributes a fixed list of resolution and depth pairs; the
/// `FROM_*` composites include every newer generation as well.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct IconOutputFormat(u32);

impl IconOutputFormat {
    pub const NONE: Self = Self(0);
    pub const VISTA: Self = Self(1);
    pub const WIN_XP: Self = Self(2);
    pub const WIN_XP_UNPOPULAR: Self = Self(4);
    pub const WIN_95: Self = Self(8);
    pub const WIN_95_UNPOPULAR: Self = Self(16);
    pub const WIN_31: Self = Self(32);
    pub const WIN_31_UNPOPULAR: Self = Self(64);
    pub const WIN_30: Self = Self(128);
    /// Accepted for completeness; contributes no images.
    pub const WIN_30_UNPOPULAR: Self = Self(256);

    pub const FROM_WIN_XP: Self = Self(Self::WIN_XP.0 | Self::VISTA.0);
    pub const FROM_WIN_95: Self = Self(Self::WIN_95.0 | Self::FROM_WIN_XP.0);
    pub const FROM_WIN_31: Self = Self(Self::WIN_31.0 | Self::FROM_WIN_95.0);
    pub const FROM_WIN_30: Self = Self(Self::WIN_30.0 | Self::FROM_WIN_31.0);
    pub const ALL: Self = Self(0x1FF);

    const TABLE: &'static [(IconOutputFormat, &'static [IconTarget])] = &[
        (Self::VISTA, &[IconTarget::new(256, 32)]),
        (
            Self::WIN_XP_UNPOPULAR,
            &[IconTarget::new(64, 32), IconTarget::new(24, 32)],
        ),
        (
            Self::WIN_XP,
            &[
                IconTarget::new(48, 32),
                IconTarget::new(32, 32),
                IconTarget::new(16, 32),
            ],
        ),
        (Self::WIN_95_UNPOPULAR, &[IconTarget::new(24, 8)]),
        (
            Self::WIN_95,
            &[
                IconTarget::new(48, 8),
                IconTarget::new(32, 8),
                IconTarget::new(16, 8),
            ],
        ),
        (Self::WIN_31_UNPOPULAR, &[IconTarget::new(24, 4)]),
        (
            Self::WIN_31,
            &[
                IconTarget::new(48, 4),
                IconTarget::new(32, 4),
                IconTarget::new(16, 4),
            ],
        ),
        (
            Self::WIN_30,
            &[
                IconTarget::new(32, 1),
                IconTarget::new(24, 1),
                IconTarget::new(16, 1),
            ],
        ),
    ];

    const NAMES: &'static [(&'static str, IconOutputFormat)] = &[
        ("vista", Self::VISTA),
        ("winxp", Self::WIN_XP),
        ("winxp-unpopular", Self::WIN_XP_UNPOPULAR),
        ("win95", Self::WIN_95),
        ("win95-unpopular", Self::WIN_95_UNPOPULAR),
        ("win31", Self::WIN_31),
        ("win31-unpopular", Self::WIN_31_UNPOPULAR),
        ("win30", Self::WIN_30),
        ("win30-unpopular", Self::WIN_30_UNPOPULAR),
        ("from-winxp", Self::FROM_WIN_XP),
        ("from-win95", Self::FROM_WIN_95),
        ("from-win31", Self::FROM_WIN_31),
        ("from-win30", Self::FROM_WIN_30),
        ("all", Self::ALL),
    ];

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Targets for every flag in the set, largest resolution first and,
    /// within a resolution, deepest color first.
    pub fn targets(self) -> Vec<IconTarget> {
        let mut targets: Vec<IconTarget> = Self::TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .flat_map(|(_, targets)| targets.iter().copied())
            .collect();
        targets.sort_by(|a, b| b.cmp(a));
        targets.dedup();
        targets
    }

    /// Union of a list of format names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        names
            .iter()
            .try_fold(Self::NONE, |acc, name| Ok(acc | name.as_ref().parse()?))
    }
}

impl Default for IconOutputFormat {
    fn default() -> Self {
        Self::FROM_WIN_95
    }
}

impl BitOr for IconOutputFormat {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for IconOutputFormat {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromStr for IconOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, format)| *format)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::NAMES.iter().map(|(name, _)| *name).collect();
                format!("unknown icon format '{s}' (known: {})", known.join(", "))
            })
    }
}

impl TryFrom<String> for IconOutputFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Debug for IconOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES[..9]
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        write!(f, "IconOutputFormat({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(size: u32, bits: u16) -> IconTarget {
        IconTarget::new(size, bits)
    }

    #[test]
    fn test_default_is_from_win95() {
        assert_eq!(
            IconOutputFormat::default().targets(),
            vec![
                t(256, 32),
                t(48, 32),
                t(48, 8),
                t(32, 32),
                t(32, 8),
                t(16, 32),
                t(16, 8),
            ]
        );
    }

    #[test]
    fn test_all_targets() {
        let targets = IconOutputFormat::ALL.targets();
        assert_eq!(targets.len(), 18);
        assert_eq!(targets[0], t(256, 32));
        assert_eq!(targets[1], t(64, 32));
        assert_eq!(
            targets.iter().filter(|t| t.size == 24).count(),
            4,
            "24x24 at 32, 8, 4 and 1 bpp"
        );
    }

    #[test]
    fn test_composites() {
        assert!(IconOutputFormat::FROM_WIN_30.contains(IconOutputFormat::VISTA));
        assert!(IconOutputFormat::FROM_WIN_30.contains(IconOutputFormat::WIN_31));
        assert!(!IconOutputFormat::FROM_WIN_95.contains(IconOutputFormat::WIN_31));
        assert!(IconOutputFormat::ALL.contains(IconOutputFormat::WIN_30_UNPOPULAR));
        assert_eq!(
            IconOutputFormat::WIN_XP | IconOutputFormat::VISTA,
            IconOutputFormat::FROM_WIN_XP
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "From_Win31".parse::<IconOutputFormat>().unwrap(),
            IconOutputFormat::FROM_WIN_31
        );
        assert_eq!(
            IconOutputFormat::from_names(&["vista", "win30"]).unwrap(),
            IconOutputFormat::VISTA | IconOutputFormat::WIN_30
        );
        let err = "win98".parse::<IconOutputFormat>().unwrap_err();
        assert!(err.contains("unknown icon format 'win98'"));
    }

    #[test]
    fn test_single_flag_targets() {
        assert_eq!(
            IconOutputFormat::WIN_30.targets(),
            vec![t(32, 1), t(24, 1), t(16, 1)]
        );
        assert!(IconOutputFormat::WIN_30_UNPOPULAR.targets().is_empty());
    }
}
