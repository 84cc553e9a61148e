use std::fmt;

/// Climatological reference period, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselinePeriod {
    pub start: i32,
    pub end: i32,
}

impl BaselinePeriod {
    pub fn new(start: i32, end: i32) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl Default for BaselinePeriod {
    /// WMO climatological standard normal.
    fn default() -> Self {
        Self {
            start: 1991,
            end: 2020,
        }
    }
}

impl fmt::Display for BaselinePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_both_ends() {
        let period = BaselinePeriod::default();
        assert!(period.contains(1991));
        assert!(period.contains(2020));
        assert!(!period.contains(1990));
        assert!(!period.contains(2021));
    }

    #[test]
    fn test_new_rejects_reversed_period() {
        assert!(BaselinePeriod::new(2020, 1991).is_none());
        assert_eq!(
            BaselinePeriod::new(1961, 1990),
            Some(BaselinePeriod {
                start: 1961,
                end: 1990
            })
        );
    }
}
