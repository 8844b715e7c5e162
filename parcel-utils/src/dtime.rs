use anyhow::{anyhow, Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Clock time of day with second resolution.
///
/// Parses the dataset's `"800"` / `"0800"` / `"8:00"` spellings and displays
/// as `HH:MM` (with seconds only when non-zero). Arithmetic saturates at
/// midnight on subtraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayTime(u32);

impl DayTime {
    pub const MIDNIGHT: DayTime = DayTime(0);

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        DayTime(hours * 3600 + minutes * 60 + seconds)
    }

    pub fn from_minutes(minutes: u32) -> Self {
        DayTime(minutes * 60)
    }

    /// Fractional hours rounded to the nearest second; this is how travel
    /// time (distance over speed) becomes a clock offset.
    pub fn from_hours(hours: f64) -> Self {
        DayTime((hours * 3600.0).round() as u32)
    }

    pub fn as_seconds(self) -> u32 {
        self.0
    }
}

impl Add for DayTime {
    type Output = DayTime;

    fn add(self, rhs: DayTime) -> DayTime {
        DayTime(self.0 + rhs.0)
    }
}

impl Sub for DayTime {
    type Output = DayTime;

    fn sub(self, rhs: DayTime) -> DayTime {
        DayTime(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for DayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = (self.0 / 3600, self.0 % 3600 / 60, self.0 % 60);
        if s == 0 {
            write!(f, "{:02}:{:02}", h, m)
        } else {
            write!(f, "{:02}:{:02}:{:02}", h, m, s)
        }
    }
}

impl FromStr for DayTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m, sec) = if s.contains(':') {
            let mut parts = s.split(':');
            let h = parts.next().unwrap_or_default();
            let m = parts.next().ok_or_else(|| anyhow!("invalid time {:?}", s))?;
            let sec = parts.next().unwrap_or("0");
            if parts.next().is_some() {
                return Err(anyhow!("invalid time {:?}", s));
            }
            (h.parse()?, m.parse()?, sec.parse()?)
        } else {
            // compact spelling: "800" or "0800"
            let n: u32 = s.parse().map_err(|_| anyhow!("invalid time {:?}", s))?;
            (n / 100, n % 100, 0)
        };
        if h > 24 || m > 59 || sec > 59 || (h == 24 && (m > 0 || sec > 0)) {
            return Err(anyhow!("time {:?} out of range", s));
        }
        Ok(DayTime::from_hms(h, m, sec))
    }
}

impl Serialize for DayTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DayTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
