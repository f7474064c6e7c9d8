// Copyright  (C) 2021, Hove and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Hove (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};

#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash)]
pub struct PositiveDuration {
    pub(crate) seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub const fn from_seconds(seconds: u32) -> PositiveDuration {
        PositiveDuration { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds as u64
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl std::ops::Mul<u32> for PositiveDuration {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds * rhs,
        }
    }
}

#[derive(Debug)]
pub struct DurationParseError {
    text: String,
}

impl std::error::Error for DurationParseError {}

impl Display for DurationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse `{}` as a duration. A duration looks like `hh:mm:ss`.",
            self.text
        )
    }
}

impl std::str::FromStr for PositiveDuration {
    type Err = DurationParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mk_err = || DurationParseError {
            text: text.to_string(),
        };
        let mut parts = text.split(':');
        let hours: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(mk_err)?;
        let minutes: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(mk_err)?;
        let seconds: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(mk_err)?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return Err(mk_err());
        }
        Ok(PositiveDuration::from_hms(hours, minutes, seconds))
    }
}

impl serde::Serialize for PositiveDuration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let hours = self.seconds / (60 * 60);
        let minutes = self.seconds / 60 % 60;
        let seconds = self.seconds % 60;
        serializer.serialize_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
    }
}

impl<'de> serde::Deserialize<'de> for PositiveDuration {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Duration since the start of the search time window.
///
/// All boarding/alighting instants handled by the core are stored as offsets
/// from this single epoch, so a journey crossing midnight needs no calendar
/// arithmetic.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct SecondsSinceSearchStart {
    seconds: u32,
}

impl serde::Serialize for SecondsSinceSearchStart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.seconds)
    }
}

impl<'de> serde::Deserialize<'de> for SecondsSinceSearchStart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let seconds = <u32 as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self { seconds })
    }
}

impl SecondsSinceSearchStart {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub fn total_seconds(&self) -> u32 {
        self.seconds
    }

    /// Offset of `datetime` from `search_start`.
    ///
    /// Returns `None` when `datetime` is before `search_start` : such an
    /// instant cannot be reached by the search and has no representation.
    pub fn from_datetimes(search_start: &NaiveDateTime, datetime: &NaiveDateTime) -> Option<Self> {
        let seconds_i64 = (*datetime - *search_start).num_seconds();
        if seconds_i64 < 0 || seconds_i64 > i64::from(u32::MAX) {
            None
        } else {
            Some(Self {
                seconds: seconds_i64 as u32,
            })
        }
    }

    pub fn to_naive_datetime(&self, search_start: &NaiveDateTime) -> NaiveDateTime {
        *search_start + chrono::Duration::seconds(i64::from(self.seconds))
    }

    pub fn duration_since(&self, earlier: &SecondsSinceSearchStart) -> Option<PositiveDuration> {
        self.seconds
            .checked_sub(earlier.seconds)
            .map(|seconds| PositiveDuration { seconds })
    }
}

impl std::ops::Add<PositiveDuration> for SecondsSinceSearchStart {
    type Output = Self;

    fn add(self, rhs: PositiveDuration) -> Self::Output {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl Display for SecondsSinceSearchStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.seconds / 60 / 60,
            self.seconds / 60 % 60,
            self.seconds % 60
        )
    }
}
