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

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::time::{PositiveDuration, SecondsSinceSearchStart};

/// Whether the requested datetime is the wanted departure or the wanted
/// arrival of the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeRepresent {
    Departure,
    Arrival,
}

impl Default for DateTimeRepresent {
    fn default() -> Self {
        DateTimeRepresent::Departure
    }
}

impl Display for DateTimeRepresent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateTimeRepresent::Departure => write!(f, "departure"),
            DateTimeRepresent::Arrival => write!(f, "arrival"),
        }
    }
}

/// Weighted time used to compare journeys. One unit is one second of
/// in-vehicle ride time; everything else is scaled onto that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeneralizedCost {
    units: u64,
}

impl GeneralizedCost {
    pub fn zero() -> Self {
        Self { units: 0 }
    }

    pub fn from_units(units: u64) -> Self {
        Self { units }
    }

    pub fn units(&self) -> u64 {
        self.units
    }
}

impl std::ops::Add for GeneralizedCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            units: self.units + rhs.units,
        }
    }
}

impl Display for GeneralizedCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.units)
    }
}

/// Scaling factors applied when deriving the generalized cost of a journey.
///
/// Only the ordering semantics of the optimizer and the filters are
/// contractual; the factors themselves are tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostModel {
    /// each second spent walking counts as this many ride seconds
    #[serde(default = "default_walk_factor")]
    pub walk_factor: f64,

    /// each second spent waiting for a vehicle counts as this many ride seconds
    #[serde(default = "default_wait_factor")]
    pub wait_factor: f64,

    /// flat cost added for each transfer between two vehicles
    #[serde(default = "default_transfer_penalty")]
    pub transfer_penalty: PositiveDuration,
}

pub const DEFAULT_WALK_FACTOR: f64 = 2.0;
pub const DEFAULT_WAIT_FACTOR: f64 = 0.8;
pub const DEFAULT_TRANSFER_PENALTY: &str = "00:02:00";

pub fn default_walk_factor() -> f64 {
    DEFAULT_WALK_FACTOR
}

pub fn default_wait_factor() -> f64 {
    DEFAULT_WAIT_FACTOR
}

pub fn default_transfer_penalty() -> PositiveDuration {
    PositiveDuration::from_str(DEFAULT_TRANSFER_PENALTY).unwrap()
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            walk_factor: default_walk_factor(),
            wait_factor: default_wait_factor(),
            transfer_penalty: default_transfer_penalty(),
        }
    }
}

impl CostModel {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_factor("walk_factor", self.walk_factor)?;
        check_factor("wait_factor", self.wait_factor)?;
        Ok(())
    }

    pub fn ride_cost(&self, duration: PositiveDuration) -> GeneralizedCost {
        GeneralizedCost::from_units(duration.total_seconds())
    }

    pub fn walk_cost(&self, duration: PositiveDuration) -> GeneralizedCost {
        GeneralizedCost::from_units(scale(duration, self.walk_factor))
    }

    pub fn wait_cost(&self, duration: PositiveDuration) -> GeneralizedCost {
        GeneralizedCost::from_units(scale(duration, self.wait_factor))
    }

    pub fn transfer_cost(&self) -> GeneralizedCost {
        GeneralizedCost::from_units(self.transfer_penalty.total_seconds())
    }
}

fn scale(duration: PositiveDuration, factor: f64) -> u64 {
    (duration.total_seconds() as f64 * factor).round() as u64
}

fn check_factor(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::BadFactor {
            name: name.to_string(),
            value,
        })
    }
}

/// Never return more than this number of itineraries, whatever the request
/// asked for.
pub const MAX_NB_OF_ITINERARIES: usize = 200;

/// Parameters of the itinerary filter chain.
///
/// A group-by-similarity threshold below 0.5 disables that pass;
/// a threshold above 1.0 is a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterChainConfig {
    /// groups itineraries sharing this fraction of transit legs, keeps the cheapest one
    #[serde(default = "default_group_similarity_keep_one")]
    pub group_similarity_keep_one: f64,

    /// groups itineraries sharing this fraction of transit legs, keeps the three cheapest
    #[serde(default = "default_group_similarity_keep_three")]
    pub group_similarity_keep_three: f64,

    /// reject itineraries whose transit generalized cost exceeds this limit
    #[serde(default)]
    pub transit_generalized_cost_limit: Option<u64>,

    /// reject itineraries whose non-transit generalized cost exceeds this limit
    #[serde(default)]
    pub non_transit_generalized_cost_limit: Option<u64>,

    /// reject itineraries walking more than this ratio of the best walk-only distance
    /// (0 disables)
    #[serde(default = "default_walk_only_distance_ratio")]
    pub walk_only_distance_ratio: f64,

    /// reject bike-rental itineraries riding more than this ratio of the total distance
    /// (0 disables)
    #[serde(default)]
    pub bike_rental_distance_ratio: f64,

    /// reject park-and-ride itineraries driving more than this ratio of the
    /// fastest alternative's duration (0 disables)
    #[serde(default)]
    pub park_and_ride_duration_ratio: f64,

    /// drop walk-all-the-way itineraries when a transit alternative exists
    #[serde(default = "default_true")]
    pub remove_walk_all_the_way: bool,

    /// drop bike-only park-and-ride itineraries when direct bike was also requested
    #[serde(default)]
    pub remove_bike_only_park_and_ride: bool,

    /// keep itineraries whose only transit is a flex service to the destination
    #[serde(default)]
    pub keep_flex_only_to_destination: bool,

    /// drop transit itineraries costlier than the best street-only alternative
    #[serde(default = "default_true")]
    pub remove_transit_costlier_than_street_only: bool,

    /// drop itineraries whose latest leg departs after this offset
    #[serde(default)]
    pub latest_departure_time: Option<SecondsSinceSearchStart>,

    /// number of itineraries asked by the caller, capped by MAX_NB_OF_ITINERARIES
    #[serde(default = "default_nb_of_itineraries")]
    pub nb_of_itineraries: usize,

    /// tag rejected itineraries with the removal reason instead of dropping them
    #[serde(default)]
    pub debug: bool,
}

pub const DEFAULT_GROUP_SIMILARITY_KEEP_ONE: f64 = 0.85;
pub const DEFAULT_GROUP_SIMILARITY_KEEP_THREE: f64 = 0.68;
pub const DEFAULT_WALK_ONLY_DISTANCE_RATIO: f64 = 2.0;
pub const DEFAULT_NB_OF_ITINERARIES: usize = 10;

pub fn default_group_similarity_keep_one() -> f64 {
    DEFAULT_GROUP_SIMILARITY_KEEP_ONE
}

pub fn default_group_similarity_keep_three() -> f64 {
    DEFAULT_GROUP_SIMILARITY_KEEP_THREE
}

pub fn default_walk_only_distance_ratio() -> f64 {
    DEFAULT_WALK_ONLY_DISTANCE_RATIO
}

pub fn default_nb_of_itineraries() -> usize {
    DEFAULT_NB_OF_ITINERARIES
}

fn default_true() -> bool {
    true
}

impl Default for FilterChainConfig {
    fn default() -> Self {
        Self {
            group_similarity_keep_one: default_group_similarity_keep_one(),
            group_similarity_keep_three: default_group_similarity_keep_three(),
            transit_generalized_cost_limit: None,
            non_transit_generalized_cost_limit: None,
            walk_only_distance_ratio: default_walk_only_distance_ratio(),
            bike_rental_distance_ratio: 0.0,
            park_and_ride_duration_ratio: 0.0,
            remove_walk_all_the_way: true,
            remove_bike_only_park_and_ride: false,
            keep_flex_only_to_destination: false,
            remove_transit_costlier_than_street_only: true,
            latest_departure_time: None,
            nb_of_itineraries: default_nb_of_itineraries(),
            debug: false,
        }
    }
}

impl FilterChainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_similarity("group_similarity_keep_one", self.group_similarity_keep_one)?;
        check_similarity(
            "group_similarity_keep_three",
            self.group_similarity_keep_three,
        )?;
        check_factor("walk_only_distance_ratio", self.walk_only_distance_ratio)?;
        check_factor("bike_rental_distance_ratio", self.bike_rental_distance_ratio)?;
        check_factor(
            "park_and_ride_duration_ratio",
            self.park_and_ride_duration_ratio,
        )?;
        if self.nb_of_itineraries == 0 {
            return Err(ConfigError::NoItineraryRequested);
        }
        Ok(())
    }
}

fn check_similarity(name: &str, value: f64) -> Result<(), ConfigError> {
    // below 0.5 just disables the pass, but above 1.0 the caller made a mistake
    if value.is_finite() && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::BadSimilarityThreshold {
            name: name.to_string(),
            value,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    BadFactor { name: String, value: f64 },
    BadSimilarityThreshold { name: String, value: f64 },
    NoItineraryRequested,
}

impl std::error::Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConfigError::BadFactor { name, value } => {
                write!(
                    f,
                    "The parameter {} must be a finite non-negative number, got {}.",
                    name, value
                )
            }
            ConfigError::BadSimilarityThreshold { name, value } => {
                write!(
                    f,
                    "The parameter {} must be a number lower or equal to 1.0, got {}.",
                    name, value
                )
            }
            ConfigError::NoItineraryRequested => {
                write!(f, "The requested number of itineraries must be at least 1.")
            }
        }
    }
}
