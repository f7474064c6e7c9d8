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

use tracing::debug;

use crate::{
    config::{CostModel, GeneralizedCost},
    models::{BaseModel, Coord, StopPointIdx},
    stop_index::{RoutingStopIdx, StopIndex},
    time::{PositiveDuration, SecondsSinceSearchStart},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreetMode {
    Walk,
    Bike,
    Car,
}

/// Where a street search ended up. Only stop points can be boarded;
/// the other kinds are returned by the street engine for display purposes
/// and are skipped by the mapper.
#[derive(Debug, Clone)]
pub enum Place {
    StopPoint(StopPointIdx),
    StopArea(String),
    Address(Coord),
    Poi(String),
}

/// The street path walked/ridden by one access or egress, as reported by
/// the street search.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub mode: StreetMode,
    pub duration: PositiveDuration,
    pub distance_meters: f64,
    pub geometry: Vec<Coord>,
}

impl Traversal {
    /// The same path walked backward. Egress traversals are computed from
    /// the destination outward, so their geometry must be flipped before
    /// being attached to a leg.
    pub fn reverse(&self) -> Traversal {
        let mut geometry = self.geometry.clone();
        geometry.reverse();
        Traversal {
            mode: self.mode,
            duration: self.duration,
            distance_meters: self.distance_meters,
            geometry,
        }
    }
}

/// Result of the street search around the origin or the destination.
#[derive(Debug, Clone)]
pub struct NearbyStop {
    pub place: Place,
    pub traversal: Traversal,
}

/// Result of the flexible-service search : an on-demand vehicle can pick up
/// (or drop off) within `[window_start, window_end]` and then rides
/// `ride_duration` to (or from) `stop_point`.
#[derive(Debug, Clone)]
pub struct FlexReach {
    pub stop_point: StopPointIdx,
    pub window_start: SecondsSinceSearchStart,
    pub window_end: SecondsSinceSearchStart,
    pub ride_duration: PositiveDuration,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Access,
    Egress,
}

/// A normalized way to enter or leave the transit network, handed to the
/// external search engine.
///
/// Closed set of variants behind one capability surface, so the search
/// engine never branches on the kind of service that produced it.
#[derive(Debug, Clone)]
pub enum AccessEgress {
    FixedRoute(FixedRouteAccessEgress),
    Flex(FlexAccessEgressAdapter),
}

#[derive(Debug, Clone)]
pub struct FixedRouteAccessEgress {
    stop: RoutingStopIdx,
    traversal: Traversal,
}

/// Wraps a flexible-service reachability result behind the same contract as
/// a fixed-route access/egress. The pickup window applies at the flex end
/// of the leg, whichever direction it is used in.
#[derive(Debug, Clone)]
pub struct FlexAccessEgressAdapter {
    stop: RoutingStopIdx,
    reach: FlexReach,
}

impl AccessEgress {
    pub fn stop(&self) -> RoutingStopIdx {
        match self {
            AccessEgress::FixedRoute(fixed) => fixed.stop,
            AccessEgress::Flex(flex) => flex.stop,
        }
    }

    pub fn duration(&self) -> PositiveDuration {
        match self {
            AccessEgress::FixedRoute(fixed) => fixed.traversal.duration,
            AccessEgress::Flex(flex) => flex.reach.ride_duration,
        }
    }

    pub fn distance_meters(&self) -> f64 {
        match self {
            AccessEgress::FixedRoute(fixed) => fixed.traversal.distance_meters,
            AccessEgress::Flex(flex) => flex.reach.distance_meters,
        }
    }

    pub fn street_mode(&self) -> Option<StreetMode> {
        match self {
            AccessEgress::FixedRoute(fixed) => Some(fixed.traversal.mode),
            AccessEgress::Flex(_) => None,
        }
    }

    pub fn geometry(&self) -> &[Coord] {
        match self {
            AccessEgress::FixedRoute(fixed) => &fixed.traversal.geometry,
            AccessEgress::Flex(_) => &[],
        }
    }

    /// `true` when boarding this access implies riding a vehicle
    /// (a flex service), as opposed to walking/cycling on the street.
    pub fn has_rides(&self) -> bool {
        matches!(self, AccessEgress::Flex(_))
    }

    pub fn generalized_cost(&self, cost_model: &CostModel) -> GeneralizedCost {
        match self {
            AccessEgress::FixedRoute(fixed) => match fixed.traversal.mode {
                StreetMode::Walk => cost_model.walk_cost(fixed.traversal.duration),
                StreetMode::Bike | StreetMode::Car => cost_model.ride_cost(fixed.traversal.duration),
            },
            AccessEgress::Flex(flex) => cost_model.ride_cost(flex.reach.ride_duration),
        }
    }

    /// Earliest instant one can be at the boarding stop when leaving the
    /// origin at `requested`. `None` when this access cannot be used that
    /// late (a flex window already closed).
    pub fn earliest_board_time(
        &self,
        requested: SecondsSinceSearchStart,
    ) -> Option<SecondsSinceSearchStart> {
        match self {
            AccessEgress::FixedRoute(fixed) => Some(requested + fixed.traversal.duration),
            AccessEgress::Flex(flex) => {
                let pickup = std::cmp::max(requested, flex.reach.window_start);
                if pickup > flex.reach.window_end {
                    None
                } else {
                    Some(pickup + flex.reach.ride_duration)
                }
            }
        }
    }

    /// Instant one reaches the destination when alighting the last vehicle
    /// at `alight_time`. `None` when this egress cannot be used that late.
    pub fn arrival_time(
        &self,
        alight_time: SecondsSinceSearchStart,
    ) -> Option<SecondsSinceSearchStart> {
        match self {
            AccessEgress::FixedRoute(fixed) => Some(alight_time + fixed.traversal.duration),
            AccessEgress::Flex(flex) => {
                let pickup = std::cmp::max(alight_time, flex.reach.window_start);
                if pickup > flex.reach.window_end {
                    None
                } else {
                    Some(pickup + flex.reach.ride_duration)
                }
            }
        }
    }
}

/// Converts street-search and flexible-service reachability results into
/// the legs consumed by the search engine.
pub struct AccessEgressMapper<'a> {
    stop_index: &'a StopIndex,
    base_model: &'a BaseModel,
}

impl<'a> AccessEgressMapper<'a> {
    pub fn new(stop_index: &'a StopIndex, base_model: &'a BaseModel) -> Self {
        Self {
            stop_index,
            base_model,
        }
    }

    /// Maps one street-search result. Returns `None` when the reached place
    /// is not a boardable stop point : this is not an error, it just means
    /// the search cannot board there.
    pub fn map_nearby_stop(
        &self,
        nearby_stop: &NearbyStop,
        direction: Direction,
    ) -> Option<AccessEgress> {
        let stop_point_idx = match &nearby_stop.place {
            Place::StopPoint(stop_point_idx) => *stop_point_idx,
            other => {
                debug!("Skipping a non-boardable place reached by the street search : {other:?}");
                return None;
            }
        };
        let stop = match self.stop_index.routing_idx(stop_point_idx, self.base_model) {
            Ok(stop) => stop,
            Err(err) => {
                debug!("Skipping a stop unreachable by transit : {err}");
                return None;
            }
        };
        let traversal = match direction {
            Direction::Access => nearby_stop.traversal.clone(),
            // the same street path, walked backward from the destination
            Direction::Egress => nearby_stop.traversal.reverse(),
        };
        Some(AccessEgress::FixedRoute(FixedRouteAccessEgress {
            stop,
            traversal,
        }))
    }

    pub fn map_nearby_stops(
        &self,
        nearby_stops: &[NearbyStop],
        direction: Direction,
    ) -> Vec<AccessEgress> {
        nearby_stops
            .iter()
            .filter_map(|nearby_stop| self.map_nearby_stop(nearby_stop, direction))
            .collect()
    }

    pub fn map_flex_reach(&self, reach: &FlexReach, direction: Direction) -> Option<AccessEgress> {
        let stop = match self.stop_index.routing_idx(reach.stop_point, self.base_model) {
            Ok(stop) => stop,
            Err(err) => {
                debug!(
                    "Skipping a flex {:?} bound to a stop unknown to transit : {}",
                    direction, err
                );
                return None;
            }
        };
        Some(AccessEgress::Flex(FlexAccessEgressAdapter {
            stop,
            reach: reach.clone(),
        }))
    }

    pub fn map_flex_reaches(
        &self,
        reaches: &[FlexReach],
        direction: Direction,
    ) -> Vec<AccessEgress> {
        reaches
            .iter()
            .filter_map(|reach| self.map_flex_reach(reach, direction))
            .collect()
    }
}
