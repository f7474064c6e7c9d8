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

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    access_egress::{AccessEgress, StreetMode},
    config::{CostModel, GeneralizedCost},
    models::{Coord, StopPointIdx, VehicleJourneyIdx},
    stop_index::StopIndex,
    time::{PositiveDuration, SecondsSinceSearchStart},
    transfer::{path::OptimizedPath, ConstrainedTransfer},
};

const WALK_SPEED_METERS_PER_SECOND: f64 = 1.4;

/// One vehicle ride of an itinerary.
#[derive(Debug, Clone)]
pub struct TransitLeg {
    pub vehicle_journey: VehicleJourneyIdx,
    pub day: NaiveDate,
    pub from_stop_point: StopPointIdx,
    pub to_stop_point: StopPointIdx,
    pub board_time: SecondsSinceSearchStart,
    pub alight_time: SecondsSinceSearchStart,
    /// the rule of the transfer that led into this leg, when the operator
    /// defined one
    pub constrained_transfer: Option<ConstrainedTransfer>,
}

/// A street traversal : access, egress, or the walk of a transfer.
#[derive(Debug, Clone)]
pub struct StreetLeg {
    pub mode: StreetMode,
    pub departure: SecondsSinceSearchStart,
    pub arrival: SecondsSinceSearchStart,
    pub distance_meters: f64,
    pub geometry: Vec<Coord>,
}

/// A ride on an on-demand service.
#[derive(Debug, Clone)]
pub struct FlexLeg {
    pub departure: SecondsSinceSearchStart,
    pub arrival: SecondsSinceSearchStart,
    pub distance_meters: f64,
}

#[derive(Debug, Clone)]
pub enum Leg {
    Transit(TransitLeg),
    Street(StreetLeg),
    Flex(FlexLeg),
}

impl Leg {
    pub fn departure(&self) -> SecondsSinceSearchStart {
        match self {
            Leg::Transit(leg) => leg.board_time,
            Leg::Street(leg) => leg.departure,
            Leg::Flex(leg) => leg.departure,
        }
    }

    pub fn arrival(&self) -> SecondsSinceSearchStart {
        match self {
            Leg::Transit(leg) => leg.alight_time,
            Leg::Street(leg) => leg.arrival,
            Leg::Flex(leg) => leg.arrival,
        }
    }
}

/// Why a filter rejected an itinerary, kept when the chain runs in debug
/// mode instead of actually removing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedReason {
    GroupedBySimilarity,
    TransitCostLimit,
    NonTransitCostLimit,
    WalkDistanceRatio,
    BikeDistanceRatio,
    ParkAndRideDurationRatio,
    WalkAllTheWay,
    BikeOnlyParkAndRide,
    FlexOnlyToDestination,
    CostlierThanStreetOnly,
    LatestDepartureTime,
}

/// A user-facing travel plan. Immutable once built : filters select or
/// remove whole itineraries, never edit one.
#[derive(Debug, Clone)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
    pub departure: SecondsSinceSearchStart,
    pub arrival: SecondsSinceSearchStart,
    pub transit_cost: GeneralizedCost,
    pub street_cost: GeneralizedCost,
    pub nb_of_transfers: usize,
    pub walk_distance_meters: f64,
    pub search_start: NaiveDateTime,
    /// set by the filter chain in debug mode
    pub removed: Option<RemovedReason>,
}

impl Itinerary {
    /// Presentation form of an optimized path : access leg, vehicle legs
    /// joined by their transfer walks, egress leg. A stay-seated junction
    /// emits no walk leg, the traveler never leaves the vehicle.
    pub fn from_optimized_path(
        path: &OptimizedPath,
        stop_index: &StopIndex,
        cost_model: &CostModel,
        search_start: NaiveDateTime,
    ) -> Self {
        let mut legs = Vec::new();
        let mut walk_distance_meters = 0.0;

        let first_board_time = path.legs[0].trip.departure_at(path.legs[0].board_position);
        legs.push(access_egress_leg(
            &path.access,
            path.departure,
            // the traveler is at the stop as soon as the access ends, the
            // remaining gap is waiting
            path.access
                .earliest_board_time(path.departure)
                .unwrap_or(first_board_time),
        ));
        if let Some(StreetMode::Walk) = path.access.street_mode() {
            walk_distance_meters += path.access.distance_meters();
        }

        for leg in &path.legs {
            if let Some(transfer) = &leg.transfer {
                let stay_seated = transfer
                    .constrained
                    .map(|constrained| constrained.constraint.stay_seated)
                    .unwrap_or(false);
                if !stay_seated && !transfer.walk_duration.is_zero() {
                    let previous_arrival = legs.last().unwrap().arrival();
                    let distance =
                        transfer.walk_duration.total_seconds() as f64 * WALK_SPEED_METERS_PER_SECOND;
                    walk_distance_meters += distance;
                    legs.push(Leg::Street(StreetLeg {
                        mode: StreetMode::Walk,
                        departure: previous_arrival,
                        arrival: previous_arrival + transfer.walk_duration,
                        distance_meters: distance,
                        geometry: Vec::new(),
                    }));
                }
            }
            legs.push(Leg::Transit(TransitLeg {
                vehicle_journey: leg.trip.vehicle_journey_idx(),
                day: leg.trip.day(),
                from_stop_point: stop_index.stop_point(leg.trip.stop_at(leg.board_position)),
                to_stop_point: stop_index.stop_point(leg.trip.stop_at(leg.alight_position)),
                board_time: leg.trip.departure_at(leg.board_position),
                alight_time: leg.trip.arrival_at(leg.alight_position),
                constrained_transfer: leg
                    .transfer
                    .as_ref()
                    .and_then(|transfer| transfer.constrained),
            }));
        }

        let last_alight = legs.last().unwrap().arrival();
        legs.push(access_egress_leg(&path.egress, last_alight, path.arrival));
        if let Some(StreetMode::Walk) = path.egress.street_mode() {
            walk_distance_meters += path.egress.distance_meters();
        }

        let street_cost = path.access.generalized_cost(cost_model)
            + path.egress.generalized_cost(cost_model);
        // the optimizer derived the full cost; everything not street is transit
        let transit_cost =
            GeneralizedCost::from_units(path.generalized_cost.units() - street_cost.units());

        Self {
            legs,
            departure: path.departure,
            arrival: path.arrival,
            transit_cost,
            street_cost,
            nb_of_transfers: path.nb_of_transfers(),
            walk_distance_meters,
            search_start,
            removed: None,
        }
    }

    /// An itinerary that never enters the transit network, built from a
    /// direct street path between origin and destination.
    pub fn street_only(
        mode: StreetMode,
        departure: SecondsSinceSearchStart,
        duration: PositiveDuration,
        distance_meters: f64,
        geometry: Vec<Coord>,
        cost_model: &CostModel,
        search_start: NaiveDateTime,
    ) -> Self {
        let arrival = departure + duration;
        let street_cost = match mode {
            StreetMode::Walk => cost_model.walk_cost(duration),
            StreetMode::Bike | StreetMode::Car => cost_model.ride_cost(duration),
        };
        let walk_distance_meters = match mode {
            StreetMode::Walk => distance_meters,
            _ => 0.0,
        };
        Self {
            legs: vec![Leg::Street(StreetLeg {
                mode,
                departure,
                arrival,
                distance_meters,
                geometry,
            })],
            departure,
            arrival,
            transit_cost: GeneralizedCost::zero(),
            street_cost,
            nb_of_transfers: 0,
            walk_distance_meters,
            search_start,
            removed: None,
        }
    }

    pub fn departure_datetime(&self) -> NaiveDateTime {
        self.departure.to_naive_datetime(&self.search_start)
    }

    pub fn arrival_datetime(&self) -> NaiveDateTime {
        self.arrival.to_naive_datetime(&self.search_start)
    }

    pub fn total_duration(&self) -> PositiveDuration {
        // arrival >= departure by construction
        self.arrival.duration_since(&self.departure).unwrap()
    }

    pub fn generalized_cost(&self) -> GeneralizedCost {
        self.transit_cost + self.street_cost
    }

    pub fn has_transit(&self) -> bool {
        self.legs.iter().any(|leg| matches!(leg, Leg::Transit(_)))
    }

    pub fn has_flex(&self) -> bool {
        self.legs.iter().any(|leg| matches!(leg, Leg::Flex(_)))
    }

    pub fn is_street_only(&self) -> bool {
        !self.has_transit() && !self.has_flex()
    }

    pub fn is_walk_only(&self) -> bool {
        self.is_street_only()
            && self.legs.iter().all(|leg| {
                matches!(
                    leg,
                    Leg::Street(StreetLeg {
                        mode: StreetMode::Walk,
                        ..
                    })
                )
            })
    }

    /// Only transit is a flex ride that ends the journey.
    pub fn is_flex_only_to_destination(&self) -> bool {
        !self.has_transit()
            && matches!(self.legs.last(), Some(Leg::Flex(_)))
            && self.legs.iter().filter(|leg| matches!(leg, Leg::Flex(_))).count() == 1
    }

    /// Drove to a stop, then rode transit.
    pub fn is_car_park_and_ride(&self) -> bool {
        self.has_transit() && self.street_mode_used(StreetMode::Car)
    }

    /// Biked, parked, walked on : no transit involved.
    pub fn is_bike_only_park_and_ride(&self) -> bool {
        self.is_street_only()
            && self.street_mode_used(StreetMode::Bike)
            && matches!(
                self.legs.last(),
                Some(Leg::Street(StreetLeg {
                    mode: StreetMode::Walk,
                    ..
                }))
            )
    }

    pub fn drive_duration(&self) -> PositiveDuration {
        self.street_durations(StreetMode::Car)
    }

    pub fn bike_distance_meters(&self) -> f64 {
        self.legs
            .iter()
            .filter_map(|leg| match leg {
                Leg::Street(street) if street.mode == StreetMode::Bike => {
                    Some(street.distance_meters)
                }
                _ => None,
            })
            .sum()
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.legs
            .iter()
            .map(|leg| match leg {
                Leg::Street(street) => street.distance_meters,
                Leg::Flex(flex) => flex.distance_meters,
                Leg::Transit(_) => 0.0,
            })
            .sum()
    }

    /// Departure time of the latest-departing leg.
    pub fn latest_leg_departure(&self) -> SecondsSinceSearchStart {
        self.legs
            .iter()
            .map(Leg::departure)
            .max()
            .unwrap_or(self.departure)
    }

    fn street_mode_used(&self, mode: StreetMode) -> bool {
        self.legs.iter().any(|leg| {
            matches!(leg, Leg::Street(street) if street.mode == mode)
        })
    }

    fn street_durations(&self, mode: StreetMode) -> PositiveDuration {
        let mut total = PositiveDuration::zero();
        for leg in &self.legs {
            if let Leg::Street(street) = leg {
                if street.mode == mode {
                    if let Some(duration) = street.arrival.duration_since(&street.departure) {
                        total = total + duration;
                    }
                }
            }
        }
        total
    }
}

fn access_egress_leg(
    access_egress: &AccessEgress,
    departure: SecondsSinceSearchStart,
    arrival: SecondsSinceSearchStart,
) -> Leg {
    match access_egress {
        AccessEgress::FixedRoute(_) => Leg::Street(StreetLeg {
            mode: access_egress.street_mode().unwrap(),
            departure,
            arrival,
            distance_meters: access_egress.distance_meters(),
            geometry: access_egress.geometry().to_vec(),
        }),
        AccessEgress::Flex(_) => Leg::Flex(FlexLeg {
            departure,
            arrival,
            distance_meters: access_egress.distance_meters(),
        }),
    }
}
