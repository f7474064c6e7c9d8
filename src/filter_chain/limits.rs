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

use crate::response::{Itinerary, RemovedReason};

use super::{live, reject_when, FilterMode, ItineraryFilter};

/// Rejects itineraries whose transit generalized cost exceeds an absolute
/// limit.
pub struct TransitCostLimit {
    pub limit: u64,
}

impl ItineraryFilter for TransitCostLimit {
    fn name(&self) -> &'static str {
        "transit_generalized_cost_limit"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let limit = self.limit;
        reject_when(
            itineraries,
            mode,
            RemovedReason::TransitCostLimit,
            |itinerary| itinerary.has_transit() && itinerary.transit_cost.units() > limit,
        );
    }
}

/// Rejects itineraries whose street (walk/bike/car) generalized cost
/// exceeds an absolute limit.
pub struct NonTransitCostLimit {
    pub limit: u64,
}

impl ItineraryFilter for NonTransitCostLimit {
    fn name(&self) -> &'static str {
        "non_transit_generalized_cost_limit"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let limit = self.limit;
        reject_when(
            itineraries,
            mode,
            RemovedReason::NonTransitCostLimit,
            |itinerary| itinerary.street_cost.units() > limit,
        );
    }
}

/// Rejects walk-heavy itineraries : walking more than `ratio` times the
/// distance of the best walk-only itinerary of the set. Does nothing when
/// the set has no walk-only itinerary to compare against.
pub struct WalkDistanceRatio {
    pub ratio: f64,
}

impl ItineraryFilter for WalkDistanceRatio {
    fn name(&self) -> &'static str {
        "walk_distance_ratio"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let best_walk_only = live(itineraries)
            .filter(|itinerary| itinerary.is_walk_only())
            .map(|itinerary| itinerary.walk_distance_meters)
            .fold(None, |best: Option<f64>, distance| match best {
                Some(best) if best <= distance => Some(best),
                _ => Some(distance),
            });
        let best_walk_only = match best_walk_only {
            Some(distance) => distance,
            None => return,
        };
        let limit = best_walk_only * self.ratio;
        reject_when(
            itineraries,
            mode,
            RemovedReason::WalkDistanceRatio,
            |itinerary| itinerary.walk_distance_meters > limit,
        );
    }
}

/// Rejects itineraries that carry a bike leg but mostly walk : the biked
/// share of the total distance is below `ratio`.
pub struct BikeDistanceRatio {
    pub ratio: f64,
}

impl ItineraryFilter for BikeDistanceRatio {
    fn name(&self) -> &'static str {
        "bike_distance_ratio"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let ratio = self.ratio;
        reject_when(
            itineraries,
            mode,
            RemovedReason::BikeDistanceRatio,
            |itinerary| {
                let bike = itinerary.bike_distance_meters();
                let total = itinerary.total_distance_meters();
                bike > 0.0 && total > 0.0 && bike / total < ratio
            },
        );
    }
}

/// Rejects park-and-ride itineraries whose driving time exceeds `ratio`
/// times the duration of the fastest itinerary of the set.
pub struct ParkAndRideDurationRatio {
    pub ratio: f64,
}

impl ItineraryFilter for ParkAndRideDurationRatio {
    fn name(&self) -> &'static str {
        "park_and_ride_duration_ratio"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let fastest = live(itineraries)
            .map(|itinerary| itinerary.total_duration().total_seconds())
            .min();
        let fastest = match fastest {
            Some(seconds) => seconds,
            None => return,
        };
        let limit = fastest as f64 * self.ratio;
        reject_when(
            itineraries,
            mode,
            RemovedReason::ParkAndRideDurationRatio,
            |itinerary| {
                itinerary.is_car_park_and_ride()
                    && itinerary.drive_duration().total_seconds() as f64 > limit
            },
        );
    }
}
