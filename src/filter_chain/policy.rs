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

use crate::{
    response::{Itinerary, RemovedReason},
    time::SecondsSinceSearchStart,
};

use super::{live, reject_when, FilterMode, ItineraryFilter};

/// Drops walk-all-the-way itineraries as soon as a transit alternative
/// exists in the set.
pub struct WalkAllTheWay {}

impl ItineraryFilter for WalkAllTheWay {
    fn name(&self) -> &'static str {
        "remove_walk_all_the_way"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let transit_exists = live(itineraries).any(|itinerary| itinerary.has_transit());
        if !transit_exists {
            return;
        }
        reject_when(
            itineraries,
            mode,
            RemovedReason::WalkAllTheWay,
            Itinerary::is_walk_only,
        );
    }
}

/// Drops bike-park-then-walk itineraries : when direct biking was also
/// requested, riding straight there always dominates them.
pub struct BikeOnlyParkAndRide {}

impl ItineraryFilter for BikeOnlyParkAndRide {
    fn name(&self) -> &'static str {
        "remove_bike_only_park_and_ride"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        reject_when(
            itineraries,
            mode,
            RemovedReason::BikeOnlyParkAndRide,
            Itinerary::is_bike_only_park_and_ride,
        );
    }
}

/// Drops itineraries whose only transit is a flex ride to the destination,
/// unless the caller explicitly asked for those.
pub struct FlexOnlyToDestination {}

impl ItineraryFilter for FlexOnlyToDestination {
    fn name(&self) -> &'static str {
        "remove_flex_only_to_destination"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        reject_when(
            itineraries,
            mode,
            RemovedReason::FlexOnlyToDestination,
            Itinerary::is_flex_only_to_destination,
        );
    }
}

/// Drops transit itineraries costlier than the cheapest street-only
/// alternative of the set, when one exists.
pub struct CostlierThanStreetOnly {}

impl ItineraryFilter for CostlierThanStreetOnly {
    fn name(&self) -> &'static str {
        "remove_transit_costlier_than_street_only"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let best_street_only = live(itineraries)
            .filter(|itinerary| itinerary.is_street_only())
            .map(Itinerary::generalized_cost)
            .min();
        let best_street_only = match best_street_only {
            Some(cost) => cost,
            None => return,
        };
        reject_when(
            itineraries,
            mode,
            RemovedReason::CostlierThanStreetOnly,
            |itinerary| itinerary.has_transit() && itinerary.generalized_cost() > best_street_only,
        );
    }
}

/// Drops itineraries whose latest-departing leg leaves after the cutoff.
/// Bounds result latency for arrive-by requests.
pub struct LatestDepartureTime {
    pub limit: SecondsSinceSearchStart,
}

impl ItineraryFilter for LatestDepartureTime {
    fn name(&self) -> &'static str {
        "latest_departure_time"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let limit = self.limit;
        reject_when(
            itineraries,
            mode,
            RemovedReason::LatestDepartureTime,
            |itinerary| itinerary.latest_leg_departure() > limit,
        );
    }
}
