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

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    stop_index::{RoutingStopIdx, StopIndex},
    time::SecondsSinceSearchStart,
};

use super::{BaseModel, StopPosition, VehicleJourneyIdx};

/// One vehicle journey on one service day, with its stop times anchored to
/// the search epoch.
///
/// Immutable once published : the external search hands trips to the core
/// as shared references, and the transfer optimizer only reads them.
#[derive(Debug)]
pub struct TripSchedule {
    vehicle_journey_idx: VehicleJourneyIdx,
    day: NaiveDate,
    // all three vecs have the same length, indexed by StopPosition.idx
    stops: Vec<RoutingStopIdx>,
    arrivals: Vec<SecondsSinceSearchStart>,
    departures: Vec<SecondsSinceSearchStart>,
}

impl TripSchedule {
    /// Anchors `vj_idx` on `day` to `search_start`.
    ///
    /// Returns `None` when the vehicle journey does not run on `day`, or
    /// when one of its stop times falls before `search_start` (the search
    /// cannot board such a trip, so it has no anchored representation).
    pub fn new(
        base_model: &BaseModel,
        stop_index: &StopIndex,
        vj_idx: VehicleJourneyIdx,
        day: NaiveDate,
        search_start: &NaiveDateTime,
    ) -> Option<Self> {
        if !base_model.trip_exists(vj_idx, &day) {
            return None;
        }
        let vehicle_journey = &base_model.vehicle_journeys[vj_idx];
        let day_start = day.and_time(NaiveTime::from_hms(0, 0, 0));

        let mut stops = Vec::with_capacity(vehicle_journey.stop_times.len());
        let mut arrivals = Vec::with_capacity(vehicle_journey.stop_times.len());
        let mut departures = Vec::with_capacity(vehicle_journey.stop_times.len());
        for stop_time in &vehicle_journey.stop_times {
            let routing_idx = stop_index
                .routing_idx(stop_time.stop_point_idx, base_model)
                .ok()?;
            let arrival_datetime = day_start
                + chrono::Duration::seconds(i64::from(stop_time.arrival_time.total_seconds()));
            let departure_datetime = day_start
                + chrono::Duration::seconds(i64::from(stop_time.departure_time.total_seconds()));
            let arrival = SecondsSinceSearchStart::from_datetimes(search_start, &arrival_datetime)?;
            let departure =
                SecondsSinceSearchStart::from_datetimes(search_start, &departure_datetime)?;
            stops.push(routing_idx);
            arrivals.push(arrival);
            departures.push(departure);
        }
        Some(Self {
            vehicle_journey_idx: vj_idx,
            day,
            stops,
            arrivals,
            departures,
        })
    }

    pub fn vehicle_journey_idx(&self) -> VehicleJourneyIdx {
        self.vehicle_journey_idx
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn last_position(&self) -> StopPosition {
        StopPosition {
            idx: self.stops.len() - 1,
        }
    }

    // Panics if `position` is not valid for this trip
    pub fn stop_at(&self, position: StopPosition) -> RoutingStopIdx {
        self.stops[position.idx]
    }

    // Panics if `position` is not valid for this trip
    pub fn arrival_at(&self, position: StopPosition) -> SecondsSinceSearchStart {
        self.arrivals[position.idx]
    }

    // Panics if `position` is not valid for this trip
    pub fn departure_at(&self, position: StopPosition) -> SecondsSinceSearchStart {
        self.departures[position.idx]
    }
}
