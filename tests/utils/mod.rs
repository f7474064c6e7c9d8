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

// not every test file uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use skadi::{
    access_egress::{
        AccessEgress, AccessEgressMapper, Direction, NearbyStop, Place, StreetMode, Traversal,
    },
    models::{BaseModel, Coord, TripSchedule},
    realtime::GraphSnapshot,
    solver::{JourneySearch, SearchContext, StreetSearch},
    transfer::path::RawPath,
    NaiveDateTime, PositiveDuration, Solver,
};

pub fn init_logger() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn as_datetime(text: &str) -> NaiveDateTime {
    text.parse().expect("invalid datetime format")
}

pub fn build_solver(model: transit_model::Model, same_stop_transfer: &str) -> (BaseModel, Solver) {
    let base_model = BaseModel::from_transit_model(model);
    let same_stop_duration: PositiveDuration =
        same_stop_transfer.parse().expect("invalid duration format");
    let solver = Solver::new(&base_model, same_stop_duration);
    (base_model, solver)
}

pub fn trip(
    base_model: &BaseModel,
    solver: &Solver,
    vehicle_journey_id: &str,
    day: &str,
    search_start: &NaiveDateTime,
) -> Arc<TripSchedule> {
    let vj_idx = base_model
        .vehicle_journey_idx(vehicle_journey_id)
        .unwrap_or_else(|| panic!("unknown vehicle journey {}", vehicle_journey_id));
    let day = day.parse().expect("invalid date format");
    let schedule = TripSchedule::new(base_model, solver.stop_index(), vj_idx, day, search_start)
        .unwrap_or_else(|| panic!("{} cannot be anchored on {}", vehicle_journey_id, day));
    Arc::new(schedule)
}

/// A walking access/egress to `stop_id`, built through the mapper like a
/// real street search result would be.
pub fn walk_access_egress(
    base_model: &BaseModel,
    solver: &Solver,
    stop_id: &str,
    duration: &str,
    direction: Direction,
) -> AccessEgress {
    let stop_point_idx = base_model
        .stop_point_idx(stop_id)
        .unwrap_or_else(|| panic!("unknown stop point {}", stop_id));
    let duration: PositiveDuration = duration.parse().expect("invalid duration format");
    let mapper = AccessEgressMapper::new(solver.stop_index(), base_model);
    let nearby_stop = NearbyStop {
        place: Place::StopPoint(stop_point_idx),
        traversal: Traversal {
            mode: StreetMode::Walk,
            duration,
            distance_meters: duration.total_seconds() as f64 * 1.4,
            geometry: Vec::new(),
        },
    };
    mapper
        .map_nearby_stop(&nearby_stop, direction)
        .expect("the stop is not boardable")
}

/// A search engine stub yielding a fixed set of raw paths.
pub struct StubJourneySearch {
    pub paths: Vec<RawPath>,
}

impl JourneySearch for StubJourneySearch {
    fn search<'search>(
        &'search self,
        _context: &SearchContext<'_>,
    ) -> Box<dyn Iterator<Item = RawPath> + 'search> {
        Box::new(self.paths.iter().cloned())
    }
}

/// A street engine stub with fixed reachability results per direction.
pub struct StubStreetSearch {
    pub access: Vec<NearbyStop>,
    pub egress: Vec<NearbyStop>,
    pub direct: Vec<Traversal>,
}

impl StreetSearch for StubStreetSearch {
    fn nearby_stops(
        &self,
        _graph: &GraphSnapshot,
        _place: &Coord,
        _mode: StreetMode,
        direction: Direction,
    ) -> Vec<NearbyStop> {
        match direction {
            Direction::Access => self.access.clone(),
            Direction::Egress => self.egress.clone(),
        }
    }

    fn direct_paths(
        &self,
        _graph: &GraphSnapshot,
        _from: &Coord,
        _to: &Coord,
        mode: StreetMode,
    ) -> Vec<Traversal> {
        self.direct
            .iter()
            .filter(|traversal| traversal.mode == mode)
            .cloned()
            .collect()
    }
}

pub fn somewhere() -> Coord {
    Coord { lat: 48.8, lon: 2.3 }
}
