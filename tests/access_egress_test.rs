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

mod utils;

use skadi::{
    access_egress::{
        AccessEgressMapper, Direction, FlexReach, NearbyStop, Place, StreetMode, Traversal,
    },
    models::Coord,
    time::SecondsSinceSearchStart,
    PositiveDuration,
};
use utils::{build_solver, init_logger, somewhere};

fn model() -> transit_model::Model {
    skadi::modelbuilder::ModelBuilder::default()
        .vj("first", |vj| {
            vj.st("A", "10:00:00").st("B", "10:05:00");
        })
        .build()
}

#[test]
fn test_egress_traversal_is_reversed() {
    init_logger();
    let (base_model, solver) = build_solver(model(), "00:02:00");
    let mapper = AccessEgressMapper::new(solver.stop_index(), &base_model);

    let stop_a = base_model.stop_point_idx("A").unwrap();
    let nearby_stop = NearbyStop {
        place: Place::StopPoint(stop_a),
        traversal: Traversal {
            mode: StreetMode::Walk,
            duration: PositiveDuration::from_seconds(120),
            distance_meters: 170.0,
            geometry: vec![
                Coord { lat: 0.0, lon: 0.0 },
                Coord { lat: 1.0, lon: 1.0 },
            ],
        },
    };

    let access = mapper
        .map_nearby_stop(&nearby_stop, Direction::Access)
        .unwrap();
    let egress = mapper
        .map_nearby_stop(&nearby_stop, Direction::Egress)
        .unwrap();

    // same duration both ways, but the egress path is walked backward
    assert_eq!(access.duration(), egress.duration());
    assert_eq!(access.geometry()[0], Coord { lat: 0.0, lon: 0.0 });
    assert_eq!(egress.geometry()[0], Coord { lat: 1.0, lon: 1.0 });
}

#[test]
fn test_non_stop_places_are_skipped_without_error() {
    init_logger();
    let (base_model, solver) = build_solver(model(), "00:02:00");
    let mapper = AccessEgressMapper::new(solver.stop_index(), &base_model);

    let nearby_stops = vec![
        NearbyStop {
            place: Place::StopArea("sa:A".to_string()),
            traversal: Traversal {
                mode: StreetMode::Walk,
                duration: PositiveDuration::from_seconds(60),
                distance_meters: 80.0,
                geometry: Vec::new(),
            },
        },
        NearbyStop {
            place: Place::Address(somewhere()),
            traversal: Traversal {
                mode: StreetMode::Walk,
                duration: PositiveDuration::from_seconds(60),
                distance_meters: 80.0,
                geometry: Vec::new(),
            },
        },
        NearbyStop {
            place: Place::StopPoint(base_model.stop_point_idx("A").unwrap()),
            traversal: Traversal {
                mode: StreetMode::Walk,
                duration: PositiveDuration::from_seconds(60),
                distance_meters: 80.0,
                geometry: Vec::new(),
            },
        },
    ];

    let mapped = mapper.map_nearby_stops(&nearby_stops, Direction::Access);

    // only the stop point is boardable, the others are not errors
    assert_eq!(mapped.len(), 1);
}

#[test]
fn test_flex_adapter_exposes_the_same_contract() {
    init_logger();
    let (base_model, solver) = build_solver(model(), "00:02:00");
    let mapper = AccessEgressMapper::new(solver.stop_index(), &base_model);

    let reach = FlexReach {
        stop_point: base_model.stop_point_idx("A").unwrap(),
        window_start: SecondsSinceSearchStart::from_seconds(600),
        window_end: SecondsSinceSearchStart::from_seconds(1200),
        ride_duration: PositiveDuration::from_seconds(300),
        distance_meters: 2500.0,
    };

    let flex = mapper.map_flex_reach(&reach, Direction::Access).unwrap();
    assert!(flex.has_rides());

    // asking before the window : picked up when it opens
    let boarded = flex
        .earliest_board_time(SecondsSinceSearchStart::zero())
        .unwrap();
    assert_eq!(boarded, SecondsSinceSearchStart::from_seconds(900));

    // asking inside the window : picked up right away
    let boarded = flex
        .earliest_board_time(SecondsSinceSearchStart::from_seconds(700))
        .unwrap();
    assert_eq!(boarded, SecondsSinceSearchStart::from_seconds(1000));

    // asking after the window closed : this access is unusable
    assert!(flex
        .earliest_board_time(SecondsSinceSearchStart::from_seconds(1300))
        .is_none());
}

#[test]
fn test_stop_index_round_trip() {
    init_logger();
    let (base_model, solver) = build_solver(model(), "00:02:00");
    let stop_index = solver.stop_index();

    assert_eq!(stop_index.nb_of_stops(), 2);
    for stop_id in ["A", "B"] {
        let stop_point_idx = base_model.stop_point_idx(stop_id).unwrap();
        assert!(stop_index.contains(stop_point_idx));
        let routing_idx = stop_index.routing_idx(stop_point_idx, &base_model).unwrap();
        assert_eq!(stop_index.stop_point(routing_idx), stop_point_idx);
    }
}
