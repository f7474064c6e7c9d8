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

use std::cell::Cell;

use rstest::rstest;
use skadi::{
    access_egress::StreetMode,
    config::{ConfigError, DateTimeRepresent, FilterChainConfig, GeneralizedCost},
    filter_chain::{FilterChain, FilterChainContext},
    models::{BaseModel, Coord, VehicleJourneyIdx},
    response::{Itinerary, Leg, RemovedReason, StreetLeg, TransitLeg},
    time::SecondsSinceSearchStart,
    PositiveDuration,
};
use utils::{as_datetime, init_logger};

fn context() -> FilterChainContext {
    FilterChainContext {
        datetime_represent: DateTimeRepresent::Departure,
        direct_bike_requested: false,
        flex_requested: false,
    }
}

fn chain(config: &FilterChainConfig) -> FilterChain {
    FilterChain::new(config, context()).unwrap()
}

/// A tiny model so transit legs have real vehicle journey / stop identities.
fn tiny_model() -> BaseModel {
    let model = skadi::modelbuilder::ModelBuilder::default()
        .vj("vj1", |vj| {
            vj.st("A", "10:00:00").st("B", "10:30:00");
        })
        .vj("vj2", |vj| {
            vj.st("A", "10:05:00").st("B", "10:40:00");
        })
        .build();
    BaseModel::from_transit_model(model)
}

fn seconds(minutes: u32) -> SecondsSinceSearchStart {
    SecondsSinceSearchStart::from_seconds(minutes * 60)
}

fn transit_itinerary(
    base_model: &BaseModel,
    vehicle_journey: &str,
    departure_minute: u32,
    arrival_minute: u32,
    transit_cost: u64,
) -> Itinerary {
    let vj_idx: VehicleJourneyIdx = base_model.vehicle_journey_idx(vehicle_journey).unwrap();
    let from_stop_point = base_model.stop_point_idx("A").unwrap();
    let to_stop_point = base_model.stop_point_idx("B").unwrap();
    let departure = seconds(departure_minute);
    let arrival = seconds(arrival_minute);
    Itinerary {
        legs: vec![Leg::Transit(TransitLeg {
            vehicle_journey: vj_idx,
            day: "2021-01-01".parse().unwrap(),
            from_stop_point,
            to_stop_point,
            board_time: departure,
            alight_time: arrival,
            constrained_transfer: None,
        })],
        departure,
        arrival,
        transit_cost: GeneralizedCost::from_units(transit_cost),
        street_cost: GeneralizedCost::zero(),
        nb_of_transfers: 0,
        walk_distance_meters: 0.0,
        search_start: as_datetime("2021-01-01T10:00:00"),
        removed: None,
    }
}

fn walk_itinerary(departure_minute: u32, duration_minutes: u32, distance_meters: f64) -> Itinerary {
    Itinerary::street_only(
        StreetMode::Walk,
        seconds(departure_minute),
        PositiveDuration::from_hms(0, duration_minutes, 0),
        distance_meters,
        vec![Coord { lat: 0.0, lon: 0.0 }],
        &skadi::CostModel::default(),
        as_datetime("2021-01-01T10:00:00"),
    )
}

fn bike_itinerary(departure_minute: u32, duration_minutes: u32, distance_meters: f64) -> Itinerary {
    Itinerary::street_only(
        StreetMode::Bike,
        seconds(departure_minute),
        PositiveDuration::from_hms(0, duration_minutes, 0),
        distance_meters,
        Vec::new(),
        &skadi::CostModel::default(),
        as_datetime("2021-01-01T10:00:00"),
    )
}

fn no_similarity(config: &mut FilterChainConfig) {
    // thresholds below 0.5 disable the grouping passes
    config.group_similarity_keep_one = 0.0;
    config.group_similarity_keep_three = 0.0;
}

#[rstest]
#[case(3, 5, 3, true)]
#[case(10, 5, 5, false)]
#[case(5, 5, 5, false)]
fn test_cap_correctness(
    #[case] requested: usize,
    #[case] supplied: usize,
    #[case] expected: usize,
    #[case] expect_callback: bool,
) {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.remove_walk_all_the_way = false;
    config.nb_of_itineraries = requested;
    let chain = chain(&config);

    let itineraries: Vec<Itinerary> = (0..supplied as u32)
        .map(|rank| transit_itinerary(&base_model, "vj1", rank, 30 + rank, 1000 + rank as u64))
        .collect();

    let callback_count = Cell::new(0usize);
    let callback = |_: &Itinerary| callback_count.set(callback_count.get() + 1);

    let result = chain.apply(itineraries, Some(&callback));

    assert_eq!(result.len(), expected);
    // the callback fires exactly once, and only if something was dropped
    assert_eq!(callback_count.get(), if expect_callback { 1 } else { 0 });
}

#[test]
fn test_cap_sorts_by_optimization_direction() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.nb_of_itineraries = 2;
    let depart_at_chain = chain(&config);

    let itineraries = vec![
        transit_itinerary(&base_model, "vj1", 5, 45, 1000),
        transit_itinerary(&base_model, "vj2", 0, 30, 1000),
        transit_itinerary(&base_model, "vj1", 10, 40, 1000),
    ];

    let result = depart_at_chain.apply(itineraries.clone(), None);
    // depart-at requests keep the earliest arrivals
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].arrival, seconds(30));
    assert_eq!(result[1].arrival, seconds(40));

    let arrive_by_chain = FilterChain::new(
        &config,
        FilterChainContext {
            datetime_represent: DateTimeRepresent::Arrival,
            direct_bike_requested: false,
            flex_requested: false,
        },
    )
    .unwrap();
    let result = arrive_by_chain.apply(itineraries, None);
    // arrive-by requests keep the latest departures
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].departure, seconds(10));
    assert_eq!(result[1].departure, seconds(5));
}

#[test]
fn test_filtering_is_idempotent() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    config.nb_of_itineraries = 3;
    let chain = chain(&config);

    let itineraries = vec![
        transit_itinerary(&base_model, "vj1", 0, 30, 1000),
        transit_itinerary(&base_model, "vj1", 0, 30, 1200),
        transit_itinerary(&base_model, "vj2", 5, 40, 900),
        walk_itinerary(0, 50, 3000.0),
        walk_itinerary(0, 70, 4500.0),
    ];

    let once = chain.apply(itineraries, None);
    let twice = chain.apply(once.clone(), None);

    assert_eq!(once.len(), twice.len());
    for (lhs, rhs) in once.iter().zip(twice.iter()) {
        assert_eq!(lhs.departure, rhs.departure);
        assert_eq!(lhs.arrival, rhs.arrival);
        assert_eq!(lhs.generalized_cost(), rhs.generalized_cost());
    }
}

#[test]
fn test_group_by_similarity_keeps_the_cheapest() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    config.group_similarity_keep_one = 0.9;
    config.group_similarity_keep_three = 0.0;
    config.remove_walk_all_the_way = false;
    let chain = chain(&config);

    // the two vj1 itineraries share their only transit leg, the vj2 one
    // does not
    let itineraries = vec![
        transit_itinerary(&base_model, "vj1", 0, 30, 1200),
        transit_itinerary(&base_model, "vj1", 0, 30, 1000),
        transit_itinerary(&base_model, "vj2", 5, 40, 2000),
    ];

    let result = chain.apply(itineraries, None);

    assert_eq!(result.len(), 2);
    assert!(result
        .iter()
        .any(|itinerary| itinerary.transit_cost.units() == 1000));
    assert!(result
        .iter()
        .any(|itinerary| itinerary.transit_cost.units() == 2000));
    assert!(!result
        .iter()
        .any(|itinerary| itinerary.transit_cost.units() == 1200));
}

#[test]
fn test_walk_all_the_way_removed_only_with_transit_alternative() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.remove_transit_costlier_than_street_only = false;
    let chain = chain(&config);

    // with a transit alternative, the pure walk disappears
    let result = chain.apply(
        vec![
            transit_itinerary(&base_model, "vj1", 0, 30, 1000),
            walk_itinerary(0, 50, 3000.0),
        ],
        None,
    );
    assert_eq!(result.len(), 1);
    assert!(result[0].has_transit());

    // alone, the pure walk stays
    let result = chain.apply(vec![walk_itinerary(0, 50, 3000.0)], None);
    assert_eq!(result.len(), 1);
    assert!(result[0].is_walk_only());
}

#[test]
fn test_transit_costlier_than_street_only_is_removed() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.remove_walk_all_the_way = false;
    let chain = chain(&config);

    let result = chain.apply(
        vec![
            // costlier than riding a bike straight there
            transit_itinerary(&base_model, "vj1", 0, 30, 5000),
            bike_itinerary(0, 20, 5000.0),
        ],
        None,
    );

    assert_eq!(result.len(), 1);
    assert!(result[0].is_street_only());
}

#[test]
fn test_latest_departure_time_cutoff() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.latest_departure_time = Some(seconds(8));
    let chain = chain(&config);

    let result = chain.apply(
        vec![
            transit_itinerary(&base_model, "vj1", 5, 45, 1000),
            transit_itinerary(&base_model, "vj2", 10, 40, 1000),
        ],
        None,
    );

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].departure, seconds(5));
}

#[test]
fn test_transit_generalized_cost_limit() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.transit_generalized_cost_limit = Some(1500);
    let chain = chain(&config);

    let result = chain.apply(
        vec![
            transit_itinerary(&base_model, "vj1", 0, 30, 1000),
            transit_itinerary(&base_model, "vj2", 0, 35, 2000),
        ],
        None,
    );

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].transit_cost.units(), 1000);
}

#[test]
fn test_walk_distance_ratio_rejects_walk_heavy_itineraries() {
    init_logger();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.remove_walk_all_the_way = false;
    config.walk_only_distance_ratio = 1.5;
    let chain = chain(&config);

    let result = chain.apply(
        vec![
            walk_itinerary(0, 30, 2000.0),
            // walks 2.25 times the best walk-only distance
            walk_itinerary(0, 70, 4500.0),
        ],
        None,
    );

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].walk_distance_meters, 2000.0);
}

#[test]
fn test_debug_mode_tags_instead_of_removing() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.transit_generalized_cost_limit = Some(1500);
    config.remove_walk_all_the_way = true;
    config.debug = true;
    let chain = chain(&config);

    let result = chain.apply(
        vec![
            transit_itinerary(&base_model, "vj1", 0, 30, 1000),
            transit_itinerary(&base_model, "vj2", 0, 35, 2000),
            walk_itinerary(0, 50, 3000.0),
        ],
        None,
    );

    // nothing disappeared, the rejected ones carry their reason
    assert_eq!(result.len(), 3);
    let tagged: Vec<_> = result
        .iter()
        .filter_map(|itinerary| itinerary.removed)
        .collect();
    assert_eq!(tagged.len(), 2);
    assert!(tagged.contains(&RemovedReason::TransitCostLimit));
    assert!(tagged.contains(&RemovedReason::WalkAllTheWay));
}

fn street_leg(
    mode: StreetMode,
    departure_minute: u32,
    arrival_minute: u32,
    distance_meters: f64,
) -> Leg {
    Leg::Street(StreetLeg {
        mode,
        departure: seconds(departure_minute),
        arrival: seconds(arrival_minute),
        distance_meters,
        geometry: Vec::new(),
    })
}

/// Drive to a stop, then ride : a car park-and-ride itinerary.
fn car_park_and_ride_itinerary(
    base_model: &BaseModel,
    drive_minutes: u32,
    arrival_minute: u32,
) -> Itinerary {
    let mut itinerary = transit_itinerary(base_model, "vj1", drive_minutes, arrival_minute, 1000);
    itinerary.legs.insert(
        0,
        street_leg(StreetMode::Car, 0, drive_minutes, drive_minutes as f64 * 800.0),
    );
    itinerary.departure = seconds(0);
    itinerary
}

#[test]
fn test_park_and_ride_duration_ratio() {
    init_logger();
    let base_model = tiny_model();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.park_and_ride_duration_ratio = 0.5;
    let chain = chain(&config);

    let result = chain.apply(
        vec![
            // fastest alternative : 30 minutes door to door
            transit_itinerary(&base_model, "vj2", 0, 30, 900),
            // drives 10 of 40 minutes : under half the fastest duration
            car_park_and_ride_itinerary(&base_model, 10, 40),
            // drives 25 of 45 minutes : way past the ratio
            car_park_and_ride_itinerary(&base_model, 25, 45),
        ],
        None,
    );

    assert_eq!(result.len(), 2);
    assert!(result
        .iter()
        .all(|itinerary| itinerary.drive_duration().total_seconds() <= 10 * 60));
}

#[test]
fn test_bike_distance_ratio_rejects_mostly_walking() {
    init_logger();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.remove_walk_all_the_way = false;
    config.walk_only_distance_ratio = 0.0;
    config.bike_rental_distance_ratio = 0.3;
    let chain = chain(&config);

    let mostly_walking = Itinerary {
        legs: vec![
            street_leg(StreetMode::Bike, 0, 2, 400.0),
            street_leg(StreetMode::Walk, 2, 40, 3000.0),
        ],
        departure: seconds(0),
        arrival: seconds(40),
        transit_cost: GeneralizedCost::zero(),
        street_cost: GeneralizedCost::from_units(4000),
        nb_of_transfers: 0,
        walk_distance_meters: 3000.0,
        search_start: as_datetime("2021-01-01T10:00:00"),
        removed: None,
    };
    let mostly_riding = Itinerary {
        legs: vec![
            street_leg(StreetMode::Bike, 0, 20, 4000.0),
            street_leg(StreetMode::Walk, 20, 25, 400.0),
        ],
        departure: seconds(0),
        arrival: seconds(25),
        transit_cost: GeneralizedCost::zero(),
        street_cost: GeneralizedCost::from_units(2000),
        nb_of_transfers: 0,
        walk_distance_meters: 400.0,
        search_start: as_datetime("2021-01-01T10:00:00"),
        removed: None,
    };

    let result = chain.apply(vec![mostly_walking, mostly_riding], None);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].walk_distance_meters, 400.0);
}

#[test]
fn test_bike_only_park_and_ride_removed_when_direct_bike_requested() {
    init_logger();

    let mut config = FilterChainConfig::default();
    no_similarity(&mut config);
    config.remove_walk_all_the_way = false;
    config.walk_only_distance_ratio = 0.0;
    config.remove_bike_only_park_and_ride = true;
    let chain = FilterChain::new(
        &config,
        FilterChainContext {
            datetime_represent: DateTimeRepresent::Departure,
            direct_bike_requested: true,
            flex_requested: false,
        },
    )
    .unwrap();

    // bike, park, walk the rest : dominated by riding straight there
    let parked = Itinerary {
        legs: vec![
            street_leg(StreetMode::Bike, 0, 10, 2500.0),
            street_leg(StreetMode::Walk, 10, 25, 1200.0),
        ],
        departure: seconds(0),
        arrival: seconds(25),
        transit_cost: GeneralizedCost::zero(),
        street_cost: GeneralizedCost::from_units(1800),
        nb_of_transfers: 0,
        walk_distance_meters: 1200.0,
        search_start: as_datetime("2021-01-01T10:00:00"),
        removed: None,
    };
    let direct_bike = bike_itinerary(0, 18, 3700.0);

    let result = chain.apply(vec![parked, direct_bike], None);

    assert_eq!(result.len(), 1);
    assert!(!result[0].is_bike_only_park_and_ride());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    init_logger();

    let mut config = FilterChainConfig::default();
    config.nb_of_itineraries = 0;
    let result = FilterChain::new(&config, context());
    assert!(matches!(
        result.err(),
        Some(ConfigError::NoItineraryRequested)
    ));

    let mut config = FilterChainConfig::default();
    config.group_similarity_keep_one = 1.5;
    let result = FilterChain::new(&config, context());
    assert!(matches!(
        result.err(),
        Some(ConfigError::BadSimilarityThreshold { .. })
    ));

    let mut config = FilterChainConfig::default();
    config.walk_only_distance_ratio = f64::NAN;
    let result = FilterChain::new(&config, context());
    assert!(matches!(result.err(), Some(ConfigError::BadFactor { .. })));
}
