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

//! Two trips, five possible transfer points with increasing constraint
//! strength, tested by moving the egress stop :
//!
//! Transfers        B-C 1m     C-D 2m       D-E 3m     E-F 4m      F-G 5m
//! Constraint       allowed  recommended  preferred  guaranteed  stay-seated
//! Trip t1  A 10:02  B 10:10    C 10:15     D 10:20     E 10:25     F 10:30
//! Trip t2           C 10:13    D 10:18     E 10:24     F 10:30     G 10:36   H 10:40
//!
//! Transfers in the same stop are not allowed.

mod utils;

use std::sync::Arc;

use rstest::rstest;
use skadi::{
    access_egress::Direction,
    config::CostModel,
    models::{StopPosition, TripSchedule},
    transfer::{
        candidates::TransferGenerator,
        optimizer::{OptimizeError, PathOptimizer},
        path::{RawPath, RawSegment},
        resolver::{TransferConstraintTable, TransferConstraintLookup},
        TransferConstraint, TransferPriority,
    },
    BaseModel, PositiveDuration, Solver,
};
use utils::{as_datetime, build_solver, init_logger, trip, walk_access_egress};

fn pos(idx: usize) -> StopPosition {
    StopPosition { idx }
}

struct Fixture {
    base_model: BaseModel,
    solver: Solver,
    t1: Arc<TripSchedule>,
    t2: Arc<TripSchedule>,
    constraints: TransferConstraintTable,
}

fn fixture() -> Fixture {
    init_logger();

    let model = skadi::modelbuilder::ModelBuilder::default()
        .vj("t1", |vj| {
            vj.st("A", "10:02:00")
                .st("B", "10:10:00")
                .st("C", "10:15:00")
                .st("D", "10:20:00")
                .st("E", "10:25:00")
                .st("F", "10:30:00");
        })
        .vj("t2", |vj| {
            vj.st("C", "10:13:00")
                .st("D", "10:18:00")
                .st("E", "10:24:00")
                .st("F", "10:30:00")
                .st("G", "10:36:00")
                .st("H", "10:40:00");
        })
        .add_transfer("B", "C", "00:01:00")
        .add_transfer("C", "D", "00:02:00")
        .add_transfer("D", "E", "00:03:00")
        .add_transfer("E", "F", "00:04:00")
        .add_transfer("F", "G", "00:05:00")
        .build();

    // transfers in the same stop take no time here, so they only stay out
    // of the way because they are marked not allowed
    let (base_model, solver) = build_solver(model, "00:00:00");
    let search_start = as_datetime("2021-01-01T10:00:00");
    let t1 = trip(&base_model, &solver, "t1", "2021-01-01", &search_start);
    let t2 = trip(&base_model, &solver, "t2", "2021-01-01", &search_start);

    let mut constraints = TransferConstraintTable::new();
    // on t1 : A=0 B=1 C=2 D=3 E=4 F=5 ; on t2 : C=0 D=1 E=2 F=3 G=4 H=5
    constraints.add(
        &t1,
        pos(1),
        &t2,
        pos(0),
        TransferConstraint::with_priority(TransferPriority::Allowed),
    );
    constraints.add(
        &t1,
        pos(2),
        &t2,
        pos(1),
        TransferConstraint::with_priority(TransferPriority::Recommended),
    );
    constraints.add(
        &t1,
        pos(3),
        &t2,
        pos(2),
        TransferConstraint::with_priority(TransferPriority::Preferred),
    );
    constraints.add(&t1, pos(4), &t2, pos(3), TransferConstraint::guaranteed());
    constraints.add(&t1, pos(5), &t2, pos(4), TransferConstraint::stay_seated());
    for (t1_pos, t2_pos) in [(2usize, 0usize), (3, 1), (4, 2), (5, 3)] {
        constraints.add(
            &t1,
            pos(t1_pos),
            &t2,
            pos(t2_pos),
            TransferConstraint::with_priority(TransferPriority::NotAllowed),
        );
    }

    Fixture {
        base_model,
        solver,
        t1,
        t2,
        constraints,
    }
}

fn raw_path_to(fixture: &Fixture, egress_position: usize, egress_stop: &str) -> RawPath {
    let access = walk_access_egress(
        &fixture.base_model,
        &fixture.solver,
        "A",
        "00:00:00",
        Direction::Access,
    );
    let egress = walk_access_egress(
        &fixture.base_model,
        &fixture.solver,
        egress_stop,
        "00:00:00",
        Direction::Egress,
    );
    RawPath::new(
        // at stop A when t1 departs
        skadi::SecondsSinceSearchStart::from_seconds(2 * 60),
        access,
        vec![
            RawSegment {
                trip: fixture.t1.clone(),
                board_position: pos(0),
                alight_position: fixture.t1.last_position(),
            },
            RawSegment {
                trip: fixture.t2.clone(),
                board_position: pos(0),
                alight_position: pos(egress_position),
            },
        ],
        egress,
    )
    .unwrap()
}

fn optimize(
    fixture: &Fixture,
    lookup: &dyn TransferConstraintLookup,
    raw_path: &RawPath,
    cost_model: &CostModel,
) -> Result<skadi::transfer::path::OptimizedPath, OptimizeError> {
    let generator = TransferGenerator::new(
        fixture.solver.walk_table(),
        PositiveDuration::from_hms(0, 20, 0),
        PositiveDuration::zero(),
    );
    let optimizer = PathOptimizer::new(generator, lookup, cost_model);
    optimizer.optimize(raw_path)
}

#[rstest]
// only B-C fits before an egress at D
#[case(1, "D", 1, 0, TransferPriority::Allowed, false, false)]
// B-C and C-D both fit; B-C is cheaper and priority only breaks cost ties
#[case(2, "E", 1, 0, TransferPriority::Allowed, false, false)]
// guaranteed E-F wins over every cheaper unconstrained candidate
#[case(4, "G", 4, 3, TransferPriority::Allowed, true, false)]
// stay-seated F-G wins over guaranteed and over every cost
#[case(5, "H", 5, 4, TransferPriority::Allowed, false, true)]
fn test_constrained_transfer_selection(
    #[case] egress_position: usize,
    #[case] egress_stop: &str,
    #[case] expected_from: usize,
    #[case] expected_to: usize,
    #[case] expected_priority: TransferPriority,
    #[case] expected_guaranteed: bool,
    #[case] expected_stay_seated: bool,
) {
    let fixture = fixture();
    let raw_path = raw_path_to(&fixture, egress_position, egress_stop);
    let cost_model = CostModel::default();

    let optimized = optimize(&fixture, &fixture.constraints, &raw_path, &cost_model).unwrap();

    assert_eq!(optimized.legs.len(), 2);
    let first_leg = &optimized.legs[0];
    let second_leg = &optimized.legs[1];
    assert_eq!(first_leg.alight_position, pos(expected_from));
    assert_eq!(second_leg.board_position, pos(expected_to));

    // the winning candidate's rule is attached to the leg after the transfer
    let resolved = second_leg.transfer.as_ref().unwrap();
    let constrained = resolved.constrained.unwrap();
    assert_eq!(constrained.constraint.priority, expected_priority);
    assert_eq!(constrained.constraint.guaranteed, expected_guaranteed);
    assert_eq!(constrained.constraint.stay_seated, expected_stay_seated);
    assert_eq!(constrained.from_stop, fixture.t1.stop_at(pos(expected_from)));
    assert_eq!(constrained.to_stop, fixture.t2.stop_at(pos(expected_to)));
}

#[test]
fn test_not_allowed_is_never_selected_even_alone() {
    let fixture = fixture();
    // egress at D : the only timely candidate is B-C; forbid it
    let mut constraints = TransferConstraintTable::new();
    constraints.add(
        &fixture.t1,
        pos(1),
        &fixture.t2,
        pos(0),
        TransferConstraint::with_priority(TransferPriority::NotAllowed),
    );
    let raw_path = raw_path_to(&fixture, 1, "D");

    let result = optimize(&fixture, &constraints, &raw_path, &CostModel::default());

    assert_eq!(result.unwrap_err(), OptimizeError::NoViableTransfer { junction: 0 });
}

#[test]
fn test_unconstrained_path_picks_cheapest_candidate() {
    let fixture = fixture();
    let raw_path = raw_path_to(&fixture, 2, "E");
    let no_constraints = skadi::transfer::resolver::NoConstraints {};

    let optimized = optimize(&fixture, &no_constraints, &raw_path, &CostModel::default()).unwrap();

    // without any constraint B-C beats C-D : the total ride time is the
    // same but B-C walks and waits less
    assert_eq!(optimized.legs[0].alight_position, pos(1));
    assert_eq!(optimized.legs[1].board_position, pos(0));
    assert!(optimized.legs[1]
        .transfer
        .as_ref()
        .unwrap()
        .constrained
        .is_none());
}

/// Two transfer options with exactly the same ride, walk and wait totals.
/// The higher priority must win the tie; with no priorities, the candidate
/// leaving the first trip sooner must win.
#[test]
fn test_equal_cost_tie_breaks() {
    init_logger();

    let model = skadi::modelbuilder::ModelBuilder::default()
        .vj("u1", |vj| {
            vj.st("A", "10:00:00")
                .st("B", "10:10:00")
                .st("C", "10:20:00");
        })
        .vj("u2", |vj| {
            vj.st("B", "10:15:00")
                .st("C", "10:25:00")
                .st("D", "10:35:00");
        })
        .add_transfer("B", "B", "00:02:00")
        .add_transfer("C", "C", "00:02:00")
        .build();

    let (base_model, solver) = build_solver(model, "00:02:00");
    let search_start = as_datetime("2021-01-01T10:00:00");
    let u1 = trip(&base_model, &solver, "u1", "2021-01-01", &search_start);
    let u2 = trip(&base_model, &solver, "u2", "2021-01-01", &search_start);

    let access = walk_access_egress(&base_model, &solver, "A", "00:00:00", Direction::Access);
    let egress = walk_access_egress(&base_model, &solver, "D", "00:00:00", Direction::Egress);
    let raw_path = RawPath::new(
        skadi::SecondsSinceSearchStart::zero(),
        access,
        vec![
            RawSegment {
                trip: u1.clone(),
                board_position: pos(0),
                alight_position: pos(2),
            },
            RawSegment {
                trip: u2.clone(),
                board_position: pos(0),
                alight_position: pos(2),
            },
        ],
        egress,
    )
    .unwrap();

    let cost_model = CostModel::default();

    // same cost on both sides, the recommended one wins
    let mut constraints = TransferConstraintTable::new();
    constraints.add(
        &u1,
        pos(2),
        &u2,
        pos(1),
        TransferConstraint::with_priority(TransferPriority::Recommended),
    );
    let generator = TransferGenerator::new(
        solver.walk_table(),
        PositiveDuration::from_hms(0, 20, 0),
        PositiveDuration::zero(),
    );
    let optimizer = PathOptimizer::new(generator, &constraints, &cost_model);
    let optimized = optimizer.optimize(&raw_path).unwrap();
    assert_eq!(optimized.legs[0].alight_position, pos(2));
    assert_eq!(optimized.legs[1].board_position, pos(1));

    // no priority anywhere, the transfer leaving u1 sooner wins
    let no_constraints = skadi::transfer::resolver::NoConstraints {};
    let generator = TransferGenerator::new(
        solver.walk_table(),
        PositiveDuration::from_hms(0, 20, 0),
        PositiveDuration::zero(),
    );
    let optimizer = PathOptimizer::new(generator, &no_constraints, &cost_model);
    let optimized = optimizer.optimize(&raw_path).unwrap();
    assert_eq!(optimized.legs[0].alight_position, pos(1));
    assert_eq!(optimized.legs[1].board_position, pos(0));
}

/// The stay-seated junction must not produce a walk leg in the itinerary,
/// and the constraint must be readable from the transit leg that follows.
#[test]
fn test_stay_seated_itinerary_rendering() {
    let fixture = fixture();
    let raw_path = raw_path_to(&fixture, 5, "H");
    let cost_model = CostModel::default();
    let optimized = optimize(&fixture, &fixture.constraints, &raw_path, &cost_model).unwrap();

    let itinerary = skadi::Itinerary::from_optimized_path(
        &optimized,
        fixture.solver.stop_index(),
        &cost_model,
        as_datetime("2021-01-01T10:00:00"),
    );

    // access, two vehicle legs, egress : no walk between the vehicles
    assert_eq!(itinerary.legs.len(), 4);
    assert_eq!(itinerary.nb_of_transfers, 1);
    match &itinerary.legs[2] {
        skadi::response::Leg::Transit(leg) => {
            let constrained = leg.constrained_transfer.unwrap();
            assert!(constrained.constraint.stay_seated);
        }
        other => panic!("expected a transit leg, got {:?}", other),
    }
}
