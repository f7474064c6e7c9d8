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

use std::collections::HashMap;

use crate::{
    models::{StopPosition, TripSchedule, VehicleJourneyIdx},
    stop_index::RoutingStopIdx,
};

use super::TransferConstraint;

/// Looks up the operator-defined rule for one transfer point, if any.
///
/// The store itself lives outside the core; keeping it behind this trait
/// makes the optimizer testable with an in-memory table.
pub trait TransferConstraintLookup {
    /// `None` means unconstrained : the transfer is implicitly allowed with
    /// no override.
    fn resolve(
        &self,
        from_trip: &TripSchedule,
        from_position: StopPosition,
        to_trip: &TripSchedule,
        to_position: StopPosition,
    ) -> Option<TransferConstraint>;
}

/// A lookup with no entry at all. Every transfer resolves as unconstrained.
pub struct NoConstraints {}

impl TransferConstraintLookup for NoConstraints {
    fn resolve(
        &self,
        _from_trip: &TripSchedule,
        _from_position: StopPosition,
        _to_trip: &TripSchedule,
        _to_position: StopPosition,
    ) -> Option<TransferConstraint> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConstraintKey {
    from_stop: RoutingStopIdx,
    to_stop: RoutingStopIdx,
    from_vehicle_journey: VehicleJourneyIdx,
    to_vehicle_journey: VehicleJourneyIdx,
    from_position: StopPosition,
    to_position: StopPosition,
}

/// In-memory implementation of the constraint store, keyed the way the
/// external store is : (stop pair, trip pair, stop-position pair).
pub struct TransferConstraintTable {
    entries: HashMap<ConstraintKey, TransferConstraint>,
}

impl Default for TransferConstraintTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferConstraintTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn add(
        &mut self,
        from_trip: &TripSchedule,
        from_position: StopPosition,
        to_trip: &TripSchedule,
        to_position: StopPosition,
        constraint: TransferConstraint,
    ) {
        let key = Self::key(from_trip, from_position, to_trip, to_position);
        self.entries.insert(key, constraint);
    }

    fn key(
        from_trip: &TripSchedule,
        from_position: StopPosition,
        to_trip: &TripSchedule,
        to_position: StopPosition,
    ) -> ConstraintKey {
        ConstraintKey {
            from_stop: from_trip.stop_at(from_position),
            to_stop: to_trip.stop_at(to_position),
            from_vehicle_journey: from_trip.vehicle_journey_idx(),
            to_vehicle_journey: to_trip.vehicle_journey_idx(),
            from_position,
            to_position,
        }
    }
}

impl TransferConstraintLookup for TransferConstraintTable {
    fn resolve(
        &self,
        from_trip: &TripSchedule,
        from_position: StopPosition,
        to_trip: &TripSchedule,
        to_position: StopPosition,
    ) -> Option<TransferConstraint> {
        let key = Self::key(from_trip, from_position, to_trip, to_position);
        self.entries.get(&key).copied()
    }
}
