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

use tracing::warn;

use crate::{
    models::{BaseModel, StopPosition, TripSchedule},
    stop_index::{RoutingStopIdx, StopIndex},
    time::PositiveDuration,
};

/// One physically possible place to move between two specific trips.
/// A pure function of trip/stop geometry and minimum-transfer-time rules :
/// permissions and priorities are attached later by the constraint resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCandidate {
    pub from_position: StopPosition,
    pub to_position: StopPosition,
    pub walk_duration: PositiveDuration,
}

/// Stop-to-stop walking durations, extracted from the model's transfer
/// table. Moving between two stops with no entry is not possible.
pub struct WalkTable {
    durations: HashMap<(RoutingStopIdx, RoutingStopIdx), PositiveDuration>,
    same_stop_duration: PositiveDuration,
}

impl WalkTable {
    pub fn new(
        base_model: &BaseModel,
        stop_index: &StopIndex,
        same_stop_duration: PositiveDuration,
    ) -> Self {
        let mut durations = HashMap::new();
        for (_, transfer) in base_model.transfers.iter() {
            let has_from = base_model
                .stop_point_idx(&transfer.from_stop_id)
                .and_then(|idx| stop_index.routing_idx(idx, base_model).ok());
            let has_to = base_model
                .stop_point_idx(&transfer.to_stop_id)
                .and_then(|idx| stop_index.routing_idx(idx, base_model).ok());
            match (has_from, has_to) {
                (Some(from), Some(to)) => {
                    let duration = transfer
                        .min_transfer_time
                        .map_or(same_stop_duration, PositiveDuration::from_seconds);
                    durations.insert((from, to), duration);
                }
                _ => {
                    warn!(
                        "Skipping transfer between {} and {} because at least one of these stops \
                         is not used by vehicles.",
                        transfer.from_stop_id, transfer.to_stop_id
                    );
                }
            }
        }
        Self {
            durations,
            same_stop_duration,
        }
    }

    pub fn walk_duration(
        &self,
        from: RoutingStopIdx,
        to: RoutingStopIdx,
    ) -> Option<PositiveDuration> {
        if from == to {
            return Some(
                self.durations
                    .get(&(from, to))
                    .copied()
                    .unwrap_or(self.same_stop_duration),
            );
        }
        self.durations.get(&(from, to)).copied()
    }
}

/// Enumerates the feasible transfer points between two trips.
pub struct TransferGenerator<'a> {
    walk_table: &'a WalkTable,
    /// transfers longer than this are out of reach
    max_transfer_duration: PositiveDuration,
    /// slack required between the end of the walk and the departure
    transfer_buffer: PositiveDuration,
}

impl<'a> TransferGenerator<'a> {
    pub fn new(
        walk_table: &'a WalkTable,
        max_transfer_duration: PositiveDuration,
        transfer_buffer: PositiveDuration,
    ) -> Self {
        Self {
            walk_table,
            max_transfer_duration,
            transfer_buffer,
        }
    }

    /// All `(from_position, to_position)` pairs allowing to leave `from_trip`
    /// and catch `to_trip`.
    ///
    /// `from_position` ranges strictly after `board_position` (one must ride
    /// at least one stop) up to `alight_bound` included; `to_position` ranges
    /// strictly before `alight_bound_on_to` (one must ride at least one stop
    /// on the next trip too). Timing is feasible when
    /// `arrival + walk + buffer <= departure`.
    pub fn feasible_transfers(
        &self,
        from_trip: &TripSchedule,
        board_position: StopPosition,
        alight_bound: StopPosition,
        to_trip: &TripSchedule,
        alight_bound_on_to: StopPosition,
    ) -> Vec<TransferCandidate> {
        let mut candidates = Vec::new();
        for from_idx in (board_position.idx + 1)..=alight_bound.idx {
            let from_position = StopPosition { idx: from_idx };
            let from_stop = from_trip.stop_at(from_position);
            let arrival = from_trip.arrival_at(from_position);
            for to_idx in 0..alight_bound_on_to.idx {
                let to_position = StopPosition { idx: to_idx };
                let to_stop = to_trip.stop_at(to_position);
                let has_walk = self.walk_table.walk_duration(from_stop, to_stop);
                let walk_duration = match has_walk {
                    Some(duration) if duration <= self.max_transfer_duration => duration,
                    _ => continue,
                };
                let ready_to_board = arrival + walk_duration + self.transfer_buffer;
                if ready_to_board <= to_trip.departure_at(to_position) {
                    candidates.push(TransferCandidate {
                        from_position,
                        to_position,
                        walk_duration,
                    });
                }
            }
        }
        candidates
    }
}
