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

use crate::models::{BaseModel, StopPointIdx};

/// Dense zero-based identifier of a boardable stop point, valid for one
/// graph snapshot only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutingStopIdx {
    pub(crate) idx: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStop {
    pub stop_id: String,
}

impl std::error::Error for UnknownStop {}

impl std::fmt::Display for UnknownStop {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "The stop point {} is not boardable by any vehicle journey.",
            self.stop_id
        )
    }
}

/// Bidirectional mapping between stop point identity and the dense integers
/// used by the routing engine.
///
/// Built once from the full stop set of a `BaseModel`. Only stop points
/// served by at least one vehicle journey are indexed : a vehicle cannot be
/// boarded anywhere else, so other stop points have no routing identity.
/// Never mutated afterwards, real time updates change attributes of
/// entities, not the node set.
pub struct StopIndex {
    // indexed by RoutingStopIdx.idx
    stop_points: Vec<StopPointIdx>,
    routing_idx_of: HashMap<StopPointIdx, RoutingStopIdx>,
}

impl StopIndex {
    pub fn new(base_model: &BaseModel) -> Self {
        let mut stop_points = Vec::new();
        let mut routing_idx_of = HashMap::new();
        for (_, vehicle_journey) in base_model.vehicle_journeys.iter() {
            for stop_time in &vehicle_journey.stop_times {
                let stop_point_idx = stop_time.stop_point_idx;
                routing_idx_of.entry(stop_point_idx).or_insert_with(|| {
                    let routing_idx = RoutingStopIdx {
                        idx: stop_points.len(),
                    };
                    stop_points.push(stop_point_idx);
                    routing_idx
                });
            }
        }
        Self {
            stop_points,
            routing_idx_of,
        }
    }

    pub fn nb_of_stops(&self) -> usize {
        self.stop_points.len()
    }

    pub fn routing_idx(
        &self,
        stop_point_idx: StopPointIdx,
        base_model: &BaseModel,
    ) -> Result<RoutingStopIdx, UnknownStop> {
        self.routing_idx_of
            .get(&stop_point_idx)
            .copied()
            .ok_or_else(|| UnknownStop {
                stop_id: base_model.stop_point_id(stop_point_idx).to_string(),
            })
    }

    pub fn contains(&self, stop_point_idx: StopPointIdx) -> bool {
        self.routing_idx_of.contains_key(&stop_point_idx)
    }

    /// Panics if `routing_idx` was not created by this index.
    pub fn stop_point(&self, routing_idx: RoutingStopIdx) -> StopPointIdx {
        self.stop_points[routing_idx.idx]
    }
}
