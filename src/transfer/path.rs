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

use std::sync::Arc;

use crate::{
    access_egress::AccessEgress,
    config::GeneralizedCost,
    models::{StopPosition, TripSchedule},
    time::{PositiveDuration, SecondsSinceSearchStart},
};

use super::ConstrainedTransfer;

/// One boarded trip of a raw path.
///
/// `board_position` is where the search boarded; `alight_position` is the
/// latest position where the trip may be left (the bracket the optimizer
/// works inside). For the last segment `alight_position` is where the
/// egress leaves the network and is final.
#[derive(Debug, Clone)]
pub struct RawSegment {
    pub trip: Arc<TripSchedule>,
    pub board_position: StopPosition,
    pub alight_position: StopPosition,
}

/// A multi-criteria path as produced by the external search : the trip
/// sequence is final, but the transfer point between two consecutive trips
/// is not yet.
#[derive(Debug, Clone)]
pub struct RawPath {
    pub departure: SecondsSinceSearchStart,
    pub access: AccessEgress,
    pub segments: Vec<RawSegment>,
    pub egress: AccessEgress,
}

#[derive(Debug)]
pub enum BadRawPath {
    NoSegment,
    BoardAfterAlight { segment: usize },
}

impl std::error::Error for BadRawPath {}

impl std::fmt::Display for BadRawPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BadRawPath::NoSegment => {
                write!(f, "A raw path must ride at least one trip.")
            }
            BadRawPath::BoardAfterAlight { segment } => {
                write!(
                    f,
                    "Segment {} of a raw path boards at or after its alight bound.",
                    segment
                )
            }
        }
    }
}

impl RawPath {
    pub fn new(
        departure: SecondsSinceSearchStart,
        access: AccessEgress,
        segments: Vec<RawSegment>,
        egress: AccessEgress,
    ) -> Result<Self, BadRawPath> {
        if segments.is_empty() {
            return Err(BadRawPath::NoSegment);
        }
        for (idx, segment) in segments.iter().enumerate() {
            if !segment.board_position.is_before(&segment.alight_position) {
                return Err(BadRawPath::BoardAfterAlight { segment: idx });
            }
        }
        Ok(Self {
            departure,
            access,
            segments,
            egress,
        })
    }

    pub fn nb_of_junctions(&self) -> usize {
        self.segments.len() - 1
    }
}

/// A transit leg of an optimized path, with its transfer point resolved.
///
/// `transfer` describes the junction *preceding* this leg (absent on the
/// first leg) : its walk duration and the operator constraint of the chosen
/// candidate, if any.
#[derive(Debug, Clone)]
pub struct OptimizedLeg {
    pub trip: Arc<TripSchedule>,
    pub board_position: StopPosition,
    pub alight_position: StopPosition,
    pub transfer: Option<ResolvedTransfer>,
}

#[derive(Debug, Clone)]
pub struct ResolvedTransfer {
    pub walk_duration: PositiveDuration,
    pub constrained: Option<ConstrainedTransfer>,
}

/// A raw path with every junction pinned to one concrete transfer point,
/// carrying the full re-derived generalized cost.
#[derive(Debug, Clone)]
pub struct OptimizedPath {
    pub departure: SecondsSinceSearchStart,
    pub arrival: SecondsSinceSearchStart,
    pub access: AccessEgress,
    pub legs: Vec<OptimizedLeg>,
    pub egress: AccessEgress,
    pub generalized_cost: GeneralizedCost,
}

impl OptimizedPath {
    pub fn nb_of_transfers(&self) -> usize {
        self.legs.len() - 1
    }
}
