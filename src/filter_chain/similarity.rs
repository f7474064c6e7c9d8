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

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    models::{StopPointIdx, VehicleJourneyIdx},
    response::{Itinerary, Leg, RemovedReason},
    time::SecondsSinceSearchStart,
};

use super::{FilterMode, ItineraryFilter};

/// Groups itineraries whose transit legs overlap above `threshold` and
/// keeps only the `keep_count` cheapest of each group.
pub struct GroupBySimilarity {
    pub threshold: f64,
    pub keep_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransitLegKey {
    vehicle_journey: VehicleJourneyIdx,
    day: NaiveDate,
    from_stop_point: StopPointIdx,
    to_stop_point: StopPointIdx,
    board_time: SecondsSinceSearchStart,
    alight_time: SecondsSinceSearchStart,
}

fn transit_leg_keys(itinerary: &Itinerary) -> HashSet<TransitLegKey> {
    itinerary
        .legs
        .iter()
        .filter_map(|leg| match leg {
            Leg::Transit(transit) => Some(TransitLegKey {
                vehicle_journey: transit.vehicle_journey,
                day: transit.day,
                from_stop_point: transit.from_stop_point,
                to_stop_point: transit.to_stop_point,
                board_time: transit.board_time,
                alight_time: transit.alight_time,
            }),
            _ => None,
        })
        .collect()
}

/// Fraction of shared transit legs, measured against the smaller leg set,
/// so a strict sub-journey of a kept itinerary groups with it. Itineraries
/// without transit legs are never grouped.
fn similarity(lhs: &HashSet<TransitLegKey>, rhs: &HashSet<TransitLegKey>) -> f64 {
    let smaller = std::cmp::min(lhs.len(), rhs.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = lhs.intersection(rhs).count();
    shared as f64 / smaller as f64
}

// plain union-find over itinerary ranks
fn root(parents: &mut Vec<usize>, mut node: usize) -> usize {
    while parents[node] != node {
        parents[node] = parents[parents[node]];
        node = parents[node];
    }
    node
}

impl ItineraryFilter for GroupBySimilarity {
    fn name(&self) -> &'static str {
        "group_by_similarity"
    }

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode) {
        let live_ranks: Vec<usize> = itineraries
            .iter()
            .enumerate()
            .filter(|(_, itinerary)| itinerary.removed.is_none())
            .map(|(rank, _)| rank)
            .collect();

        let keys: Vec<_> = live_ranks
            .iter()
            .map(|rank| transit_leg_keys(&itineraries[*rank]))
            .collect();

        let mut parents: Vec<usize> = (0..live_ranks.len()).collect();
        for lhs in 0..live_ranks.len() {
            for rhs in (lhs + 1)..live_ranks.len() {
                if similarity(&keys[lhs], &keys[rhs]) >= self.threshold {
                    let lhs_root = root(&mut parents, lhs);
                    let rhs_root = root(&mut parents, rhs);
                    parents[rhs_root] = lhs_root;
                }
            }
        }

        let mut groups: std::collections::HashMap<usize, Vec<usize>> =
            std::collections::HashMap::new();
        for node in 0..live_ranks.len() {
            let group_root = root(&mut parents, node);
            groups.entry(group_root).or_default().push(node);
        }

        let mut rejected: HashSet<usize> = HashSet::new();
        for members in groups.values() {
            if members.len() <= self.keep_count {
                continue;
            }
            let mut ordered = members.clone();
            ordered.sort_by_key(|node| itineraries[live_ranks[*node]].generalized_cost());
            for node in ordered.into_iter().skip(self.keep_count) {
                rejected.insert(live_ranks[node]);
            }
        }

        match mode {
            FilterMode::Remove => {
                let mut rank = 0;
                itineraries.retain(|_| {
                    let keep = !rejected.contains(&rank);
                    rank += 1;
                    keep
                });
            }
            FilterMode::TagOnly => {
                for rank in rejected {
                    itineraries[rank].removed = Some(RemovedReason::GroupedBySimilarity);
                }
            }
        }
    }
}
