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

use crate::{
    config::{CostModel, GeneralizedCost},
    models::StopPosition,
    time::SecondsSinceSearchStart,
};

use super::{
    candidates::{TransferCandidate, TransferGenerator},
    path::{OptimizedLeg, OptimizedPath, RawPath, ResolvedTransfer},
    resolver::TransferConstraintLookup,
    ConstrainedTransfer, TransferConstraint, TransferPriority,
};

/// Why one raw path could not be optimized. Local to that path : the
/// caller drops it and keeps going with the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    /// every transfer candidate at this junction is excluded or missing
    NoViableTransfer { junction: usize },
    /// each junction has candidates, but no mutually compatible selection
    NoCompatibleSelection,
    /// the access or egress window cannot anchor this path in time
    InfeasibleEnds,
}

impl std::error::Error for OptimizeError {}

impl std::fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OptimizeError::NoViableTransfer { junction } => {
                write!(
                    f,
                    "No viable transfer between trips {} and {} of the path.",
                    junction,
                    junction + 1
                )
            }
            OptimizeError::NoCompatibleSelection => {
                write!(f, "No mutually compatible selection of transfer points.")
            }
            OptimizeError::InfeasibleEnds => {
                write!(f, "The access or egress cannot anchor the path in time.")
            }
        }
    }
}

#[derive(Debug, Clone)]
struct JunctionCandidate {
    candidate: TransferCandidate,
    constraint: Option<TransferConstraint>,
}

impl JunctionCandidate {
    fn priority(&self) -> TransferPriority {
        self.constraint
            .map(|constraint| constraint.priority)
            .unwrap_or(TransferPriority::Allowed)
    }

    fn is_stay_seated(&self) -> bool {
        self.constraint
            .map(|constraint| constraint.stay_seated)
            .unwrap_or(false)
    }

    fn is_guaranteed(&self) -> bool {
        self.constraint
            .map(|constraint| constraint.guaranteed)
            .unwrap_or(false)
    }
}

/// Picks the best transfer point at each junction of a raw path.
///
/// The selection order is total : stay-seated beats guaranteed beats
/// everything else; among the rest, the selection minimizing the whole
/// path's generalized cost wins, with ties broken by higher priority then
/// by earlier arrival at the junction's origin stop. A junction where all
/// candidates are excluded rejects the path, never the batch.
pub struct PathOptimizer<'a> {
    generator: TransferGenerator<'a>,
    lookup: &'a dyn TransferConstraintLookup,
    cost_model: &'a CostModel,
}

impl<'a> PathOptimizer<'a> {
    pub fn new(
        generator: TransferGenerator<'a>,
        lookup: &'a dyn TransferConstraintLookup,
        cost_model: &'a CostModel,
    ) -> Self {
        Self {
            generator,
            lookup,
            cost_model,
        }
    }

    pub fn optimize(&self, raw: &RawPath) -> Result<OptimizedPath, OptimizeError> {
        let junctions = self.viable_junction_candidates(raw)?;

        let arrival_at_first_stop = raw
            .access
            .earliest_board_time(raw.departure)
            .ok_or(OptimizeError::InfeasibleEnds)?;

        let mut best: Option<Evaluation> = None;
        let mut selection = Vec::with_capacity(junctions.len());
        self.explore(
            raw,
            &junctions,
            arrival_at_first_stop,
            &mut selection,
            &mut best,
        );

        let best = best.ok_or(OptimizeError::NoCompatibleSelection)?;
        Ok(self.build_path(raw, best))
    }

    /// Candidates per junction, after the override ladder :
    /// exclude NotAllowed, then stay-seated trumps all, then guaranteed.
    fn viable_junction_candidates(
        &self,
        raw: &RawPath,
    ) -> Result<Vec<Vec<JunctionCandidate>>, OptimizeError> {
        let mut junctions = Vec::with_capacity(raw.nb_of_junctions());
        for junction_idx in 0..raw.nb_of_junctions() {
            let from_segment = &raw.segments[junction_idx];
            let to_segment = &raw.segments[junction_idx + 1];
            // on later segments the board position may move anywhere before
            // the alight bound, so the generator is only bounded by "ride at
            // least one stop"
            let board_bound = if junction_idx == 0 {
                from_segment.board_position
            } else {
                StopPosition { idx: 0 }
            };
            let candidates = self.generator.feasible_transfers(
                &from_segment.trip,
                board_bound,
                from_segment.alight_position,
                &to_segment.trip,
                to_segment.alight_position,
            );

            let mut resolved: Vec<JunctionCandidate> = candidates
                .into_iter()
                .map(|candidate| JunctionCandidate {
                    constraint: self.lookup.resolve(
                        &from_segment.trip,
                        candidate.from_position,
                        &to_segment.trip,
                        candidate.to_position,
                    ),
                    candidate,
                })
                .filter(|junction_candidate| {
                    junction_candidate.priority() != TransferPriority::NotAllowed
                })
                .collect();

            if resolved.iter().any(JunctionCandidate::is_stay_seated) {
                resolved.retain(JunctionCandidate::is_stay_seated);
            } else if resolved.iter().any(JunctionCandidate::is_guaranteed) {
                resolved.retain(JunctionCandidate::is_guaranteed);
            }

            if resolved.is_empty() {
                return Err(OptimizeError::NoViableTransfer {
                    junction: junction_idx,
                });
            }
            junctions.push(resolved);
        }
        Ok(junctions)
    }

    fn explore<'c>(
        &self,
        raw: &RawPath,
        junctions: &'c [Vec<JunctionCandidate>],
        arrival_at_first_stop: SecondsSinceSearchStart,
        selection: &mut Vec<&'c JunctionCandidate>,
        best: &mut Option<Evaluation>,
    ) {
        if selection.len() == junctions.len() {
            if let Some(evaluation) =
                self.evaluate_selection(raw, arrival_at_first_stop, selection)
            {
                let is_better = match best {
                    None => true,
                    Some(incumbent) => evaluation.is_better_than(incumbent),
                };
                if is_better {
                    *best = Some(evaluation);
                }
            }
            return;
        }
        let junction_idx = selection.len();
        for junction_candidate in &junctions[junction_idx] {
            // one must ride at least one stop between two junctions of the
            // shared trip
            if let Some(previous) = selection.last() {
                if !previous
                    .candidate
                    .to_position
                    .is_before(&junction_candidate.candidate.from_position)
                {
                    continue;
                }
            }
            selection.push(junction_candidate);
            self.explore(raw, junctions, arrival_at_first_stop, selection, best);
            selection.pop();
        }
    }

    /// Re-derives the cost of the whole path under this selection. A
    /// different transfer point moves ride time on both adjoining trips, so
    /// nothing short of the full sum is comparable across selections.
    fn evaluate_selection(
        &self,
        raw: &RawPath,
        arrival_at_first_stop: SecondsSinceSearchStart,
        selection: &[&JunctionCandidate],
    ) -> Option<Evaluation> {
        let cost_model = self.cost_model;
        let mut cost = raw.access.generalized_cost(cost_model)
            + raw.egress.generalized_cost(cost_model);

        let first_trip = &raw.segments[0].trip;
        let first_board = raw.segments[0].board_position;
        let initial_wait = first_trip
            .departure_at(first_board)
            .duration_since(&arrival_at_first_stop)?;
        cost = cost + cost_model.wait_cost(initial_wait);

        for (segment_idx, segment) in raw.segments.iter().enumerate() {
            let board = if segment_idx == 0 {
                segment.board_position
            } else {
                selection[segment_idx - 1].candidate.to_position
            };
            let alight = if segment_idx == raw.segments.len() - 1 {
                segment.alight_position
            } else {
                selection[segment_idx].candidate.from_position
            };
            let ride = segment
                .trip
                .arrival_at(alight)
                .duration_since(&segment.trip.departure_at(board))?;
            cost = cost + cost_model.ride_cost(ride);
        }

        for (junction_idx, junction_candidate) in selection.iter().enumerate() {
            let from_trip = &raw.segments[junction_idx].trip;
            let to_trip = &raw.segments[junction_idx + 1].trip;
            let alighted = from_trip.arrival_at(junction_candidate.candidate.from_position);
            let boarding = to_trip.departure_at(junction_candidate.candidate.to_position);
            if junction_candidate.is_stay_seated() {
                // still onboard : the dwell is waiting time, nothing else
                cost = cost + cost_model.wait_cost(boarding.duration_since(&alighted)?);
            } else {
                let walked = alighted + junction_candidate.candidate.walk_duration;
                cost = cost
                    + cost_model.walk_cost(junction_candidate.candidate.walk_duration)
                    + cost_model.wait_cost(boarding.duration_since(&walked)?)
                    + cost_model.transfer_cost();
            }
        }

        let last_segment = raw.segments.last().unwrap();
        let final_alight_time = last_segment.trip.arrival_at(last_segment.alight_position);
        let arrival = raw.egress.arrival_time(final_alight_time)?;

        Some(Evaluation {
            cost,
            arrival,
            junctions: selection
                .iter()
                .map(|junction_candidate| EvaluatedJunction {
                    candidate: junction_candidate.candidate,
                    constraint: junction_candidate.constraint,
                    priority: junction_candidate.priority(),
                })
                .collect(),
        })
    }

    fn build_path(&self, raw: &RawPath, evaluation: Evaluation) -> OptimizedPath {
        let mut legs = Vec::with_capacity(raw.segments.len());
        for (segment_idx, segment) in raw.segments.iter().enumerate() {
            let board_position = if segment_idx == 0 {
                segment.board_position
            } else {
                evaluation.junctions[segment_idx - 1].candidate.to_position
            };
            let alight_position = if segment_idx == raw.segments.len() - 1 {
                segment.alight_position
            } else {
                evaluation.junctions[segment_idx].candidate.from_position
            };
            let transfer = if segment_idx == 0 {
                None
            } else {
                let junction = &evaluation.junctions[segment_idx - 1];
                let from_trip = &raw.segments[segment_idx - 1].trip;
                let constrained = junction.constraint.map(|constraint| ConstrainedTransfer {
                    from_stop: from_trip.stop_at(junction.candidate.from_position),
                    to_stop: segment.trip.stop_at(junction.candidate.to_position),
                    constraint,
                });
                Some(ResolvedTransfer {
                    walk_duration: junction.candidate.walk_duration,
                    constrained,
                })
            };
            legs.push(OptimizedLeg {
                trip: segment.trip.clone(),
                board_position,
                alight_position,
                transfer,
            });
        }

        OptimizedPath {
            departure: raw.departure,
            arrival: evaluation.arrival,
            access: raw.access.clone(),
            legs,
            egress: raw.egress.clone(),
            generalized_cost: evaluation.cost,
        }
    }
}

struct EvaluatedJunction {
    candidate: TransferCandidate,
    constraint: Option<TransferConstraint>,
    priority: TransferPriority,
}

struct Evaluation {
    cost: GeneralizedCost,
    arrival: SecondsSinceSearchStart,
    junctions: Vec<EvaluatedJunction>,
}

impl Evaluation {
    /// Strictly lower cost wins; at equal cost, junction by junction,
    /// higher priority wins, then the candidate leaving the first trip
    /// sooner.
    fn is_better_than(&self, incumbent: &Evaluation) -> bool {
        if self.cost != incumbent.cost {
            return self.cost < incumbent.cost;
        }
        for (challenger, incumbent) in self.junctions.iter().zip(incumbent.junctions.iter()) {
            if challenger.priority != incumbent.priority {
                return challenger.priority > incumbent.priority;
            }
            let challenger_from = challenger.candidate.from_position;
            let incumbent_from = incumbent.candidate.from_position;
            if challenger_from != incumbent_from {
                return challenger_from.is_before(&incumbent_from);
            }
        }
        false
    }
}
