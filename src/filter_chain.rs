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

pub mod limits;
pub mod policy;
pub mod similarity;

use tracing::debug;

use crate::{
    config::{ConfigError, DateTimeRepresent, FilterChainConfig, MAX_NB_OF_ITINERARIES},
    response::{Itinerary, RemovedReason},
};

use self::{
    limits::{
        BikeDistanceRatio, NonTransitCostLimit, ParkAndRideDurationRatio, TransitCostLimit,
        WalkDistanceRatio,
    },
    policy::{
        BikeOnlyParkAndRide, CostlierThanStreetOnly, FlexOnlyToDestination, LatestDepartureTime,
        WalkAllTheWay,
    },
    similarity::GroupBySimilarity,
};

/// Whether a rejecting stage actually removes, or only tags for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Remove,
    TagOnly,
}

/// One stage of the chain. Stages consume the set left by the previous
/// stage and never mutate a leg.
pub trait ItineraryFilter {
    fn name(&self) -> &'static str;

    fn apply(&self, itineraries: &mut Vec<Itinerary>, mode: FilterMode);
}

/// Removes (or tags) every live itinerary matched by `predicate`.
pub(crate) fn reject_when<F>(
    itineraries: &mut Vec<Itinerary>,
    mode: FilterMode,
    reason: RemovedReason,
    predicate: F,
) where
    F: Fn(&Itinerary) -> bool,
{
    match mode {
        FilterMode::Remove => {
            itineraries.retain(|itinerary| !predicate(itinerary));
        }
        FilterMode::TagOnly => {
            for itinerary in itineraries.iter_mut() {
                if itinerary.removed.is_none() && predicate(itinerary) {
                    itinerary.removed = Some(reason);
                }
            }
        }
    }
}

/// Itineraries still in play : in tag mode the rejected ones stay in the
/// vec, so baselines and counts must skip them.
pub(crate) fn live(itineraries: &[Itinerary]) -> impl Iterator<Item = &Itinerary> {
    itineraries
        .iter()
        .filter(|itinerary| itinerary.removed.is_none())
}

/// Interesting facts of the request, used to decide which policy stages
/// the chain needs.
#[derive(Debug, Clone, Copy)]
pub struct FilterChainContext {
    pub datetime_represent: DateTimeRepresent,
    pub direct_bike_requested: bool,
    pub flex_requested: bool,
}

/// The ordered filter pipeline reducing a raw itinerary set to the final
/// bounded result. Pure over the set : legs are never touched, applying the
/// chain twice equals applying it once.
pub struct FilterChain {
    filters: Vec<Box<dyn ItineraryFilter>>,
    mode: FilterMode,
    nb_of_itineraries: usize,
    datetime_represent: DateTimeRepresent,
}

impl FilterChain {
    pub fn new(
        config: &FilterChainConfig,
        context: FilterChainContext,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut filters: Vec<Box<dyn ItineraryFilter>> = Vec::new();

        // a threshold below 0.5 disables the pass
        if config.group_similarity_keep_one >= 0.5 {
            filters.push(Box::new(GroupBySimilarity {
                threshold: config.group_similarity_keep_one,
                keep_count: 1,
            }));
        }
        if config.group_similarity_keep_three >= 0.5 {
            filters.push(Box::new(GroupBySimilarity {
                threshold: config.group_similarity_keep_three,
                keep_count: 3,
            }));
        }

        if let Some(limit) = config.transit_generalized_cost_limit {
            filters.push(Box::new(TransitCostLimit { limit }));
        }
        if let Some(limit) = config.non_transit_generalized_cost_limit {
            filters.push(Box::new(NonTransitCostLimit { limit }));
        }
        if config.walk_only_distance_ratio > 0.0 {
            filters.push(Box::new(WalkDistanceRatio {
                ratio: config.walk_only_distance_ratio,
            }));
        }
        if config.bike_rental_distance_ratio > 0.0 {
            filters.push(Box::new(BikeDistanceRatio {
                ratio: config.bike_rental_distance_ratio,
            }));
        }
        if config.park_and_ride_duration_ratio > 0.0 {
            filters.push(Box::new(ParkAndRideDurationRatio {
                ratio: config.park_and_ride_duration_ratio,
            }));
        }

        if config.remove_walk_all_the_way {
            filters.push(Box::new(WalkAllTheWay {}));
        }
        if config.remove_bike_only_park_and_ride && context.direct_bike_requested {
            filters.push(Box::new(BikeOnlyParkAndRide {}));
        }
        if !(context.flex_requested && config.keep_flex_only_to_destination) {
            filters.push(Box::new(FlexOnlyToDestination {}));
        }
        if config.remove_transit_costlier_than_street_only {
            filters.push(Box::new(CostlierThanStreetOnly {}));
        }

        if let Some(limit) = config.latest_departure_time {
            filters.push(Box::new(LatestDepartureTime { limit }));
        }

        let mode = if config.debug {
            FilterMode::TagOnly
        } else {
            FilterMode::Remove
        };

        Ok(Self {
            filters,
            mode,
            nb_of_itineraries: std::cmp::min(config.nb_of_itineraries, MAX_NB_OF_ITINERARIES),
            datetime_represent: context.datetime_represent,
        })
    }

    /// Runs every stage then caps the result, invoking `max_limit_reached`
    /// exactly once iff the cap actually removed an itinerary.
    pub fn apply(
        &self,
        mut itineraries: Vec<Itinerary>,
        max_limit_reached: Option<&dyn Fn(&Itinerary)>,
    ) -> Vec<Itinerary> {
        for filter in &self.filters {
            let before = live(&itineraries).count();
            filter.apply(&mut itineraries, self.mode);
            let after = live(&itineraries).count();
            if after != before {
                debug!(
                    "Filter {} rejected {} itineraries.",
                    filter.name(),
                    before - after
                );
            }
        }
        self.cap(&mut itineraries, max_limit_reached);
        itineraries
    }

    /// Truncates to the requested count, sorted along the optimization
    /// direction of the request. Tagged itineraries do not count toward the
    /// cap : they are only carried for diagnostics.
    fn cap(
        &self,
        itineraries: &mut Vec<Itinerary>,
        max_limit_reached: Option<&dyn Fn(&Itinerary)>,
    ) {
        match self.datetime_represent {
            DateTimeRepresent::Departure => {
                itineraries.sort_by(|lhs, rhs| {
                    lhs.arrival
                        .cmp(&rhs.arrival)
                        .then_with(|| lhs.generalized_cost().cmp(&rhs.generalized_cost()))
                });
            }
            DateTimeRepresent::Arrival => {
                itineraries.sort_by(|lhs, rhs| {
                    rhs.departure
                        .cmp(&lhs.departure)
                        .then_with(|| lhs.generalized_cost().cmp(&rhs.generalized_cost()))
                });
            }
        }

        let mut kept = 0usize;
        let mut first_removed: Option<Itinerary> = None;
        let mut result = Vec::with_capacity(itineraries.len());
        for itinerary in itineraries.drain(..) {
            if itinerary.removed.is_some() {
                // tagged for diagnostics, carried along but not counted
                result.push(itinerary);
                continue;
            }
            if kept < self.nb_of_itineraries {
                kept += 1;
                result.push(itinerary);
            } else if first_removed.is_none() {
                first_removed = Some(itinerary);
            }
        }
        *itineraries = result;

        if let Some(removed) = first_removed {
            debug!("More itineraries than the requested maximum, truncating.");
            if let Some(subscriber) = max_limit_reached {
                subscriber(&removed);
            }
        }
    }
}
