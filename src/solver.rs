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

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::{
    access_egress::{
        AccessEgress, AccessEgressMapper, Direction, FlexReach, NearbyStop, StreetMode, Traversal,
    },
    config::{ConfigError, CostModel, DateTimeRepresent, FilterChainConfig},
    filter_chain::{FilterChain, FilterChainContext},
    models::{BaseModel, Coord},
    realtime::GraphSnapshot,
    response::Itinerary,
    stop_index::StopIndex,
    time::{PositiveDuration, SecondsSinceSearchStart},
    transfer::{
        candidates::{TransferGenerator, WalkTable},
        optimizer::PathOptimizer,
        path::RawPath,
        resolver::TransferConstraintLookup,
    },
};

/// The round-based multi-criteria search. Consumed as an opaque producer of
/// raw path candidates : zero or more paths, order undefined.
pub trait JourneySearch {
    fn search<'search>(
        &'search self,
        context: &SearchContext<'_>,
    ) -> Box<dyn Iterator<Item = RawPath> + 'search>;
}

pub struct SearchContext<'a> {
    pub access: &'a [AccessEgress],
    pub egress: &'a [AccessEgress],
    pub search_start: NaiveDateTime,
    pub datetime_represent: DateTimeRepresent,
}

/// The street-network shortest-path search. The core adapts its results
/// and never drives its internals. It receives the request's graph
/// snapshot so parking/bike-share availability is read consistently.
pub trait StreetSearch {
    fn nearby_stops(
        &self,
        graph: &GraphSnapshot,
        place: &Coord,
        mode: StreetMode,
        direction: Direction,
    ) -> Vec<NearbyStop>;

    /// Direct origin-to-destination paths, one per returned traversal.
    fn direct_paths(
        &self,
        graph: &GraphSnapshot,
        from: &Coord,
        to: &Coord,
        mode: StreetMode,
    ) -> Vec<Traversal>;
}

/// The flexible-service reachability search.
pub trait FlexSearch {
    fn reaches(
        &self,
        graph: &GraphSnapshot,
        place: &Coord,
        direction: Direction,
    ) -> Vec<FlexReach>;
}

#[derive(Debug)]
pub enum BadRequest {
    Config(ConfigError),
}

impl std::error::Error for BadRequest {}

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BadRequest::Config(err) => write!(f, "Invalid request parameters : {}", err),
        }
    }
}

impl From<ConfigError> for BadRequest {
    fn from(err: ConfigError) -> Self {
        BadRequest::Config(err)
    }
}

pub struct Request {
    pub origin: Coord,
    pub destination: Coord,
    pub datetime: NaiveDateTime,
    pub datetime_represent: DateTimeRepresent,
    pub access_mode: StreetMode,
    pub egress_mode: StreetMode,
    pub direct_modes: Vec<StreetMode>,
    pub use_flex: bool,
    pub max_journey_duration: PositiveDuration,
    pub max_transfer_duration: PositiveDuration,
    pub transfer_buffer: PositiveDuration,
    pub cost_model: CostModel,
    pub filter_config: FilterChainConfig,
}

impl Request {
    pub fn new(origin: Coord, destination: Coord, datetime: NaiveDateTime) -> Self {
        Self {
            origin,
            destination,
            datetime,
            datetime_represent: DateTimeRepresent::Departure,
            access_mode: StreetMode::Walk,
            egress_mode: StreetMode::Walk,
            direct_modes: vec![StreetMode::Walk],
            use_flex: false,
            max_journey_duration: PositiveDuration::from_hms(24, 0, 0),
            max_transfer_duration: PositiveDuration::from_hms(0, 20, 0),
            transfer_buffer: PositiveDuration::zero(),
            cost_model: CostModel::default(),
            filter_config: FilterChainConfig::default(),
        }
    }

    /// The epoch all offsets of this request are anchored to. For an
    /// arrive-by request the window opens one maximum journey duration
    /// before the wanted arrival.
    pub fn search_start(&self) -> NaiveDateTime {
        match self.datetime_represent {
            DateTimeRepresent::Departure => self.datetime,
            DateTimeRepresent::Arrival => {
                self.datetime
                    - chrono::Duration::seconds(self.max_journey_duration.total_seconds() as i64)
            }
        }
    }
}

/// External collaborators of one `plan_itineraries` call.
pub struct Collaborators<'a> {
    pub journey_search: &'a dyn JourneySearch,
    pub street_search: &'a dyn StreetSearch,
    pub flex_search: Option<&'a dyn FlexSearch>,
    pub constraints: &'a dyn TransferConstraintLookup,
}

/// Computes itineraries : adapts access/egress, runs the external search,
/// re-optimizes every raw path's transfer points, then reduces the set
/// through the filter chain.
pub struct Solver {
    stop_index: StopIndex,
    walk_table: WalkTable,
}

impl Solver {
    pub fn new(base_model: &BaseModel, default_transfer_duration: PositiveDuration) -> Self {
        let stop_index = StopIndex::new(base_model);
        let walk_table = WalkTable::new(base_model, &stop_index, default_transfer_duration);
        Self {
            stop_index,
            walk_table,
        }
    }

    pub fn stop_index(&self) -> &StopIndex {
        &self.stop_index
    }

    pub fn walk_table(&self) -> &WalkTable {
        &self.walk_table
    }

    /// The single entry point exposed to the query-serving layer.
    ///
    /// `graph` is the snapshot this request observes for its whole
    /// execution. Path-local failures shrink the result set; only invalid
    /// request parameters surface as an error.
    pub fn plan_itineraries(
        &self,
        request: &Request,
        base_model: &BaseModel,
        graph: &GraphSnapshot,
        collaborators: &Collaborators<'_>,
        max_limit_reached: Option<&dyn Fn(&Itinerary)>,
    ) -> Result<Vec<Itinerary>, BadRequest> {
        request.cost_model.validate()?;
        let filter_chain = FilterChain::new(
            &request.filter_config,
            FilterChainContext {
                datetime_represent: request.datetime_represent,
                direct_bike_requested: request.direct_modes.contains(&StreetMode::Bike),
                flex_requested: request.use_flex,
            },
        )?;

        let search_start = request.search_start();
        let mapper = AccessEgressMapper::new(&self.stop_index, base_model);

        let access = self.map_side(
            request,
            graph,
            collaborators,
            &mapper,
            &request.origin,
            request.access_mode,
            Direction::Access,
        );
        let egress = self.map_side(
            request,
            graph,
            collaborators,
            &mapper,
            &request.destination,
            request.egress_mode,
            Direction::Egress,
        );
        if access.is_empty() || egress.is_empty() {
            warn!("No boardable access or egress, the transit search is skipped.");
        }

        let mut itineraries = Vec::new();

        if !access.is_empty() && !egress.is_empty() {
            let context = SearchContext {
                access: &access,
                egress: &egress,
                search_start,
                datetime_represent: request.datetime_represent,
            };
            let generator = TransferGenerator::new(
                &self.walk_table,
                request.max_transfer_duration,
                request.transfer_buffer,
            );
            let optimizer =
                PathOptimizer::new(generator, collaborators.constraints, &request.cost_model);

            let mut nb_of_paths = 0usize;
            let mut nb_of_rejected = 0usize;
            for raw_path in collaborators.journey_search.search(&context) {
                nb_of_paths += 1;
                match optimizer.optimize(&raw_path) {
                    Ok(optimized) => {
                        itineraries.push(Itinerary::from_optimized_path(
                            &optimized,
                            &self.stop_index,
                            &request.cost_model,
                            search_start,
                        ));
                    }
                    Err(err) => {
                        // local to this path, the batch goes on
                        nb_of_rejected += 1;
                        debug!("A raw path could not be optimized : {}.", err);
                    }
                }
            }
            info!(
                "Search produced {} raw paths, {} rejected by transfer optimization.",
                nb_of_paths, nb_of_rejected
            );
        }

        self.push_direct_itineraries(request, graph, collaborators, search_start, &mut itineraries);

        Ok(filter_chain.apply(itineraries, max_limit_reached))
    }

    #[allow(clippy::too_many_arguments)]
    fn map_side(
        &self,
        request: &Request,
        graph: &GraphSnapshot,
        collaborators: &Collaborators<'_>,
        mapper: &AccessEgressMapper<'_>,
        place: &Coord,
        mode: StreetMode,
        direction: Direction,
    ) -> Vec<AccessEgress> {
        let nearby_stops =
            collaborators
                .street_search
                .nearby_stops(graph, place, mode, direction);
        let mut side = mapper.map_nearby_stops(&nearby_stops, direction);
        if request.use_flex {
            if let Some(flex_search) = collaborators.flex_search {
                let reaches = flex_search.reaches(graph, place, direction);
                side.extend(mapper.map_flex_reaches(&reaches, direction));
            }
        }
        side
    }

    fn push_direct_itineraries(
        &self,
        request: &Request,
        graph: &GraphSnapshot,
        collaborators: &Collaborators<'_>,
        search_start: NaiveDateTime,
        itineraries: &mut Vec<Itinerary>,
    ) {
        for mode in &request.direct_modes {
            let traversals = collaborators.street_search.direct_paths(
                graph,
                &request.origin,
                &request.destination,
                *mode,
            );
            for traversal in traversals {
                let departure = match request.datetime_represent {
                    DateTimeRepresent::Departure => SecondsSinceSearchStart::zero(),
                    // leave just in time to arrive at the wanted datetime
                    DateTimeRepresent::Arrival => SecondsSinceSearchStart::from_seconds(
                        (request.max_journey_duration.total_seconds() as u32)
                            .saturating_sub(traversal.duration.total_seconds() as u32),
                    ),
                };
                itineraries.push(Itinerary::street_only(
                    traversal.mode,
                    departure,
                    traversal.duration,
                    traversal.distance_meters,
                    traversal.geometry,
                    &request.cost_model,
                    search_start,
                ));
            }
        }
    }
}
