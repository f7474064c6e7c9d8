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

use futures::future::BoxFuture;
use tokio::time::Duration;

use super::graph::{
    BikeStation, BikeStationGroup, GraphEntities, VehicleParking, VehicleParkingGroup,
};

/// A transient failure of a real-time feed. The graph keeps the previous
/// data of that feed (stale but valid) and the poll is retried on the next
/// tick; only diagnostics distinguish the two kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// network/transport failure while fetching
    Fetch(String),
    /// the payload arrived but is structurally invalid; everything from
    /// this fetch is discarded, never partially committed
    Malformed(String),
}

impl std::error::Error for FeedError {}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FeedError::Fetch(reason) => write!(f, "Could not fetch the feed : {}", reason),
            FeedError::Malformed(reason) => write!(f, "Malformed feed payload : {}", reason),
        }
    }
}

/// Lifecycle of a managed updater. Transitions are driven by explicit
/// start/stop calls on the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterState {
    Created,
    Running,
    Stopped,
}

/// The boundary to a thin feed adapter : fetch the current entity set of
/// the feed, suspending on I/O as needed. Everything slow happens here,
/// before the mutation is submitted.
pub trait DataSource<T>: Send {
    fn fetch(&mut self) -> BoxFuture<'_, Result<Vec<T>, FeedError>>;
}

/// A mutation task, ready to run inside the exclusive mutation window.
/// Must be short and non-blocking : all heavy lifting was done at poll
/// time.
pub type GraphMutation = Box<dyn FnOnce(&mut GraphEntities) + Send>;

/// An autonomous source of graph mutations. A running updater polls its
/// feed on its own schedule and turns each result into one mutation task.
pub trait GraphUpdater: Send {
    fn feed_id(&self) -> &str;

    fn poll_interval(&self) -> Duration;

    /// Fetches fresh data and prepares the corresponding mutation.
    /// An `Err` leaves the graph untouched for this feed.
    fn poll(&mut self) -> BoxFuture<'_, Result<GraphMutation, FeedError>>;
}

/// Keeps the vehicle parkings of one feed up to date. Each successful poll
/// replaces the feed's whole parking group; a poll returning zero parkings
/// removes the group.
pub struct VehicleParkingUpdater {
    feed_id: String,
    poll_interval: Duration,
    source: Box<dyn DataSource<VehicleParking>>,
    generation: u64,
}

impl VehicleParkingUpdater {
    pub fn new(
        feed_id: &str,
        poll_interval: Duration,
        source: Box<dyn DataSource<VehicleParking>>,
    ) -> Self {
        Self {
            feed_id: feed_id.to_string(),
            poll_interval,
            source,
            generation: 0,
        }
    }
}

impl GraphUpdater for VehicleParkingUpdater {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn poll(&mut self) -> BoxFuture<'_, Result<GraphMutation, FeedError>> {
        Box::pin(async move {
            let parkings = self.source.fetch().await?;
            self.generation += 1;
            // the full group is built here, outside the mutation window
            let group = Arc::new(VehicleParkingGroup::new(
                self.feed_id.clone(),
                self.generation,
                parkings,
            ));
            let mutation: GraphMutation = Box::new(move |entities: &mut GraphEntities| {
                entities.set_vehicle_parking_group(group);
            });
            Ok(mutation)
        })
    }
}

/// Same contract as `VehicleParkingUpdater`, for bike-share stations.
pub struct BikeStationUpdater {
    feed_id: String,
    poll_interval: Duration,
    source: Box<dyn DataSource<BikeStation>>,
    generation: u64,
}

impl BikeStationUpdater {
    pub fn new(
        feed_id: &str,
        poll_interval: Duration,
        source: Box<dyn DataSource<BikeStation>>,
    ) -> Self {
        Self {
            feed_id: feed_id.to_string(),
            poll_interval,
            source,
            generation: 0,
        }
    }
}

impl GraphUpdater for BikeStationUpdater {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn poll(&mut self) -> BoxFuture<'_, Result<GraphMutation, FeedError>> {
        Box::pin(async move {
            let stations = self.source.fetch().await?;
            self.generation += 1;
            let group = Arc::new(BikeStationGroup::new(
                self.feed_id.clone(),
                self.generation,
                stations,
            ));
            let mutation: GraphMutation = Box::new(move |entities: &mut GraphEntities| {
                entities.set_bike_station_group(group);
            });
            Ok(mutation)
        })
    }
}
