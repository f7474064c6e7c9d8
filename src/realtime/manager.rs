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

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{bail, format_err, Error};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};

use super::{
    graph::RealTimeGraph,
    updater::{GraphMutation, GraphUpdater, UpdaterState},
};

// mutations are small pointer swaps, a short queue is plenty
const TASK_QUEUE_CAPACITY: usize = 16;

struct WriterTask {
    feed_id: String,
    mutation: Option<GraphMutation>,
    applied: Option<oneshot::Sender<()>>,
}

struct ManagedUpdater {
    feed_id: String,
    state: UpdaterState,
    // present unless the updater is running (ownership is then inside the
    // polling task, and comes back when it stops)
    updater: Option<Box<dyn GraphUpdater>>,
    stop_sender: Option<watch::Sender<bool>>,
    poll_loop: Option<JoinHandle<Box<dyn GraphUpdater>>>,
}

/// Serializes all real-time mutations of the graph.
///
/// Every mutation task, whatever its source, goes through one bounded
/// channel consumed by a single writer task : never two mutations run
/// concurrently. Routing requests read snapshots of the graph and never
/// go through here.
pub struct UpdaterManager {
    graph: Arc<RealTimeGraph>,
    task_sender: Option<mpsc::Sender<WriterTask>>,
    writer: Option<JoinHandle<()>>,
    updaters: Vec<ManagedUpdater>,
}

impl UpdaterManager {
    /// Must be called within a tokio runtime : the writer task is spawned
    /// immediately.
    pub fn new(graph: Arc<RealTimeGraph>) -> Self {
        let (task_sender, task_receiver) = mpsc::channel(TASK_QUEUE_CAPACITY);
        let writer = tokio::spawn(writer_loop(graph.clone(), task_receiver));
        Self {
            graph,
            task_sender: Some(task_sender),
            writer: Some(writer),
            updaters: Vec::new(),
        }
    }

    pub fn graph(&self) -> &Arc<RealTimeGraph> {
        &self.graph
    }

    pub fn add_updater(&mut self, updater: Box<dyn GraphUpdater>) -> Result<(), Error> {
        let feed_id = updater.feed_id().to_string();
        if self.find(&feed_id).is_some() {
            bail!("An updater for feed {} is already managed.", feed_id);
        }
        info!("Updater for feed {} created.", feed_id);
        self.updaters.push(ManagedUpdater {
            feed_id,
            state: UpdaterState::Created,
            updater: Some(updater),
            stop_sender: None,
            poll_loop: None,
        });
        Ok(())
    }

    pub fn updater_state(&self, feed_id: &str) -> Option<UpdaterState> {
        self.find(feed_id).map(|managed| managed.state)
    }

    /// Starts the polling loop of one updater. The loop fetches on its own
    /// schedule and submits one mutation task per successful poll.
    pub fn start_updater(&mut self, feed_id: &str) -> Result<(), Error> {
        let task_sender = self
            .task_sender
            .as_ref()
            .ok_or_else(|| format_err!("The update engine is shut down."))?
            .clone();
        let managed = self
            .find_mut(feed_id)
            .ok_or_else(|| format_err!("No updater managed for feed {}.", feed_id))?;
        if managed.state == UpdaterState::Running {
            bail!("The updater for feed {} is already running.", feed_id);
        }
        let updater = managed
            .updater
            .take()
            .ok_or_else(|| format_err!("The updater for feed {} has no state.", feed_id))?;

        let (stop_sender, stop_receiver) = watch::channel(false);
        managed.stop_sender = Some(stop_sender);
        managed.poll_loop = Some(tokio::spawn(poll_loop(updater, task_sender, stop_receiver)));
        managed.state = UpdaterState::Running;
        info!("Updater for feed {} started.", feed_id);
        Ok(())
    }

    /// Stops one updater : no further mutation will be submitted, but
    /// already applied mutations stay. An in-flight fetch is abandoned.
    pub async fn stop_updater(&mut self, feed_id: &str) -> Result<(), Error> {
        let managed = self
            .find_mut(feed_id)
            .ok_or_else(|| format_err!("No updater managed for feed {}.", feed_id))?;
        if managed.state != UpdaterState::Running {
            bail!("The updater for feed {} is not running.", feed_id);
        }
        if let Some(stop_sender) = managed.stop_sender.take() {
            let _ = stop_sender.send(true);
        }
        if let Some(poll_loop) = managed.poll_loop.take() {
            match poll_loop.await {
                Ok(updater) => {
                    managed.updater = Some(updater);
                }
                Err(err) => {
                    error!("The polling loop of feed {} panicked : {}.", feed_id, err);
                }
            }
        }
        managed.state = UpdaterState::Stopped;
        info!("Updater for feed {} stopped.", feed_id);
        Ok(())
    }

    pub fn start_all(&mut self) -> Result<(), Error> {
        let feed_ids: Vec<String> = self
            .updaters
            .iter()
            .filter(|managed| managed.state != UpdaterState::Running)
            .map(|managed| managed.feed_id.clone())
            .collect();
        for feed_id in feed_ids {
            self.start_updater(&feed_id)?;
        }
        Ok(())
    }

    pub async fn stop_all(&mut self) {
        let feed_ids: Vec<String> = self
            .updaters
            .iter()
            .filter(|managed| managed.state == UpdaterState::Running)
            .map(|managed| managed.feed_id.clone())
            .collect();
        for feed_id in feed_ids {
            if let Err(err) = self.stop_updater(&feed_id).await {
                error!("Could not stop the updater for feed {} : {}.", feed_id, err);
            }
        }
    }

    /// Polls one non-running updater exactly once and waits for the
    /// mutation to be applied. Deterministic path for startup priming and
    /// tests.
    pub async fn run_updater_once(&mut self, feed_id: &str) -> Result<(), Error> {
        let task_sender = self
            .task_sender
            .as_ref()
            .ok_or_else(|| format_err!("The update engine is shut down."))?
            .clone();
        let managed = self
            .find_mut(feed_id)
            .ok_or_else(|| format_err!("No updater managed for feed {}.", feed_id))?;
        if managed.state == UpdaterState::Running {
            bail!(
                "The updater for feed {} polls on its own, I won't poll it concurrently.",
                feed_id
            );
        }
        let updater = managed
            .updater
            .as_mut()
            .ok_or_else(|| format_err!("The updater for feed {} has no state.", feed_id))?;

        match updater.poll().await {
            Ok(mutation) => {
                let (applied_sender, applied_receiver) = oneshot::channel();
                task_sender
                    .send(WriterTask {
                        feed_id: feed_id.to_string(),
                        mutation: Some(mutation),
                        applied: Some(applied_sender),
                    })
                    .await
                    .map_err(|_| format_err!("The writer task is gone."))?;
                applied_receiver
                    .await
                    .map_err(|_| format_err!("The writer task dropped a mutation."))?;
                Ok(())
            }
            Err(feed_error) => {
                warn!(
                    "Poll of feed {} failed, keeping its previous data. {}",
                    feed_id, feed_error
                );
                Ok(())
            }
        }
    }

    /// Completes once every mutation submitted before this call is applied.
    pub async fn flush(&self) -> Result<(), Error> {
        let task_sender = self
            .task_sender
            .as_ref()
            .ok_or_else(|| format_err!("The update engine is shut down."))?;
        let (applied_sender, applied_receiver) = oneshot::channel();
        task_sender
            .send(WriterTask {
                feed_id: String::from("flush"),
                mutation: None,
                applied: Some(applied_sender),
            })
            .await
            .map_err(|_| format_err!("The writer task is gone."))?;
        applied_receiver
            .await
            .map_err(|_| format_err!("The writer task dropped a mutation."))?;
        Ok(())
    }

    /// Stops every updater, then the writer task.
    pub async fn shutdown(mut self) {
        self.stop_all().await;
        // closing the channel ends the writer loop
        self.task_sender = None;
        if let Some(writer) = self.writer.take() {
            if let Err(err) = writer.await {
                error!("The graph writer task panicked : {}.", err);
            }
        }
    }

    fn find(&self, feed_id: &str) -> Option<&ManagedUpdater> {
        self.updaters
            .iter()
            .find(|managed| managed.feed_id == feed_id)
    }

    fn find_mut(&mut self, feed_id: &str) -> Option<&mut ManagedUpdater> {
        self.updaters
            .iter_mut()
            .find(|managed| managed.feed_id == feed_id)
    }
}

/// The single consumer of the mutation queue. A task that fails only loses
/// its own mutation : the graph stays as the previous task left it, and
/// later tasks run unaffected.
async fn writer_loop(graph: Arc<RealTimeGraph>, mut receiver: mpsc::Receiver<WriterTask>) {
    debug!("Graph writer task started.");
    while let Some(task) = receiver.recv().await {
        if let Some(mutation) = task.mutation {
            let applied = catch_unwind(AssertUnwindSafe(|| graph.apply(mutation)));
            if applied.is_err() {
                error!(
                    "A mutation task of feed {} panicked. The graph keeps its previous state \
                     for this feed, subsequent tasks are unaffected.",
                    task.feed_id
                );
            }
        }
        if let Some(applied_sender) = task.applied {
            let _ = applied_sender.send(());
        }
    }
    debug!("Graph writer task finished.");
}

/// One running updater : fetch (possibly slow), then submit the prepared
/// mutation. Mutations of the same feed are submitted, hence applied, in
/// poll order.
async fn poll_loop(
    mut updater: Box<dyn GraphUpdater>,
    task_sender: mpsc::Sender<WriterTask>,
    mut stop_receiver: watch::Receiver<bool>,
) -> Box<dyn GraphUpdater> {
    let mut ticks = tokio::time::interval(updater.poll_interval());
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = stop_receiver.changed() => {
                break;
            }
            _ = ticks.tick() => {}
        }
        let feed_id = updater.feed_id().to_string();
        // racing the fetch against the stop signal abandons an in-flight
        // fetch as soon as the updater is stopped
        let poll_result = tokio::select! {
            _ = stop_receiver.changed() => {
                break;
            }
            poll_result = updater.poll() => poll_result,
        };
        match poll_result {
            Ok(mutation) => {
                let task = WriterTask {
                    feed_id,
                    mutation: Some(mutation),
                    applied: None,
                };
                if task_sender.send(task).await.is_err() {
                    // the engine is shutting down
                    break;
                }
            }
            Err(feed_error) => {
                warn!(
                    "Poll of feed {} failed, keeping its previous data. {}",
                    feed_id, feed_error
                );
            }
        }
    }
    updater
}
