// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Picker`]: the entry point that owns traversal state and dispatches requests.

use core::fmt::Debug;

use crate::node::PickScene;
use crate::probe::RawProbe;
use crate::request::PickRequest;
use crate::state::{PickConfig, TraversalState};
use crate::traverse;
use crate::warning::{LogReporter, WarningReporter};

/// Answers pick requests against any [`PickScene`] whose handles are `N`.
///
/// A picker owns its traversal stacks and reuses them for every request, so
/// steady-state picking does not allocate. Picks take `&mut self`; use one
/// picker per thread, or `pick_batch_parallel` with the `rayon` feature.
#[derive(Clone, Debug)]
pub struct Picker<N, R = LogReporter> {
    pub(crate) state: TraversalState<N>,
    pub(crate) reporter: R,
}

impl<N> Default for Picker<N, LogReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Picker<N, LogReporter> {
    /// A picker with default stack sizing that logs warnings.
    pub fn new() -> Self {
        Self::with_config(PickConfig::default())
    }

    /// A picker with custom stack sizing that logs warnings.
    pub fn with_config(config: PickConfig) -> Self {
        Self::with_reporter(config, LogReporter)
    }
}

impl<N, R> Picker<N, R> {
    /// A picker that sends warnings to `reporter`.
    pub fn with_reporter(config: PickConfig, reporter: R) -> Self {
        Self {
            state: TraversalState::new(config),
            reporter,
        }
    }

    /// The traversal stacks; their depth is zero between picks.
    pub fn state(&self) -> &TraversalState<N> {
        &self.state
    }

    /// The warning reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}

impl<N, R> Picker<N, R>
where
    N: Copy + Eq + Debug,
    R: WarningReporter,
{
    /// Answer `request` against the subgraph rooted at `root`.
    ///
    /// Results replace whatever the request's sink held; the new count is returned.
    /// A root that fails the mask test yields no results.
    pub fn pick<S>(&mut self, scene: &S, root: N, request: &mut PickRequest<N>) -> usize
    where
        S: PickScene<Node = N> + ?Sized,
    {
        let count = traverse::run(scene, root, request, &mut self.state, &self.reporter);
        log::trace!(
            target: "understory_pick",
            "pick {:?}/{:?} from {:?}: {} result(s)",
            request.probe.kind(),
            request.sort,
            root,
            count
        );
        count
    }

    /// Answer every request in order, returning the total result count.
    pub fn pick_batch<S>(&mut self, scene: &S, root: N, requests: &mut [PickRequest<N>]) -> usize
    where
        S: PickScene<Node = N> + ?Sized,
    {
        if let [single] = requests {
            return self.pick(scene, root, single);
        }
        let total: usize = requests
            .iter_mut()
            .map(|request| self.pick(scene, root, request))
            .sum();
        log::debug!(
            target: "understory_pick",
            "batch of {} probe(s): {} result(s)",
            requests.len(),
            total
        );
        total
    }

    /// Decode `raw` into `request` and answer it.
    ///
    /// Unknown kind or sort codes are reported and leave the request with no results.
    pub fn pick_raw<S>(
        &mut self,
        scene: &S,
        root: N,
        raw: &RawProbe,
        request: &mut PickRequest<N>,
    ) -> usize
    where
        S: PickScene<Node = N> + ?Sized,
    {
        match raw.decode() {
            Ok((probe, sort)) => {
                request.probe = probe;
                request.sort = sort;
                self.pick(scene, root, request)
            }
            Err(warning) => {
                request.results.clear();
                self.reporter.warning(&warning);
                0
            }
        }
    }
}
