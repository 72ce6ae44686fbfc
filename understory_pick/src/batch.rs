// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallel batches over a shared, read-only scene.

use core::fmt::Debug;

use rayon::prelude::*;

use crate::node::PickScene;
use crate::picker::Picker;
use crate::request::PickRequest;
use crate::state::TraversalState;
use crate::traverse;
use crate::warning::WarningReporter;

impl<N, R> Picker<N, R>
where
    N: Copy + Eq + Debug + Send + Sync,
    R: WarningReporter + Sync,
{
    /// Answer independent requests in parallel, returning the total result count.
    ///
    /// Each rayon worker gets traversal stacks sized like this picker's; the
    /// picker's own stacks are not touched. Results match [`Picker::pick_batch`].
    pub fn pick_batch_parallel<S>(
        &self,
        scene: &S,
        root: N,
        requests: &mut [PickRequest<N>],
    ) -> usize
    where
        S: PickScene<Node = N> + Sync + ?Sized,
    {
        let config = self.state.config();
        let reporter = &self.reporter;
        let total: usize = requests
            .par_iter_mut()
            .map_init(
                || TraversalState::new(config),
                |state, request| traverse::run(scene, root, request, state, reporter),
            )
            .sum();
        log::debug!(
            target: "understory_pick",
            "parallel batch of {} probe(s): {} result(s)",
            requests.len(),
            total
        );
        total
    }
}

#[cfg(test)]
mod tests {
    use crate::probe::Probe;
    use crate::state::PickConfig;
    use crate::test_scene::TestScene;
    use crate::types::SortPolicy;
    use crate::{PickRequest, Picker, SilentReporter};
    use glam::DVec3;
    use understory_bounds3d::Aabb3D;

    #[test]
    fn parallel_matches_sequential() {
        let mut scene = TestScene::default();
        let leaves: Vec<_> = (0..8)
            .map(|i| {
                let x = f64::from(i) * 2.0;
                Some(scene.leaf(Aabb3D::new(
                    DVec3::new(x, -1.0, -1.0),
                    DVec3::new(x + 1.0, 1.0, 1.0),
                )))
            })
            .collect();
        let root = scene.group(&leaves);
        let make = || -> Vec<PickRequest<usize>> {
            (0..32)
                .map(|i| {
                    PickRequest::new(
                        Probe::Ray {
                            origin: DVec3::new(-1.0, f64::from(i % 3) * 0.9 - 0.9, 0.0),
                            direction: DVec3::X,
                        },
                        if i % 2 == 0 {
                            SortPolicy::AllOrdered
                        } else {
                            SortPolicy::ClosestOne
                        },
                    )
                })
                .collect()
        };
        let mut sequential = make();
        let mut parallel = make();
        let mut picker = Picker::with_reporter(PickConfig::default(), SilentReporter);
        let a = picker.pick_batch(&scene, root, &mut sequential);
        let b = picker.pick_batch_parallel(&scene, root, &mut parallel);
        assert_eq!(a, b);
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.results.hits(), p.results.hits());
        }
    }
}
