// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable conditions reported during picking.
//!
//! Nothing in the picking core is fatal. A "no hit" is never reported; the
//! conditions below are surfaced through a [`WarningReporter`] and then treated
//! as "no hit" for the affected probe or subtree.

/// A recoverable problem encountered while picking.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PickWarning {
    /// A raw probe carried a kind code outside the known range.
    #[error("unknown probe kind code {0}; probe skipped")]
    UnknownProbeKind(u8),
    /// A raw probe carried a sort code outside the known range.
    #[error("unknown sort policy code {0}; probe skipped")]
    UnknownSortPolicy(u8),
    /// A node's pickable bounds name a proxy of a type the traversal cannot descend into.
    #[error("proxy geometry of type `{type_name}` cannot be picked; subtree skipped")]
    UnsupportedProxy {
        /// Identity of the offending proxy type.
        type_name: &'static str,
    },
    /// A proxy, pass-through child or produced child leads back to a node
    /// already on the current path.
    #[error("{edge} leads back onto the current path; subtree skipped")]
    Cycle {
        /// Which kind of edge closed the cycle.
        edge: &'static str,
    },
}

/// Sink for [`PickWarning`]s.
///
/// Reporters take `&self` so a single reporter can serve parallel batches.
pub trait WarningReporter {
    /// Report one warning.
    fn warning(&self, warning: &PickWarning);
}

/// Forwards warnings to the `log` facade at `warn` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl WarningReporter for LogReporter {
    fn warning(&self, warning: &PickWarning) {
        log::warn!(target: "understory_pick", "{warning}");
    }
}

/// Drops every warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;

impl WarningReporter for SilentReporter {
    fn warning(&self, _warning: &PickWarning) {}
}

impl<R: WarningReporter + ?Sized> WarningReporter for &R {
    fn warning(&self, warning: &PickWarning) {
        (**self).warning(warning);
    }
}
