//! Scoped suspension of auto-refresh.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use super::proxy::GroupProxy;
use crate::api::Result;

/// Guard returned by [`GroupProxy::suspend_auto_refresh`].
///
/// While the guard lives, writes through it skip the post-write refresh.
/// Dropping it (normal exit, early return via `?`, or unwinding) restores the
/// auto-refresh value that was in effect when it was created. Guards nest:
/// an inner guard restores `false`, the outer one restores the original.
pub struct RefreshSuspension<'a> {
    group: &'a mut GroupProxy,
    prior: bool,
}

impl<'a> RefreshSuspension<'a> {
    pub(crate) fn new(group: &'a mut GroupProxy) -> Self {
        let prior = group.auto_refresh();
        group.set_auto_refresh(false);
        debug!(group_id = group.id(), prior, "Auto-refresh suspended");
        Self { group, prior }
    }

    /// Value auto-refresh will be restored to
    pub fn prior(&self) -> bool {
        self.prior
    }

    /// End the suspension and, if auto-refresh comes back on, refresh once.
    ///
    /// Use this after a batch of writes to pay for a single refresh.
    pub async fn finish(mut self) -> Result<()> {
        self.group.set_auto_refresh(self.prior);
        if self.prior {
            self.group.refresh().await
        } else {
            Ok(())
        }
    }
}

impl Deref for RefreshSuspension<'_> {
    type Target = GroupProxy;

    fn deref(&self) -> &GroupProxy {
        self.group
    }
}

impl DerefMut for RefreshSuspension<'_> {
    fn deref_mut(&mut self) -> &mut GroupProxy {
        self.group
    }
}

impl Drop for RefreshSuspension<'_> {
    fn drop(&mut self) {
        self.group.set_auto_refresh(self.prior);
        debug!(group_id = self.group.id(), restored = self.prior, "Auto-refresh restored");
    }
}
