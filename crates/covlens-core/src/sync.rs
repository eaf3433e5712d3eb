//! Horizontal scroll synchronization between surfaces
//!
//! Each registration is one-directional: a scroll on the driver copies its
//! horizontal offset onto the follower. Offsets are written directly rather
//! than by dispatching a scroll event, so a follower never feeds back into
//! its driver. Vertical scrolling is not synchronized here; it belongs to
//! the page-level scroll controller.

use crate::error::SurfaceError;
use crate::surface::{Surface, SurfaceId, SurfaceSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration {
    pub driver: SurfaceId,
    pub follower: SurfaceId,
}

/// What one driver scroll did to its followers
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Followers whose offset was written
    pub updated: usize,
    pub failures: Vec<(SurfaceId, SurfaceError)>,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    links: Vec<Registration>,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `driver -> follower`. Registering twice is a no-op.
    pub fn register(&mut self, driver: SurfaceId, follower: SurfaceId) -> Registration {
        let registration = Registration { driver, follower };
        if driver != follower && !self.links.contains(&registration) {
            self.links.push(registration);
        }
        registration
    }

    pub fn register_all(
        &mut self,
        driver: SurfaceId,
        followers: &[SurfaceId],
    ) -> Vec<Registration> {
        followers
            .iter()
            .map(|&follower| self.register(driver, follower))
            .collect()
    }

    /// Remove a registration. Removing twice is a no-op.
    pub fn unregister(&mut self, registration: Registration) -> bool {
        let before = self.links.len();
        self.links.retain(|link| *link != registration);
        self.links.len() != before
    }

    /// Drop every registration that involves `id`.
    pub fn unregister_surface(&mut self, id: SurfaceId) {
        self.links.retain(|link| link.driver != id && link.follower != id);
    }

    pub fn is_registered(&self, registration: Registration) -> bool {
        self.links.contains(&registration)
    }

    pub fn followers(&self, driver: SurfaceId) -> impl Iterator<Item = SurfaceId> + '_ {
        self.links
            .iter()
            .filter(move |link| link.driver == driver)
            .map(|link| link.follower)
    }

    /// Handle a scroll event on `driver`.
    ///
    /// Unmounted surfaces are skipped. A failing follower does not stop the
    /// others from being updated.
    pub fn on_scroll<S: Surface>(
        &self,
        driver: SurfaceId,
        surfaces: &mut SurfaceSet<S>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let Some(source) = surfaces.get(driver) else {
            return outcome;
        };
        let offset = match source.metrics() {
            Ok(metrics) => metrics.scroll_left,
            Err(err) => {
                outcome.failures.push((driver, err));
                return outcome;
            }
        };

        for follower in self.followers(driver) {
            let Some(target) = surfaces.get_mut(follower) else {
                continue;
            };
            let result = match target.metrics() {
                Ok(metrics) if metrics.scroll_left == offset => Ok(false),
                Ok(_) => target.set_scroll_left(offset).map(|_| true),
                Err(err) => Err(err),
            };
            match result {
                Ok(true) => outcome.updated += 1,
                Ok(false) => {}
                Err(err) => outcome.failures.push((follower, err)),
            }
        }
        outcome
    }
}
