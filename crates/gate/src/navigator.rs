//! Navigation effector seam.

use std::sync::{Arc, Mutex, PoisonError};

use crate::area::AreaCategory;

/// Performs the actual screen replacement.
///
/// Called by the gate from inside its evaluation path, at most once per
/// settled transition. Implementations must tolerate a redirect into the area
/// that is already active.
pub trait Navigator {
    fn redirect_to(&mut self, area: AreaCategory);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn redirect_to(&mut self, area: AreaCategory) {
        (**self).redirect_to(area);
    }
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn redirect_to(&mut self, area: AreaCategory) {
        (**self).redirect_to(area);
    }
}

/// Navigator that only records what it was asked to do.
///
/// Clones share the record, so a caller can hand one clone to the gate and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    calls: Arc<Mutex<Vec<AreaCategory>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AreaCategory> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to(&mut self, area: AreaCategory) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(area);
    }
}
