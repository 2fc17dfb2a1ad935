// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub(crate) use self::lock::Lock;

mod lock {
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// Thread safe lock: just wraps a `Mutex`, and clones share it.
    ///
    /// Everything kept behind one of these is replaced wholesale rather
    /// than edited in place, so a panic while it's held can't leave the
    /// value half updated, and poisoning is ignored.
    pub(crate) struct Lock<A> {
        lock: Arc<Mutex<A>>,
    }

    impl<A> Lock<A> {
        pub(crate) fn new(value: A) -> Self {
            Lock {
                lock: Arc::new(Mutex::new(value)),
            }
        }

        #[inline]
        pub(crate) fn lock(&self) -> MutexGuard<'_, A> {
            self.lock.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<A> Clone for Lock<A> {
        fn clone(&self) -> Self {
            Lock {
                lock: self.lock.clone(),
            }
        }
    }
}
