//! About shared pointers. Re-export the [`archery`] crate.
//!
//! Trie nodes are reference counted so that every version of a map can
//! share the subtrees it didn't touch. The pointer kind is a type
//! parameter of [`GenericTrieMap`], so a single-threaded program can pick
//! [`RcK`] and avoid atomic reference counting.
//!
//! [`archery`]: https://docs.rs/archery/latest/
//! [`GenericTrieMap`]: ../triemap/struct.GenericTrieMap.html

pub use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

#[cfg(feature = "triomphe")]
pub use archery::ArcTK;

#[cfg(not(feature = "triomphe"))]
/// Default shared pointer used for trie nodes. This alias points to [`ArcK`] if `triomphe` is disabled, [`ArcTK`] otherwise.
///
/// [`ArcK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcK.html
/// [`ArcTK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcTK.html
pub type DefaultSharedPtr = ArcK;

#[cfg(feature = "triomphe")]
/// Default shared pointer used for trie nodes. This alias points to [`ArcK`] if `triomphe` is disabled, [`ArcTK`] otherwise.
///
/// [`ArcK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcK.html
/// [`ArcTK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcTK.html
pub type DefaultSharedPtr = ArcTK;
