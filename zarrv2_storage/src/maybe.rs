//! Send/Sync bounds that relax to nothing on `wasm32`.

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    /// `Send` on native targets.
    pub use core::marker::Send as MaybeSend;
    /// `Sync` on native targets.
    pub use core::marker::Sync as MaybeSync;
}

#[cfg(target_arch = "wasm32")]
mod platform {
    /// Implemented for every type on `wasm32`.
    pub trait MaybeSend {}

    impl<T> MaybeSend for T {}

    /// Implemented for every type on `wasm32`.
    pub trait MaybeSync {}

    impl<T> MaybeSync for T {}
}

pub use platform::{MaybeSend, MaybeSync};
