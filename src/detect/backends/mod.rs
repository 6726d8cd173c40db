pub mod stub;

#[cfg(feature = "backend-tract")]
pub mod tract;

pub use stub::{StubBackend, StubProvider, STUB_SCHEME};

#[cfg(feature = "backend-tract")]
pub use tract::{TractBackend, TractProvider};
