pub mod domain;
pub mod garde;
pub mod postgres;
pub mod s3;
pub mod telegram;
pub mod telemetry;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockNotifier;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockPhotoContentStore;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockTrackingEventRepository;
