// ── Reactive reading store ──
//
// Replace-only storage with push-based change notification.

mod data_store;

pub use data_store::ReadingStore;
