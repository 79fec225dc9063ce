//! In-memory collaborators.
//!
//! Every external contract the composition layer consumes has a headless
//! implementation here: a render target with inspectable nodes and
//! switchable media queries, a recording timeline, static i18n and
//! capability services, a router that remembers where it went and a data
//! source that records verbs and lets the caller push results.
//!
//! They are used throughout the test suites and are equally usable by hosts
//! that drive the view tree without a real document, such as server-side
//! snapshotting.

mod data;
mod services;
mod target;
mod timeline;

pub use data::MemoryDataSource;
pub use services::{MemoryRouter, StaticCapabilities, StaticI18n};
pub use target::{HeadlessMediaQuery, HeadlessNode, HeadlessTarget};
pub use timeline::{HeadlessTimeline, RecordedTween};
