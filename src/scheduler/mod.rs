//! Background task scheduling.
//!
//! One dispatcher task pulls [`PreloadTask`]s off a bounded queue in FIFO
//! arrival order and hands them to a fixed pool of workers guarded by a
//! semaphore. Submission is non-blocking: a full queue is reported to the
//! caller immediately and the preload opportunity is skipped. When every
//! worker is busy, high-priority tasks wait in a small bounded retry buffer
//! while normal-priority tasks are dropped: adjacent-item prefetch is what
//! the user feels first, and next-page prefetch gets another chance on the
//! next scroll.

mod dispatcher;
mod pending;
mod task;

pub use task::{PreloadTask, TaskPayload, TaskPriority};

pub(crate) use dispatcher::{spawn_dispatcher, SchedulerConfig, WorkerContext};
pub(crate) use pending::{message_claim, PendingSet};
