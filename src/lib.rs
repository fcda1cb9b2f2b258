//! Defectlab core library: the scenario catalog, the deterministic runtime
//! and the session controller shared by the CLI and tests.

#[path = "runtime/auth.rs"]
mod auth;
#[path = "model/behavior.rs"]
mod behavior;
#[path = "runtime/boundary.rs"]
mod boundary;
#[path = "model/catalog.rs"]
mod catalog;
#[path = "cmd/catalog_cmd.rs"]
mod catalog_cmd;
#[path = "runtime/clock.rs"]
mod clock;
#[path = "platform/config.rs"]
mod config;
#[path = "runtime/dispatch.rs"]
mod dispatch;
#[path = "platform/duration.rs"]
mod duration;
#[path = "platform/envinfo.rs"]
mod envinfo;
#[path = "platform/error.rs"]
mod error;
#[path = "runtime/instance.rs"]
mod instance;
#[path = "runtime/navigation.rs"]
mod navigation;
#[path = "runtime/primitives.rs"]
mod primitives;
#[path = "model/reporting.rs"]
mod reporting;
#[path = "cmd/run_cmd.rs"]
mod run_cmd;
#[path = "runtime/scheduler.rs"]
mod scheduler;
#[path = "model/script.rs"]
mod script;
#[path = "runtime/session.rs"]
mod session;
#[path = "model/state.rs"]
mod state;
#[path = "runtime/timeline.rs"]
mod timeline;
#[path = "runtime/toast.rs"]
mod toast;

pub use behavior::*;
pub use boundary::*;
pub use catalog::*;
pub use catalog_cmd::*;
pub use clock::*;
pub use config::*;
pub use duration::*;
pub use envinfo::*;
pub use error::*;
pub use instance::*;
pub use navigation::*;
pub use primitives::*;
pub use reporting::*;
pub use run_cmd::*;
pub use scheduler::*;
pub use script::*;
pub use session::*;
pub use state::*;
pub use timeline::*;
