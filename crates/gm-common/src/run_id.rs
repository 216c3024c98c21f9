//! Identifiers for sweep runs.
//!
//! A process gets one ULID the first time [`process`] is called; every sweep
//! run started by that process logs it next to its own per-run id from
//! [`next`], so a log search can go from a single run back to the worker
//! instance that executed it.

use once_cell::sync::Lazy;
use ulid::Ulid;

static PROCESS_ID: Lazy<Ulid> = Lazy::new(Ulid::new);

/// Id of this worker process. Stable for the process lifetime.
pub fn process() -> &'static str {
    static RENDERED: Lazy<String> = Lazy::new(|| PROCESS_ID.to_string());
    &RENDERED
}

/// Fresh id for one sweep run. ULIDs sort by creation time.
pub fn next() -> String {
    Ulid::new().to_string()
}
