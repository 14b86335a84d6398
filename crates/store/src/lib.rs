//! Local step persistence for the wizard.
//!
//! [`StepStore`] is the key-value contract the wizard uses to remember
//! where the user was: keys are namespace parts joined with `-` (e.g.
//! `application-{id}-current`), values are opaque strings. The contract is
//! deliberately infallible — quota errors, disabled storage, and corrupt
//! data all read back as "value absent", never as an error the wizard has
//! to handle.
//!
//! Two implementations ship here: [`MemoryStepStore`] for tests and
//! render-without-storage contexts, and [`FileStepStore`] backed by a JSON
//! document on disk.

pub mod file;
pub mod memory;

pub use file::FileStepStore;
pub use memory::MemoryStepStore;

use hakemus_core::schema::clamp_step;
use hakemus_core::types::ApplicationId;

/// Separator for namespace parts when forming a storage key.
pub const KEY_SEPARATOR: &str = "-";

/// Leading namespace part for wizard position keys.
pub const KEY_PREFIX: &str = "application";

/// Infallible key-value storage for wizard bookkeeping.
///
/// Implementations must swallow their own failures: a failed write is a
/// no-op, a failed read is `None`. Logging the cause is the implementation's
/// business.
pub trait StepStore: Send + Sync {
    /// Read the value stored under the joined namespace, if any.
    fn read(&self, namespace: &[&str]) -> Option<String>;

    /// Store a value under the joined namespace.
    fn write(&self, namespace: &[&str], value: &str);

    /// Delete the key if present.
    fn remove(&self, namespace: &[&str]);
}

/// Join namespace parts into a storage key.
pub fn storage_key(namespace: &[&str]) -> String {
    namespace.join(KEY_SEPARATOR)
}

// ---------------------------------------------------------------------------
// Wizard position codec
// ---------------------------------------------------------------------------

/// Which persisted step value a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The step the user is currently on.
    Current,
    /// The furthest step the user has reached.
    LastVisited,
}

impl StepKind {
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::LastVisited => "last-visited",
        }
    }
}

/// Read a persisted step position, clamped to `[1, step_count]`.
///
/// Absent, unparseable, or out-of-range values yield the default step; a
/// store manipulated to `99` restores to step 1, not a crash.
pub fn read_position(
    store: &dyn StepStore,
    id: &ApplicationId,
    kind: StepKind,
    step_count: u8,
) -> u8 {
    let id = id.to_string();
    let raw = store.read(&[KEY_PREFIX, &id, kind.as_key()]);
    let parsed = raw.as_deref().and_then(|v| v.parse::<i64>().ok());
    clamp_step(parsed, step_count)
}

/// Persist a step position as a plain integer.
pub fn write_position(store: &dyn StepStore, id: &ApplicationId, kind: StepKind, step: u8) {
    let id = id.to_string();
    store.write(&[KEY_PREFIX, &id, kind.as_key()], &step.to_string());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
