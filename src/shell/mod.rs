pub mod editor;
pub mod kind;

pub use editor::{ExistingVars, ShellEnvError, ShellRcEditor, MARKER_END, MARKER_START};
pub use kind::ShellKind;
