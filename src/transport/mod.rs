//! # Print Transport
//!
//! Moves finished ZPL to a printer. Transports treat the payload as opaque
//! bytes and never look inside it.
//!
//! ## Available Transports
//!
//! - [`raw_tcp`]: direct socket to the printer (port 9100), used by the
//!   agent's `/print`
//! - [`spooler`]: the host's print spooler, used by `/printers` and
//!   `/print-local`
//! - [`share`]: temp file plus an OS copy command, used by the server proxy
//!
//! ## Errors
//!
//! | Failure | Error |
//! |---------|-------|
//! | connect or write over 10 s | `TransportTimeout` |
//! | refused, unreachable, command failed | `TransportConnection` |
//! | no spooler on this host | `CapabilityUnavailable` |
//!
//! Two jobs sent to the same printer at once are not serialized here; the
//! printer's input buffer decides how they interleave.

pub mod raw_tcp;
pub mod share;
pub mod spooler;

pub use raw_tcp::{RAW_PORT, RAW_TIMEOUT, RawTcpClient};
pub use share::{CopyCommand, ShareProxy};
pub use spooler::{CupsSpooler, Spooler, UnavailableSpooler};
