//! # Etiket - ZPL Label Designer and Printing Pipeline
//!
//! Etiket designs product labels in millimetres and prints them on Zebra
//! compatible thermal printers. It provides:
//!
//! - **Layout model**: fixed anchors for title, product name, detail lines and
//!   barcode, plus free-form text, barcode, image and shape items
//! - **ZPL generation**: deterministic `^XA ... ^XZ` output with validation
//!   issues reported next to it
//! - **Preview**: grayscale raster of the label with grid, selection and
//!   darkness emulation
//! - **Editor**: pointer gestures for dragging and resizing with grid snap
//! - **Transport**: raw TCP to port 9100, the OS spooler, and printer shares
//! - **Servers**: a local print agent and a designer API with a label type
//!   registry
//!
//! ## Quick Start
//!
//! ```
//! use etiket::{Assets, LabelDocument, zpl};
//!
//! let mut doc = LabelDocument::default();
//! doc.field_values.product_name = "Vida M4x20".into();
//! doc.field_values.barcode = "4006381333931".into();
//!
//! let output = zpl::generate(&doc, &Assets::new());
//! assert!(output.zpl.starts_with("^XA"));
//! assert!(output.zpl.ends_with("^XZ"));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`units`] | mm, screen px and printer dot conversions |
//! | [`layout`] | Label document model and validation |
//! | [`zpl`] | ZPL command builders and generator |
//! | [`render`] | Raster preview |
//! | [`editor`] | Drag and resize state machine |
//! | [`registry`] | Label type definitions and stores |
//! | [`assets`] | Decoded images referenced by a label |
//! | [`transport`] | Printer delivery backends |
//! | [`server`] | Print agent and designer HTTP services |
//! | [`config`] | Runtime configuration |
//! | [`error`] | Error and validation issue types |

pub mod assets;
pub mod config;
pub mod editor;
pub mod error;
pub mod layout;
pub mod registry;
pub mod render;
pub mod server;
pub mod transport;
pub mod units;
pub mod zpl;

// Re-exports for convenience
pub use assets::{AssetSource, Assets};
pub use editor::Editor;
pub use error::{EtiketError, Result, ValidationIssue};
pub use layout::{EditMode, LabelDocument};
pub use registry::{LabelTypeDef, Registry};
pub use units::Dpi;
pub use zpl::{ZplOutput, generate};
