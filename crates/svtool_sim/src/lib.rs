//! Event-driven four-state simulation kernel.
//!
//! The kernel consumes an [`RtlDesign`](svtool_ir::RtlDesign) and executes
//! it with a time+delta scheduler, level/posedge/negedge sensitivity
//! dispatch, procedural thread execution with delay continuations, an NBA
//! region for deferred register updates, and optional VCD waveform output.
//!
//! # Usage
//!
//! ```ignore
//! let mut kernel = Kernel::new(&interner);
//! kernel.load_design(&design)?;
//! kernel.run(100)?;
//! let y = kernel.get_signal("y");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod eval;
pub mod kernel;
pub mod vcd;

pub use error::SimError;
pub use kernel::{Kernel, SchedRegion};
pub use vcd::VcdWriter;
