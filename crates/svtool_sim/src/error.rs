//! Simulation error types.

use std::io;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A signal name could not be resolved in the loaded design.
    #[error("unknown signal `{name}`")]
    UnknownSignal {
        /// The name that failed to resolve.
        name: String,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_signal_display() {
        let e = SimError::UnknownSignal { name: "clk".into() };
        assert_eq!(e.to_string(), "unknown signal `clk`");
    }

    #[test]
    fn waveform_io_display() {
        let e = SimError::WaveformIo(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(e.to_string().contains("waveform I/O error"));
    }
}
