//! VCD (Value Change Dump) waveform output.
//!
//! Emits a standard four-state trace: a header section, a single `top`
//! scope with one `$var` per registered signal, then `#<time>` lines each
//! followed by one `b<bits> <id>` line per signal. Identifier codes are
//! generated from a counter mapped onto the printable-ASCII range
//! `'!'..'~'`.

use std::io::{self, Write};

use svtool_common::Value;

/// A streaming VCD writer over any [`Write`] sink.
pub struct VcdWriter<W: Write> {
    out: W,
    signals: Vec<SigInfo>,
    next_id: u32,
    header_written: bool,
}

struct SigInfo {
    name: String,
    id: String,
    width: u32,
}

impl<W: Write> VcdWriter<W> {
    /// Creates a VCD writer over the given sink.
    pub fn new(out: W) -> Self {
        Self {
            out,
            signals: Vec::new(),
            next_id: 0,
            header_written: false,
        }
    }

    /// Registers a signal for dumping. Repeated registrations of the same
    /// name are ignored. Must happen before [`dump_header`](Self::dump_header).
    pub fn add_signal(&mut self, name: &str, width: u32) {
        if self.signals.iter().any(|s| s.name == name) {
            return;
        }
        let id = make_id(self.next_id);
        self.next_id += 1;
        self.signals.push(SigInfo {
            name: name.to_string(),
            id,
            width,
        });
    }

    /// Writes the header: date, tool, timescale, the `top` scope with all
    /// `$var` declarations, and `$enddefinitions`.
    pub fn dump_header(&mut self) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.out, "$date")?;
        writeln!(self.out, "  today")?;
        writeln!(self.out, "$end")?;
        writeln!(self.out, "$version")?;
        writeln!(self.out, "  svtool")?;
        writeln!(self.out, "$end")?;
        writeln!(self.out, "$timescale 1ns $end")?;
        writeln!(self.out, "$scope module top $end")?;
        for s in &self.signals {
            writeln!(self.out, "$var wire {} {} {} $end", s.width, s.id, s.name)?;
        }
        writeln!(self.out, "$upscope $end")?;
        writeln!(self.out, "$enddefinitions $end")?;
        self.header_written = true;
        Ok(())
    }

    /// Writes a `#<time>` marker. Duplicate markers for the same time are
    /// permitted (the kernel snapshots before and after each tick).
    pub fn dump_time(&mut self, time: u64) -> io::Result<()> {
        if !self.header_written {
            return Ok(());
        }
        writeln!(self.out, "#{time}")
    }

    /// Writes one `b<bits> <id>` line for the signal, MSB first.
    pub fn dump_value(&mut self, name: &str, value: &Value) -> io::Result<()> {
        if !self.header_written {
            return Ok(());
        }
        let Some(sig) = self.signals.iter().find(|s| s.name == name) else {
            return Ok(());
        };
        let bits = if value.width() == 0 {
            "x".to_string()
        } else {
            value.to_string()
        };
        writeln!(self.out, "b{bits} {}", sig.id)
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Generates a VCD identifier code from a sequential index, using the
/// printable ASCII range `'!'..'~'` (base 94).
fn make_id(index: u32) -> String {
    let mut s = String::new();
    let mut n = index;
    loop {
        s.push((b'!' + (n % 94) as u8) as char);
        n /= 94;
        if n == 0 {
            break;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> VcdWriter<Vec<u8>> {
        VcdWriter::new(Vec::new())
    }

    fn output(w: VcdWriter<Vec<u8>>) -> String {
        String::from_utf8(w.out).unwrap()
    }

    #[test]
    fn id_codes_start_at_bang() {
        assert_eq!(make_id(0), "!");
        assert_eq!(make_id(1), "\"");
        assert_eq!(make_id(93), "~");
    }

    #[test]
    fn id_codes_multi_char_after_94() {
        let code = make_id(94);
        assert_eq!(code.len(), 2);
        assert_eq!(make_id(94), "!\"");
    }

    #[test]
    fn header_contents() {
        let mut w = writer();
        w.add_signal("clk", 1);
        w.add_signal("data", 4);
        w.dump_header().unwrap();
        let out = output(w);
        assert!(out.contains("$date"));
        assert!(out.contains("svtool"));
        assert!(out.contains("$timescale 1ns $end"));
        assert!(out.contains("$scope module top $end"));
        assert!(out.contains("$var wire 1 ! clk $end"));
        assert!(out.contains("$var wire 4 \" data $end"));
        assert!(out.contains("$upscope $end"));
        assert!(out.contains("$enddefinitions $end"));
    }

    #[test]
    fn header_written_once() {
        let mut w = writer();
        w.dump_header().unwrap();
        w.dump_header().unwrap();
        let out = output(w);
        assert_eq!(out.matches("$enddefinitions").count(), 1);
    }

    #[test]
    fn duplicate_signal_registration_ignored() {
        let mut w = writer();
        w.add_signal("clk", 1);
        w.add_signal("clk", 1);
        w.dump_header().unwrap();
        let out = output(w);
        assert_eq!(out.matches("clk").count(), 1);
    }

    #[test]
    fn value_lines_msb_first() {
        let mut w = writer();
        w.add_signal("r", 4);
        w.dump_header().unwrap();
        w.dump_time(0).unwrap();
        w.dump_value("r", &Value::from_binary_str("10xz").unwrap())
            .unwrap();
        let out = output(w);
        assert!(out.contains("#0"));
        assert!(out.contains("b10xz !"));
    }

    #[test]
    fn scalar_values_use_b_format_too() {
        let mut w = writer();
        w.add_signal("clk", 1);
        w.dump_header().unwrap();
        w.dump_time(5).unwrap();
        w.dump_value("clk", &Value::from_uint(1, 1)).unwrap();
        let out = output(w);
        assert!(out.contains("b1 !"));
    }

    #[test]
    fn nothing_emitted_before_header() {
        let mut w = writer();
        w.add_signal("clk", 1);
        w.dump_time(0).unwrap();
        w.dump_value("clk", &Value::from_uint(1, 0)).unwrap();
        assert!(output(w).is_empty());
    }

    #[test]
    fn unregistered_signal_ignored() {
        let mut w = writer();
        w.add_signal("a", 1);
        w.dump_header().unwrap();
        w.dump_value("missing", &Value::from_uint(1, 0)).unwrap();
        let out = output(w);
        assert!(!out.contains("missing"));
    }

    #[test]
    fn duplicate_time_markers_allowed() {
        let mut w = writer();
        w.add_signal("a", 1);
        w.dump_header().unwrap();
        w.dump_time(3).unwrap();
        w.dump_time(3).unwrap();
        let out = output(w);
        assert_eq!(out.matches("#3").count(), 2);
    }

    #[test]
    fn zero_width_value_dumps_x() {
        let mut w = writer();
        w.add_signal("w", 1);
        w.dump_header().unwrap();
        w.dump_value("w", &Value::new(0)).unwrap();
        assert!(output(w).contains("bx !"));
    }
}
