//! Black-box tests of the `svtool` binary.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn svtool() -> Command {
    Command::new(env!("CARGO_BIN_EXE_svtool"))
}

#[test]
fn simulates_a_simple_design() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("top.sv");
    fs::write(
        &src,
        "module m;\n  reg r;\n  initial begin r = 1'b0; #10 r = 1'b1; #10 $finish; end\nendmodule\n",
    )
    .unwrap();

    let output = svtool().arg(&src).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("$finish at time 20"));
}

#[test]
fn writes_vcd_trace() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("top.sv");
    let vcd = dir.path().join("wave.vcd");
    fs::write(
        &src,
        "module m;\n  reg r;\n  initial begin r = 1'b0; #5 r = 1'b1; #1 $finish; end\nendmodule\n",
    )
    .unwrap();

    let output = svtool()
        .arg(format!("--vcd={}", vcd.display()))
        .arg(&src)
        .output()
        .unwrap();
    assert!(output.status.success());

    let trace = fs::read_to_string(&vcd).unwrap();
    assert!(trace.contains("$timescale 1ns $end"));
    assert!(trace.contains("$scope module top $end"));
    assert!(trace.contains("$var wire 1 ! r $end"));
    assert!(trace.contains("$enddefinitions $end"));
    assert!(trace.contains("#0"));
    assert!(trace.contains("#5"));
    assert!(trace.contains("b1 !"));
}

#[test]
fn max_limits_simulated_time() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("top.sv");
    fs::write(
        &src,
        "module m;\n  reg clk = 1'b0;\n  always #5 clk = ~clk;\nendmodule\n",
    )
    .unwrap();

    let output = svtool().arg("--max=42").arg(&src).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation settled at time 40"));
}

#[test]
fn missing_file_exits_one() {
    let output = svtool().arg("/nonexistent/missing.sv").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open"));
}

#[test]
fn parse_error_exits_one_with_location() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("bad.sv");
    fs::write(&src, "module ;\nendmodule\n").unwrap();

    let output = svtool().arg(&src).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error["));
    assert!(stderr.contains("bad.sv:1:"));
}

#[test]
fn usage_error_exits_one() {
    let output = svtool().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
