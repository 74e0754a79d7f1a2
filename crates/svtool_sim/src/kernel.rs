//! The event-driven simulation kernel.
//!
//! [`Kernel`] owns the signal store, the process table, the watcher
//! tables, and the time+delta priority queue. Watchers hold indices into
//! the process table and are dereferenced at dispatch time, so the table
//! may grow without invalidating them.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::io::Write;

use svtool_common::{Ident, Interner, Logic4, Value};
use svtool_ir::{
    RtlDesign, RtlEdge, RtlExpr, RtlGateKind, RtlProcessKind, RtlStmtId, RtlStmtOp,
};

use crate::error::SimError;
use crate::eval::{eval_binary, eval_unary, parse_literal, uint_projection};
use crate::vcd::VcdWriter;

/// Scheduler regions, in dispatch order within one `(time, delta)` step.
///
/// Only `Active` and `NBA` are scheduled in this core; the others are
/// reserved for future phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchedRegion {
    /// Sampling region (reserved).
    Preponed,
    /// Normal process execution.
    Active,
    /// Explicit zero-delay region (reserved).
    Inactive,
    /// Non-blocking assignment updates.
    Nba,
    /// End-of-step region (reserved).
    Postponed,
}

/// A suspended procedural thread: the statement to execute next, the
/// owning process, and the chain entry for free-running re-entry.
#[derive(Debug, Clone, Copy)]
struct Thread {
    cur: Option<RtlStmtId>,
    owner: usize,
    entry: Option<RtlStmtId>,
}

/// Work item dispatched by the scheduler.
#[derive(Debug, Clone, Copy)]
enum SimTask {
    /// Run a process from the top.
    RunProcess(usize),
    /// Resume a suspended thread after a delay.
    Resume(Thread),
}

/// A queue entry ordered by `(time, delta, region)`, ties broken by
/// insertion order.
#[derive(Debug)]
struct ScheduledProcess {
    time: u64,
    delta: u64,
    region: SchedRegion,
    seq: u64,
    task: SimTask,
}

impl ScheduledProcess {
    fn key(&self) -> (u64, u64, SchedRegion, u64) {
        (self.time, self.delta, self.region, self.seq)
    }
}

impl PartialEq for ScheduledProcess {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledProcess {}

impl PartialOrd for ScheduledProcess {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledProcess {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// A deferred register write queued for the NBA region.
struct NbaUpdate {
    signal: Ident,
    value: Value,
}

/// What a process table entry executes when dispatched.
#[derive(Debug, Clone, Copy)]
enum SimProcKind {
    /// Evaluate a continuous assign's RHS and drive its LHS.
    ContAssign { module: usize, index: usize },
    /// Run an RTL process (statement graph or flat assigns).
    Proc { module: usize, index: usize },
    /// Recompute a gate output from its inputs.
    Gate { module: usize, index: usize },
}

struct SimProcess {
    kind: SimProcKind,
    region: SchedRegion,
}

/// The simulation kernel.
///
/// Construct with [`Kernel::new`], wire a design with
/// [`load_design`](Kernel::load_design), then call [`run`](Kernel::run).
/// Signals are owned exclusively by the kernel; processes read through
/// [`get_signal`](Kernel::get_signal) and write through
/// [`drive_signal`](Kernel::drive_signal).
pub struct Kernel<'d> {
    design: Option<&'d RtlDesign>,
    interner: &'d Interner,

    cur_time: u64,
    cur_delta: u64,
    seq: u64,
    stop_requested: bool,

    pq: BinaryHeap<Reverse<ScheduledProcess>>,
    nba_queue: Vec<NbaUpdate>,

    signals: HashMap<Ident, Value>,
    processes: Vec<SimProcess>,

    level_watchers: HashMap<Ident, Vec<usize>>,
    posedge_watchers: HashMap<Ident, Vec<usize>>,
    negedge_watchers: HashMap<Ident, Vec<usize>>,

    vcd: Option<VcdWriter<Box<dyn Write>>>,
    vcd_order: Vec<Ident>,
}

impl<'d> Kernel<'d> {
    /// Creates an empty kernel.
    pub fn new(interner: &'d Interner) -> Self {
        Self {
            design: None,
            interner,
            cur_time: 0,
            cur_delta: 0,
            seq: 0,
            stop_requested: false,
            pq: BinaryHeap::new(),
            nba_queue: Vec::new(),
            signals: HashMap::new(),
            processes: Vec::new(),
            level_watchers: HashMap::new(),
            posedge_watchers: HashMap::new(),
            negedge_watchers: HashMap::new(),
            vcd: None,
            vcd_order: Vec::new(),
        }
    }

    /// Attaches a VCD writer. Must be called before
    /// [`load_design`](Kernel::load_design) for signals to be registered.
    pub fn set_vcd(&mut self, vcd: VcdWriter<Box<dyn Write>>) {
        self.vcd = Some(vcd);
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> u64 {
        self.cur_time
    }

    /// Returns the current delta count within the time step.
    pub fn delta(&self) -> u64 {
        self.cur_delta
    }

    /// Returns `true` once `$finish` has been executed.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Looks up a signal's current value by name.
    pub fn get_signal(&self, name: &str) -> Option<&Value> {
        let id = self.interner.get(name)?;
        self.signals.get(&id)
    }

    /// Looks up a signal's current value by name, erroring when absent.
    pub fn signal(&self, name: &str) -> Result<&Value, SimError> {
        self.get_signal(name).ok_or_else(|| SimError::UnknownSignal {
            name: name.to_string(),
        })
    }

    /// Looks up a signal's current value by interned name.
    pub fn signal_value(&self, name: Ident) -> Option<&Value> {
        self.signals.get(&name)
    }

    // ========================================================================
    // Design wiring
    // ========================================================================

    /// Resets all kernel state and wires up a design: signals initialized
    /// to X at their declared widths, processes created for continuous
    /// assigns / RTL processes / gates, watchers registered, and start-up
    /// work scheduled at time 0.
    pub fn load_design(&mut self, design: &'d RtlDesign) -> Result<(), SimError> {
        self.design = Some(design);
        self.cur_time = 0;
        self.cur_delta = 0;
        self.stop_requested = false;
        self.pq.clear();
        self.nba_queue.clear();
        self.signals.clear();
        self.processes.clear();
        self.level_watchers.clear();
        self.posedge_watchers.clear();
        self.negedge_watchers.clear();
        self.vcd_order.clear();

        for module in &design.modules {
            for net in &module.nets {
                self.signals
                    .entry(net.name)
                    .or_insert_with(|| Value::filled(net.width, Logic4::LX));
            }
        }

        for (mi, module) in design.modules.iter().enumerate() {
            // Continuous assigns: combinational processes watching every
            // net their RHS reads.
            for (ai, assign) in module.continuous_assigns.iter().enumerate() {
                let idx = self.processes.len();
                self.processes.push(SimProcess {
                    kind: SimProcKind::ContAssign { module: mi, index: ai },
                    region: SchedRegion::Active,
                });
                assign.rhs.for_each_ref(&mut |sig| {
                    self.level_watchers.entry(sig).or_default().push(idx);
                });
                self.schedule(SimTask::RunProcess(idx), 0, SchedRegion::Active);
            }

            // RTL processes.
            for (pi, process) in module.processes.iter().enumerate() {
                let idx = self.processes.len();
                self.processes.push(SimProcess {
                    kind: SimProcKind::Proc { module: mi, index: pi },
                    region: SchedRegion::Active,
                });

                match process.kind {
                    RtlProcessKind::Initial => {
                        // Run once at t=0; never sensitivity-registered.
                        self.schedule(SimTask::RunProcess(idx), 0, SchedRegion::Active);
                    }
                    RtlProcessKind::Always => {
                        let mut has_edge = false;
                        for sens in &process.sensitivity {
                            let table = match sens.edge {
                                RtlEdge::Level => &mut self.level_watchers,
                                RtlEdge::Posedge => {
                                    has_edge = true;
                                    &mut self.posedge_watchers
                                }
                                RtlEdge::Negedge => {
                                    has_edge = true;
                                    &mut self.negedge_watchers
                                }
                            };
                            table.entry(sens.signal).or_default().push(idx);
                        }
                        // Edge-triggered processes arm on their watchers
                        // and wait for the first edge; everything else
                        // (level-sensitive, free-running) runs once at t=0.
                        if !has_edge {
                            self.schedule(SimTask::RunProcess(idx), 0, SchedRegion::Active);
                        }
                    }
                }
            }

            // Gates: combinational processes watching every input.
            for (gi, gate) in module.gates.iter().enumerate() {
                let idx = self.processes.len();
                self.processes.push(SimProcess {
                    kind: SimProcKind::Gate { module: mi, index: gi },
                    region: SchedRegion::Active,
                });
                for input in &gate.inputs {
                    self.level_watchers.entry(*input).or_default().push(idx);
                }
                self.schedule(SimTask::RunProcess(idx), 0, SchedRegion::Active);
            }
        }

        // Register all signals with the waveform writer and emit the
        // header, now that widths are known.
        if self.vcd.is_some() {
            for module in &design.modules {
                for net in &module.nets {
                    if !self.vcd_order.contains(&net.name) {
                        self.vcd_order.push(net.name);
                    }
                }
            }
            let vcd = self.vcd.as_mut().unwrap();
            for name in &self.vcd_order {
                let width = self.signals.get(name).map_or(1, Value::width);
                vcd.add_signal(self.interner.resolve(*name), width);
            }
            vcd.dump_header()?;
        }

        Ok(())
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    fn schedule(&mut self, task: SimTask, delay: u64, region: SchedRegion) {
        let time = self.cur_time + delay;
        let delta = if delay == 0 { self.cur_delta } else { 0 };
        self.seq += 1;
        self.pq.push(Reverse(ScheduledProcess {
            time,
            delta,
            region,
            seq: self.seq,
            task,
        }));
    }

    /// Runs the simulation.
    ///
    /// `max_time == 0` runs until the event queue empties or `$finish`;
    /// otherwise the kernel halts before processing any event with
    /// `time > max_time`.
    pub fn run(&mut self, max_time: u64) -> Result<(), SimError> {
        let unlimited = max_time == 0;

        while !self.pq.is_empty() && !self.stop_requested {
            let top_time = self.pq.peek().map(|Reverse(sp)| sp.time).unwrap_or(0);
            if !unlimited && top_time > max_time {
                break;
            }

            self.cur_time = top_time;
            self.cur_delta = 0;

            self.emit_vcd_snapshot()?;
            self.run_active_region(top_time);
            self.run_nba_region();
            self.emit_vcd_snapshot()?;
        }

        if let Some(vcd) = &mut self.vcd {
            vcd.flush()?;
        }
        Ok(())
    }

    /// Drains all Preponed/Active/Inactive entries at the target time,
    /// bumping the delta counter per pop.
    fn run_active_region(&mut self, target_time: u64) {
        loop {
            let runnable = match self.pq.peek() {
                Some(Reverse(sp)) => {
                    sp.time == target_time
                        && matches!(
                            sp.region,
                            SchedRegion::Preponed | SchedRegion::Active | SchedRegion::Inactive
                        )
                }
                None => false,
            };
            if !runnable {
                break;
            }
            let Reverse(sp) = self.pq.pop().unwrap();
            self.cur_delta += 1;
            self.run_task(sp.task);
            if self.stop_requested {
                break;
            }
        }
    }

    /// Drains the NBA queue one-shot: the queue is swapped out before
    /// draining so that new NBA work produced while draining is deferred
    /// to the next cycle. Updates are applied through the normal drive
    /// path and may re-trigger active work at the same time.
    fn run_nba_region(&mut self) {
        if self.nba_queue.is_empty() || self.stop_requested {
            return;
        }
        let queue = std::mem::take(&mut self.nba_queue);
        for update in queue {
            self.drive_signal(update.signal, update.value, false);
        }
    }

    fn run_task(&mut self, task: SimTask) {
        match task {
            SimTask::RunProcess(idx) => self.run_process(idx),
            SimTask::Resume(thread) => self.exec_stmt(thread),
        }
    }

    // ========================================================================
    // Process execution
    // ========================================================================

    fn run_process(&mut self, idx: usize) {
        let Some(design) = self.design else { return };
        match self.processes[idx].kind {
            SimProcKind::ContAssign { module, index } => {
                let assign = &design.modules[module].continuous_assigns[index];
                let value = self.eval_expr(&assign.rhs);
                self.drive_signal(assign.lhs, value, false);
            }
            SimProcKind::Proc { module, index } => {
                let process = &design.modules[module].processes[index];
                if let Some(first) = process.first_stmt {
                    self.exec_stmt(Thread {
                        cur: Some(first),
                        owner: idx,
                        entry: Some(first),
                    });
                } else {
                    // Combinational fallback over the flat assigns view.
                    for assign in &process.assigns {
                        let nba = assign.kind == svtool_ir::RtlAssignKind::NonBlocking;
                        let value = self.eval_expr(&assign.rhs);
                        self.drive_signal(assign.lhs, value, nba);
                    }
                }
            }
            SimProcKind::Gate { module, index } => {
                let gate = &design.modules[module].gates[index];
                let out = self.eval_gate(gate);
                let mut value = Value::new(1);
                value.set(0, out);
                self.drive_signal(gate.out, value, false);
            }
        }
    }

    fn eval_gate(&self, gate: &svtool_ir::RtlGate) -> Logic4 {
        let get_bit = |name: &Ident| -> Logic4 {
            match self.signals.get(name) {
                Some(v) if v.width() > 0 => v.get(0),
                _ => Logic4::LX,
            }
        };

        match gate.kind {
            RtlGateKind::And | RtlGateKind::Nand => {
                let mut acc = Logic4::L1;
                for input in &gate.inputs {
                    acc = acc & get_bit(input);
                }
                if gate.kind == RtlGateKind::Nand {
                    !acc
                } else {
                    acc
                }
            }
            RtlGateKind::Or | RtlGateKind::Nor => {
                let mut acc = Logic4::L0;
                for input in &gate.inputs {
                    acc = acc | get_bit(input);
                }
                if gate.kind == RtlGateKind::Nor {
                    !acc
                } else {
                    acc
                }
            }
            RtlGateKind::Xor | RtlGateKind::Xnor => {
                let mut acc = Logic4::L0;
                for input in &gate.inputs {
                    acc = acc ^ get_bit(input);
                }
                if gate.kind == RtlGateKind::Xnor {
                    !acc
                } else {
                    acc
                }
            }
            RtlGateKind::Not => gate.inputs.first().map_or(Logic4::LX, |i| !get_bit(i)),
            RtlGateKind::Buf => gate.inputs.first().map_or(Logic4::LX, get_bit),
        }
    }

    /// The procedural thread executor.
    ///
    /// Runs the statement chain until it suspends at a delay, terminates
    /// at `$finish`, or falls off the end. A delay schedules a
    /// continuation that re-enters here; a finished chain of a
    /// free-running always process (empty sensitivity list, delay in the
    /// chain) resets to its entry.
    fn exec_stmt(&mut self, mut thread: Thread) {
        let Some(design) = self.design else { return };
        let SimProcKind::Proc { module, index } = self.processes[thread.owner].kind else {
            return;
        };

        loop {
            let Some(cur) = thread.cur else {
                let process = &design.modules[module].processes[index];
                if process.kind == RtlProcessKind::Always
                    && process.sensitivity.is_empty()
                    && process.has_delay()
                {
                    thread.cur = thread.entry;
                    continue;
                }
                return;
            };

            let stmt = &design.modules[module].processes[index].stmts[cur];
            match &stmt.op {
                RtlStmtOp::BlockingAssign { lhs, rhs } => {
                    let value = self.eval_expr(rhs);
                    self.drive_signal(*lhs, value, false);
                    thread.cur = stmt.next;
                }
                RtlStmtOp::NonBlockingAssign { lhs, rhs } => {
                    let value = self.eval_expr(rhs);
                    self.drive_signal(*lhs, value, true);
                    thread.cur = stmt.next;
                }
                RtlStmtOp::Delay { delay, body } => {
                    let ticks = uint_projection(&self.eval_expr(delay));
                    let resume = Thread {
                        cur: body.or(stmt.next),
                        owner: thread.owner,
                        entry: thread.entry,
                    };
                    self.schedule(SimTask::Resume(resume), ticks, SchedRegion::Active);
                    return;
                }
                RtlStmtOp::Finish => {
                    self.stop_requested = true;
                    return;
                }
            }
        }
    }

    // ========================================================================
    // Signals
    // ========================================================================

    /// Evaluates an RTL expression against the current signal state.
    ///
    /// An unresolved reference reads as a width-1 X instead of aborting.
    pub fn eval_expr(&self, expr: &RtlExpr) -> Value {
        match expr {
            RtlExpr::Ref(name) => self
                .signals
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::filled(1, Logic4::LX)),
            RtlExpr::Const(text) => parse_literal(text),
            RtlExpr::Unary { op, operand } => eval_unary(*op, &self.eval_expr(operand)),
            RtlExpr::Binary { op, lhs, rhs } => {
                eval_binary(*op, &self.eval_expr(lhs), &self.eval_expr(rhs))
            }
        }
    }

    /// Drives a net.
    ///
    /// The NBA path queues a deferred write for the end of the current
    /// time step. The immediate path is glitch-free: a write of the value
    /// already held is a no-op; a change overwrites the store, detects
    /// scalar edges on bit 0, and wakes level watchers always, posedge
    /// watchers on a 0 to 1 transition, and negedge watchers on 1 to 0,
    /// in registration order.
    pub fn drive_signal(&mut self, name: Ident, value: Value, nba: bool) {
        if nba {
            self.nba_queue.push(NbaUpdate {
                signal: name,
                value,
            });
            return;
        }

        let old = self.signals.get(&name);
        if old == Some(&value) {
            return;
        }
        let old_bit = match old {
            Some(v) if v.width() > 0 => v.get(0),
            _ => Logic4::LX,
        };
        let new_bit = if value.width() > 0 {
            value.get(0)
        } else {
            Logic4::LX
        };
        self.signals.insert(name, value);

        let posedge = old_bit == Logic4::L0 && new_bit == Logic4::L1;
        let negedge = old_bit == Logic4::L1 && new_bit == Logic4::L0;

        let mut to_wake: Vec<usize> = Vec::new();
        if let Some(level) = self.level_watchers.get(&name) {
            to_wake.extend_from_slice(level);
        }
        if posedge {
            if let Some(pos) = self.posedge_watchers.get(&name) {
                to_wake.extend_from_slice(pos);
            }
        }
        if negedge {
            if let Some(neg) = self.negedge_watchers.get(&name) {
                to_wake.extend_from_slice(neg);
            }
        }
        for idx in to_wake {
            let region = self.processes[idx].region;
            self.schedule(SimTask::RunProcess(idx), 0, region);
        }
    }

    fn emit_vcd_snapshot(&mut self) -> Result<(), SimError> {
        let Some(vcd) = &mut self.vcd else {
            return Ok(());
        };
        vcd.dump_time(self.cur_time)?;
        for name in &self.vcd_order {
            if let Some(value) = self.signals.get(name) {
                vcd.dump_value(self.interner.resolve(*name), value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svtool_diagnostics::DiagnosticSink;
    use svtool_elaborate::{elaborate, GenArena};
    use svtool_ir::{build_design, RtlAssign, RtlAssignKind, RtlGate, RtlModule};
    use svtool_source::FileId;

    fn compile(src: &str, interner: &Interner) -> RtlDesign {
        let sink = DiagnosticSink::new();
        let ast = svtool_parser::parse_source(src, FileId::from_raw(0), interner, &sink);
        assert!(!sink.has_errors(), "parse errors: {:?}", sink.diagnostics());
        let arena = GenArena::new();
        let elab = elaborate(&ast, &arena, interner, &sink).unwrap();
        build_design(&elab, interner)
    }

    fn bit(kernel: &Kernel<'_>, name: &str) -> Logic4 {
        kernel.get_signal(name).expect(name).get(0)
    }

    #[test]
    fn signals_initialized_to_x_at_declared_width() {
        let interner = Interner::new();
        let design = compile("module m; reg [3:0] r; wire w; endmodule", &interner);
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();

        let r = kernel.get_signal("r").unwrap();
        assert_eq!(r.width(), 4);
        assert!(r.has_unknown());
        assert_eq!(kernel.get_signal("w").unwrap().width(), 1);
    }

    #[test]
    fn continuous_assign_settles() {
        let interner = Interner::new();
        let design = compile(
            "module m; wire a, b, y; assign a = 1'b1; assign b = 1'b1; assign y = a & b; endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(10).unwrap();
        assert_eq!(bit(&kernel, "y"), Logic4::L1);
    }

    #[test]
    fn drive_then_read_same_step() {
        let interner = Interner::new();
        let design = compile("module m; reg r; endmodule", &interner);
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();

        let name = interner.get("r").unwrap();
        kernel.drive_signal(name, Value::from_uint(1, 1), false);
        assert_eq!(bit(&kernel, "r"), Logic4::L1);
    }

    #[test]
    fn glitch_free_write_does_not_wake_watchers() {
        let interner = Interner::new();
        let design = compile(
            "module m; wire a, y; assign y = a; endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();

        let a = interner.get("a").unwrap();
        let before = kernel.pq.len();
        let held = kernel.get_signal("a").unwrap().clone();
        kernel.drive_signal(a, held, false);
        assert_eq!(kernel.pq.len(), before);
    }

    #[test]
    fn edge_detection_ignores_x_transitions() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg clk, q; always @(posedge clk) q <= 1'b1; initial q = 1'b0; endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();

        // clk starts X; X -> 1 must not fire the posedge watcher.
        let clk = interner.get("clk").unwrap();
        kernel.drive_signal(clk, Value::from_uint(1, 1), false);
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "q"), Logic4::L0);

        // 1 -> 0 -> 1 is a real posedge.
        kernel.drive_signal(clk, Value::from_uint(1, 0), false);
        kernel.run(0).unwrap();
        kernel.drive_signal(clk, Value::from_uint(1, 1), false);
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "q"), Logic4::L1);
    }

    #[test]
    fn run_zero_with_no_events_returns() {
        let interner = Interner::new();
        let design = compile("module m; endmodule", &interner);
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert_eq!(kernel.time(), 0);
    }

    #[test]
    fn initial_chain_with_delays() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r; initial begin r = 1'b0; #10 r = 1'b1; #10 $finish; end endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert!(kernel.stop_requested());
        assert_eq!(kernel.time(), 20);
        assert_eq!(bit(&kernel, "r"), Logic4::L1);
    }

    #[test]
    fn delay_value_observed_midway() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r; initial begin r = 1'b0; #10 r = 1'b1; end endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(5).unwrap();
        assert_eq!(bit(&kernel, "r"), Logic4::L0);
        kernel.run(10).unwrap();
        assert_eq!(bit(&kernel, "r"), Logic4::L1);
    }

    #[test]
    fn finish_is_cooperative() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r; initial begin $finish; r = 1'b1; end endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert!(kernel.stop_requested());
        // The assignment after $finish never ran.
        assert!(kernel.get_signal("r").unwrap().has_unknown());
    }

    #[test]
    fn free_running_clock_toggles() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg clk = 1'b0; always #5 clk = ~clk; endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(23).unwrap();
        // Toggles at 5, 10, 15, 20: 0 -> 1 -> 0 -> 1 -> 0
        assert_eq!(bit(&kernel, "clk"), Logic4::L0);
        assert_eq!(kernel.time(), 20);
    }

    #[test]
    fn nba_applied_after_active_work() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg clk = 1'b0; reg q = 1'b0;\n\
             always #5 clk = ~clk;\n\
             always @(posedge clk) q <= ~q;\n\
             endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(25).unwrap();
        // Posedges at 5, 15, 25 flip q three times from 0.
        assert_eq!(bit(&kernel, "q"), Logic4::L1);
    }

    #[test]
    fn max_time_halts_before_later_events() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r = 1'b0; initial #100 r = 1'b1; endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(50).unwrap();
        assert_eq!(bit(&kernel, "r"), Logic4::L0);
    }

    #[test]
    fn level_sensitive_always_reacts() {
        let interner = Interner::new();
        let design = compile(
            "module m; wire a; reg y; always @(a) y = a; assign a = 1'b1; endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "y"), Logic4::L1);
    }

    #[test]
    fn star_sensitivity_follows_inputs() {
        let interner = Interner::new();
        let design = compile(
            "module m; wire a, b; reg y;\n\
             always @* y = a | b;\n\
             assign a = 1'b0; assign b = 1'b1;\n\
             endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "y"), Logic4::L1);
    }

    #[test]
    fn gate_process_recomputes_output() {
        let interner = Interner::new();
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");
        let y = interner.get_or_intern("y");

        let mut module = RtlModule::new(interner.get_or_intern("m"));
        for name in [a, b, y] {
            module.nets.push(svtool_ir::RtlNet { name, width: 1 });
        }
        module.gates.push(RtlGate {
            kind: RtlGateKind::And,
            inputs: vec![a, b],
            out: y,
        });
        let design = RtlDesign {
            modules: vec![module],
        };

        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.drive_signal(a, Value::from_uint(1, 1), false);
        kernel.drive_signal(b, Value::from_uint(1, 1), false);
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "y"), Logic4::L1);

        kernel.drive_signal(b, Value::from_uint(1, 0), false);
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "y"), Logic4::L0);
    }

    #[test]
    fn all_gate_kinds_evaluate() {
        let interner = Interner::new();
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");

        let mut module = RtlModule::new(interner.get_or_intern("m"));
        module.nets.push(svtool_ir::RtlNet { name: a, width: 1 });
        module.nets.push(svtool_ir::RtlNet { name: b, width: 1 });
        let outs: Vec<(RtlGateKind, &str)> = vec![
            (RtlGateKind::And, "o_and"),
            (RtlGateKind::Or, "o_or"),
            (RtlGateKind::Not, "o_not"),
            (RtlGateKind::Nand, "o_nand"),
            (RtlGateKind::Nor, "o_nor"),
            (RtlGateKind::Xor, "o_xor"),
            (RtlGateKind::Xnor, "o_xnor"),
            (RtlGateKind::Buf, "o_buf"),
        ];
        for (kind, name) in &outs {
            let out = interner.get_or_intern(name);
            module.nets.push(svtool_ir::RtlNet { name: out, width: 1 });
            let inputs = if matches!(kind, RtlGateKind::Not | RtlGateKind::Buf) {
                vec![a]
            } else {
                vec![a, b]
            };
            module.gates.push(RtlGate {
                kind: *kind,
                inputs,
                out,
            });
        }
        let design = RtlDesign {
            modules: vec![module],
        };

        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.drive_signal(a, Value::from_uint(1, 1), false);
        kernel.drive_signal(b, Value::from_uint(1, 0), false);
        kernel.run(0).unwrap();

        assert_eq!(bit(&kernel, "o_and"), Logic4::L0);
        assert_eq!(bit(&kernel, "o_or"), Logic4::L1);
        assert_eq!(bit(&kernel, "o_not"), Logic4::L0);
        assert_eq!(bit(&kernel, "o_nand"), Logic4::L1);
        assert_eq!(bit(&kernel, "o_nor"), Logic4::L0);
        assert_eq!(bit(&kernel, "o_xor"), Logic4::L1);
        assert_eq!(bit(&kernel, "o_xnor"), Logic4::L0);
        assert_eq!(bit(&kernel, "o_buf"), Logic4::L1);
    }

    #[test]
    fn legacy_assigns_path_without_statement_graph() {
        let interner = Interner::new();
        let y = interner.get_or_intern("y");

        let mut module = RtlModule::new(interner.get_or_intern("m"));
        module.nets.push(svtool_ir::RtlNet { name: y, width: 1 });
        let mut process = svtool_ir::RtlProcess::new(RtlProcessKind::Initial);
        process.assigns.push(RtlAssign {
            kind: RtlAssignKind::Blocking,
            lhs: y,
            rhs: RtlExpr::constant("1'b1"),
        });
        module.processes.push(process);
        let design = RtlDesign {
            modules: vec![module],
        };

        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert_eq!(bit(&kernel, "y"), Logic4::L1);
    }

    #[test]
    fn eval_missing_signal_reads_x() {
        let interner = Interner::new();
        let kernel = Kernel::new(&interner);
        let ghost = interner.get_or_intern("ghost");
        let v = kernel.eval_expr(&RtlExpr::Ref(ghost));
        assert_eq!(v.width(), 1);
        assert_eq!(v.get(0), Logic4::LX);
    }

    #[test]
    fn signal_lookup_error() {
        let interner = Interner::new();
        let kernel = Kernel::new(&interner);
        assert!(matches!(
            kernel.signal("nothing"),
            Err(SimError::UnknownSignal { .. })
        ));
    }

    #[test]
    fn vcd_records_header_and_ticks() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r; initial begin r = 1'b0; #5 r = 1'b1; #1 $finish; end endmodule",
            &interner,
        );
        let path = std::env::temp_dir().join("svtool_kernel_vcd_test.vcd");
        {
            let file = std::fs::File::create(&path).unwrap();
            let writer: Box<dyn Write> = Box::new(file);
            let mut kernel = Kernel::new(&interner);
            kernel.set_vcd(VcdWriter::new(writer));
            kernel.load_design(&design).unwrap();
            kernel.run(0).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.contains("$var wire 1 ! r $end"));
        assert!(text.contains("$enddefinitions $end"));
        assert!(text.contains("#0"));
        assert!(text.contains("#5"));
        assert!(text.contains("b1 !"));
    }

    #[test]
    fn load_design_resets_state() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r; initial begin #5 $finish; end endmodule",
            &interner,
        );
        let mut kernel = Kernel::new(&interner);
        kernel.load_design(&design).unwrap();
        kernel.run(0).unwrap();
        assert!(kernel.stop_requested());

        kernel.load_design(&design).unwrap();
        assert!(!kernel.stop_requested());
        assert_eq!(kernel.time(), 0);
        kernel.run(0).unwrap();
        assert!(kernel.stop_requested());
    }

    #[test]
    fn deep_copied_module_simulates_identically() {
        let interner = Interner::new();
        let design = compile(
            "module m; reg r; initial begin r = 1'b0; #10 r = 1'b1; #10 $finish; end endmodule",
            &interner,
        );
        let copy = RtlDesign {
            modules: vec![design.modules[0].clone()],
        };

        let mut k1 = Kernel::new(&interner);
        k1.load_design(&design).unwrap();
        k1.run(0).unwrap();

        let mut k2 = Kernel::new(&interner);
        k2.load_design(&copy).unwrap();
        k2.run(0).unwrap();

        assert_eq!(k1.time(), k2.time());
        assert_eq!(
            k1.get_signal("r").unwrap().to_string(),
            k2.get_signal("r").unwrap().to_string()
        );
        assert_eq!(k1.stop_requested(), k2.stop_requested());
    }
}
