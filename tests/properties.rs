// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use rand::{Rng, SeedableRng};
use yieldfsm::cfg::{build, enumerate_paths, simplify, Cfg};
use yieldfsm::dataflow::propagate;
use yieldfsm::desugar::desugar_suspend_repeat;
use yieldfsm::ir::*;
use yieldfsm::sim::{CfgInterpreter, FsmInterpreter, InitKind, Simulator};
use yieldfsm::{compile, CompileOptions};

/// A process that exercises nested branches, a constant condition and a bounded repeat:
///
/// ```text
/// reg counter: bv<4>
/// reg mode: bv<2>
/// while true:
///   mode = 1
///   if mode == 1:
///     counter += 1
///   if ready and counter > 3:
///     suspend
///     counter = 0
///   else:
///     mode = 2
///   suspend
///   if mode == 2:
///     suspend(3)
/// ```
fn controller(ctx: &mut Context) -> Process {
    let mut process = Process::new("controller");
    let ready = ctx.string("ready".into());
    process.add_input(ready);
    let ready = ctx.symbol_ref(ready);
    let counter = ctx.string("counter".into());
    let mode = ctx.string("mode".into());
    let counter_sym = ctx.symbol_ref(counter);
    let mode_sym = ctx.symbol_ref(mode);
    let (zero, one, two, three) = (ctx.int(0), ctx.int(1), ctx.int(2), ctx.int(3));
    let (four, width) = (ctx.int(4), ctx.int(2));
    let mode_is_one = ctx.equal(mode_sym, one);
    let mode_is_two = ctx.equal(mode_sym, two);
    let counter_gt = ctx.greater(counter_sym, three);
    let go = ctx.and(ready, counter_gt);
    let body = vec![
        Stmt::assign(mode, one),
        Stmt::If {
            cond: mode_is_one,
            then: vec![Stmt::AugAssign {
                target: counter,
                op: BinaryOp::Add,
                value: one,
            }],
            els: vec![],
        },
        Stmt::If {
            cond: go,
            then: vec![Stmt::Suspend, Stmt::assign(counter, zero)],
            els: vec![Stmt::assign(mode, two)],
        },
        Stmt::Suspend,
        Stmt::If {
            cond: mode_is_two,
            then: vec![Stmt::SuspendRepeat { count: three }],
            els: vec![],
        },
    ];
    process.body = vec![
        Stmt::Register {
            name: counter,
            width: four,
        },
        Stmt::Register { name: mode, width },
        Stmt::While {
            cond: ctx.tru(),
            body,
        },
    ];
    process
}

/// Desugars and builds the control flow graph without simplifying it.
fn raw_cfg(ctx: &mut Context, process: &Process) -> (Cfg, Vec<(StringRef, WidthInt)>) {
    let (body, induction_vars) = desugar_suspend_repeat(ctx, process).unwrap();
    (build(ctx, &body).unwrap(), induction_vars)
}

#[test]
fn compilation_is_deterministic() {
    let compile_fresh = || {
        let mut ctx = Context::default();
        let process = controller(&mut ctx);
        let fsm = compile(&mut ctx, &process, &CompileOptions::default()).unwrap();
        fsm.serialize_to_str(&ctx)
    };
    let first = compile_fresh();
    for _ in 0..3 {
        assert_eq!(compile_fresh(), first);
    }
}

#[test]
fn compiling_twice_in_one_context() {
    let mut ctx = Context::default();
    let process = controller(&mut ctx);
    let options = CompileOptions::default();
    let first = compile(&mut ctx, &process, &options).unwrap();
    let first = first.serialize_to_str(&ctx);
    let second = compile(&mut ctx, &process, &options).unwrap();
    assert_eq!(second.serialize_to_str(&ctx), first);
    assert!(first.contains("reg __repeat0: bv<2>"));
}

#[test]
fn suspension_ids_are_contiguous() {
    let mut ctx = Context::default();
    let process = controller(&mut ctx);
    let (cfg, _) = raw_cfg(&mut ctx, &process);
    // two explicit suspensions, the first inside the branch, plus two from `suspend(3)`
    assert_eq!(cfg.suspend_count(), 4);
    let ids: Vec<_> = cfg.suspensions().map(|(_, id)| id).collect();
    assert_eq!(ids, [1, 2, 3, 4]);

    let fsm = compile(&mut ctx, &process, &CompileOptions::default()).unwrap();
    for id in 0..=fsm.suspend_count {
        assert!(fsm.states_from(id).count() > 0, "no state for {id}");
    }
    assert!(fsm.states.iter().all(|s| (1..=4).contains(&s.next)));
}

#[test]
fn one_state_per_path() {
    let mut ctx = Context::default();
    let process = controller(&mut ctx);
    let (mut cfg, _) = raw_cfg(&mut ctx, &process);
    simplify(&mut ctx, &mut cfg, true);
    let paths = enumerate_paths(&cfg, 1024).unwrap();

    let mut ctx2 = Context::default();
    let process2 = controller(&mut ctx2);
    let fsm = compile(&mut ctx2, &process2, &CompileOptions::default()).unwrap();
    assert_eq!(fsm.states.len(), paths.len());
    for (path, state) in paths.iter().zip(fsm.states.iter()) {
        assert_eq!(path.start_id(), state.from);
        assert_eq!(path.end_id(), state.next);
        assert_eq!(path.branches().count(), state.guards.len());
    }
}

#[test]
fn propagation_is_idempotent() {
    let mut ctx = Context::default();
    let process = controller(&mut ctx);
    let (mut cfg, _) = raw_cfg(&mut ctx, &process);
    simplify(&mut ctx, &mut cfg, true);
    let mut paths = enumerate_paths(&cfg, 1024).unwrap();
    for path in paths.iter_mut() {
        propagate(&mut ctx, path);
        let once = path.clone();
        propagate(&mut ctx, path);
        assert_eq!(*path, once);
        // folding a folded condition does not change it either
        for (cond, _) in path.branches() {
            assert_eq!(fold(&mut ctx, cond), cond);
        }
    }
}

/// Runs all simulators with the same random inputs and checks that they agree on the
/// suspension points and register values.
fn compare_traces(seed: u64, steps: usize) {
    let mut ctx = Context::default();
    let process = controller(&mut ctx);
    let ready = ctx.lookup_str("ready").unwrap();
    let counter = ctx.lookup_str("counter").unwrap();
    let mode = ctx.lookup_str("mode").unwrap();

    let (original, _) = raw_cfg(&mut ctx, &process);
    let mut simplified = original.clone();
    simplify(&mut ctx, &mut simplified, true);
    let fsm = compile(&mut ctx, &process, &CompileOptions::default()).unwrap();

    let mut reference = CfgInterpreter::new(&ctx, &original);
    let mut bypassed = CfgInterpreter::new(&ctx, &simplified);
    let mut synthesized = FsmInterpreter::new(&ctx, &fsm);
    reference.init(InitKind::Zero);
    bypassed.init(InitKind::Zero);
    synthesized.init(InitKind::Zero);

    let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed);
    for step in 0..steps {
        let input = Value::Bool(rng.gen());
        reference.set(ready, input);
        bypassed.set(ready, input);
        synthesized.set(ready, input);
        let expected = reference.step().unwrap();
        assert_eq!(bypassed.step().unwrap(), expected, "step {step}");
        assert_eq!(synthesized.step().unwrap(), expected, "step {step}");
        for name in [counter, mode] {
            let expected = reference.get(name).map(|v| v.to_int());
            assert_eq!(bypassed.get(name).map(|v| v.to_int()), expected);
            assert_eq!(synthesized.get(name).map(|v| v.to_int()), expected);
        }
    }
}

#[test]
fn bypass_preserves_behavior() {
    for seed in 0..16 {
        compare_traces(seed, 64);
    }
}

#[test]
fn random_init_matches_between_graphs() {
    let mut ctx = Context::default();
    let process = controller(&mut ctx);
    let counter = ctx.lookup_str("counter").unwrap();
    let (original, _) = raw_cfg(&mut ctx, &process);
    let mut simplified = original.clone();
    simplify(&mut ctx, &mut simplified, true);

    let mut a = CfgInterpreter::new(&ctx, &original);
    let mut b = CfgInterpreter::new(&ctx, &simplified);
    a.init(InitKind::Random(1234));
    b.init(InitKind::Random(1234));
    let initial = a.get(counter).unwrap().to_int();
    assert!((0..16).contains(&initial));
    assert_eq!(b.get(counter).unwrap().to_int(), initial);
}
