// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use yieldfsm::cfg;
use yieldfsm::desugar::desugar_suspend_repeat;
use yieldfsm::fsm::{paths_to_dot, synthesize};
use yieldfsm::ir::*;
use yieldfsm::sim::{FsmInterpreter, InitKind, Simulator};

#[derive(Parser, Debug)]
#[command(name = "fsm")]
#[command(author = "Kevin Laeufer <laeufer@cornell.edu>")]
#[command(version)]
#[command(about = "Compiles a built-in process into a state machine.", long_about = None)]
struct Args {
    #[arg(value_enum, index = 1, default_value = "branch")]
    process: Example,
    #[arg(short, long)]
    verbose: bool,
    #[arg(long, help = "Keep branches that are constant after the preceding block.")]
    no_bypass: bool,
    #[arg(long, help = "Write the control flow graph to this file.")]
    cfg_dot: Option<String>,
    #[arg(long, help = "Write all paths and their states to this file.")]
    paths_dot: Option<String>,
    #[arg(long, default_value_t = 0, help = "Simulate with random inputs.")]
    steps: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Example {
    /// suspend; x = 1; suspend
    Straight,
    /// if ready: suspend else: counter += 1; suspend
    Branch,
    /// a = 5; if a > 3: suspend else: suspend
    Constant,
    /// suspend(4)
    Repeat,
}

fn main() {
    let args = Args::parse();
    let mut ctx = Context::default();
    let process = build_process(&mut ctx, args.process);
    if args.verbose {
        println!("{}", process.serialize_to_str(&ctx));
        println!();
    }

    let (body, induction_vars) =
        desugar_suspend_repeat(&mut ctx, &process).expect("failed to desugar");
    let mut graph = cfg::build(&ctx, &body).expect("failed to build control flow graph");
    cfg::simplify(&mut ctx, &mut graph, !args.no_bypass);
    if let Some(filename) = &args.cfg_dot {
        std::fs::write(filename, cfg::to_dot(&ctx, &graph)).expect("failed to write dot file");
    }
    let mut paths = cfg::enumerate_paths(&graph, 1024).expect("failed to enumerate paths");
    if args.verbose {
        for path in paths.iter() {
            println!("{}", path.serialize_to_str(&ctx));
        }
        println!();
    }

    let state_var = ctx.string("yield_state".into());
    let fsm = synthesize(
        &mut ctx,
        &process,
        graph.registers(),
        &induction_vars,
        graph.suspend_count(),
        state_var,
        &mut paths,
    );
    println!("{}", fsm.serialize_to_str(&ctx));
    if let Some(filename) = &args.paths_dot {
        std::fs::write(filename, paths_to_dot(&ctx, &fsm, &paths))
            .expect("failed to write dot file");
    }

    if args.steps > 0 {
        let inputs: Vec<_> = process.inputs().collect();
        let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(args.seed);
        let mut sim = FsmInterpreter::new(&ctx, &fsm);
        sim.init(InitKind::Random(args.seed));
        let mut trace = Vec::with_capacity(args.steps as usize);
        for _ in 0..args.steps {
            for input in inputs.iter() {
                sim.set(*input, Value::Bool(rng.gen()));
            }
            trace.push(sim.step().expect("simulation failed"));
        }
        println!();
        println!("suspension points: {trace:?}");
    }
}

fn build_process(ctx: &mut Context, example: Example) -> Process {
    let mut process = Process::new(format!("{example:?}").to_lowercase());
    let tru = ctx.tru();
    let one = ctx.int(1);
    let body = match example {
        Example::Straight => {
            let x = ctx.string("x".into());
            vec![Stmt::Suspend, Stmt::assign(x, one), Stmt::Suspend]
        }
        Example::Branch => {
            let ready = ctx.string("ready".into());
            process.add_input(ready);
            let counter = ctx.string("counter".into());
            let width = ctx.int(8);
            process.body.push(Stmt::Register {
                name: counter,
                width,
            });
            vec![
                Stmt::If {
                    cond: ctx.symbol_ref(ready),
                    then: vec![Stmt::Suspend],
                    els: vec![Stmt::AugAssign {
                        target: counter,
                        op: BinaryOp::Add,
                        value: one,
                    }],
                },
                Stmt::Suspend,
            ]
        }
        Example::Constant => {
            let a = ctx.string("a".into());
            let a_sym = ctx.symbol_ref(a);
            let five = ctx.int(5);
            let three = ctx.int(3);
            vec![
                Stmt::assign(a, five),
                Stmt::If {
                    cond: ctx.greater(a_sym, three),
                    then: vec![Stmt::Suspend],
                    els: vec![Stmt::Suspend],
                },
            ]
        }
        Example::Repeat => {
            let four = ctx.int(4);
            vec![Stmt::SuspendRepeat { count: four }]
        }
    };
    process.body.push(Stmt::While { cond: tru, body });
    process
}
