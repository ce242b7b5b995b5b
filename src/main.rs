//! Counter demo: mounts a small state tree, dispatches a few actions
//! through a logging middleware, and prints every render frame.

use std::rc::Rc;

use clap::Parser;
use log::info;
use serde_json::{Value, json};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use graft::{ActionResult, Middleware, OpsTree, mount};

#[derive(Parser)]
#[command(name = "graft", about = "Counter demo for the graft runtime")]
struct Args {
    /// Number of increments to dispatch
    #[arg(short, long, default_value_t = 3)]
    count: u32,

    /// Step added per increment
    #[arg(short, long, default_value_t = 1)]
    step: i64,
}

fn main() {
    let args = Args::parse();
    let _ = TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let runtime = mount(
        json!({ "counter": 0 }),
        OpsTree::branch([(
            "counter",
            OpsTree::branch([("inc", OpsTree::action(|ops_args, counter, _actions| {
                let step = ops_args.first().and_then(Value::as_i64).unwrap_or(1);
                let current = counter.value().as_i64().unwrap_or(0);
                ActionResult::Replace(json!(current + step))
            }))]),
        )]),
    );

    let announce: Middleware = Rc::new(|action, next| {
        info!("-> {}", action.kind);
        next.call(action)
    });
    runtime.run_with(
        |state| println!("render: {state}"),
        vec![announce, runtime.call_action()],
    );

    for _ in 0..args.count {
        if let Err(err) = runtime
            .actions()
            .invoke(&["counter", "inc"], vec![json!(args.step)])
        {
            eprintln!("dispatch failed: {err}");
            std::process::exit(1);
        }
    }

    runtime.run_until_idle();
    println!("final: {}", runtime.get_state());
}
