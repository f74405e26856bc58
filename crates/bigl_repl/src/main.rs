mod repl;

use std::{cell::RefCell, env, fs, process, rc::Rc};

use log::debug;

use bigl_interpreter::object::Object;
use bigl_interpreter::{Config, Environment, Evaluator, Signal};

fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [] => repl::repl(),
        [path] => process::exit(run_file(path)),
        _ => {
            eprintln!("usage: bigl [script]");
            process::exit(2);
        }
    }
}

/// Run a script and return the status the process should exit with.
fn run_file(path: &str) -> i32 {
    debug!("running {}", path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read {}: {}", path, err);
            return 1;
        }
    };

    let prog = match bigl_interpreter::parse(&source) {
        Ok(prog) => prog,
        Err(errors) => {
            eprintln!("Parser errors:");
            for error in errors {
                eprintln!("\t{}", error);
            }
            return 1;
        }
    };

    let env = Rc::new(RefCell::new(Environment::new_module(repl::MAIN_MODULE)));
    let mut evaluator = Evaluator::new_with_env(env).with_config(Config::from_env());

    match evaluator.eval(&prog) {
        Ok(result_obj) => {
            if *result_obj != Object::Nil {
                println!("{}", result_obj.to_code_string());
            }
            0
        }
        Err(Signal::Exit(code)) => i32::try_from(code).unwrap_or(1),
        Err(Signal::Error(err)) => {
            eprintln!("Error: {}", err);
            1
        }
        Err(signal) => {
            debug!("ignoring stray signal {:?}", signal);
            0
        }
    }
}
