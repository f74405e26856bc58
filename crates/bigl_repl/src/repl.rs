use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use bigl_interpreter::object::Object;
use bigl_interpreter::{Config, Environment, Evaluator, Signal};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name the root environment of an interactive session or a script is tagged with.
pub const MAIN_MODULE: &str = "_main";

pub fn repl() {
    println!("BIG-L language v{}", VERSION);

    let env = Rc::new(RefCell::new(Environment::new_module(MAIN_MODULE)));
    let mut evaluator = Evaluator::new_with_env(env).with_config(Config::from_env());

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                // Skip empty lines
                if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                let prog = match bigl_interpreter::parse(&line) {
                    Ok(prog) => prog,
                    Err(errors) => {
                        println!("Parser errors:");
                        for error in errors {
                            println!("\t{}", error);
                        }
                        continue;
                    }
                };

                match evaluator.eval(&prog) {
                    Ok(result_obj) => {
                        if *result_obj != Object::Nil {
                            println!("{}", result_obj.to_code_string());
                        }
                    }
                    Err(Signal::Error(result_err)) => println!("Error: {}", result_err),
                    Err(Signal::Exit(code)) => {
                        println!("exited the program with code {}", code);
                        break;
                    }
                    Err(signal) => debug!("ignoring stray signal {:?}", signal),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }
}
