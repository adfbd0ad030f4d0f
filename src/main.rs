use pipeshell::Interpreter;

fn main() {
    if let Err(err) = Interpreter::new().repl() {
        eprintln!("pipeshell: {}", err);
        std::process::exit(1);
    }
}
