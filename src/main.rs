use addr_reconcile::loader::LoadError;

fn main() {
    if let Err(err) = addr_reconcile::run() {
        match err.downcast_ref::<LoadError>() {
            Some(load_error) => eprintln!("{}", load_error.abort_message()),
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}
