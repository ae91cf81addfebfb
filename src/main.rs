fn main() {
    if let Err(e) = scan_reader_lib::run() {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
