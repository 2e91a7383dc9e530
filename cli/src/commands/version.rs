pub fn run() {
    println!("terralist {}", env!("CARGO_PKG_VERSION"));
}
