//! Demo driver: builds a buffer, edits it, and prints the text followed by a
//! Graphviz rendering of the tree.
//!
//! Usage: `treebuffer [FILE]`. Without a file a short sample is used. Set
//! `RUST_LOG=treebuffer=trace` to watch splits and merges on stderr.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use treebuffer::Config;
use treebuffer::TreeBuffer;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let contents = match std::env::args().nth(1) {
        Some(path) => match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("failed to read {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => b"Test string.".repeat(3),
    };

    let mut buf: TreeBuffer<u8> = TreeBuffer::with_config(Config::new(8, 3));
    buf.append(&contents);
    let middle = buf.size() / 2;
    if let Err(err) = buf.insert(middle, b"[inserted]") {
        eprintln!("insert failed: {}", err);
        return ExitCode::FAILURE;
    }
    if let Err(err) = buf.remove(0, buf.size().min(5)) {
        eprintln!("remove failed: {}", err);
        return ExitCode::FAILURE;
    }
    if let Err(violation) = buf.check() {
        eprintln!("{}", violation);
        return ExitCode::FAILURE;
    }

    println!("{}", buf.to_string_lossy());
    println!("{:?}", buf);
    print!("{}", buf.to_dot());
    return ExitCode::SUCCESS;
}
