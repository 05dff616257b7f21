//! dump the events of a stylesheet
//!
//! `cargo run --example scan -- path/to/file.css`, or pipe the stylesheet
//! into stdin. Set `RUST_LOG=cssscan=trace` to watch every event go by.

use std::io;
use std::process::ExitCode;

use cssscan::ingest::{ChunkBuffer, Source};
use cssscan::stream::write_stream;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let source = match std::env::args().nth(1) {
    Some(path) => Source::read_file(&path),
    None => {
      let mut buffer = ChunkBuffer::with_path("<stdin>");
      io::copy(&mut io::stdin().lock(), &mut buffer).map(|_| buffer.finish())
    }
  };
  let source = match source {
    Ok(source) => source,
    Err(error) => {
      eprintln!("{error}");
      return ExitCode::FAILURE;
    }
  };

  match source.events() {
    Ok(events) => {
      let mut out = String::new();
      write_stream(&mut out, events).expect("write to String");
      println!("{out}");
      ExitCode::SUCCESS
    }
    Err(error) => {
      eprintln!("{error}");
      ExitCode::FAILURE
    }
  }
}
