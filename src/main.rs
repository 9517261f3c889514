//! chatmark CLI - render chat-assistant markdown with directives
//!
//! ```text
//! chatmark [FILE|-] [--stream N] [--json]
//! ```
//!
//! `--stream N` feeds the input through the streaming processor in N-byte
//! chunks instead of parsing it in one go. `--json` prints the segment list
//! instead of HTML. Set `RUST_LOG=chatmark=trace` to watch chunks resolve.

use std::error::Error;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use chatmark::{Segment, StreamProcessor, chunks_of};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: chatmark [FILE|-] [--stream N] [--json]";

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    stream: Option<usize>,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--stream" => {
                let size = args
                    .next()
                    .ok_or_else(|| "--stream needs a chunk size".to_string())?;
                match size.parse::<usize>() {
                    Ok(n) if n > 0 => parsed.stream = Some(n),
                    _ => return Err(format!("invalid chunk size: {size}")),
                }
            }
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            _ if parsed.input.is_some() => return Err(format!("unexpected argument: {arg}")),
            _ => parsed.input = Some(arg),
        }
    }
    Ok(parsed)
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = read_input(args.input.as_deref())?;

    let (segments, html): (Vec<Segment>, String) = match args.stream {
        Some(size) => {
            let mut processor = StreamProcessor::new();
            // An empty file is still one (empty) message.
            processor.process_chunk("");
            for (n, chunk) in chunks_of(&input, size).enumerate() {
                let out = processor.process_chunk(chunk);
                debug!(chunk = n, updates = out.new_segments.len(), "processed chunk");
            }
            let done = processor.finalize()?;
            (done.final_segments, done.full_html)
        }
        None => {
            let segments = chatmark::parse_markdown(&input).segments;
            let html = chatmark::combine_segments(&segments);
            (segments, html)
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &segments)?;
        out.write_all(b"\n")?;
    } else {
        out.write_all(html.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("chatmark: {msg}");
            }
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("chatmark: {err}");
            ExitCode::FAILURE
        }
    }
}
