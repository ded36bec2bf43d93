use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write},
    path::PathBuf,
    time::Duration,
};
use vddlog::{datalog, frame};

/// Erase page size of the nRF52833 flash
const DEFAULT_PAGE_SIZE: usize = 4096;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints live readings streamed by the board together with running statistics
    Monitor {
        #[clap(short, long)]
        port: String,
        #[clap(short, long, default_value_t = 115_200)]
        baud: u32,
    },

    /// Converts a raw dump of the data log flash region into CSV
    Decode {
        #[clap(short, long)]
        input: PathBuf,
        /// Defaults to standard output
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
}

/// Running minimum, mean and maximum of the readings seen so far
#[derive(Debug, Default, PartialEq, Eq)]
struct Stats {
    min: Option<u32>,
    max: Option<u32>,
    sum: u64,
    count: u64,
}

impl Stats {
    fn push(&mut self, millivolts: u32) {
        self.min = Some(self.min.map_or(millivolts, |m| m.min(millivolts)));
        self.max = Some(self.max.map_or(millivolts, |m| m.max(millivolts)));
        self.sum += millivolts as u64;
        self.count += 1;
    }

    fn mean(&self) -> Option<u64> {
        self.sum.checked_div(self.count)
    }
}

/// Consumes frames until the stream ends, passing each reading and the
/// updated statistics to `on_reading`. Lines that are not valid frames are
/// skipped and read timeouts keep waiting.
fn follow<R: BufRead>(
    mut reader: R,
    stats: &mut Stats,
    mut on_reading: impl FnMut(u32, &Stats),
) -> io::Result<()> {
    let mut buf = Vec::new();

    loop {
        // A timeout can leave part of a line in `buf`
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) if buf.is_empty() => return Ok(()),
            Ok(_) => {}
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                debug!("no data yet, still waiting");
                continue;
            }
            Err(e) => return Err(e),
        }

        match std::str::from_utf8(&buf) {
            Ok(line) => match frame::parse(line) {
                Ok(millivolts) => {
                    stats.push(millivolts);
                    on_reading(millivolts, stats);
                }
                Err(e) => warn!("skipping {:?}: {}", line.trim_end(), e),
            },
            Err(e) => warn!("skipping undecodable line: {}", e),
        }

        buf.clear();
    }
}

fn monitor(port: &str, baud: u32) -> Result<(), Box<dyn std::error::Error>> {
    let raw_port = serialport::new(port, baud)
        .timeout(Duration::from_secs(60))
        .open()?;
    raw_port.clear(serialport::ClearBuffer::Input)?;
    info!("listening on {} at {} baud", port, baud);

    let mut stats = Stats::default();
    follow(BufReader::new(raw_port), &mut stats, |millivolts, stats| {
        println!(
            "{:>5} mV    min {:>5}  mean {:>5}  max {:>5}",
            millivolts,
            stats.min.unwrap_or_default(),
            stats.mean().unwrap_or_default(),
            stats.max.unwrap_or_default(),
        );
    })?;

    Ok(())
}

fn decode(
    input: PathBuf,
    output: Option<PathBuf>,
    page_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let dump = std::fs::read(&input)?;
    let (header, records) = datalog::decode(&dump, page_size)?;
    info!(
        "log header: visible={} timestamp={:?}",
        header.visible, header.timestamp
    );

    let mut sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    let mut rows = 0;
    for record in records {
        match record {
            Ok(line) => {
                writeln!(sink, "{}", line)?;
                rows += 1;
            }
            Err(e) => warn!("{}", e),
        }
    }
    sink.flush()?;

    info!("decoded {} lines", rows);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor { port, baud } => monitor(&port, baud),
        Commands::Decode {
            input,
            output,
            page_size,
        } => decode(input, output, page_size),
    }
}
