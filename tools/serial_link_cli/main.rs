// tools/serial_link_cli/main.rs
//
// Serial link diagnostic: list ports, send and listen for framed messages,
// or run a framing loopback against the mock device.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};

use labserial_lib::{
    init_file_logging, list_ports, ConnectionManager, Echo, FrameCodec, FramingEncoding,
    LinkConfig, MockConfig, MockTransport, SerialConfig, SerialError,
};

/// Framed serial link diagnostic
#[derive(Parser, Debug)]
#[command(name = "serial_link_cli", version, long_about = None)]
struct Cli {
    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports
    Ports,
    /// Send one framed message and print any replies
    Send {
        #[command(flatten)]
        link: LinkArgs,
        /// Message text (UTF-8)
        message: String,
        /// How long to wait for replies
        #[arg(long, default_value_t = 500)]
        wait_ms: u64,
    },
    /// Print incoming frames
    Listen {
        #[command(flatten)]
        link: LinkArgs,
        /// Stop after this many seconds (0 = run until killed)
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
    /// Round-trip frames through an echoing mock device
    Loopback {
        /// Hex boundary pattern; COBS framing when omitted
        #[arg(long)]
        pattern: Option<String>,
        /// Let payloads contain the boundary pattern
        #[arg(long, requires = "pattern")]
        rejoin: bool,
        /// Number of frames to send
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Simulated baud rate
        #[arg(long, default_value_t = 115_200)]
        baud: u32,
    },
}

#[derive(Args, Debug)]
struct LinkArgs {
    /// TOML link config; overrides the port options below
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Serial port name
    #[arg(short, long)]
    port: Option<String>,
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,
    /// Hex boundary pattern; COBS framing when omitted
    #[arg(long)]
    pattern: Option<String>,
    /// Let payloads contain the boundary pattern
    #[arg(long, requires = "pattern")]
    rejoin: bool,
}

impl LinkArgs {
    fn to_config(&self) -> Result<LinkConfig, SerialError> {
        if let Some(path) = &self.config {
            return LinkConfig::load(path);
        }
        let port = self
            .port
            .clone()
            .ok_or_else(|| SerialError::Config("either --config or --port is required".to_string()))?;
        let config = LinkConfig::new(SerialConfig::new(port, self.baud), encoding(&self.pattern, self.rejoin)?);
        config.validate()?;
        Ok(config)
    }
}

fn encoding(pattern: &Option<String>, rejoin: bool) -> Result<FramingEncoding, SerialError> {
    match pattern {
        None => Ok(FramingEncoding::Cobs),
        Some(text) => {
            let bytes = hex::decode(text)
                .map_err(|e| SerialError::Config(format!("bad pattern {:?}: {}", text, e)))?;
            let encoding = if rejoin {
                FramingEncoding::pattern_rejoining(bytes)
            } else {
                FramingEncoding::pattern(bytes)
            };
            encoding.validate()?;
            Ok(encoding)
        }
    }
}

fn render(frame: &[u8]) -> String {
    match std::str::from_utf8(frame) {
        Ok(text) if !text.chars().any(char::is_control) => format!("{:?}", text),
        _ => hex::encode(frame),
    }
}

fn print_stats(codec: &FrameCodec) {
    match serde_json::to_string(&codec.stats()) {
        Ok(json) => println!("stats: {}", json),
        Err(e) => eprintln!("Failed to render stats: {}", e),
    }
}

fn ports() -> Result<(), SerialError> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        let usb = match (port.vid, port.pid) {
            (Some(vid), Some(pid)) => format!(" {:04x}:{:04x}", vid, pid),
            _ => String::new(),
        };
        println!(
            "{}  {}{}  {}",
            port.port_name,
            port.port_type,
            usb,
            port.product.unwrap_or_default()
        );
    }
    Ok(())
}

fn send(link: &LinkArgs, message: &str, wait: Duration) -> Result<(), SerialError> {
    let mut codec = FrameCodec::from_config(link.to_config()?)?;
    codec.start()?;
    codec.send_frame_confirmed(message.as_bytes(), Duration::from_secs(2))?;
    println!("sent {} bytes", message.len());

    let deadline = Instant::now() + wait;
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match codec.receive_frame(remaining)? {
            Some(frame) => println!("<- {}", render(&frame)),
            None => break,
        }
    }
    print_stats(&codec);
    codec.stop()
}

fn listen(link: &LinkArgs, seconds: u64) -> Result<(), SerialError> {
    let mut codec = FrameCodec::from_config(link.to_config()?)?;
    codec.start()?;

    let started = Instant::now();
    while seconds == 0 || started.elapsed() < Duration::from_secs(seconds) {
        if let Some(frame) = codec.receive_frame(Duration::from_millis(200))? {
            println!("<- {}", render(&frame));
        }
    }
    print_stats(&codec);
    codec.stop()
}

fn loopback(pattern: &Option<String>, rejoin: bool, count: usize, baud: u32) -> Result<(), SerialError> {
    let transport = MockTransport::with_generator(MockConfig::new("LOOPBACK", baud), Echo)?;
    let mut codec = FrameCodec::new(ConnectionManager::new(transport), encoding(pattern, rejoin)?)?;
    codec.start()?;

    let frames: Vec<Vec<u8>> = (0..count)
        .map(|i| {
            let mut frame = format!("frame {} ", i).into_bytes();
            frame.extend((0..i % 64).map(|b| b as u8));
            frame
        })
        .collect();

    let started = Instant::now();
    for frame in &frames {
        codec.send_frame(frame)?;
    }

    let mut mismatches = 0;
    for (i, expected) in frames.iter().enumerate() {
        match codec.receive_frame(Duration::from_secs(2))? {
            Some(frame) if &frame == expected => {}
            Some(frame) => {
                mismatches += 1;
                println!("frame {} mismatch: {}", i, render(&frame));
            }
            None => {
                println!("frame {} missing", i);
                mismatches += 1;
                break;
            }
        }
    }

    println!(
        "{} frames in {:.1} ms, {} mismatched",
        count,
        started.elapsed().as_secs_f64() * 1000.0,
        mismatches
    );
    print_stats(&codec);
    codec.stop()?;

    if mismatches > 0 {
        return Err(SerialError::TransportIo(format!("{} frames did not round-trip", mismatches)));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        if let Err(e) = init_file_logging(dir) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let result = match &cli.command {
        Command::Ports => ports(),
        Command::Send {
            link,
            message,
            wait_ms,
        } => send(link, message, Duration::from_millis(*wait_ms)),
        Command::Listen { link, seconds } => listen(link, *seconds),
        Command::Loopback {
            pattern,
            rejoin,
            count,
            baud,
        } => loopback(pattern, *rejoin, *count, *baud),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
