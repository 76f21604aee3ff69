//! Decode the first frames of a Blackmagic RAW clip to 8-bit RGBA.
//!
//! Every read frame is decoded and processed by the SDK's worker threads; the callback
//! reports each image back to the main thread over a channel. The first image is
//! written to disk as a binary PPM when `--out` is given.
//!
//! Run with: cargo run --example decode_clip -- [--sdk DIR] [--frames N] [--out FILE] CLIP
//!
//! Without `--sdk` the library is looked up in `BLACKMAGIC_RAW_API_DIR`, then in the
//! platform's default SDK location.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::mpsc::{channel, Sender};
use std::time::Instant;

use anyhow::{bail, Context};
use blackmagic_raw_sys::errors::Result;
use blackmagic_raw_sys::formats::ResourceFormat;
use blackmagic_raw_sys::helpers::{Callback, Factory, Frame, Job, ProcessedImage};

enum Event {
    Decoded {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
    Failed(String),
}

struct Decoder {
    events: Sender<Event>,
}

impl Decoder {
    fn fail(&self, what: &str, err: impl std::fmt::Display) {
        let _ = self.events.send(Event::Failed(format!("{what}: {err}")));
    }

    fn start_decode(&self, frame: &Frame) -> Result<()> {
        frame.set_resource_format(ResourceFormat::RGBA_U8)?;
        frame.create_job_decode_and_process_frame(None, None)?.submit()
    }
}

impl Callback for Decoder {
    fn read_complete(&self, _job: Job, frame: Result<Frame>) {
        match frame.and_then(|frame| self.start_decode(&frame)) {
            Ok(()) => {}
            Err(err) => self.fail("read", err),
        }
    }

    fn process_complete(&self, _job: Job, image: Result<ProcessedImage>) {
        let event = image.and_then(|image| {
            Ok(Event::Decoded {
                width: image.width()?,
                height: image.height()?,
                pixels: image.resource()?.to_vec(),
            })
        });
        match event {
            Ok(event) => {
                let _ = self.events.send(event);
            }
            Err(err) => self.fail("process", err),
        }
    }
}

struct Args {
    sdk: Option<String>,
    frames: u64,
    out: Option<String>,
    clip: String,
}

fn print_help() {
    println!("Usage: decode_clip [OPTIONS] CLIP");
    println!();
    println!("Options:");
    println!("  --sdk <DIR>      Directory containing the Blackmagic RAW API library");
    println!("  --frames <N>     Number of frames to decode (default: 10)");
    println!("  --out <FILE>     Write the first decoded frame as PPM");
    println!("  -h, --help       Show this help message");
}

fn parse_args() -> anyhow::Result<Args> {
    let mut sdk = None;
    let mut frames = 10;
    let mut out = None;
    let mut clip = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sdk" => sdk = Some(args.next().context("--sdk requires a directory")?),
            "--frames" => {
                frames = args
                    .next()
                    .context("--frames requires a number")?
                    .parse()
                    .context("--frames requires a number")?
            }
            "--out" => out = Some(args.next().context("--out requires a file name")?),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ if clip.is_none() => clip = Some(arg),
            other => bail!("unexpected argument: {other}"),
        }
    }

    let Some(clip) = clip else {
        print_help();
        std::process::exit(1);
    };
    Ok(Args {
        sdk,
        frames,
        out,
        clip,
    })
}

fn write_ppm(path: &str, width: u32, height: u32, rgba: &[u8]) -> anyhow::Result<()> {
    let mut file = BufWriter::new(File::create(path).with_context(|| format!("create {path}"))?);
    write!(file, "P6\n{width} {height}\n255\n")?;
    for pixel in rgba.chunks_exact(4) {
        file.write_all(&pixel[..3])?;
    }
    file.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = parse_args()?;

    let factory = match &args.sdk {
        Some(dir) => Factory::new_from_path(dir)?,
        None => Factory::new()?,
    };
    let codec = factory.create_codec()?;
    let clip = codec
        .open_clip(&args.clip)
        .with_context(|| format!("open {}", args.clip))?;

    let frame_count = clip.frame_count()?;
    println!(
        "{}: {}x{} @ {} fps, {} frames, {}",
        args.clip,
        clip.width()?,
        clip.height()?,
        clip.frame_rate()?,
        frame_count,
        clip.camera_type()?
    );

    let (events, received) = channel();
    codec.set_callback(Decoder { events })?;

    let wanted = args.frames.min(frame_count);
    let start = Instant::now();
    for index in 0..wanted {
        clip.create_job_read_frame(index)?.submit()?;
    }
    codec.flush_jobs()?;

    let mut decoded = 0;
    let mut failed = 0;
    for event in received.try_iter() {
        match event {
            Event::Decoded {
                width,
                height,
                pixels,
            } => {
                if decoded == 0 {
                    if let Some(out) = &args.out {
                        write_ppm(out, width, height, &pixels)?;
                        println!("wrote {out}");
                    }
                }
                decoded += 1;
            }
            Event::Failed(message) => {
                eprintln!("{message}");
                failed += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    println!(
        "decoded {decoded}/{wanted} frames in {:.2?} ({:.1} fps), {failed} failed",
        elapsed,
        decoded as f64 / elapsed.as_secs_f64()
    );

    codec.clear_callback()?;
    Ok(())
}
