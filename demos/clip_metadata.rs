//! Print the clip properties, audio format and metadata of a Blackmagic RAW clip.
//!
//! Run with: cargo run --example clip_metadata -- CLIP [SDK_DIR]

use anyhow::Context;
use blackmagic_raw_sys::helpers::Factory;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: clip_metadata CLIP [SDK_DIR]");
        std::process::exit(1);
    };

    let factory = match args.next() {
        Some(dir) => Factory::new_from_path(dir)?,
        None => Factory::new()?,
    };
    let codec = factory.create_codec()?;
    let clip = codec.open_clip(&path).with_context(|| format!("open {path}"))?;

    let frame_count = clip.frame_count()?;
    println!("Clip:        {path}");
    println!("Camera:      {}", clip.camera_type()?);
    println!("Resolution:  {}x{}", clip.width()?, clip.height()?);
    println!("Frame rate:  {}", clip.frame_rate()?);
    println!("Frames:      {frame_count}");
    if frame_count > 0 {
        println!(
            "Timecode:    {} - {}",
            clip.timecode_for_frame(0)?,
            clip.timecode_for_frame(frame_count - 1)?
        );
    }

    match clip.audio()? {
        Some(audio) => println!(
            "Audio:       {} ch, {} Hz, {} bit, {} samples",
            audio.channel_count()?,
            audio.sample_rate()?,
            audio.bit_depth()?,
            audio.sample_count()?
        ),
        None => println!("Audio:       none"),
    }

    println!();
    println!("Metadata:");
    for entry in clip.metadata_iter()? {
        match entry {
            Ok((key, value)) => println!("  {key:<32} {value}"),
            Err(err) => eprintln!("  <unreadable entry: {err}>"),
        }
    }

    Ok(())
}
