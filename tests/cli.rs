use image::{Rgb, RgbImage};
use std::error::Error;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn keyhop_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keyhop"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(keyhop_command().args(args).output()?)
}

fn write_png(path: &Path, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    img.save(path)?;
    Ok(())
}

fn write_wav(path: &Path, frames: usize) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..frames * 2 {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn cli_image_end_to_end() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_png(&cover, 256, 256)?;

    let embed = run(&[
        "embed",
        "--password",
        "test123",
        cover.to_str().unwrap(),
        stego.to_str().unwrap(),
        "hello",
    ])?;
    assert!(
        embed.status.success(),
        "embed command failed: {}",
        String::from_utf8_lossy(&embed.stderr)
    );
    assert!(String::from_utf8(embed.stdout)?.contains("Embedded 9-byte frame"));
    assert!(stego.exists(), "stego image should exist after embed");

    let extract = run(&["extract", "--password", "test123", stego.to_str().unwrap()])?;
    assert!(
        extract.status.success(),
        "extract command failed: {}",
        String::from_utf8_lossy(&extract.stderr)
    );
    assert_eq!(String::from_utf8(extract.stdout)?.trim(), "hello");

    let wrong = run(&["extract", "--password", "wrong", stego.to_str().unwrap()])?;
    assert_eq!(wrong.status.code(), Some(1));
    assert!(String::from_utf8(wrong.stderr)?.contains("Marker not found"));

    Ok(())
}

#[test]
fn cli_audio_with_timestamp() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    let stego = dir.path().join("stego.wav");
    write_wav(&cover, 8192)?;

    let embed = run(&[
        "embed",
        "--password",
        "dwm",
        "--strategy",
        "chained-hop",
        "--timestamp",
        cover.to_str().unwrap(),
        stego.to_str().unwrap(),
        "signed",
    ])?;
    assert!(
        embed.status.success(),
        "embed command failed: {}",
        String::from_utf8_lossy(&embed.stderr)
    );

    let extract = run(&[
        "extract",
        "--password",
        "dwm",
        "--strategy",
        "chained-hop",
        stego.to_str().unwrap(),
    ])?;
    assert!(extract.status.success());
    let stdout = String::from_utf8(extract.stdout)?;
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("signed"));
    let stamp = lines
        .next()
        .and_then(|l| l.strip_prefix("Metadata: "))
        .ok_or("missing metadata line")?;
    assert_eq!(stamp.split('/').count(), 6);

    Ok(())
}

#[test]
fn cli_short_wav_folds_overflow() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.wav");
    let stego = dir.path().join("stego.wav");
    write_wav(&cover, 1000)?;
    // keep 600 of the 1000 frames the header declares
    let full = std::fs::metadata(&cover)?.len();
    let short = full - 400 * 4;
    std::fs::OpenOptions::new()
        .write(true)
        .open(&cover)?
        .set_len(short)?;

    let info = run(&["info", cover.to_str().unwrap()])?;
    assert!(info.status.success());
    let stdout = String::from_utf8(info.stdout)?;
    assert!(stdout.contains("Capacity: 1000 units"));
    assert!(stdout.contains("Resident: 600 units"));

    let embed = run(&[
        "embed",
        "--password",
        "fold-me",
        cover.to_str().unwrap(),
        stego.to_str().unwrap(),
        "echo",
    ])?;
    assert!(
        embed.status.success(),
        "embed command failed: {}",
        String::from_utf8_lossy(&embed.stderr)
    );
    assert_eq!(std::fs::metadata(&stego)?.len(), short);
    assert_eq!(hound::WavReader::open(&stego)?.duration(), 1000);

    let extract = run(&["extract", "--password", "fold-me", stego.to_str().unwrap()])?;
    assert!(
        extract.status.success(),
        "extract command failed: {}",
        String::from_utf8_lossy(&extract.stderr)
    );
    assert_eq!(String::from_utf8(extract.stdout)?.trim(), "echo");

    let config = dir.path().join("strict.toml");
    std::fs::write(&config, "overflow = \"strict\"\n")?;
    let strict = run(&[
        "embed",
        "--password",
        "fold-me",
        "--config",
        config.to_str().unwrap(),
        cover.to_str().unwrap(),
        dir.path().join("strict.wav").to_str().unwrap(),
        "echo",
    ])?;
    assert_eq!(strict.status.code(), Some(1));
    assert!(String::from_utf8(strict.stderr)?.contains("Address 740 out of bounds"));

    Ok(())
}

#[test]
fn cli_unframed_red_lsb() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_png(&cover, 64, 64)?;

    let flags = ["--strategy", "permutation", "--codec", "red-lsb", "--unframed"];
    let mut args = vec!["embed", "--password", "bits"];
    args.extend(flags);
    args.extend([cover.to_str().unwrap(), stego.to_str().unwrap(), "abc"]);
    let embed = run(&args)?;
    assert!(
        embed.status.success(),
        "embed command failed: {}",
        String::from_utf8_lossy(&embed.stderr)
    );
    assert!(String::from_utf8(embed.stdout)?.contains("(24 units touched)"));

    let mut args = vec!["extract", "--password", "bits", "--length", "3"];
    args.extend(flags);
    args.push(stego.to_str().unwrap());
    let extract = run(&args)?;
    assert!(extract.status.success());
    assert_eq!(String::from_utf8(extract.stdout)?.trim(), "abc");

    let mut args = vec!["extract", "--password", "bits"];
    args.extend(flags);
    args.push(stego.to_str().unwrap());
    assert!(!run(&args)?.status.success());

    Ok(())
}

#[test]
fn cli_fixed_length_extract() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_png(&cover, 64, 64)?;

    let embed = run(&[
        "embed",
        "--password",
        "pw",
        "--strategy",
        "permutation",
        cover.to_str().unwrap(),
        stego.to_str().unwrap(),
        "abcdef",
    ])?;
    assert!(embed.status.success());

    let extract = run(&[
        "extract",
        "--password",
        "pw",
        "--strategy",
        "permutation",
        "--length",
        "4",
        stego.to_str().unwrap(),
    ])?;
    assert!(extract.status.success());
    assert_eq!(String::from_utf8(extract.stdout)?.trim(), "abcd");

    Ok(())
}

#[test]
fn cli_config_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let config = dir.path().join("scheme.toml");
    write_png(&cover, 64, 64)?;
    std::fs::write(
        &config,
        "strategy = \"permutation\"\nhash = \"blake3\"\n\n[markers]\nstart = \"<<\"\nend = \">>\"\n",
    )?;

    let embed = run(&[
        "embed",
        "--password",
        "cfg",
        "--config",
        config.to_str().unwrap(),
        cover.to_str().unwrap(),
        stego.to_str().unwrap(),
        "from config",
    ])?;
    assert!(
        embed.status.success(),
        "embed command failed: {}",
        String::from_utf8_lossy(&embed.stderr)
    );

    let extract = run(&[
        "extract",
        "--password",
        "cfg",
        "--config",
        config.to_str().unwrap(),
        stego.to_str().unwrap(),
    ])?;
    assert!(extract.status.success());
    assert_eq!(String::from_utf8(extract.stdout)?.trim(), "from config");

    Ok(())
}

#[test]
fn cli_derive_and_info() -> Result<(), Box<dyn Error>> {
    let derive = run(&["derive", "--password", "abc", "--hash", "md5", "--json"])?;
    assert!(derive.status.success());
    let value: serde_json::Value = serde_json::from_slice(&derive.stdout)?;
    assert_eq!(value["digest"], "900150983cd24fb0d6963f7d28e17f72");

    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    write_png(&cover, 16, 16)?;
    let info = run(&["info", cover.to_str().unwrap()])?;
    assert!(info.status.success());
    let stdout = String::from_utf8(info.stdout)?;
    assert!(stdout.contains("Dimensions: 16x16"));
    assert!(stdout.contains("Capacity: 256 units"));
    assert!(stdout.contains("permutation: 64 bytes"));

    Ok(())
}

#[test]
fn cli_rejects_jpeg_output_and_unknown_strategy() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let out = dir.path().join("out.jpg");
    write_png(&cover, 32, 32)?;

    let jpeg = run(&[
        "embed",
        "--password",
        "pw",
        cover.to_str().unwrap(),
        out.to_str().unwrap(),
        "x",
    ])?;
    assert!(!jpeg.status.success());
    assert!(!out.exists());

    let bad = run(&[
        "extract",
        "--password",
        "pw",
        "--strategy",
        "zigzag",
        cover.to_str().unwrap(),
    ])?;
    assert!(!bad.status.success());

    Ok(())
}

#[test]
fn cli_version() -> Result<(), Box<dyn Error>> {
    let out = run(&["-V"])?;
    assert!(out.status.success());
    assert!(String::from_utf8(out.stdout)?.starts_with("keyhop "));
    Ok(())
}
