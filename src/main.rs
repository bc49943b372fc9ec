//! stepcask CLI - Convert STEP attribute trees to Cask containers and
//! inspect the result.

use std::env;
use std::path::Path;
use std::process;

use anyhow::Context;

use stepcask::cask::{Entry, IContainer};
use stepcask::convert::convert_file;
use stepcask::extract::SampleExtractor;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbose = false;
    let mut quiet = false;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-q" | "--quiet" => quiet = true,
            _ => filtered_args.push(arg),
        }
    }

    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = match filtered_args.first().copied() {
        Some("convert") | Some("c") => {
            if filtered_args.len() < 3 {
                eprintln!("Usage: {} convert <input.step> <output.cask>", args[0]);
                process::exit(1);
            }
            cmd_convert(filtered_args[1], filtered_args[2])
        }
        Some("dump") | Some("d") => {
            if filtered_args.len() < 2 {
                eprintln!("Usage: {} dump <file.cask>", args[0]);
                process::exit(1);
            }
            cmd_dump(filtered_args[1])
        }
        Some("help") | Some("h") | Some("-h") | Some("--help") | None => {
            print_usage(&args[0]);
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn print_usage(prog: &str) {
    println!("stepcask - STEP attribute trees in a hierarchical binary container");
    println!();
    println!("Usage: {prog} [options] <command> <args>");
    println!();
    println!("Commands:");
    println!("  c, convert <in.step> <out.cask>   Extract attributes and write a container");
    println!("  d, dump <file.cask>               Print every group and dataset");
    println!("  h, help                           Show this help");
    println!();
    println!("Options:");
    println!("  -v, --verbose  Debug output");
    println!("  -q, --quiet    Errors only");
}

fn cmd_convert(input: &str, output: &str) -> anyhow::Result<()> {
    let summary = convert_file(&SampleExtractor, Path::new(input), Path::new(output))
        .with_context(|| format!("converting {input}"))?;

    if summary.entities == 0 {
        println!("Nothing to do: no attributes extracted from {input}");
        return Ok(());
    }

    println!("Wrote {output}");
    println!("  Entities:  {}", summary.entities);
    println!("  Groups:    {}", summary.groups);
    println!("  Datasets:  {} ({} text fallbacks)", summary.datasets, summary.fallbacks);
    Ok(())
}

fn cmd_dump(path: &str) -> anyhow::Result<()> {
    let container =
        IContainer::open(path).with_context(|| format!("opening {path}"))?;

    println!("Container: {path} (version {})", container.version());

    let mut entries = 0usize;
    container.for_each_entry(|entry_path, entry| {
        match entry {
            Entry::Group => println!("  Group: {entry_path}/"),
            Entry::Dataset(value) => println!("    Dataset: {entry_path} = {value}"),
        }
        entries += 1;
    })?;

    if entries == 0 {
        println!("  (no entries)");
    }
    Ok(())
}
