use std::path::PathBuf;

use clap::Parser;
use homefeed::cli::{Cli, Commands, OutputFormat};
use homefeed::dates::DateSource;

#[test]
fn test_images_command() {
    let cli = Cli::try_parse_from([
        "homefeed",
        "images",
        "--folder",
        "/a",
        "--folder",
        "/b",
        "-n",
        "5",
        "--output",
        "json",
    ])
    .unwrap();

    let Commands::Images(opts) = cli.command else {
        panic!("expected images command");
    };
    assert_eq!(opts.folders, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    assert_eq!(opts.limit, Some(5));
    assert_eq!(opts.output, OutputFormat::Json);
    assert_eq!(opts.date_source, None);
}

#[test]
fn test_folder_command() {
    let cli = Cli::try_parse_from([
        "homefeed",
        "folder",
        "/lib/2024",
        "--date-source",
        "ctime",
        "--max-video-size",
        "1GiB",
        "--slow-storage",
    ])
    .unwrap();

    let Commands::Folder(args) = cli.command else {
        panic!("expected folder command");
    };
    assert_eq!(args.dir, PathBuf::from("/lib/2024"));
    assert_eq!(args.scan.date_source, Some(DateSource::Ctime));
    assert_eq!(args.scan.max_video_size, Some(1_073_741_824));
    assert!(args.scan.slow_storage);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["homefeed", "leaves", "-vv", "--config", "/etc/hf.toml"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("/etc/hf.toml")));
    assert!(matches!(cli.command, Commands::Leaves(_)));
}

#[test]
fn test_invalid_arguments_rejected() {
    assert!(Cli::try_parse_from(["homefeed", "images", "--date-source", "atime"]).is_err());
    assert!(Cli::try_parse_from(["homefeed", "images", "--max-video-size", "-5"]).is_err());
    assert!(Cli::try_parse_from(["homefeed", "folder"]).is_err());
    assert!(Cli::try_parse_from(["homefeed", "-q", "-v", "cache-info"]).is_err());
}
