use clap::{ArgAction, Parser};
use std::path::PathBuf;

pub const USAGE: &str = "Usage: tolling-vision-batch <service_url> <secured> <max_parallel_requests> <image_folder_path> <csv_file_path> <group_regex> <front_regex> <rear_regex> <overview_regex>";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tolling-vision-batch",
    version,
    about = "Group crossing images and analyze them with a Tolling Vision service"
)]
pub struct Cli {
    #[arg(help = "Service address, host:port or a full URI")]
    pub service_url: String,
    #[arg(action = ArgAction::Set, value_parser = parse_secured, help = "Use TLS (true/false)")]
    pub secured: bool,
    #[arg(value_parser = parse_max_parallel, help = "Maximum analyze calls in flight")]
    pub max_parallel_requests: usize,
    #[arg(help = "Root folder scanned recursively for images")]
    pub image_folder_path: PathBuf,
    #[arg(help = "CSV file receiving one row per analyzed crossing")]
    pub csv_file_path: PathBuf,
    #[arg(allow_hyphen_values = true, help = "Pattern whose first match names the crossing")]
    pub group_regex: String,
    #[arg(allow_hyphen_values = true, help = "Pattern selecting front images")]
    pub front_regex: String,
    #[arg(allow_hyphen_values = true, help = "Pattern selecting rear images")]
    pub rear_regex: String,
    #[arg(allow_hyphen_values = true, help = "Pattern selecting overview images")]
    pub overview_regex: String,
}

/// Only a case-insensitive `true` enables TLS; anything else means plaintext
fn parse_secured(value: &str) -> Result<bool, String> {
    Ok(value.eq_ignore_ascii_case("true"))
}

fn parse_max_parallel(value: &str) -> Result<usize, String> {
    let parsed: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", value))?;
    if parsed == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS: [&str; 10] = [
        "tolling-vision-batch",
        "localhost:50051",
        "false",
        "4",
        "/images",
        "out.csv",
        r"crossing\d+",
        "front",
        "rear",
        "overview",
    ];

    #[test]
    fn test_parses_nine_positionals() {
        let cli = Cli::try_parse_from(ARGS).unwrap();
        assert_eq!(cli.service_url, "localhost:50051");
        assert!(!cli.secured);
        assert_eq!(cli.max_parallel_requests, 4);
        assert_eq!(cli.image_folder_path, PathBuf::from("/images"));
        assert_eq!(cli.group_regex, r"crossing\d+");
        assert_eq!(cli.overview_regex, "overview");
    }

    #[test]
    fn test_wrong_argument_count_is_rejected() {
        assert!(Cli::try_parse_from(ARGS[..9].iter().copied()).is_err());
        let mut extra = ARGS.to_vec();
        extra.push("surplus");
        assert!(Cli::try_parse_from(extra).is_err());
    }

    #[test]
    fn test_secured_is_lenient() {
        assert_eq!(parse_secured("TRUE"), Ok(true));
        assert_eq!(parse_secured("yes"), Ok(false));
        assert_eq!(parse_secured("false"), Ok(false));
    }

    #[test]
    fn test_max_parallel_must_be_positive() {
        assert_eq!(parse_max_parallel("8"), Ok(8));
        assert!(parse_max_parallel("0").is_err());
        assert!(parse_max_parallel("many").is_err());
    }

    #[test]
    fn test_hyphen_leading_patterns() {
        let mut args = ARGS.to_vec();
        args[6] = r"-\d{4}-";
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.group_regex, r"-\d{4}-");
    }
}
