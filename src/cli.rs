use std::path::PathBuf;

use clap::Parser;

use crate::aws::ConnectOptions;

#[derive(Debug, Parser)]
#[command(
    name = "bucket-browser",
    version,
    about = "Browse S3 buckets interactively and download objects",
    long_about = "Browse S3-compatible buckets from the terminal, filter buckets and \
                  objects by substring, and download the selected object."
)]
pub struct Cli {
    /// S3 endpoint URL, e.g. http://localhost:4566
    #[arg(long, value_name = "URL")]
    pub endpoint_url: String,

    /// AWS profile to use (falls back to AWS_PROFILE, then "default")
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Directory downloaded objects are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Write a debug log
    #[arg(long)]
    pub debug: bool,

    /// Debug log location (defaults to the user cache directory)
    #[arg(long, value_name = "PATH", requires = "debug")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            profile: self.profile.clone().filter(|p| !p.is_empty()),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn endpoint_is_required() {
        let err = Cli::try_parse_from(["bucket-browser"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn defaults_apply() {
        let cli =
            Cli::try_parse_from(["bucket-browser", "--endpoint-url", "http://localhost:9000"])
                .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert!(!cli.debug);
        assert_eq!(
            cli.connect_options(),
            ConnectOptions {
                profile: None,
                endpoint_url: "http://localhost:9000".into(),
            }
        );
    }

    #[test]
    fn all_flags_parse() {
        let cli = Cli::try_parse_from([
            "bucket-browser",
            "--endpoint-url",
            "https://s3.example.com",
            "--profile",
            "staging",
            "--output-dir",
            "/tmp/dl",
            "--debug",
            "--log-file",
            "/tmp/bb.log",
        ])
        .unwrap();
        assert_eq!(cli.connect_options().profile.as_deref(), Some("staging"));
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/dl"));
        assert!(cli.debug);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/bb.log")));
    }

    #[test]
    fn log_file_needs_debug() {
        let err = Cli::try_parse_from([
            "bucket-browser",
            "--endpoint-url",
            "http://localhost:9000",
            "--log-file",
            "x.log",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
