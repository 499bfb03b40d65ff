// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{CleanupScope, DEFAULT_PAGE_SIZE, MediaKind, MediaRef, PageRequest, VerifiedPrincipal};
use crate::domain::ownership::ClientContext;
use crate::infra::cli::parsing::MainCommands::{Batch, Cleanup, History, Profile, Scan, Show};
use crate::infra::config::{DetectionSettings, SettingsArguments};
use crate::verisight::VerisightTask;
use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Args, Debug)]
struct ScanArguments {
    /// Public URL of the image or video to scan
    pub media_url: String,

    /// Kind of media behind the URL
    #[arg(long, value_enum, default_value_t = MediaKind::Image)]
    pub kind: MediaKind,
}

#[derive(Args, Debug)]
struct BatchArguments {
    /// File listing one `<image|video> <url>` pair per line
    pub input: PathBuf,
}

#[derive(Args, Debug)]
struct HistoryArguments {
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Between 1 and 50 scans per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(Args, Debug)]
struct ShowArguments {
    pub scan_id: String,
}

#[derive(Args, Debug)]
struct CleanupArguments {
    /// Define the scope of stored data to remove
    #[arg(value_enum)]
    pub mode: CleanupScope,
}

#[derive(Args, Debug)]
struct ClientArguments {
    /// Email of a user already verified by the authentication layer
    #[arg(long, global = true)]
    pub user_email: Option<String>,

    /// Display name of the verified user
    #[arg(long, global = true, requires = "user_email")]
    pub user_name: Option<String>,

    /// Act as a client that cannot keep cookies
    #[arg(long, global = true)]
    pub no_cookies: bool,

    #[arg(long, global = true, default_value = "127.0.0.1")]
    pub client_ip: String,

    #[arg(long, global = true)]
    pub user_agent: Option<String>,
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = false)]
struct CliParser {
    #[command(subcommand)]
    pub command: MainCommands,

    #[command(flatten)]
    pub settings: SettingsArguments,

    #[command(flatten)]
    pub client: ClientArguments,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_colors: bool,
}

#[derive(Subcommand)]
enum MainCommands {
    /// Scan a single image or video and persist its verdict
    Scan(ScanArguments),
    /// Scan every media listed in a file
    Batch(BatchArguments),
    /// List past scans, newest first
    History(HistoryArguments),
    /// Show details for one past scan
    Show(ShowArguments),
    /// Show account details and verdict statistics (verified users only)
    Profile,
    /// Clean up stored data used by this tool
    Cleanup(CleanupArguments),
}

#[derive(Debug)]
pub struct CliInvocation {
    pub task: VerisightTask,
    pub settings: DetectionSettings,
    pub client: ClientContext,
    pub use_colors: bool,
}

pub fn parse_arguments() -> anyhow::Result<CliInvocation> {
    into_invocation(CliParser::parse())
}

pub fn parse_arguments_from<I, T>(raw_arguments: I) -> anyhow::Result<CliInvocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    into_invocation(CliParser::try_parse_from(raw_arguments)?)
}

fn into_invocation(cli: CliParser) -> anyhow::Result<CliInvocation> {
    let task = match cli.command {
        Scan(args) => VerisightTask::ScanMedia(MediaRef::parse(&args.media_url, args.kind)?),
        Batch(args) => {
            if !args.input.exists() {
                bail!("verisight.cli : no such file or directory ({:?})", args.input)
            }
            VerisightTask::ScanBatch(args.input)
        },
        History(args) => VerisightTask::ListHistory(PageRequest::new(args.page, args.page_size)),
        Show(args) => VerisightTask::ShowScan(args.scan_id),
        Profile => VerisightTask::ShowProfile,
        Cleanup(args) => VerisightTask::Cleanup(args.mode),
    };

    let settings = DetectionSettings::validate(cli.settings)?;

    let principal = cli.client.user_email.map(|email| VerifiedPrincipal {
        email,
        name: cli.client.user_name,
    });

    let client = ClientContext {
        principal,
        accepts_cookies: !cli.client.no_cookies,
        client_ip: cli.client.client_ip,
        user_agent: cli
            .client
            .user_agent
            .unwrap_or_else(|| format!("verisight/{}", env!("CARGO_PKG_VERSION"))),
    };

    Ok(CliInvocation {
        task,
        settings,
        client,
        use_colors: !cli.no_colors,
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::errors::ScanError;
    use crate::domain::models::{CleanupScope, MediaKind, PageRequest, VerifiedPrincipal};
    use crate::infra::cli::parsing::parse_arguments_from;
    use crate::verisight::VerisightTask;
    use assertor::{BooleanAssertion, EqualityAssertion, ResultAssertion};
    use temp_dir::TempDir;

    #[test]
    fn should_parse_scan_with_kind() {
        let invocation = parse_arguments_from(["verisight", "scan", "https://cdn.example.com/a.mp4", "--kind", "video"])
            .unwrap();

        let VerisightTask::ScanMedia(media) = invocation.task else {
            panic!("expecting a scan task");
        };

        assertor::assert_that!(media.kind).is_equal_to(MediaKind::Video);
        assertor::assert_that!(media.url.as_str()).is_equal_to("https://cdn.example.com/a.mp4");
        assertor::assert_that!(invocation.use_colors).is_true();
        assertor::assert_that!(invocation.client.accepts_cookies).is_true();
    }

    #[test]
    fn should_reject_media_urls_without_http_scheme() {
        let parsed = parse_arguments_from(["verisight", "scan", "file:///tmp/a.png"]);

        assertor::assert_that!(parsed).is_err();
    }

    #[test]
    fn should_clamp_history_pagination() {
        let invocation =
            parse_arguments_from(["verisight", "history", "--page", "0", "--page-size", "500"]).unwrap();

        let VerisightTask::ListHistory(page) = invocation.task else {
            panic!("expecting a history task");
        };

        assertor::assert_that!(page).is_equal_to(PageRequest::new(1, 50));
    }

    #[test]
    fn should_carry_verified_principal_and_client_details() {
        let invocation = parse_arguments_from([
            "verisight",
            "profile",
            "--user-email",
            "ada@example.com",
            "--user-name",
            "Ada",
            "--no-cookies",
            "--client-ip",
            "10.1.1.1",
            "--no-colors",
        ])
        .unwrap();

        let expected = VerifiedPrincipal {
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
        };

        assertor::assert_that!(invocation.client.principal).is_equal_to(Some(expected));
        assertor::assert_that!(invocation.client.accepts_cookies).is_false();
        assertor::assert_that!(invocation.client.client_ip).is_equal_to("10.1.1.1".to_string());
        assertor::assert_that!(invocation.use_colors).is_false();
    }

    #[test]
    fn should_require_email_along_user_name() {
        let parsed = parse_arguments_from(["verisight", "profile", "--user-name", "Ada"]);

        assertor::assert_that!(parsed).is_err();
    }

    #[test]
    fn should_parse_cleanup_scopes() {
        let invocation = parse_arguments_from(["verisight", "cleanup", "expired-scores"]).unwrap();

        let VerisightTask::Cleanup(scope) = invocation.task else {
            panic!("expecting a cleanup task");
        };

        assertor::assert_that!(scope).is_equal_to(CleanupScope::ExpiredScores);
    }

    #[test]
    fn should_require_existing_batch_file() {
        let temp_dir = TempDir::new().unwrap();
        let batch_file = temp_dir.path().join("media.txt");

        let missing = parse_arguments_from([
            "verisight".to_string(),
            "batch".to_string(),
            batch_file.to_string_lossy().to_string(),
        ]);

        std::fs::write(&batch_file, "image https://cdn.example.com/a.png").unwrap();

        let existing = parse_arguments_from([
            "verisight".to_string(),
            "batch".to_string(),
            batch_file.to_string_lossy().to_string(),
        ]);

        assertor::assert_that!(missing).is_err();
        assertor::assert_that!(existing).is_ok();
    }

    #[test]
    fn should_surface_invalid_thresholds_at_startup() {
        let parsed = parse_arguments_from(["verisight", "history", "--verdict-hi", "0.2", "--verdict-lo", "0.2"]);

        let Err(failure) = parsed else {
            panic!("expecting a configuration error");
        };

        assertor::assert_that!(failure.downcast_ref::<ScanError>().cloned()).is_equal_to(Some(
            ScanError::InvalidThresholdConfiguration { hi: 0.2, lo: 0.2 },
        ));
    }
}
