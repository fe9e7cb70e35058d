use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use tokio_util::sync::CancellationToken;
use url::Url;

use chapter_core::RetryPolicy;
use chapter_engine::{
    load_cookie_header, run, FetchSettings, GenericSite, IdentityProfile, ReqwestFetcher,
    RunSettings, RunSummary, SiteAdapter,
};
use chapter_logging::LogDestination;

const USAGE: &str = "\
usage: chapter_app [options] <catalog-url>
  --out <file>            archive path (default: novel.txt)
  --cookies <file>        Cookie-Editor JSON export to send with every request
  --mobile                present a mobile browser identity
  --link-fragment <s>     substring marking chapter links (default: /book/)
  --newest-first          catalog lists newest chapters first
  --auth                  site needs a logged-in session
  --no-resume             re-fetch chapters already in the archive
  --no-normalize          keep chapter text exactly as extracted
  --delay <min,max>       inter-request delay range in seconds (default: 3,6)
  --max-retries <n|-1>    retry budget per fetch, -1 for unlimited (default: 20)
  --retry-cycle <s,s,..>  backoff wait cycle in seconds (default: 5,10,30,60)
  --log <term|file|both>  log destination (default: term)";

struct CliOptions {
    catalog: Url,
    archive_path: PathBuf,
    cookie_file: Option<PathBuf>,
    identity: IdentityProfile,
    link_fragment: Option<String>,
    newest_first: bool,
    requires_auth: bool,
    resume: bool,
    normalize: bool,
    delay_secs: RangeInclusive<f64>,
    retry: RetryPolicy,
    log_destination: LogDestination,
}

fn main() -> ExitCode {
    let options = match parse_args(std::env::args().skip(1).collect()) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    chapter_logging::initialize(options.log_destination);

    match execute(options) {
        Ok(summary) => {
            log::info!(
                "all chapters processed: {} downloaded, {} skipped, {} failed",
                summary.downloaded,
                summary.skipped,
                summary.failed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(options: CliOptions) -> anyhow::Result<RunSummary> {
    let cookie_header = match options.cookie_file.as_deref() {
        Some(path) => match load_cookie_header(path) {
            Ok(Some(header)) => {
                log::info!("cookies loaded from {}", path.display());
                Some(header)
            }
            Ok(None) => {
                log::warn!("no cookies found in {}; continuing as guest", path.display());
                None
            }
            Err(err) => {
                log::warn!("cookie file ignored ({err}); continuing as guest");
                None
            }
        },
        None => None,
    };

    let mut site = GenericSite::new(options.catalog.host_str().unwrap_or("site").to_string(), options.catalog.clone());
    if let Some(fragment) = options.link_fragment.as_deref() {
        site = site.with_link_fragment(fragment);
    }
    if options.newest_first {
        site = site.newest_first();
    }
    if options.requires_auth {
        site = site.authenticated();
    }
    if site.requires_auth() && cookie_header.is_none() {
        log::warn!("{} normally needs a logged-in session; expect 403 retries", site.name());
    }

    let fetcher = ReqwestFetcher::new(FetchSettings {
        identity: options.identity,
        cookie_header,
        retry: options.retry.clone(),
        ..FetchSettings::default()
    })?;

    let settings = RunSettings {
        archive_path: options.archive_path.clone(),
        resume: options.resume,
        normalize: options.normalize,
        delay_secs: options.delay_secs.clone(),
    };

    let cancel = CancellationToken::new();
    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let interrupt = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received; stopping after the current wait");
            interrupt.cancel();
        }
    });

    let summary = runtime.block_on(run(&settings, &site, &fetcher, &cancel))?;
    Ok(summary)
}

impl CliOptions {
    fn new(catalog: Url) -> Self {
        Self {
            catalog,
            archive_path: PathBuf::from("novel.txt"),
            cookie_file: None,
            identity: IdentityProfile::Desktop,
            link_fragment: None,
            newest_first: false,
            requires_auth: false,
            resume: true,
            normalize: true,
            delay_secs: 3.0..=6.0,
            retry: RetryPolicy::default(),
            log_destination: LogDestination::Terminal,
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut catalog = None;
    let mut pending: Vec<(String, String)> = Vec::new();
    let mut flags: Vec<String> = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" | "--cookies" | "--link-fragment" | "--delay" | "--max-retries"
            | "--retry-cycle" | "--log" => {
                let value = iter.next().ok_or_else(|| format!("{arg} needs a value"))?;
                pending.push((arg, value));
            }
            "--mobile" | "--newest-first" | "--auth" | "--no-resume" | "--no-normalize" => {
                flags.push(arg);
            }
            "--help" | "-h" => return Err("".to_string()),
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            other => {
                if catalog.is_some() {
                    return Err("only one catalog url is accepted".to_string());
                }
                catalog = Some(Url::parse(other).map_err(|e| format!("bad catalog url: {e}"))?);
            }
        }
    }

    let catalog = catalog.ok_or_else(|| "a catalog url is required".to_string())?;
    if catalog.scheme() != "http" && catalog.scheme() != "https" {
        return Err(format!("catalog url must be http/https: {catalog}"));
    }

    let mut options = CliOptions::new(catalog);
    for flag in flags {
        match flag.as_str() {
            "--mobile" => options.identity = IdentityProfile::Mobile,
            "--newest-first" => options.newest_first = true,
            "--auth" => options.requires_auth = true,
            "--no-resume" => options.resume = false,
            "--no-normalize" => options.normalize = false,
            _ => unreachable!(),
        }
    }
    for (key, value) in pending {
        match key.as_str() {
            "--out" => options.archive_path = PathBuf::from(value),
            "--cookies" => options.cookie_file = Some(PathBuf::from(value)),
            "--link-fragment" => options.link_fragment = Some(value),
            "--delay" => options.delay_secs = parse_delay(&value)?,
            "--max-retries" => options.retry.max_retries = parse_max_retries(&value)?,
            "--retry-cycle" => options.retry.cycle = parse_cycle(&value)?,
            "--log" => options.log_destination = parse_log(&value)?,
            _ => unreachable!(),
        }
    }
    Ok(options)
}

fn parse_delay(value: &str) -> Result<RangeInclusive<f64>, String> {
    let (min, max) = value
        .split_once(',')
        .ok_or_else(|| format!("--delay wants min,max seconds, got {value}"))?;
    let min: f64 = min.trim().parse().map_err(|_| format!("bad delay minimum: {min}"))?;
    let max: f64 = max.trim().parse().map_err(|_| format!("bad delay maximum: {max}"))?;
    if min < 0.0 || max < min {
        return Err(format!("--delay range must satisfy 0 <= min <= max, got {value}"));
    }
    Ok(min..=max)
}

fn parse_max_retries(value: &str) -> Result<Option<u32>, String> {
    if value == "-1" || value.eq_ignore_ascii_case("unlimited") {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| format!("bad retry budget: {value}"))
}

fn parse_cycle(value: &str) -> Result<Vec<Duration>, String> {
    let cycle = value
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("bad retry cycle entry: {s}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if cycle.is_empty() {
        return Err("--retry-cycle needs at least one wait".to_string());
    }
    Ok(cycle)
}

fn parse_log(value: &str) -> Result<LogDestination, String> {
    match value {
        "term" => Ok(LogDestination::Terminal),
        "file" => Ok(LogDestination::File),
        "both" => Ok(LogDestination::Both),
        other => Err(format!("unknown log destination: {other}")),
    }
}
