// File: ./src/cli.rs
//! Command-line interface: argument parsing, help text and command execution.
//!
//! Commands write to a caller-supplied writer so they can be exercised in tests.

use crate::audit::audit;
use crate::catalog::Catalog;
use crate::config::{LogLevel, Settings};
use crate::context::AppContext;
use crate::model::{Jurisdiction, Location, TransliterationStyle};
use crate::service::{ZmanimService, catalog_path};
use crate::source::StaticCalendar;
use crate::storage::LocalStorage;
use crate::store::{CatalogSnapshot, CatalogStore};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Context(NaiveDate),
    Day(NaiveDate),
    Resolve(String),
    Check(Option<PathBuf>),
    Audit(NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub catalog: Option<PathBuf>,
    pub calendar: Option<PathBuf>,
    pub jurisdiction: Option<Jurisdiction>,
    pub style: Option<TransliterationStyle>,
    pub root: Option<PathBuf>,
    pub verbose: u8,
}

impl CliArgs {
    /// Effective log level: the configured one, raised by each `-v`.
    pub fn log_level(&self, configured: LogLevel) -> log::LevelFilter {
        let requested = match self.verbose {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        configured.to_filter().max(requested)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

/// Parses the arguments after the binary name.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut positional: Vec<String> = Vec::new();
    let mut parsed = CliArgs {
        command: Command::Help,
        catalog: None,
        calendar: None,
        jurisdiction: None,
        style: None,
        root: None,
        verbose: 0,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(parsed),
            "--catalog" => {
                let value = iter.next().ok_or_else(|| anyhow!("--catalog needs a path"))?;
                parsed.catalog = Some(PathBuf::from(value));
            }
            "--calendar" => {
                let value = iter.next().ok_or_else(|| anyhow!("--calendar needs a path"))?;
                parsed.calendar = Some(PathBuf::from(value));
            }
            "-r" | "--root" => {
                let value = iter.next().ok_or_else(|| anyhow!("--root needs a path"))?;
                parsed.root = Some(PathBuf::from(value));
            }
            "--israel" => parsed.jurisdiction = Some(Jurisdiction::Israel),
            "--diaspora" => parsed.jurisdiction = Some(Jurisdiction::Diaspora),
            "--ashkenazi" => parsed.style = Some(TransliterationStyle::Ashkenazi),
            "--sephardi" => parsed.style = Some(TransliterationStyle::Sephardi),
            "-v" | "--verbose" => parsed.verbose += 1,
            "-vv" => parsed.verbose += 2,
            other if other.starts_with('-') && other.len() > 1 => {
                bail!("Unknown option '{}'", other)
            }
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let Some(command) = positional.next() else {
        return Ok(parsed);
    };
    let mut next = |what: &str| {
        positional
            .next()
            .ok_or_else(|| anyhow!("'{}' needs {}", command, what))
    };

    parsed.command = match command.as_str() {
        "help" => Command::Help,
        "context" => Command::Context(parse_date(&next("a date")?)?),
        "day" => Command::Day(parse_date(&next("a date")?)?),
        "resolve" => Command::Resolve(next("an occurrence name")?),
        "check" => Command::Check(next("").ok().map(PathBuf::from)),
        "audit" => {
            let from = parse_date(&next("a start date")?)?;
            let to = parse_date(&next("an end date")?)?;
            if to < from {
                bail!("audit: end date {} is before start date {}", to, from);
            }
            Command::Audit(from, to)
        }
        other => bail!("Unknown command '{}'. Try --help.", other),
    };
    Ok(parsed)
}

/// Runs a parsed command.
pub fn run(
    args: &CliArgs,
    settings: &Settings,
    ctx: &dyn AppContext,
    out: &mut dyn Write,
) -> Result<()> {
    let jurisdiction = args.jurisdiction.unwrap_or(settings.default_jurisdiction);
    let style = args.style.unwrap_or(settings.transliteration);
    let location = Location::in_jurisdiction(jurisdiction);

    match &args.command {
        Command::Help => {
            print_help_to(out, "zmanim-tags")?;
        }
        Command::Context(date) => {
            let service = build_service(args, settings, ctx)?;
            let context = service.zmanim_context(*date, &location);
            writeln!(out, "{}", serde_json::to_string_pretty(&context)?)?;
        }
        Command::Day(date) => {
            let service = build_service(args, settings, ctx)?;
            let info = service.event_day_info(*date, &location, style);
            writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        }
        Command::Resolve(name) => {
            let service = build_service(args, settings, ctx)?.with_style(style);
            match service.resolve_name(name, jurisdiction) {
                Some(event) => writeln!(
                    out,
                    "{} -> {} ({}), day {} of {}{}",
                    name,
                    event.tag_key,
                    event.name_english,
                    event.day_number,
                    event.total_days,
                    if event.is_final_day { ", final day" } else { "" }
                )?,
                None if service.snapshot().resolve(name).is_some() => writeln!(
                    out,
                    "{} -> matched a rule, but the day is outside the span for {}",
                    name, jurisdiction
                )?,
                None => writeln!(out, "{} -> no match", name)?,
            }
        }
        Command::Check(path) => {
            let path = match path {
                Some(p) => Some(p.clone()),
                None => resolve_catalog_path(args, settings, ctx)?,
            };
            let catalog = match &path {
                Some(p) => {
                    let contents = LocalStorage::read_locked(p)?;
                    toml::from_str::<Catalog>(&contents)
                        .with_context(|| format!("Failed to parse catalog '{}'", p.display()))?
                }
                None => Catalog::builtin()?,
            };
            let snapshot = CatalogSnapshot::build(catalog, &settings.weekly_rest_tag)?;
            writeln!(
                out,
                "{}: OK ({} tags, {} exact rules, {} pattern rules)",
                path.as_ref()
                    .map_or_else(|| "built-in catalog".to_string(), |p| p.display().to_string()),
                snapshot.registry.len(),
                snapshot.rules.exact_count(),
                snapshot.rules.pattern_count()
            )?;
        }
        Command::Audit(from, to) => {
            if args.calendar.is_none() {
                bail!("audit needs --calendar <file.json>");
            }
            let service = build_service(args, settings, ctx)?;
            let report = audit(&service.snapshot(), service.source(), *from, *to, jurisdiction);
            write!(out, "{}", report)?;
        }
    }
    Ok(())
}

fn resolve_catalog_path(
    args: &CliArgs,
    settings: &Settings,
    ctx: &dyn AppContext,
) -> Result<Option<PathBuf>> {
    match &args.catalog {
        Some(path) => Ok(Some(path.clone())),
        None => catalog_path(settings, ctx),
    }
}

fn build_service(
    args: &CliArgs,
    settings: &Settings,
    ctx: &dyn AppContext,
) -> Result<ZmanimService<StaticCalendar>> {
    let calendar = match &args.calendar {
        Some(path) => StaticCalendar::load(path)?,
        None => {
            log::warn!("No --calendar given; only the weekly rest day will be detected");
            StaticCalendar::new()
        }
    };
    let catalog = match resolve_catalog_path(args, settings, ctx)? {
        Some(path) => Catalog::load(&path)?,
        None => Catalog::builtin()?,
    };
    let store =
        CatalogStore::new(catalog, &settings.weekly_rest_tag).context("Catalog rejected")?;
    Ok(ZmanimService::new(store, calendar).with_style(settings.transliteration))
}

pub fn print_help(binary_name: &str) {
    let _ = print_help_to(&mut std::io::stdout(), binary_name);
}

fn print_help_to(out: &mut dyn Write, binary_name: &str) -> std::io::Result<()> {
    writeln!(
        out,
        "Zmanim Tags v{} - Resolve Hebrew calendar occurrences into zmanim event tags",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "USAGE:")?;
    writeln!(out, "    {} context <YYYY-MM-DD>            Active event codes and display contexts", binary_name)?;
    writeln!(out, "    {} day <YYYY-MM-DD>                Full day classification (JSON)", binary_name)?;
    writeln!(out, "    {} resolve \"<occurrence name>\"     Resolve one occurrence name", binary_name)?;
    writeln!(out, "    {} check [catalog.toml]            Validate a catalog", binary_name)?;
    writeln!(out, "    {} audit <from> <to>               Mapping coverage over a date range", binary_name)?;
    writeln!(out, "    {} --help                          Show this help message", binary_name)?;
    writeln!(out)?;
    writeln!(out, "OPTIONS:")?;
    writeln!(out, "    --catalog <path>      Use this catalog instead of the configured one.")?;
    writeln!(out, "    --calendar <path>     JSON file of occurrences keyed by date.")?;
    writeln!(out, "    --israel              Use the Israel calendar.")?;
    writeln!(out, "    --diaspora            Use the diaspora calendar.")?;
    writeln!(out, "    --ashkenazi           Ashkenazi transliteration for English names.")?;
    writeln!(out, "    --sephardi            Sephardi transliteration for English names.")?;
    writeln!(out, "    -r, --root <path>     Use a different directory for config and data.")?;
    writeln!(out, "    -v, --verbose         More logging (repeat for more).")?;
    writeln!(out, "    -h, --help            Show this help message.")?;
    writeln!(out)?;
    writeln!(out, "CALENDAR FILE:")?;
    writeln!(out, "    {{")?;
    writeln!(out, "      \"2025-04-19\": [{{ \"name\": \"Pesach VII\", \"is_festival\": true }}],")?;
    writeln!(out, "      \"2025-04-20\": {{ \"diaspora\": [{{ \"name\": \"Pesach VIII\", \"is_festival\": true }}] }}")?;
    writeln!(out, "    }}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_to_string(cli: &CliArgs, ctx: &TestContext) -> Result<String> {
        let mut out = Vec::new();
        run(cli, &Settings::default(), ctx, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_commands_and_options() {
        let cli = parse_args(&args(&["--israel", "context", "2025-04-19", "-v", "--ashkenazi"])).unwrap();
        assert_eq!(
            cli.command,
            Command::Context(NaiveDate::from_ymd_opt(2025, 4, 19).unwrap())
        );
        assert_eq!(cli.jurisdiction, Some(Jurisdiction::Israel));
        assert_eq!(cli.style, Some(TransliterationStyle::Ashkenazi));
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.log_level(LogLevel::Warn), log::LevelFilter::Info);

        let cli = parse_args(&args(&["check"])).unwrap();
        assert_eq!(cli.command, Command::Check(None));
        assert_eq!(parse_args(&[]).unwrap().command, Command::Help);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["context"])).is_err());
        assert!(parse_args(&args(&["context", "19/04/2025"])).is_err());
        assert!(parse_args(&args(&["audit", "2025-05-01", "2025-04-01"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["--catalog"])).is_err());
    }

    #[test]
    fn resolve_command_reports_span() {
        let ctx = TestContext::new();
        let cli = parse_args(&args(&["resolve", "Chanukah: 3 Candles"])).unwrap();
        let out = run_to_string(&cli, &ctx).unwrap();
        assert_eq!(out.trim(), "Chanukah: 3 Candles -> chanukah (Chanukah), day 3 of 8");

        let cli = parse_args(&args(&["--israel", "resolve", "Pesach VIII"])).unwrap();
        let out = run_to_string(&cli, &ctx).unwrap();
        assert!(out.contains("outside the span for israel"));

        let cli = parse_args(&args(&["resolve", "Totally Unknown Event 2099"])).unwrap();
        assert!(run_to_string(&cli, &ctx).unwrap().contains("no match"));
    }

    #[test]
    fn check_reports_builtin_and_broken_catalogs() {
        let ctx = TestContext::new();
        let cli = parse_args(&args(&["check"])).unwrap();
        assert!(run_to_string(&cli, &ctx).unwrap().contains("built-in catalog: OK"));

        let broken = ctx.root.join("broken.toml");
        std::fs::write(
            &broken,
            "[[tags]]\nkey = \"purim\"\nnames = { ashkenazi = \"Purim\" }\n\n[[rules]]\ntag = \"purim\"\nkind = \"pattern\"\npattern = \"^Purim (\"\n",
        )
        .unwrap();
        let cli = parse_args(&args(&["check", broken.to_str().unwrap()])).unwrap();
        let err = run_to_string(&cli, &ctx).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid pattern"));
    }

    #[test]
    fn check_reads_saved_catalog_under_lock() {
        let ctx = TestContext::new();
        let path = ctx.get_catalog_path().unwrap();
        Catalog::builtin().unwrap().save(&path).unwrap();

        let cli = parse_args(&args(&["check", path.to_str().unwrap()])).unwrap();
        let out = run_to_string(&cli, &ctx).unwrap();
        assert!(out.starts_with(&format!("{}: OK (", path.display())), "{}", out);
        assert!(path.with_extension("toml.lock").exists());
    }

    #[test]
    fn context_on_a_saturday_without_calendar() {
        let ctx = TestContext::new();
        let cli = parse_args(&args(&["context", "2025-01-11"])).unwrap();
        let out = run_to_string(&cli, &ctx).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["active_event_codes"][0], "shabbos");
        assert_eq!(value["display_contexts"][0], "shabbos");
    }

    #[test]
    fn audit_requires_calendar() {
        let ctx = TestContext::new();
        let cli = parse_args(&args(&["audit", "2025-01-01", "2025-01-31"])).unwrap();
        assert!(run_to_string(&cli, &ctx).is_err());
    }
}
