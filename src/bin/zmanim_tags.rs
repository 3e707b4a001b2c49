use anyhow::Result;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use zmanim_tags::cli::{self, Command};
use zmanim_tags::config::Settings;
use zmanim_tags::context::StandardContext;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let parsed = cli::parse_args(&args)?;

    if parsed.command == Command::Help {
        cli::print_help("zmanim-tags");
        return Ok(());
    }

    let ctx = StandardContext::new(parsed.root.clone());
    let settings = Settings::load_or_default(&ctx)?;

    let mut config = ConfigBuilder::new();
    config
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off);
    TermLogger::init(
        parsed.log_level(settings.log_level),
        config.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    log::debug!("Parsed arguments: {:?}", parsed);

    cli::run(&parsed, &settings, &ctx, &mut std::io::stdout().lock())
}
