//! Inspect and initialize pimgate configuration from the command line.
//!
//! Resolution uses the real process environment (`PIMGATE_CONFIG_DIR`,
//! `PIMGATE_PROFILE`) unless overridden with `--config-dir` / `--profile`.
//! Diagnostics go to stderr; the rendered configuration goes to stdout.

use std::path::PathBuf;

use anyhow::{Context, bail};
use pimgate::config::{
    self, BaseSource, Environment, ProcessEnv, Resolution, SourceOverrides, format_init,
    format_show,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Ok(());
    };
    let options = Options::parse(rest)?;
    let resolution = options.resolve();

    match command.as_str() {
        "show" => show(&resolution),
        "init" => init(&resolution),
        "profiles" => profiles(&resolution),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => bail!("unknown subcommand `{other}` (use show|init|profiles)"),
    }
}

#[derive(Debug, Default)]
struct Options {
    call: SourceOverrides,
    workspace: Option<PathBuf>,
}

impl Options {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut options = Self::default();
        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{flag} requires a value"))
            };
            match flag.as_str() {
                "--config-dir" => options.call.config_dir = Some(value()?),
                "--profile" => options.call.profile = Some(value()?),
                "--workspace" => options.workspace = Some(PathBuf::from(value()?)),
                other => bail!("unknown option `{other}`"),
            }
        }
        Ok(options)
    }

    fn resolve(&self) -> Resolution {
        config::resolve(&self.call, self.workspace.as_deref(), None, &ProcessEnv)
    }
}

fn show(resolution: &Resolution) -> anyhow::Result<()> {
    let loaded = config::load_for(resolution).context("failed to load configuration")?;
    if loaded.base_source == BaseSource::Defaults {
        eprintln!("{}", loaded.base_source.describe(&loaded.config_path));
    }
    println!(
        "{}",
        format_show(
            &loaded.config,
            &loaded.config_path,
            &loaded.profiles_dir,
            loaded.profile.as_deref(),
            ProcessEnv.home_dir().as_deref(),
        )
    );
    Ok(())
}

fn init(resolution: &Resolution) -> anyhow::Result<()> {
    // Discovery of live calendars and lists belongs to the native helpers;
    // from the command line we start with an empty, permissive config.
    let report = config::init_config(&resolution.config_dir, &[], &[])?;
    println!(
        "{}",
        format_init(
            &report.config_path,
            &report.profiles_dir,
            &[],
            &[],
            report.config.effective_default_calendar(),
            report.config.effective_default_reminder_list(),
            ProcessEnv.home_dir().as_deref(),
        )
    );
    Ok(())
}

fn profiles(resolution: &Resolution) -> anyhow::Result<()> {
    let names = config::list_profiles(&resolution.config_dir)?;
    if names.is_empty() {
        let dir = pimgate::paths::profiles_dir(&resolution.config_dir);
        println!("no profiles in {}", dir.display());
        return Ok(());
    }
    for name in names {
        let marker = if resolution.profile.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {name}");
    }
    Ok(())
}

fn print_usage() {
    println!(
        "usage: pimgate-config <show|init|profiles> [--config-dir DIR] [--profile NAME] [--workspace DIR]"
    );
}
