use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kira_neurovoice::catalog::{self, Catalog, Domain};
use kira_neurovoice::cli::{CatalogCommand, CatalogShowArgs, Cli, Commands};
use kira_neurovoice::ctx::Ctx;
use kira_neurovoice::io;
use kira_neurovoice::pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let mut ctx = Ctx::new(args.input, args.out, args.json, env!("CARGO_PKG_VERSION"));
            ctx.crossval = args.crossval;
            ctx.threads = args.threads;
            ctx.config_path = args.config;
            ctx.catalog_path = args.catalog;
            ctx.topics_path = args.topics;
            ctx.overrides.age = args.age;
            ctx.overrides.calibration = args.calibration;
            ctx.overrides.weeks = args.weeks;

            pipeline::full_run().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Catalog(args) => match args.command {
            CatalogCommand::Show(show) => handle_catalog_show(show)?,
        },
        Commands::Validate(args) => {
            let mut ctx = Ctx::new(
                args.input,
                PathBuf::from("."),
                false,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.catalog_path = args.catalog;
            ctx.overrides.calibration = args.calibration;

            pipeline::validate_run().run(&mut ctx)?;
            print_validate_summary(&ctx);
        }
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    print_warnings(ctx);
    Ok(())
}

fn print_validate_summary(ctx: &Ctx) {
    println!("kira-neurovoice validate ok");
    if let Some(patient) = &ctx.patient {
        println!("patient: {}", patient.patient_id);
        println!("sessions: {}", patient.sessions.len());
    }
    println!("calibration: {}", ctx.calibration_count);
    if let Some(baseline) = &ctx.baseline {
        println!("baseline_complete: {}", baseline.complete);
        println!("indicators_with_baseline: {}", baseline.sufficient_count());
    }
    print_warnings(ctx);
}

fn print_warnings(ctx: &Ctx) {
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
}

fn handle_catalog_show(args: CatalogShowArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => catalog::load_user(path, None)?,
        None => catalog::load_builtin()?,
    };
    let domain = match args.domain.as_deref() {
        Some(name) => match Domain::parse(name) {
            Some(d) => Some(d),
            None => bail!("unknown domain '{}'", name),
        },
        None => None,
    };
    print_catalog(&catalog, domain);
    Ok(())
}

fn print_catalog(catalog: &Catalog, domain: Option<Domain>) {
    println!("indicators (version {}):", catalog.version);
    for ind in &catalog.indicators {
        if domain.is_some_and(|d| d != ind.domain) {
            continue;
        }
        println!(
            "{}\t{}\t{:.2}\t{}",
            ind.id,
            ind.domain.as_str(),
            ind.base_weight,
            ind.name
        );
    }
}
