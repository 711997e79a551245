use assert_cmd::Command;
use clap::Parser;
use kira_neurovoice::cli::{CatalogCommand, Cli, Commands};

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-neurovoice").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_flags_default_off() {
    let cli = Cli::parse_from(["kira-neurovoice", "run", "--input", "p.json", "--out", "out"]);
    match cli.command {
        Commands::Run(args) => {
            assert!(!args.json);
            assert!(!args.crossval);
            assert_eq!(args.threads, 0);
            assert_eq!(args.age, None);
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn catalog_show_parses_domain() {
    let cli = Cli::parse_from(["kira-neurovoice", "catalog", "show", "--domain", "lexical"]);
    match cli.command {
        Commands::Catalog(args) => match args.command {
            CatalogCommand::Show(show) => assert_eq!(show.domain.as_deref(), Some("lexical")),
        },
        _ => panic!("expected catalog command"),
    }
}
